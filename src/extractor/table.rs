// src/extractor/table.rs

//! 旧版 "资源列表" 布局: 页面主区域是一张 mod_index 表格, 每行一个资源。
//! 行内图标的 alt 文本是类型标签, 锚点文本是资源名, 首列单元格是分区名。

use super::{PageStrategy, select};
use crate::{descriptor::build_descriptor, models::{Resource, ResourceKind}};
use log::debug;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static TABLE_BODY: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div[role='main'] > table.generaltable.mod_index > tbody").unwrap()
});
static ICON: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// 行内中间态: 类型过滤之前先做分区传播, 与行在表格里的相邻关系一致。
struct RowCandidate {
    name: String,
    label: String,
    href: String,
    section: String,
}

pub struct TableStrategy;

impl PageStrategy for TableStrategy {
    fn name(&self) -> &'static str {
        "表格布局"
    }

    fn extract(&self, doc: &Html, sesskey: Option<&str>) -> Vec<Resource> {
        let Some(tbody) = doc.select(&TABLE_BODY).next() else {
            debug!("未找到 mod_index 表格, 跳过表格策略");
            return Vec::new();
        };

        let mut candidates: Vec<RowCandidate> = tbody
            .children()
            .filter_map(ElementRef::wrap)
            .filter_map(|row| parse_row(&row))
            .collect();

        // 分区名按行序向后传播: 空分区继承最近一个非空前行的分区。
        // 传播发生在类型过滤之前, 被丢弃的行也参与传递分区名。
        for i in 1..candidates.len() {
            if candidates[i].section.is_empty() {
                candidates[i].section = candidates[i - 1].section.clone();
            }
        }

        candidates
            .into_iter()
            .filter_map(|row| {
                let kind = ResourceKind::from_label(&row.label)?;
                Some(Resource {
                    name: row.name,
                    kind,
                    section: row.section,
                    course: String::new(),
                    retrieval: build_descriptor(sesskey, &row.href),
                })
            })
            .collect()
    }
}

/// 没有图标的行 (表头、说明行) 不是资源行。
fn parse_row(row: &ElementRef) -> Option<RowCandidate> {
    let icon = row.select(&ICON).next()?;
    let anchor = row.select(&ANCHOR).next()?;
    let section = row
        .select(&CELL)
        .next()
        .map(|cell| select::element_text(&cell))
        .unwrap_or_default();

    Some(RowCandidate {
        name: select::element_text(&anchor),
        label: icon.value().attr("alt").unwrap_or_default().trim().to_string(),
        href: anchor.value().attr("href")?.to_string(),
        section,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HttpMethod;

    fn page(rows: &str) -> Html {
        Html::parse_document(&format!(
            r#"<div role="main"><table class="generaltable mod_index"><tbody>{}</tbody></table></div>"#,
            rows
        ))
    }

    #[test]
    fn test_section_propagates_across_rows() {
        let doc = page(concat!(
            r#"<tr><td>Week 1</td><td><img alt="File"><a href="https://site/mod/resource/view.php?id=1">Slides</a></td></tr>"#,
            r#"<tr><td></td><td><img alt="File"><a href="https://site/mod/resource/view.php?id=2">Notes</a></td></tr>"#,
            r#"<tr><td></td><td><img alt="Page"><a href="https://site/mod/page/view.php?id=3">Syllabus</a></td></tr>"#,
        ));
        let resources = TableStrategy.extract(&doc, None);
        assert_eq!(resources.len(), 3);
        assert!(resources.iter().all(|r| r.section == "Week 1"));
    }

    #[test]
    fn test_unsupported_label_row_still_carries_section_forward() {
        // 作业行被丢弃, 但它的分区名仍传递给下一行
        let doc = page(concat!(
            r#"<tr><td>Week 2</td><td><img alt="Assignment"><a href="https://site/mod/assign/view.php?id=4">HW</a></td></tr>"#,
            r#"<tr><td></td><td><img alt="File"><a href="https://site/mod/resource/view.php?id=5">Sheet</a></td></tr>"#,
        ));
        let resources = TableStrategy.extract(&doc, None);
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name, "Sheet");
        assert_eq!(resources[0].section, "Week 2");
    }

    #[test]
    fn test_rows_without_icon_are_ignored() {
        let doc = page(concat!(
            r#"<tr><th>Topic</th><th>Name</th></tr>"#,
            r#"<tr><td>Intro</td><td><img alt="URL"><a href="https://site/mod/url/view.php?id=6">Course site</a></td></tr>"#,
        ));
        let resources = TableStrategy.extract(&doc, None);
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].kind, ResourceKind::Url);
        assert_eq!(resources[0].retrieval.method, HttpMethod::Get);
        assert!(resources[0].retrieval.endpoint.ends_with("redirect=1"));
    }

    #[test]
    fn test_missing_table_yields_empty() {
        let doc = Html::parse_document(r#"<div role="main"><ul class="section"></ul></div>"#);
        assert!(TableStrategy.extract(&doc, None).is_empty());
    }
}
