// src/extractor/select.rs

//! 级联选择器辅助: 每个语义槽位 (分区容器、分区标题、活动条目、名称元素)
//! 都对应一列候选选择器, 按顺序尝试, 第一个产生 ≥1 个匹配的候选获胜。
//! 表格/分区/链接三个策略共用这一套查找逻辑。

use scraper::{ElementRef, Html, Selector};

/// 在整个文档上级联查找, 返回第一个非空匹配集。
pub fn first_match_all<'a>(doc: &'a Html, candidates: &[Selector]) -> Vec<ElementRef<'a>> {
    for selector in candidates {
        let hits: Vec<_> = doc.select(selector).collect();
        if !hits.is_empty() {
            return hits;
        }
    }
    Vec::new()
}

/// 在某个元素的子树内级联查找, 返回第一个非空匹配集。
pub fn first_match_all_within<'a>(
    root: &ElementRef<'a>,
    candidates: &[Selector],
) -> Vec<ElementRef<'a>> {
    for selector in candidates {
        let hits: Vec<_> = root.select(selector).collect();
        if !hits.is_empty() {
            return hits;
        }
    }
    Vec::new()
}

/// 在某个元素的子树内级联查找, 只取第一个匹配元素。
pub fn first_match_within<'a>(
    root: &ElementRef<'a>,
    candidates: &[Selector],
) -> Option<ElementRef<'a>> {
    candidates
        .iter()
        .find_map(|selector| root.select(selector).next())
}

/// 沿祖先链向上, 返回第一个命中任一候选选择器的祖先元素。
pub fn closest_ancestor<'a>(
    el: &ElementRef<'a>,
    candidates: &[Selector],
) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| candidates.iter().any(|selector| selector.matches(ancestor)))
}

/// 元素的全部后代文本, 去除首尾空白。
pub fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// 第一个有文本的直接子节点的文本。Moodle 约定里这是条目的可见标题。
pub fn first_child_text(el: &ElementRef) -> Option<String> {
    el.children()
        .filter_map(|child| match ElementRef::wrap(child) {
            Some(sub) => Some(element_text(&sub)),
            None => child.value().as_text().map(|t| t.text.trim().to_string()),
        })
        .find(|text| !text.is_empty())
}

/// 最后一个有文本的直接子节点的文本。Moodle 约定里可访问性类型标签
/// (accesshide) 附在可见标题之后, 因此这是条目的类型标签。
pub fn last_child_text(el: &ElementRef) -> Option<String> {
    el.children()
        .filter_map(|child| match ElementRef::wrap(child) {
            Some(sub) => Some(element_text(&sub)),
            None => child.value().as_text().map(|t| t.text.trim().to_string()),
        })
        .filter(|text| !text.is_empty())
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors(list: &[&str]) -> Vec<Selector> {
        list.iter().map(|s| Selector::parse(s).unwrap()).collect()
    }

    #[test]
    fn test_first_match_all_cascade_order() {
        let doc = Html::parse_document(r#"<div class="section"><p>a</p></div>"#);
        // 第一个候选没有命中, 落到第二个
        let hits = first_match_all(&doc, &selectors(&[".content", ".section"]));
        assert_eq!(hits.len(), 1);

        // 第一个候选命中后, 后面的候选不再参与
        let doc = Html::parse_document(r#"<div class="content"></div><div class="section"></div>"#);
        let hits = first_match_all(&doc, &selectors(&[".content", ".section"]));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_first_and_last_child_text() {
        let doc = Html::parse_document(
            r#"<span class="instancename">Lecture 1<span class="accesshide"> File</span></span>"#,
        );
        let sel = Selector::parse(".instancename").unwrap();
        let el = doc.select(&sel).next().unwrap();
        assert_eq!(first_child_text(&el).as_deref(), Some("Lecture 1"));
        assert_eq!(last_child_text(&el).as_deref(), Some("File"));
    }

    #[test]
    fn test_child_text_without_type_label() {
        // 没有 accesshide 标签时, 首末子节点是同一个文本节点
        let doc = Html::parse_document(r#"<span class="instancename">Notes</span>"#);
        let sel = Selector::parse(".instancename").unwrap();
        let el = doc.select(&sel).next().unwrap();
        assert_eq!(first_child_text(&el).as_deref(), Some("Notes"));
        assert_eq!(last_child_text(&el).as_deref(), Some("Notes"));
    }

    #[test]
    fn test_closest_ancestor() {
        let doc = Html::parse_document(
            r#"<li class="section"><div class="activity"><a href="https://site/mod/resource/view.php?id=1">x</a></div></li>"#,
        );
        let link_sel = Selector::parse("a").unwrap();
        let link = doc.select(&link_sel).next().unwrap();

        let activity = closest_ancestor(&link, &selectors(&[".activity"])).unwrap();
        assert_eq!(activity.value().name(), "div");
        let section = closest_ancestor(&activity, &selectors(&[".section"])).unwrap();
        assert_eq!(section.value().name(), "li");
        assert!(closest_ancestor(&link, &selectors(&[".missing"])).is_none());
    }
}
