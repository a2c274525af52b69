// src/extractor/mod.rs

pub mod link_scan;
pub mod meta;
pub mod section;
mod select;
pub mod table;

use crate::models::Resource;
use log::{debug, info, warn};
use scraper::Html;

/// 一种页面布局的资源提取策略。对静态文档快照同步执行, 永不失败,
/// 解析不出就返回空列表。
pub trait PageStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, doc: &Html, sesskey: Option<&str>) -> Vec<Resource>;
}

/// 按固定顺序尝试三种布局策略, 第一个产出 ≥1 个资源的策略获胜,
/// 各策略的结果绝不合并。全部落空返回空列表, 由调用方提示 "未找到资源"。
pub fn extract(doc: &Html) -> Vec<Resource> {
    let sesskey = meta::resolve_sesskey(doc);
    if sesskey.is_none() {
        // 只影响文件夹归档请求, 提取照常进行
        warn!("未能从退出链接解析会话密钥, 文件夹下载将不可用");
    }
    extract_with_sesskey(doc, sesskey.as_deref())
}

pub fn extract_with_sesskey(doc: &Html, sesskey: Option<&str>) -> Vec<Resource> {
    let strategies: [&dyn PageStrategy; 3] = [
        &table::TableStrategy,
        &section::SectionStrategy,
        &link_scan::LinkScanStrategy,
    ];

    let course = meta::resolve_course_name(doc);

    for strategy in strategies {
        let mut resources = strategy.extract(doc, sesskey);
        if resources.is_empty() {
            debug!("策略 [{}] 无结果, 尝试下一种", strategy.name());
            continue;
        }
        info!("策略 [{}] 命中, 共 {} 个资源", strategy.name(), resources.len());
        for resource in &mut resources {
            resource.course = course.clone();
        }
        return resources;
    }

    warn!("所有布局策略均无结果");
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceKind;

    #[test]
    fn test_course_name_stamped_on_every_resource() {
        let doc = Html::parse_document(
            r#"<h1>CS101</h1>
               <div class="content">
                 <h3 class="sectionname">Week 1</h3>
                 <li class="activity">
                   <a href="https://site/mod/resource/view.php?id=1">
                     <span class="instancename">Slides<span class="accesshide"> File</span></span>
                   </a>
                 </li>
                 <li class="activity">
                   <a href="https://site/mod/page/view.php?id=2">
                     <span class="instancename">Syllabus<span class="accesshide"> Page</span></span>
                   </a>
                 </li>
               </div>"#,
        );
        let resources = extract(&doc);
        assert_eq!(resources.len(), 2);
        assert!(resources.iter().all(|r| r.course == "CS101"));
    }

    #[test]
    fn test_table_layout_takes_precedence() {
        // 页面同时带表格和分区标记时, 表格策略先命中, 分区里的条目不参与
        let doc = Html::parse_document(
            r#"<div role="main"><table class="generaltable mod_index"><tbody>
                 <tr><td>Topic A</td><td><img alt="File"><a href="https://site/mod/resource/view.php?id=1">From table</a></td></tr>
               </tbody></table></div>
               <div class="content">
                 <h3 class="sectionname">Topic B</h3>
                 <li class="activity">
                   <a href="https://site/mod/resource/view.php?id=2">
                     <span class="instancename">From section<span class="accesshide"> File</span></span>
                   </a>
                 </li>
               </div>"#,
        );
        let resources = extract_with_sesskey(&doc, None);
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name, "From table");
    }

    #[test]
    fn test_fallback_output_used_verbatim_never_merged() {
        // 表格缺席、分区策略零结果时, 启用链接启发式, 其输出原样使用
        let doc = Html::parse_document(
            r#"<div data-for="cmitem">
                 <a href="https://site/mod/url/view.php?id=3">
                   <span class="activityname">Portal<span class="accesshide"> URL</span></span>
                 </a>
               </div>"#,
        );
        let resources = extract_with_sesskey(&doc, None);
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name, "Portal");
        assert_eq!(resources[0].kind, ResourceKind::Url);
    }

    #[test]
    fn test_unrecognized_page_yields_empty() {
        let doc = Html::parse_document("<html><body><p>login required</p></body></html>");
        assert!(extract(&doc).is_empty());
    }
}
