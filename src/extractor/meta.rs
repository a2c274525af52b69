// src/extractor/meta.rs

//! 页面级元信息: 课程名与会话密钥。与具体资源策略无关, 每次提取各解析一次。

use super::select;
use crate::constants;
use log::debug;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static COURSE_NAME_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        Selector::parse("h1").unwrap(),
        Selector::parse(".header-title").unwrap(),
        Selector::parse("header#page-header .header-title").unwrap(),
    ]
});
static BREADCRUMB_ITEM: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".breadcrumb-item").unwrap());
static LOGOUT_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&format!(
        "a[href*='{}']",
        constants::moodle::LOGOUT_PATH_SEGMENT
    ))
    .unwrap()
});

/// 课程名解析链: 一级标题 → 页头标题元素 → 页头区域 → 面包屑第三项的链接
/// title 属性。第一个非空文本获胜, 全部落空则返回空串。
pub fn resolve_course_name(doc: &Html) -> String {
    for selector in COURSE_NAME_SELECTORS.iter() {
        if let Some(el) = doc.select(selector).next() {
            let text = select::element_text(&el);
            if !text.is_empty() {
                debug!("课程名来自选择器命中: '{}'", text);
                return text;
            }
        }
    }

    if let Some(title) = breadcrumb_course_title(doc) {
        debug!("课程名来自面包屑导航: '{}'", title);
        return title;
    }
    String::new()
}

/// 面包屑的第三项通常是课程节点, 其首个子元素 (链接) 的 title 属性带课程全名。
fn breadcrumb_course_title(doc: &Html) -> Option<String> {
    let item = doc.select(&BREADCRUMB_ITEM).nth(2)?;
    let child = item.children().filter_map(ElementRef::wrap).next()?;
    let title = child.value().attr("title")?.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// 从退出链接的查询参数里取会话密钥。
/// window.M.cfg.sesskey 在注入环境下拿不到, 退出按钮是最稳定的替代来源;
/// 找不到时返回 None, 提取流程继续, 只有文件夹归档请求会因此失败。
pub fn resolve_sesskey(doc: &Html) -> Option<String> {
    let href = doc.select(&LOGOUT_LINK).next()?.value().attr("href")?;
    let url = Url::parse(href).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == constants::moodle::SESSKEY_PARAM)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_name_prefers_h1() {
        let doc = Html::parse_document(
            r#"<h1>Algorithms 101</h1><div class="header-title">ignored</div>"#,
        );
        assert_eq!(resolve_course_name(&doc), "Algorithms 101");
    }

    #[test]
    fn test_course_name_skips_empty_candidates() {
        // h1 存在但为空时落到下一个候选, 而不是返回空串
        let doc = Html::parse_document(
            r#"<h1> </h1><div class="header-title">Linear Algebra</div>"#,
        );
        assert_eq!(resolve_course_name(&doc), "Linear Algebra");
    }

    #[test]
    fn test_course_name_from_breadcrumb() {
        let doc = Html::parse_document(
            r#"<nav>
                <li class="breadcrumb-item"><a title="Home" href="/">Home</a></li>
                <li class="breadcrumb-item"><a title="Courses" href="/c">Courses</a></li>
                <li class="breadcrumb-item"><a title="Intro to CS" href="/course">CS</a></li>
            </nav>"#,
        );
        assert_eq!(resolve_course_name(&doc), "Intro to CS");
    }

    #[test]
    fn test_course_name_defaults_to_empty() {
        let doc = Html::parse_document("<p>nothing here</p>");
        assert_eq!(resolve_course_name(&doc), "");
    }

    #[test]
    fn test_sesskey_from_logout_link() {
        let doc = Html::parse_document(
            r#"<a href="https://site/login/logout.php?sesskey=abcsesskey">Log out</a>"#,
        );
        assert_eq!(resolve_sesskey(&doc).as_deref(), Some("abcsesskey"));
    }

    #[test]
    fn test_sesskey_missing_logout_link() {
        let doc = Html::parse_document(r#"<a href="https://site/course/view.php?id=1">x</a>"#);
        assert_eq!(resolve_sesskey(&doc), None);
    }
}
