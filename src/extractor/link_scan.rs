// src/extractor/link_scan.rs

//! 链接启发式兜底: 前两种布局都落空时, 扫描所有指向 /mod/ 的链接,
//! 沿祖先链找活动容器和分区容器, 再用多级回退解析名称与类型标签。
//! 这是对未知主题的最后一搏, 宁可漏也不错收 (名称或类型解析不出就丢)。

use super::{PageStrategy, select};
use crate::{
    constants,
    descriptor::build_descriptor,
    models::{Resource, ResourceKind},
};
use log::debug;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

static MODULE_LINK: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&format!(
        "a[href*='{}']",
        constants::moodle::MODULE_PATH_SEGMENT
    ))
    .unwrap()
});
static ACTIVITY_CONTAINER_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        Selector::parse("li.activity").unwrap(),
        Selector::parse(".activity").unwrap(),
        Selector::parse("[data-for='cmitem']").unwrap(),
        Selector::parse("[class*='activity']").unwrap(),
    ]
});
static NAME_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        Selector::parse(".instancename").unwrap(),
        Selector::parse(".activityname").unwrap(),
        Selector::parse("[class*='instancename']").unwrap(),
        Selector::parse("[class*='activityname']").unwrap(),
    ]
});
static ACCESS_HIDE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".accesshide").unwrap());
static SECTION_ANCESTOR_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        Selector::parse("li.section").unwrap(),
        Selector::parse(".section").unwrap(),
        Selector::parse("[class*='section']").unwrap(),
    ]
});
static SECTION_HEADER_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        Selector::parse("h3.sectionname").unwrap(),
        Selector::parse(".sectionname").unwrap(),
        Selector::parse("h3").unwrap(),
        Selector::parse("h4").unwrap(),
    ]
});

pub struct LinkScanStrategy;

impl PageStrategy for LinkScanStrategy {
    fn name(&self) -> &'static str {
        "链接启发式"
    }

    fn extract(&self, doc: &Html, sesskey: Option<&str>) -> Vec<Resource> {
        // 同一个活动容器里常有重复链接 (图标一个、标题一个), 按容器节点去重
        let mut seen_containers = HashSet::new();
        let mut resources = Vec::new();

        for link in doc.select(&MODULE_LINK) {
            let Some(container) = select::closest_ancestor(&link, &ACTIVITY_CONTAINER_SELECTORS)
            else {
                continue;
            };
            if !seen_containers.insert(container.id()) {
                continue;
            }
            if let Some(resource) = extract_from_container(&container, &link, sesskey) {
                resources.push(resource);
            }
        }
        debug!("链接启发式扫描到 {} 个资源", resources.len());
        resources
    }
}

fn extract_from_container(
    container: &ElementRef,
    link: &ElementRef,
    sesskey: Option<&str>,
) -> Option<Resource> {
    let href = link.value().attr("href")?;
    let name_el = select::first_match_within(container, &NAME_SELECTORS);

    let name = name_el
        .and_then(|el| select::first_child_text(&el))
        .or_else(|| attr_text(link, "title"))
        .or_else(|| attr_text(link, "aria-label"))?;

    let label = resolve_label(container, name_el.as_ref(), &name)?;
    let kind = ResourceKind::from_label(&label)?;

    Some(Resource {
        name,
        kind,
        section: resolve_section(container),
        course: String::new(),
        retrieval: build_descriptor(sesskey, href),
    })
}

/// 类型标签: 优先取名称元素的末子节点文本 (须不同于可见标题),
/// 否则落到容器里的 accesshide 元素。
fn resolve_label(
    container: &ElementRef,
    name_el: Option<&ElementRef>,
    name: &str,
) -> Option<String> {
    if let Some(label) = name_el.and_then(select::last_child_text)
        && label != name
    {
        return Some(label);
    }
    container
        .select(&ACCESS_HIDE)
        .next()
        .map(|el| select::element_text(&el))
}

fn resolve_section(container: &ElementRef) -> String {
    select::closest_ancestor(container, &SECTION_ANCESTOR_SELECTORS)
        .and_then(|section| select::first_match_within(&section, &SECTION_HEADER_SELECTORS))
        .map(|header| select::element_text(&header))
        .unwrap_or_default()
}

fn attr_text(el: &ElementRef, attr: &str) -> Option<String> {
    let value = el.value().attr(attr)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
