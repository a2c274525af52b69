// src/extractor/section.rs

//! 分区卡片布局: 课程页按分区容器组织, 每个容器里是一列活动条目。
//! 容器、分区标题、活动条目、名称元素都用级联候选选择器解析,
//! 兼容从旧版 .content 到新版 .course-section 的多代主题标记。

use super::{PageStrategy, select};
use crate::{descriptor::build_descriptor, models::{Resource, ResourceKind}};
use log::debug;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static SECTION_CONTAINER_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        Selector::parse(".content").unwrap(),
        Selector::parse(".section").unwrap(),
        Selector::parse(".course-section").unwrap(),
        Selector::parse("[class*='section']").unwrap(),
    ]
});
static SECTION_NAME_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        Selector::parse("h3.sectionname").unwrap(),
        Selector::parse("h3").unwrap(),
        Selector::parse("[class*='sectionname']").unwrap(),
        Selector::parse("[class*='section-title']").unwrap(),
    ]
});
static ACTIVITY_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        Selector::parse(".activity").unwrap(),
        Selector::parse("[class*='activity']").unwrap(),
    ]
});
static INSTANCE_NAME_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    vec![
        Selector::parse(".instancename").unwrap(),
        Selector::parse("[class*='instancename']").unwrap(),
    ]
});
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

pub struct SectionStrategy;

impl PageStrategy for SectionStrategy {
    fn name(&self) -> &'static str {
        "分区布局"
    }

    fn extract(&self, doc: &Html, sesskey: Option<&str>) -> Vec<Resource> {
        let containers = select::first_match_all(doc, &SECTION_CONTAINER_SELECTORS);
        if containers.is_empty() {
            debug!("未找到任何分区容器, 跳过分区策略");
            return Vec::new();
        }
        debug!("分区容器数量: {}", containers.len());

        containers
            .iter()
            .flat_map(|container| extract_section(container, sesskey))
            .collect()
    }
}

fn extract_section(container: &ElementRef, sesskey: Option<&str>) -> Vec<Resource> {
    // 没有标题的容器不算分区 (嵌套包装元素常会命中泛化选择器)
    let Some(header) = select::first_match_within(container, &SECTION_NAME_SELECTORS) else {
        return Vec::new();
    };
    let section = select::element_text(&header);

    select::first_match_all_within(container, &ACTIVITY_SELECTORS)
        .iter()
        .filter_map(|activity| extract_activity(activity, &section, sesskey))
        .collect()
}

/// 名称元素或锚点缺失的条目直接丢弃。
/// 名称元素里第一个有文本的子节点是可见标题, 最后一个是类型标签
/// (accesshide 约定), 标签不在支持集合内的条目同样丢弃。
fn extract_activity(
    activity: &ElementRef,
    section: &str,
    sesskey: Option<&str>,
) -> Option<Resource> {
    let instance_name = select::first_match_within(activity, &INSTANCE_NAME_SELECTORS)?;
    let anchor = activity.select(&ANCHOR).next()?;
    let href = anchor.value().attr("href")?;

    let name = select::first_child_text(&instance_name)?;
    let label = select::last_child_text(&instance_name)?;
    let kind = ResourceKind::from_label(&label)?;

    Some(Resource {
        name,
        kind,
        section: section.to_string(),
        course: String::new(),
        retrieval: build_descriptor(sesskey, href),
    })
}
