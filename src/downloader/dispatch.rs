// src/downloader/dispatch.rs

//! 按资源类型分派的保存逻辑。
//! File/Folder 直接按描述符取回字节流; URL 先解析最终跳转目标再合成
//! 快捷方式文件; Page 抓取页面并只保留主内容区域。合成载荷的类型在
//! 真正落盘前等价于把描述符替换成指向载荷本身。

use super::naming;
use crate::{
    DownloadJobContext,
    constants,
    error::*,
    models::{DownloadResult, DownloadStatus, Resource, ResourceKind},
    utils,
};
use futures::StreamExt;
use log::{debug, info};
use scraper::{Html, Selector};
use std::{
    io::Write,
    path::{Path, PathBuf},
    sync::LazyLock,
};

static MAIN_REGION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(constants::moodle::MAIN_REGION_SELECTOR).unwrap());

pub async fn download_resource(
    context: &DownloadJobContext,
    resource: &Resource,
) -> AppResult<DownloadResult> {
    match resource.kind {
        ResourceKind::Url => save_shortcut(context, resource).await,
        ResourceKind::Page => save_page(context, resource).await,
        ResourceKind::File | ResourceKind::Folder => save_stream(context, resource).await,
    }
}

/// File/Folder: 按描述符取回并流式写盘。
async fn save_stream(context: &DownloadJobContext, resource: &Resource) -> AppResult<DownloadResult> {
    let res = context.http_client.execute(&resource.retrieval).await?;

    // 服务器没给文件名时的兜底: 文件夹归档固定是 zip
    let fallback = match resource.kind {
        ResourceKind::Folder => format!("{}.zip", utils::sanitize_filename(&resource.name)),
        _ => utils::sanitize_filename(&resource.name),
    };
    let host_name = naming::host_filename(&res, &fallback);
    let relative = naming::suggest_path(resource, &host_name, &context.config);

    let Some(target) = prepare_target(context, &relative)? else {
        return Ok(skipped(&relative));
    };

    let mut tmp = tempfile::NamedTempFile::new_in(target_dir(&target, context))?;
    let mut stream = res.bytes_stream();
    while let Some(chunk) = stream.next().await {
        tmp.as_file_mut().write_all(&chunk?)?;
    }
    tmp.persist(&target)?;

    info!("已保存: {}", target.display());
    Ok(success(&relative))
}

/// URL: 解析最终跳转目标, 合成 .url 快捷方式文件。
async fn save_shortcut(
    context: &DownloadJobContext,
    resource: &Resource,
) -> AppResult<DownloadResult> {
    let target_url = context
        .http_client
        .resolve_redirect(&resource.retrieval.endpoint)
        .await?;
    debug!("链接 '{}' 的最终目标: {}", resource.name, target_url);

    let payload = format!("[InternetShortcut]\nURL={}\n", target_url);
    save_payload(context, resource, payload.as_bytes())
}

/// Page: 抓取页面, 只保留主内容区域的序列化标记。
async fn save_page(context: &DownloadJobContext, resource: &Resource) -> AppResult<DownloadResult> {
    let body = context
        .http_client
        .fetch_page(&resource.retrieval.endpoint)
        .await?;
    let region = extract_main_region(&body)?;
    save_payload(context, resource, region.as_bytes())
}

/// 同步辅助: Html 不是 Send, 解析必须在不跨越 await 的作用域里完成。
fn extract_main_region(body: &str) -> AppResult<String> {
    let doc = Html::parse_document(body);
    doc.select(&MAIN_REGION)
        .next()
        .map(|el| el.html())
        .ok_or(AppError::PageContentMissing)
}

fn save_payload(
    context: &DownloadJobContext,
    resource: &Resource,
    payload: &[u8],
) -> AppResult<DownloadResult> {
    // 合成载荷的文件名不依赖宿主侧文件名, 强制扩展名由类型决定
    let relative = naming::suggest_path(resource, "", &context.config);

    let Some(target) = prepare_target(context, &relative)? else {
        return Ok(skipped(&relative));
    };

    let mut tmp = tempfile::NamedTempFile::new_in(target_dir(&target, context))?;
    tmp.as_file_mut().write_all(payload)?;
    tmp.persist(&target)?;

    info!("已保存: {}", target.display());
    Ok(success(&relative))
}

/// 计算最终保存路径并建好父目录; 目标已存在且未开启强制重下时返回 None。
fn prepare_target(context: &DownloadJobContext, relative: &Path) -> AppResult<Option<PathBuf>> {
    let target = utils::secure_join_path(&context.config.save_dir, relative)?;
    if target.exists() && !context.config.force_redownload {
        return Ok(None);
    }
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(Some(target))
}

fn target_dir<'a>(target: &'a Path, context: &'a DownloadJobContext) -> &'a Path {
    target.parent().unwrap_or(&context.config.save_dir)
}

fn success(relative: &Path) -> DownloadResult {
    DownloadResult {
        filename: relative.to_string_lossy().into_owned(),
        status: DownloadStatus::Success,
        message: None,
    }
}

fn skipped(relative: &Path) -> DownloadResult {
    DownloadResult {
        filename: relative.to_string_lossy().into_owned(),
        status: DownloadStatus::Skipped,
        message: Some("文件已存在".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_main_region() {
        let body = r#"<html><body><nav>menu</nav>
            <div role="main"><h2>Syllabus</h2><p>content</p></div></body></html>"#;
        let region = extract_main_region(body).unwrap();
        assert!(region.starts_with(r#"<div role="main">"#));
        assert!(region.contains("<h2>Syllabus</h2>"));
        assert!(!region.contains("<nav>"));
    }

    #[test]
    fn test_extract_main_region_missing() {
        let err = extract_main_region("<html><body><p>bare</p></body></html>");
        assert!(matches!(err, Err(AppError::PageContentMissing)));
    }
}
