// src/downloader/naming.rs

//! 文件名建议策略: 由资源元数据和宿主侧文件名计算最终的相对保存路径。
//! URL/Page 类型强制使用净化资源名加固定扩展名; 其余类型默认沿用宿主
//! 文件名, 开启替换选项时用净化资源名换掉主干并保留原扩展名。

use crate::{
    config::AppConfig,
    models::{Resource, ResourceKind},
    utils,
};
use reqwest::Response;
use std::path::{Path, PathBuf};
use url::Url;

pub fn suggest_path(resource: &Resource, host_filename: &str, config: &AppConfig) -> PathBuf {
    let sanitized_name = utils::sanitize_filename(&resource.name);

    let filename = match resource.kind {
        ResourceKind::Url => format!("{}.url", sanitized_name),
        ResourceKind::Page => format!("{}.html", sanitized_name),
        _ if config.replace_filename => match Path::new(host_filename)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(ext) => format!("{}.{}", sanitized_name, ext),
            None => sanitized_name,
        },
        _ => host_filename.to_string(),
    };

    let mut path = PathBuf::new();
    if config.organize {
        let course = utils::sanitize_filename(&resource.course);
        if !course.is_empty() {
            path.push(course);
        }
        // 分区为空时不产生空目录段
        let section = utils::sanitize_filename(&resource.section);
        if !section.is_empty() {
            path.push(section);
        }
    }
    path.push(filename);
    path
}

/// 宿主侧文件名: 优先取 Content-Disposition, 其次取最终 URL 的末路径段。
pub fn host_filename(res: &Response, fallback: &str) -> String {
    if let Some(name) = filename_from_content_disposition(res) {
        return name;
    }
    filename_from_url(res.url()).unwrap_or_else(|| fallback.to_string())
}

fn filename_from_content_disposition(res: &Response) -> Option<String> {
    let header = res
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)?
        .to_str()
        .ok()?;
    let name = header
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))?
        .trim_matches('"')
        .trim();
    if name.is_empty() {
        None
    } else {
        Some(utils::sanitize_filename(name))
    }
}

fn filename_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }
    Some(utils::sanitize_filename(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RetrievalDescriptor;

    fn resource(name: &str, kind: ResourceKind, section: &str, course: &str) -> Resource {
        Resource {
            name: name.to_string(),
            kind,
            section: section.to_string(),
            course: course.to_string(),
            retrieval: RetrievalDescriptor::get("https://site/mod/x/view.php?id=1".into()),
        }
    }

    fn config(organize: bool, replace: bool) -> AppConfig {
        AppConfig {
            organize,
            replace_filename: replace,
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_url_resource_forces_shortcut_extension() {
        let r = resource("My Link", ResourceKind::Url, "", "");
        let path = suggest_path(&r, "view.php", &config(false, false));
        assert_eq!(path, PathBuf::from("My Link.url"));
    }

    #[test]
    fn test_page_resource_forces_html_extension() {
        let r = resource("Sylla/bus", ResourceKind::Page, "", "");
        let path = suggest_path(&r, "view.php", &config(false, false));
        assert_eq!(path, PathBuf::from("Sylla-bus.html"));
    }

    #[test]
    fn test_file_resource_keeps_host_filename_by_default() {
        let r = resource("Lecture 1", ResourceKind::File, "", "");
        let path = suggest_path(&r, "lec01.pdf", &config(false, false));
        assert_eq!(path, PathBuf::from("lec01.pdf"));
    }

    #[test]
    fn test_replace_filename_preserves_extension() {
        let r = resource("Lecture 1: Intro", ResourceKind::File, "", "");
        let path = suggest_path(&r, "lec01.pdf", &config(false, true));
        assert_eq!(path, PathBuf::from("Lecture 1- Intro.pdf"));
    }

    #[test]
    fn test_organize_prefixes_course_and_section() {
        let r = resource("Notes", ResourceKind::File, "Week 1", "CS101");
        let path = suggest_path(&r, "notes.pdf", &config(true, false));
        assert_eq!(path, PathBuf::from("CS101/Week 1/notes.pdf"));
    }

    #[test]
    fn test_organize_with_empty_section_emits_no_segment() {
        let r = resource("Notes", ResourceKind::File, "", "CS101");
        let path = suggest_path(&r, "notes.pdf", &config(true, false));
        assert_eq!(path, PathBuf::from("CS101/notes.pdf"));
    }
}
