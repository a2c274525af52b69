// src/descriptor.rs

//! 下载描述符构建器: 根据资源的原始链接和会话密钥, 计算取回该资源
//! 字节流所需的请求形状。
//!
//! 对文件夹资源, 直接 GET 其 view 页面拿不到可按 URL 区分的归档流,
//! 必须 POST 到同目录下的归档动作; 其余类型一律 GET 并附加跳转标志。

use crate::{
    constants,
    models::{HeaderField, HttpMethod, RetrievalDescriptor},
};
use log::debug;
use url::{Url, form_urlencoded};

/// 纯函数: 由 (会话密钥, 原始 href) 计算描述符, 永不失败。
/// href 来自真实页面锚点, 理论上总是合法 URL; 万一不是, 按普通资源退化处理。
pub fn build_descriptor(sesskey: Option<&str>, raw_href: &str) -> RetrievalDescriptor {
    let Ok(url) = Url::parse(raw_href) else {
        return RetrievalDescriptor::get(format!(
            "{}&{}={}",
            raw_href,
            constants::moodle::REDIRECT_PARAM.0,
            constants::moodle::REDIRECT_PARAM.1
        ));
    };

    if !url.path().contains(constants::moodle::FOLDER_PATH_SEGMENT) {
        let mut endpoint = url;
        endpoint
            .query_pairs_mut()
            .append_pair(
                constants::moodle::REDIRECT_PARAM.0,
                constants::moodle::REDIRECT_PARAM.1,
            );
        return RetrievalDescriptor::get(endpoint.to_string());
    }

    folder_descriptor(&url, sesskey.unwrap_or_default())
}

/// 文件夹归档描述符: POST 到与 view.php 同目录的 download_folder.php。
/// id 同时编码进 endpoint 的查询串: POST 本身不读它, 但按 endpoint
/// 反查建议文件名时, 并发的多个文件夹下载靠它互相区分。
fn folder_descriptor(view_url: &Url, sesskey: &str) -> RetrievalDescriptor {
    let folder_id = view_url
        .query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();

    let parent_dir = view_url.path().rsplit_once('/').map_or("", |(dir, _)| dir);
    let mut endpoint = view_url.clone();
    endpoint.set_path(&format!(
        "{}/{}",
        parent_dir,
        constants::moodle::FOLDER_DOWNLOAD_FILE
    ));
    endpoint.set_query(Some(&format!("id={}", folder_id)));

    // sesskey 缺失时 body 仍会生成 (sesskey= 为空), 请求会在取回阶段被
    // 服务器拒绝而不是在这里报错; 文件夹下载少见, 接受这种延迟失败。
    let body = form_urlencoded::Serializer::new(String::new())
        .append_pair("id", &folder_id)
        .append_pair(constants::moodle::SESSKEY_PARAM, sesskey)
        .finish();

    debug!("文件夹 {} 的归档端点: {}", folder_id, endpoint);
    RetrievalDescriptor {
        endpoint: endpoint.to_string(),
        method: HttpMethod::Post,
        headers: vec![HeaderField {
            name: "content-type".into(),
            value: "application/x-www-form-urlencoded".into(),
        }],
        body: Some(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_resource_gets_redirect_flag() {
        let d = build_descriptor(Some("abcsesskey"), "https://site/mod/resource/view.php?id=7");
        assert_eq!(
            d,
            RetrievalDescriptor::get("https://site/mod/resource/view.php?id=7&redirect=1".into())
        );
        assert_eq!(d.method, HttpMethod::Get);
        assert!(d.headers.is_empty());
        assert!(d.body.is_none());
    }

    #[test]
    fn test_url_resource_without_query_gets_redirect_flag() {
        let d = build_descriptor(None, "https://site/mod/url/view.php");
        assert_eq!(d.endpoint, "https://site/mod/url/view.php?redirect=1");
    }

    #[test]
    fn test_folder_becomes_post_archive_action() {
        let d = build_descriptor(Some("abcsesskey"), "https://site/mod/folder/view.php?id=42");
        // 归档动作与 view.php 同目录, id 保留在查询串里用于区分并发下载
        assert_eq!(
            d.endpoint,
            "https://site/mod/folder/download_folder.php?id=42"
        );
        assert_eq!(d.method, HttpMethod::Post);
        assert_eq!(
            d.headers,
            vec![HeaderField {
                name: "content-type".into(),
                value: "application/x-www-form-urlencoded".into(),
            }]
        );
        assert_eq!(d.body.as_deref(), Some("id=42&sesskey=abcsesskey"));
    }

    #[test]
    fn test_folder_without_sesskey_degrades_to_empty_token() {
        // 会话密钥缺失: body 照常生成, 失败推迟到取回阶段
        let d = build_descriptor(None, "https://site/mod/folder/view.php?id=42");
        assert_eq!(d.body.as_deref(), Some("id=42&sesskey="));
    }

    #[test]
    fn test_folder_in_name_but_not_in_path_is_plain() {
        // 路径段判断, 不是子串判断: 资源名里带 folder 字样不会误判
        let d = build_descriptor(None, "https://site/mod/resource/view.php?id=9&name=folder");
        assert_eq!(d.method, HttpMethod::Get);
        assert!(d.endpoint.ends_with("&redirect=1"));
    }
}
