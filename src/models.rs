// src/models.rs

use crate::{error::AppError, symbols};
use colored::{ColoredString, Colorize};
use serde::Serialize;

/// 资源类型: 一个封闭的双语标签集合 (英语 + 希伯来语)。
/// 页面上标签不在该集合内的条目在提取阶段直接丢弃, 不会进入资源列表。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceKind {
    File,
    Folder,
    #[serde(rename = "URL")]
    Url,
    Page,
}

impl ResourceKind {
    /// 标签匹配是大小写敏感的精确匹配; 空串与未知标签一律返回 None。
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "File" | "קובץ" => Some(ResourceKind::File),
            "Folder" | "תיקייה" => Some(ResourceKind::Folder),
            "URL" | "כתובת אינטרנט" => Some(ResourceKind::Url),
            "Page" | "דף" => Some(ResourceKind::Page),
            _ => None,
        }
    }

    /// 选择菜单里展示用的短标签
    pub fn display_tag(&self) -> &'static str {
        match self {
            ResourceKind::File => "文件",
            ResourceKind::Folder => "目录",
            ResourceKind::Url => "链接",
            ResourceKind::Page => "页面",
        }
    }
}

/// HTTP 方法。GET 是隐式默认值, 序列化时省略。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum HttpMethod {
    #[default]
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
}

impl HttpMethod {
    pub fn is_get(&self) -> bool {
        *self == HttpMethod::Get
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderField {
    pub name: String,
    pub value: String,
}

/// 下载描述符: 完整决定如何取回一个资源的字节流。
/// 每个资源恰好携带一个, 在提取时计算; URL/Page 类型在真正保存前会被替换成
/// 指向合成载荷的新描述符。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetrievalDescriptor {
    pub endpoint: String,
    #[serde(skip_serializing_if = "HttpMethod::is_get")]
    pub method: HttpMethod,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<HeaderField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RetrievalDescriptor {
    pub fn get(endpoint: String) -> Self {
        Self {
            endpoint,
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
        }
    }
}

/// 课程页面上发现的一个可下载条目。列表顺序即页面顺序, 不排序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub section: String,
    pub course: String,
    pub retrieval: RetrievalDescriptor,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DownloadStatus {
    Success,
    Skipped,
    HttpError,
    NetworkError,
    ConnectionError,
    TimeoutError,
    SessionError,
    ContentMissing,
    IoError,
    UnexpectedError,
}

impl DownloadStatus {
    pub fn get_display_info(
        &self,
    ) -> (
        &'static ColoredString,
        fn(ColoredString) -> ColoredString,
        &'static str,
    ) {
        match self {
            DownloadStatus::Success => (&symbols::OK, |s| s.green(), "下载成功"),
            DownloadStatus::Skipped => (&symbols::INFO, |s| s.cyan(), "文件已存在，跳过"),
            DownloadStatus::HttpError => (&symbols::ERROR, |s| s.red(), "服务器返回错误"),
            DownloadStatus::NetworkError => (&symbols::ERROR, |s| s.red(), "网络请求失败"),
            DownloadStatus::ConnectionError => (&symbols::ERROR, |s| s.red(), "无法建立连接"),
            DownloadStatus::TimeoutError => (&symbols::WARN, |s| s.yellow(), "网络连接超时"),
            DownloadStatus::SessionError => (&symbols::ERROR, |s| s.red(), "会话失效 (Cookie 无效)"),
            DownloadStatus::ContentMissing => (&symbols::ERROR, |s| s.red(), "页面主内容区域缺失"),
            DownloadStatus::IoError => (&symbols::ERROR, |s| s.red(), "本地文件读写错误"),
            DownloadStatus::UnexpectedError => {
                (&symbols::ERROR, |s| s.red(), "发生未预期的程序错误")
            }
        }
    }
}

impl From<&AppError> for DownloadStatus {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::SessionInvalid => DownloadStatus::SessionError,
            AppError::Network(err)
            | AppError::NetworkMiddleware(reqwest_middleware::Error::Reqwest(err)) => {
                if err.is_timeout() {
                    DownloadStatus::TimeoutError
                } else if err.is_connect() {
                    DownloadStatus::ConnectionError
                } else if err.is_status() {
                    DownloadStatus::HttpError
                } else {
                    DownloadStatus::NetworkError
                }
            }
            AppError::NetworkMiddleware(_) => DownloadStatus::NetworkError,
            AppError::PageContentMissing => DownloadStatus::ContentMissing,
            AppError::Io(_) | AppError::TempFilePersist(_) => DownloadStatus::IoError,
            _ => DownloadStatus::UnexpectedError,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub filename: String,
    pub status: DownloadStatus,
    pub message: Option<String>,
}
