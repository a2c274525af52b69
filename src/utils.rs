// src/utils.rs

use crate::error::*;
use anyhow::Context;
use regex::Regex;
use std::sync::LazyLock;
use std::{
    collections::BTreeSet,
    path::{Component, Path, PathBuf},
};

static ILLEGAL_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]"#).unwrap());

/// 把文件系统非法字符统一替换为 '-'。对已净化的输入是幂等的。
pub fn sanitize_filename(name: &str) -> String {
    ILLEGAL_CHARS_RE.replace_all(name, "-").into_owned()
}

pub fn truncate_text(text: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut end_pos = 0;
    for (i, c) in text.char_indices() {
        width += if c.is_ascii() { 1 } else { 2 };
        if width > max_width.saturating_sub(3) {
            end_pos = i;
            break;
        }
    }
    if end_pos == 0 { text.to_string() } else { format!("{}...", &text[..end_pos]) }
}

pub fn parse_selection_indices(selection_str: &str, total_items: usize) -> Vec<usize> {
    if selection_str.to_lowercase() == "all" { return (0..total_items).collect(); }
    let mut indices = BTreeSet::new();
    for part in selection_str.split(',').map(|s| s.trim()) {
        if part.is_empty() { continue; }
        if let Some(range_part) = part.split_once('-') {
            if let (Ok(start), Ok(end)) = (range_part.0.parse::<usize>(), range_part.1.parse::<usize>()) {
                if start == 0 || end == 0 { continue; }
                let (min, max) = (start.min(end), start.max(end));
                for i in min..=max {
                    if i > 0 && i <= total_items { indices.insert(i - 1); }
                }
            }
        } else if let Ok(num) = part.parse::<usize>() {
            if num > 0 && num <= total_items { indices.insert(num - 1); }
        }
    }
    indices.into_iter().collect()
}

/// 把相对路径安全地拼到基目录下, 拒绝任何路径遍历成分。
/// organize 模式下的课程/分区目录名都经过净化, 这里是最后一道防线。
pub fn secure_join_path(base_dir: &Path, relative_path: &Path) -> AppResult<PathBuf> {
    let resolved_base = dunce::canonicalize(base_dir)
        .with_context(|| format!("基础目录 '{:?}' 不存在或无法访问", base_dir))?;
    let mut final_path = resolved_base.clone();
    for component in relative_path.components() {
        match component {
            Component::Normal(part) => final_path.push(part),
            Component::ParentDir => {
                return Err(AppError::Security("检测到路径遍历 '..' ".to_string()));
            }
            _ => continue,
        }
    }
    if !final_path.starts_with(&resolved_base) {
        return Err(AppError::Security(format!("路径遍历攻击检测: '{:?}'", relative_path)));
    }
    Ok(final_path)
}
