// src/stats.rs

//! 持久使用计数: 累计下载量与 "反馈提示已展示" 标志, 存放在配置目录的
//! stats.json。读-改-写不是原子的, 多实例并发可能相互覆盖, 但计数只用于
//! 展示和一次性提示, 影响可以接受。

use crate::{
    constants,
    error::{AppError, AppResult},
};
use anyhow::{Context, anyhow};
use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub feedback_prompted: bool,
}

impl UsageStats {
    /// 累计量达到阈值且尚未提示过时, 应向用户展示一次反馈提示。
    pub fn should_prompt_feedback(&self) -> bool {
        self.downloads >= constants::FEEDBACK_THRESHOLD && !self.feedback_prompted
    }
}

/// 统计文件的默认位置: 配置目录下的 stats.json。实际使用的路径由
/// `AppConfig::stats_file` 持有, 这里只负责计算默认值。
pub fn default_stats_path() -> AppResult<PathBuf> {
    let path = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("无法获取用户主目录")))?
        .join(constants::CONFIG_DIR_NAME)
        .join(constants::STATS_FILE_NAME);
    Ok(path)
}

/// 文件缺失或损坏都退化为全零计数, 不打断下载流程。
pub fn load(path: &Path) -> UsageStats {
    fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

pub fn store(path: &Path, stats: &UsageStats) -> AppResult<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let content = serde_json::to_string_pretty(stats)?;
    fs::write(path, content)
        .with_context(|| format!("写入统计文件 '{}' 失败", path.display()))?;
    Ok(())
}

pub fn record_downloads(path: &Path, count: u64) -> UsageStats {
    let mut stats = load(path);
    stats.downloads += count;
    if let Err(e) = store(path, &stats) {
        debug!("统计文件写入失败 (忽略): {}", e);
    }
    stats
}

pub fn mark_feedback_prompted(path: &Path) {
    let mut stats = load(path);
    stats.feedback_prompted = true;
    if let Err(e) = store(path, &stats) {
        debug!("统计文件写入失败 (忽略): {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_prompt_feedback_threshold() {
        let stats = UsageStats { downloads: 49, feedback_prompted: false };
        assert!(!stats.should_prompt_feedback());

        let stats = UsageStats { downloads: 50, feedback_prompted: false };
        assert!(stats.should_prompt_feedback());

        // 已提示过的不再提示
        let stats = UsageStats { downloads: 500, feedback_prompted: true };
        assert!(!stats.should_prompt_feedback());
    }

    #[test]
    fn test_record_downloads_writes_given_path_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counters").join("stats.json");

        // 文件不存在时从零累计, 并连父目录一起创建
        let stats = record_downloads(&path, 3);
        assert_eq!(stats.downloads, 3);
        let stats = record_downloads(&path, 2);
        assert_eq!(stats.downloads, 5);

        mark_feedback_prompted(&path);
        let stats = load(&path);
        assert_eq!(stats.downloads, 5);
        assert!(stats.feedback_prompted);

        // 除指定路径外不产生其他文件
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_stats_roundtrip_shape() {
        let stats = UsageStats { downloads: 7, feedback_prompted: false };
        let json = serde_json::to_string(&stats).unwrap();
        let parsed: UsageStats = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.downloads, 7);
        assert!(!parsed.feedback_prompted);

        // 旧版本文件缺字段时按默认值补齐
        let parsed: UsageStats = serde_json::from_str(r#"{"downloads": 3}"#).unwrap();
        assert_eq!(parsed.downloads, 3);
        assert!(!parsed.feedback_prompted);
    }
}
