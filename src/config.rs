// src/config.rs

pub mod cookie;

use self::cookie::load_or_create_external_config;
use crate::{cli::Cli, constants, error::AppResult, stats};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    pub connect_timeout_secs: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

/// 落盘在 ~/.moodle-dl/config.json 的持久配置。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
    #[serde(default)]
    pub network: NetworkConfig,
}

impl ExternalConfig {
    pub(crate) fn default_app_config() -> Self {
        Self {
            session_cookie: None,
            // 一组稳健的网络默认值
            network: NetworkConfig {
                connect_timeout_secs: Some(10),
                timeout_secs: Some(60),
                max_retries: Some(3),
            },
        }
    }
}

/// 运行期配置: CLI 参数与持久配置合并后的只读快照。
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub session_cookie: Option<String>,
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub timeout: Duration,
    pub max_retries: u32,
    pub save_dir: PathBuf,
    /// 使用计数的落盘位置 (默认在配置目录下)
    pub stats_file: PathBuf,
    /// 相邻保存动作的错峰间隔
    pub interval: Duration,
    pub organize: bool,
    pub replace_filename: bool,
    pub force_redownload: bool,
}

impl AppConfig {
    pub fn new(args: &Cli, session_cookie: Option<String>) -> AppResult<Self> {
        let external_config = load_or_create_external_config()?;

        Ok(Self {
            session_cookie,
            user_agent: constants::USER_AGENT.into(),
            connect_timeout: Duration::from_secs(
                external_config.network.connect_timeout_secs.unwrap_or(10),
            ),
            timeout: Duration::from_secs(external_config.network.timeout_secs.unwrap_or(60)),
            max_retries: external_config.network.max_retries.unwrap_or(3),
            save_dir: args.output.clone(),
            stats_file: stats::default_stats_path()?,
            interval: Duration::from_millis(args.interval_ms),
            organize: args.organize,
            replace_filename: args.replace_filename,
            force_redownload: args.force_redownload,
        })
    }
}

#[cfg(feature = "testing")]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session_cookie: None,
            user_agent: "test-agent/1.0".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(15),
            max_retries: 3,
            save_dir: PathBuf::from(constants::DEFAULT_SAVE_DIR),
            stats_file: std::env::temp_dir()
                .join(concat!(clap::crate_name!(), "-test-stats.json")),
            interval: Duration::from_millis(0),
            organize: false,
            replace_filename: false,
            force_redownload: false,
        }
    }
}
