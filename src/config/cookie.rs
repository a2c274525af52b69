// src/config/cookie.rs

use crate::{
    config::ExternalConfig,
    constants,
    error::{AppError, AppResult},
};
use anyhow::{Context, anyhow};
use log::{debug, info};
use std::{fs, path::PathBuf};

pub(super) fn get_config_path() -> AppResult<PathBuf> {
    let path = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("无法获取用户主目录")))?
        .join(constants::CONFIG_DIR_NAME)
        .join(constants::CONFIG_FILE_NAME);
    Ok(path)
}

pub(crate) fn load_or_create_external_config() -> AppResult<ExternalConfig> {
    let config_path = get_config_path()?;
    if config_path.is_file() {
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("读取配置文件 '{}' 失败", config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件 '{}' 失败", config_path.display()))
            .map_err(AppError::from)
    } else {
        info!("配置文件 {:?} 不存在，将创建默认配置。", config_path);
        let config = ExternalConfig::default_app_config();

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json_content = serde_json::to_string_pretty(&config)?;
        fs::write(&config_path, json_content)?;

        Ok(config)
    }
}

pub fn save_cookie(cookie: &str) -> AppResult<()> {
    if cookie.is_empty() {
        return Ok(());
    }

    let config_path = get_config_path()?;
    let mut config = load_or_create_external_config()?;

    config.session_cookie = Some(cookie.to_string());

    let json_content = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, json_content)
        .with_context(|| format!("保存 Cookie 到 '{}' 失败", config_path.display()))?;

    info!("用户已将会话 Cookie 保存至配置文件: {}", config_path.display());
    println!(
        "{} Cookie 已成功保存至: {}",
        *crate::symbols::INFO,
        config_path.display()
    );

    Ok(())
}

pub fn load_cookie_from_config() -> Option<String> {
    load_or_create_external_config()
        .ok()
        .and_then(|config| config.session_cookie)
}

/// Cookie 解析优先级: 命令行参数 > 环境变量 MOODLE_SESSION > 本地配置文件。
pub fn resolve_cookie(cli_cookie: Option<&str>) -> (Option<String>, String) {
    if let Some(cookie) = cli_cookie
        && !cookie.is_empty()
    {
        debug!("使用来自命令行参数的会话 Cookie");
        return (Some(cookie.to_string()), "命令行参数".to_string());
    }
    if let Ok(cookie) = std::env::var("MOODLE_SESSION")
        && !cookie.is_empty()
    {
        debug!("使用来自环境变量 MOODLE_SESSION 的会话 Cookie");
        return (Some(cookie), "环境变量 (MOODLE_SESSION)".to_string());
    }
    if let Some(cookie) = load_cookie_from_config()
        && !cookie.is_empty()
    {
        debug!("使用来自本地配置文件的会话 Cookie");
        return (Some(cookie), "本地配置文件".to_string());
    }
    debug!("未在任何位置找到可用的会话 Cookie");
    (None, "未找到".to_string())
}
