// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod descriptor;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod models;
pub mod stats;
pub mod symbols;
pub mod ui;
pub mod utils;

use crate::{
    cli::Cli,
    client::RobustClient,
    config::AppConfig,
    downloader::{CoursePageJob, DownloadManager},
    error::{AppError, AppResult},
};
use anyhow::anyhow;
use colored::*;
use log::{debug, info};
use std::{
    path::Path,
    sync::{Arc, atomic::AtomicBool},
};
use url::Url;

/// 核心的执行上下文，包含所有任务所需的状态和工具
#[derive(Clone)]
pub struct DownloadJobContext {
    pub manager: DownloadManager,
    pub config: Arc<AppConfig>,
    pub http_client: Arc<RobustClient>,
    pub args: Arc<Cli>,
    pub non_interactive: bool,
    pub cancellation_token: Arc<AtomicBool>,
}

/// 库的公共入口点，由 `main.rs` 调用
pub async fn run_from_cli(args: Arc<Cli>, cancellation_token: Arc<AtomicBool>) -> AppResult<()> {
    debug!("CLI 参数: {:?}", args);
    if args.cookie_help {
        ui::box_message(
            "获取会话 Cookie 指南",
            constants::HELP_COOKIE_GUIDE
                .lines()
                .collect::<Vec<_>>()
                .as_slice(),
            |s| s.cyan(),
        );
        println!(
            "\n{} 安全提醒: 会话 Cookie 等同于你的登录凭证，不要分享给他人。",
            *symbols::INFO
        );
        return Ok(());
    }

    let (mut cookie_opt, source) = config::cookie::resolve_cookie(args.cookie.as_deref());
    if cookie_opt.is_some() {
        info!("从 {} 加载会话 Cookie", source);
        if !args.json {
            println!("\n{} 已从 {} 加载会话 Cookie。", *symbols::INFO, source);
        }
    } else if args.interactive {
        // 交互模式下当场询问一次, 其余模式按匿名会话继续
        println!(
            "\n{} 未找到会话 Cookie (使用 --cookie-help 查看获取方法)。",
            *symbols::WARN
        );
        if let Ok(input) = ui::prompt_hidden("请粘贴 MoodleSession Cookie (直接回车跳过)")
            && !input.trim().is_empty()
        {
            let input = input.trim().to_string();
            if ui::confirm("是否将该 Cookie 保存到本地配置文件?", true) {
                config::cookie::save_cookie(&input)?;
            }
            cookie_opt = Some(input);
        }
    } else {
        info!("未找到会话 Cookie，将以匿名会话访问");
        if !args.json {
            println!(
                "\n{}",
                format!("{} 未找到会话 Cookie，将以匿名会话访问 (仅公开课程可用)。", *symbols::INFO).yellow()
            );
        }
    }

    let config = Arc::new(AppConfig::new(&args, cookie_opt)?);
    let http_client = Arc::new(RobustClient::new(config.clone())?);

    let context = DownloadJobContext {
        manager: DownloadManager::new(),
        config,
        http_client,
        args: args.clone(),
        non_interactive: !args.interactive,
        cancellation_token,
    };

    if args.interactive {
        handle_interactive_mode(context).await?;
    } else if let Some(batch_file) = &args.batch_file {
        process_batch_tasks(batch_file, context).await?;
    } else if let Some(url) = &args.url {
        CoursePageJob::new(context).run_from_url(url).await?;
    } else if let Some(html_file) = &args.html_file {
        CoursePageJob::new(context).run_from_file(html_file).await?;
    };

    Ok(())
}

async fn handle_interactive_mode(base_context: DownloadJobContext) -> AppResult<()> {
    ui::print_header("交互模式");
    println!(
        "在此模式下，你可以逐一输入课程页面链接进行提取和下载。按 {} 可随时退出。",
        *symbols::CTRL_C
    );

    loop {
        match ui::prompt("请输入课程页面链接", None) {
            Ok(input) if !input.is_empty() => {
                let result: AppResult<bool> = if Url::parse(&input).is_ok() {
                    let context = base_context.clone();
                    CoursePageJob::new(context).run_from_url(&input).await
                } else {
                    Err(AppError::Other(anyhow!("输入 '{}' 不是有效的链接。", input)))
                };

                if let Err(e) = result {
                    log::error!("交互模式任务 '{}' 失败: {}", input, e);
                    if !matches!(e, AppError::UserInterrupt) {
                        eprintln!(
                            "\n{} 处理任务时发生错误: {}",
                            *symbols::ERROR,
                            e.to_string().red()
                        );
                    }
                }
            }
            Ok(_) => break, // 用户输入空行
            Err(_) => return Err(AppError::UserInterrupt), // 用户按 Ctrl+C
        }
    }

    println!("\n{} 退出交互模式。", *symbols::INFO);
    Ok(())
}

async fn process_batch_tasks(batch_file: &Path, base_context: DownloadJobContext) -> AppResult<()> {
    let content = std::fs::read_to_string(batch_file).map_err(|e| {
        log::error!("读取批量文件 '{}' 失败: {}", batch_file.display(), e);
        AppError::from(e)
    })?;

    let tasks: Vec<String> = content
        .lines()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if tasks.is_empty() {
        log::warn!("批量文件 '{}' 为空或不含有效行。", batch_file.display());
        println!(
            "{} 批量文件 '{}' 为空。",
            *symbols::WARN,
            batch_file.display()
        );
        return Ok(());
    }

    let mut success = 0;
    let mut failed = 0;
    ui::print_header(&format!(
        "开始批量处理任务 (按 {} 可随时退出)",
        *symbols::CTRL_C
    ));
    for (i, task) in tasks.iter().enumerate() {
        if base_context
            .cancellation_token
            .load(std::sync::atomic::Ordering::Relaxed)
        {
            return Err(AppError::UserInterrupt);
        }
        ui::print_sub_header(&format!(
            "批量任务 {}/{} - {}",
            i + 1,
            tasks.len(),
            utils::truncate_text(task, 60)
        ));

        if Url::parse(task).is_err() {
            log::warn!("跳过无效条目: {}", task);
            eprintln!("{} 跳过无效条目: {}", *symbols::WARN, task);
            continue;
        }
        let context = base_context.clone();
        match CoursePageJob::new(context).run_from_url(task).await {
            Ok(_) => success += 1,
            Err(e) => {
                failed += 1;
                log::error!("批量任务 '{}' 失败: {}", task, e);
                eprintln!("\n{} 处理任务时发生错误: {}", *symbols::ERROR, e);
            }
        }
    }

    ui::print_header("批量任务报告");
    println!(
        "{} | {} | 总计: {}",
        format!("成功任务: {}", success).green(),
        format!("失败任务: {}", failed).red(),
        tasks.len()
    );
    if failed > 0 {
        Err(AppError::Other(anyhow!("{} 个批量任务执行失败。", failed)))
    } else {
        Ok(())
    }
}
