// src/main.rs

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use log::{error, warn};
use moodle_dl::{cli::Cli, error::AppError, logging, run_from_cli, symbols};
use std::{
    env,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

#[tokio::main]
async fn main() {
    // 为 Windows 终端启用 ANSI 颜色支持。
    #[cfg(windows)]
    {
        colored::control::set_virtual_terminal(true).ok();
    }

    let bin_name = env::var("CARGO_BIN_NAME").unwrap_or_else(|_| "moodle-dl".to_string());

    let after_help = format!(
        "示例:\n  # 启动交互模式 (推荐)\n  {bin} -i\n\n  # 提取并下载单个课程页面的资源\n  {bin} --url \"https://moodle.example.edu/course/view.php?id=123\"\n\n  # 只输出资源列表 (JSON)，不下载\n  {bin} --url \"https://...\" --json\n\n  # 从保存的页面文件提取\n  {bin} --html-file course.html --json\n\n  # 获取会话 Cookie 帮助\n  {bin} --cookie-help",
        bin = bin_name
    );

    let cmd = Cli::command().after_help(after_help);
    let args = Arc::new(Cli::from_arg_matches(&cmd.get_matches()).unwrap());

    logging::init_logger(args.log_level);

    let cancellation_token = Arc::new(AtomicBool::new(false));
    let handler_token = cancellation_token.clone();
    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("无法监听 Ctrl-C 信号: {}", e);
                return;
            }
            if handler_token.load(Ordering::Relaxed) {
                println!("\n第二次中断，强制退出...");
                warn!("用户第二次按下 Ctrl+C，强制退出。");
                std::process::exit(130);
            }
            println!(
                "\n{} 正在停止... 请等待当前任务完成。再按一次 {} 可强制退出。",
                *symbols::WARN,
                *symbols::CTRL_C
            );
            warn!("用户通过 Ctrl+C 请求中断程序。");
            handler_token.store(true, Ordering::Relaxed);
        }
    });

    if let Err(e) = run_from_cli(args, cancellation_token).await {
        match e {
            AppError::UserInterrupt => {
                warn!("程序被用户中断。");
                std::process::exit(130);
            }
            AppError::SessionInvalid => {
                error!("程序因会话失效而退出: {}", e);
                eprintln!("\n{} {}", *symbols::ERROR, format!("{}", e).red());
                eprintln!(
                    "{} 请使用 --cookie-help 命令查看如何获取或更新你的会话 Cookie。",
                    *symbols::INFO
                );
                std::process::exit(1);
            }
            _ => {
                error!("程序执行出错: {}", e);
                eprintln!("\n{} {}", *symbols::ERROR, format!("程序执行出错: {}", e).red());
                std::process::exit(1);
            }
        }
    }
}
