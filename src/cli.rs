// src/cli.rs

use crate::constants;
use clap::{Parser, ValueEnum, crate_version};
use std::path::PathBuf;

/// 定义日志输出级别
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Parser, Debug, Clone)]
#[command(
    version = crate_version!(),
    about,
    long_about = None,
    arg_required_else_help = true,
    disable_help_flag = true,
    disable_version_flag = true,
)]
#[command(group(
    clap::ArgGroup::new("mode")
        .required(true)
        .args(&["interactive", "url", "html_file", "batch_file", "cookie_help"]),
))]
pub struct Cli {
    // --- 运行模式 (Mode) ---
    /// 启动交互式会话，逐一输入课程页面链接
    #[arg(short, long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub interactive: bool,
    /// 指定要处理的单个课程页面链接
    #[arg(long, help_heading = "Mode")]
    pub url: Option<String>,
    /// 从本地保存的课程页面 HTML 文件提取资源
    #[arg(long, value_name = "FILE", help_heading = "Mode")]
    pub html_file: Option<PathBuf>,
    /// 从文本文件批量处理多个课程页面链接 (每行一个)
    #[arg(short, long, value_name = "FILE", help_heading = "Mode")]
    pub batch_file: Option<PathBuf>,
    /// 显示如何获取会话 Cookie 的指南并退出
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Mode")]
    pub cookie_help: bool,

    // --- 下载选项 (Options) ---
    /// [非交互模式] 指定下载项 (例如 '1-5,8', 'all')
    #[arg(long, default_value_t = constants::DEFAULT_SELECTION.to_string(), value_name = "SELECTION", help_heading = "Options")]
    pub select: String,
    /// 提供 MoodleSession 会话 Cookie，优先级最高
    #[arg(short, long, help_heading = "Options")]
    pub cookie: Option<String>,
    /// 按 课程/分区 目录结构组织保存的文件
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub organize: bool,
    /// 用页面上的资源名替换服务器返回的文件名 (保留扩展名)
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub replace_filename: bool,
    /// 强制重新下载已存在的文件
    #[arg(short, long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub force_redownload: bool,
    /// 相邻两次下载之间的错峰间隔 (毫秒)
    #[arg(long, value_name = "MS", default_value_t = constants::DEFAULT_INTERVAL_MS, help_heading = "Options")]
    pub interval_ms: u64,
    /// 设置文件保存目录
    #[arg(short, long, value_name = "DIR", default_value_os_t = PathBuf::from(constants::DEFAULT_SAVE_DIR), help_heading = "Options")]
    pub output: PathBuf,
    /// 只输出提取到的资源列表 (JSON)，不执行下载
    #[arg(long, action = clap::ArgAction::SetTrue, help_heading = "Options")]
    pub json: bool,

    // --- 通用选项 (General) ---
    /// 显示此帮助信息并退出
    #[arg(short = 'h', long, action = clap::ArgAction::Help, global = true, help_heading = "General")]
    _help: Option<bool>,
    /// 显示版本信息并退出
    #[arg(short = 'V', long, action = clap::ArgAction::Version, global = true, help_heading = "General")]
    _version: Option<bool>,
    /// (隐藏参数) 设置日志文件的输出级别，用于调试
    #[arg(long, value_enum, default_value_t = LogLevel::Off, global = true, hide = true)]
    pub log_level: LogLevel,
}
