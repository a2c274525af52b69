// src/constants.rs

pub const UI_WIDTH: usize = 88;
pub const NAME_TRUNCATE_LENGTH: usize = 65;
pub const CONFIG_DIR_NAME: &str = concat!(".", clap::crate_name!());
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const STATS_FILE_NAME: &str = "stats.json";
pub const LOG_FILE_NAME: &str = "moodle-dl.log";
pub const LOG_FALLBACK_FILE_NAME: &str = "moodle-dl-fallback.log";
pub const DEFAULT_SAVE_DIR: &str = "downloads";
pub const DEFAULT_SELECTION: &str = "all";
/// 相邻两次保存动作之间的错峰间隔 (毫秒)
pub const DEFAULT_INTERVAL_MS: u64 = 500;
/// 累计下载量达到该阈值后，提示用户给项目反馈 (只提示一次)
pub const FEEDBACK_THRESHOLD: u64 = 50;
pub const PROJECT_HOMEPAGE: &str = "https://github.com/lss53/moodle-dl";
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub const HELP_COOKIE_GUIDE: &str = r#"
1. 登录 Moodle: 使用 Chrome / Edge / Firefox 浏览器登录你的 Moodle 站点。
2. 打开开发者工具:
   - 在 Windows / Linux 上: 按 F12 或 Ctrl+Shift+I
   - 在 macOS 上: 按 Cmd+Opt+I (⌘⌥I)
3. 切换到"应用" (Application) / "存储" (Storage) 标签页。
4. 在左侧 Cookies 列表中选中你的 Moodle 站点域名。
5. 复制名为 MoodleSession 的 Cookie 的值，粘贴给 --cookie 参数
   (或写入环境变量 MOODLE_SESSION)。"#;

/// Moodle 站点家族的标记约定。选择器硬编码为该家族的布局, 不做通用化。
pub mod moodle {
    /// 课程活动链接的路径段, 如 /mod/resource/view.php
    pub const MODULE_PATH_SEGMENT: &str = "/mod/";
    /// 文件夹资源的路径段; 命中则需要 POST 归档动作而非直接 GET
    pub const FOLDER_PATH_SEGMENT: &str = "/mod/folder/";
    /// 文件夹归档下载动作, 与 view.php 同目录
    pub const FOLDER_DOWNLOAD_FILE: &str = "download_folder.php";
    /// 附加在非文件夹资源 URL 上的跳转标志
    pub const REDIRECT_PARAM: (&str, &str) = ("redirect", "1");
    /// 退出链接, 会话密钥从它的查询参数里取
    pub const LOGOUT_PATH_SEGMENT: &str = "login/logout.php";
    pub const SESSKEY_PARAM: &str = "sesskey";
    /// Page 类型资源保存时抓取的主内容区域
    pub const MAIN_REGION_SELECTOR: &str = "[role='main']";
    pub const SESSION_COOKIE_NAME: &str = "MoodleSession";
}
