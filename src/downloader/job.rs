// src/downloader/job.rs

use super::dispatch;
use crate::{
    DownloadJobContext, constants,
    error::*,
    extractor,
    models::{DownloadStatus, Resource},
    stats, symbols, ui, utils,
};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use scraper::Html;
use std::{fs, path::Path, sync::atomic::Ordering};

pub struct CoursePageJob {
    context: DownloadJobContext,
}

impl CoursePageJob {
    pub fn new(context: DownloadJobContext) -> Self {
        Self { context }
    }

    pub async fn run_from_url(&self, url: &str) -> AppResult<bool> {
        info!("开始处理课程页面: {}", url);
        let html = self.context.http_client.fetch_page(url).await?;
        self.run_with_html(&html).await
    }

    pub async fn run_from_file(&self, path: &Path) -> AppResult<bool> {
        info!("开始处理本地页面文件: {}", path.display());
        let html = fs::read_to_string(path)?;
        self.run_with_html(&html).await
    }

    pub async fn run_with_html(&self, html: &str) -> AppResult<bool> {
        let resources = parse_resources(html);

        if self.context.args.json {
            println!("{}", serde_json::to_string_pretty(&resources)?);
            return Ok(true);
        }

        if resources.is_empty() {
            println!(
                "\n{} 页面上未找到可下载的资源 (支持的类型: 文件/目录/链接/页面)。",
                *symbols::INFO
            );
            return Ok(true);
        }

        if let Some(course) = resources.first().map(|r| r.course.as_str())
            && !course.is_empty()
        {
            println!("\n{} 课程: {}", *symbols::INFO, course);
        }

        let selected = self.get_user_selection(&resources)?;
        if selected.is_empty() {
            println!("\n{} 未选择任何资源，任务结束。", *symbols::INFO);
            return Ok(true);
        }

        fs::create_dir_all(&self.context.config.save_dir)?;
        let absolute_path = dunce::canonicalize(&self.context.config.save_dir)?;
        info!("文件将保存到目录: \"{}\"", absolute_path.display());
        println!(
            "\n{} 文件将保存到目录: \"{}\"",
            *symbols::INFO,
            absolute_path.display()
        );

        self.execute_download_batch(selected).await?;
        self.context.manager.print_report();

        let success_count = self.context.manager.get_stats().success;
        if success_count > 0 {
            self.maybe_prompt_feedback(success_count as u64);
        }
        Ok(self.context.manager.did_all_succeed())
    }

    fn get_user_selection(&self, resources: &[Resource]) -> AppResult<Vec<Resource>> {
        let options: Vec<String> = resources
            .iter()
            .map(|r| {
                let location = if r.section.is_empty() {
                    r.name.clone()
                } else {
                    format!("{} / {}", r.section, r.name)
                };
                format!(
                    "[{}] {}",
                    r.kind.display_tag(),
                    utils::truncate_text(&location, constants::NAME_TRUNCATE_LENGTH)
                )
            })
            .collect();

        let user_input = if self.context.non_interactive {
            self.context.args.select.clone()
        } else {
            ui::resource_menu(&options, &self.context.args.select)
        };

        let indices = utils::parse_selection_indices(&user_input, options.len());
        debug!("根据用户输入 '{}'，解析出的索引为: {:?}", user_input, indices);
        Ok(indices.into_iter().map(|i| resources[i].clone()).collect())
    }

    /// 每个任务按其在选择中的序号错峰启动 (序号 × 固定间隔),
    /// 避免同时向站点发起全部请求。
    async fn execute_download_batch(&self, tasks: Vec<Resource>) -> AppResult<()> {
        self.context.manager.start_batch(tasks.len());
        println!("\n{} 开始下载 {} 个资源...", *symbols::INFO, tasks.len());

        let pbar = ProgressBar::new(tasks.len() as u64);
        pbar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        let handles: Vec<_> = tasks
            .into_iter()
            .enumerate()
            .map(|(index, resource)| {
                let context = self.context.clone();
                let pbar = pbar.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(context.config.interval * index as u32).await;
                    if context.cancellation_token.load(Ordering::Relaxed) {
                        return;
                    }
                    run_single_task(&context, resource, &pbar).await;
                })
            })
            .collect();

        join_all(handles).await;
        pbar.finish_and_clear();

        if self.context.cancellation_token.load(Ordering::Relaxed) {
            return Err(AppError::UserInterrupt);
        }
        Ok(())
    }

    fn maybe_prompt_feedback(&self, new_downloads: u64) {
        let stats_file = &self.context.config.stats_file;
        let usage = stats::record_downloads(stats_file, new_downloads);
        if self.context.non_interactive || !usage.should_prompt_feedback() {
            return;
        }
        stats::mark_feedback_prompted(stats_file);
        println!(
            "\n{} 你已累计下载 {} 个资源。",
            *symbols::OK, usage.downloads
        );
        if ui::confirm("愿意到项目主页留下反馈或建议吗?", false) {
            println!("{} 项目主页: {}", *symbols::INFO, constants::PROJECT_HOMEPAGE);
        }
    }
}

/// 同步辅助: Html 不是 Send, 解析作用域不能跨越 await。
fn parse_resources(html: &str) -> Vec<Resource> {
    let doc = Html::parse_document(html);
    extractor::extract(&doc)
}

async fn run_single_task(context: &DownloadJobContext, resource: Resource, pbar: &ProgressBar) {
    let result = match dispatch::download_resource(context, &resource).await {
        Ok(result) => result,
        Err(e) => {
            error!("资源 '{}' 下载失败: {}", resource.name, e);
            crate::models::DownloadResult {
                filename: resource.name.clone(),
                status: DownloadStatus::from(&e),
                message: Some(e.to_string()),
            }
        }
    };

    match result.status {
        DownloadStatus::Success => context.manager.record_success(),
        DownloadStatus::Skipped => context.manager.record_skip(
            &result.filename,
            result.message.as_deref().unwrap_or("文件已存在"),
        ),
        status => context.manager.record_failure(&result.filename, status),
    }

    pbar.inc(1);
    if result.status != DownloadStatus::Skipped {
        let (symbol, color_fn, default_msg) = result.status.get_display_info();
        let line = if result.status == DownloadStatus::Success {
            format!("{} {}", symbol, result.filename)
        } else {
            let detail = result
                .message
                .map(|m| format!("{} (详情: {})", default_msg, m))
                .unwrap_or_else(|| default_msg.to_string());
            format!("{} {} {}", symbol, result.filename, color_fn(detail.into()))
        };
        pbar.println(line);
    }
    if result.status == DownloadStatus::SessionError {
        warn!("会话已失效，后续任务大概率同样失败。");
    }
}
