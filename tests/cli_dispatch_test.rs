// tests/cli_dispatch_test.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::File;
use std::io::Write;
use tempfile::tempdir;

// 辅助函数，避免重复
fn main_command() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

// --- 测试基本 CLI 行为 ---

#[test]
fn test_help_flag() {
    let mut cmd = main_command();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("显示此帮助信息并退出"));
}

#[test]
fn test_cookie_help_command() {
    let mut cmd = main_command();
    cmd.arg("--cookie-help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("MoodleSession"))
        .stdout(predicate::str::contains("开发者工具"));
}

#[test]
fn test_missing_mode_shows_help() {
    let mut cmd = main_command();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_mode_flags_conflict() {
    let mut cmd = main_command();
    cmd.arg("-i").arg("--url").arg("https://site/course/view.php?id=1");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

// --- 测试核心分发逻辑 ---

#[test]
fn test_html_file_json_mode_outputs_resources() {
    let dir = tempdir().unwrap();
    let page_path = dir.path().join("course.html");
    let mut file = File::create(&page_path).unwrap();
    write!(
        file,
        r#"<html><body><h1>CS101</h1>
           <a href="https://site/login/logout.php?sesskey=k">out</a>
           <div class="content"><h3 class="sectionname">Week 1</h3>
             <li class="activity">
               <a href="https://site/mod/resource/view.php?id=1">
                 <span class="instancename">Slides<span class="accesshide"> File</span></span>
               </a>
             </li>
           </div></body></html>"#
    )
    .unwrap();

    let mut cmd = main_command();
    cmd.arg("--html-file").arg(&page_path).arg("--json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"Slides\""))
        .stdout(predicate::str::contains("\"type\": \"File\""))
        .stdout(predicate::str::contains(
            "https://site/mod/resource/view.php?id=1&redirect=1"
        ));
}

#[test]
fn test_html_file_json_mode_empty_page() {
    let dir = tempdir().unwrap();
    let page_path = dir.path().join("empty.html");
    let mut file = File::create(&page_path).unwrap();
    write!(file, "<html><body><p>nothing</p></body></html>").unwrap();

    let mut cmd = main_command();
    cmd.arg("--html-file").arg(&page_path).arg("--json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_single_url_mode_dispatch() {
    let mut cmd = main_command();
    // 无监听端口: 验证网络失败被折叠为友好错误而不是 panic
    cmd.arg("--url").arg("http://127.0.0.1:9/course/view.php?id=1");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("程序执行出错"));
}

#[test]
fn test_batch_mode_reports_failures() {
    let dir = tempdir().unwrap();
    let file_path = dir.path().join("links.txt");
    let mut file = File::create(&file_path).unwrap();
    writeln!(file, "http://127.0.0.1:9/course/view.php?id=1").unwrap();
    writeln!(file, "not-a-url").unwrap();

    let mut cmd = main_command();
    cmd.arg("-b").arg(&file_path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("个批量任务执行失败"));
}
