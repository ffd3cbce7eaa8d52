//! Integration tests for the `wanmei` CLI binary.
//!
//! The binary runs as a subprocess against temporary site trees. Smoke
//! tests use the offline static driver so no browser is needed.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::process::Command;

fn wanmei_bin() -> String {
    let path = env!("CARGO_BIN_EXE_wanmei");
    assert!(Path::new(path).exists(), "wanmei binary not found at {path}");
    path.to_owned()
}

/// Run wanmei with args and return (`exit_code`, stdout, stderr).
fn run_in(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(wanmei_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("WANMEI_ROOT")
        .env_remove("WANMEI_OUT_DIR")
        .env_remove("WANMEI_CHROME")
        .env_remove("WANMEI_LOAD_TIMEOUT_MS")
        .env_remove("WANMEI_LOG_FORMAT")
        .env_remove("RUST_LOG")
        .env("WANMEI_LOG_LEVEL", "off")
        .output()
        .expect("failed to execute wanmei");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

fn run(args: &[&str]) -> (i32, String, String) {
    run_in(&std::env::temp_dir(), args)
}

const PAGE: &str = r##"<!DOCTYPE html>
<html lang="zh-CN">
<head><title>万媒师 - AI 营销助手</title></head>
<body>
  <header class="header" id="header">
    <ul class="nav-menu" id="navMenu">
      <li><a class="nav-link" href="#home">首页</a></li>
      <li><a class="nav-link" href="#download">下载</a></li>
    </ul>
    <button class="nav-toggle" id="navToggle"><span></span></button>
  </header>
  <section class="hero" id="home"><a class="btn btn-primary" href="#download">立即下载</a></section>
  <section class="features" id="features"><div class="feature-card">AI</div></section>
  <section id="download">
    <div class="download-card">
      <a class="btn-download" data-os="windows" href="#"><span>下载 Windows 版</span></a>
    </div>
  </section>
  <section id="pricing"><div class="pricing-card">Pro</div></section>
  <section id="about"><div class="value-item">V</div></section>
  <footer class="footer"></footer>
</body>
</html>"##;

/// Minimal site tree: index.html, a stylesheet and one image.
fn site(html: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("index.html"), html).unwrap();
    fs::create_dir_all(root.join("assets/css")).unwrap();
    fs::write(root.join("assets/css/style.css"), "body { margin: 0; }\n").unwrap();
    fs::create_dir_all(root.join("png")).unwrap();
    fs::write(root.join("png/logo.png"), [0x89, b'P', b'N', b'G', 0, 1, 2, 3]).unwrap();
    dir
}

// ── Version & help ───────────────────────────────────────────────────

#[test]
fn test_version_flag() {
    let (code, stdout, _) = run(&["--version"]);
    assert_eq!(code, 0, "wanmei --version should exit 0");
    assert!(stdout.contains("wanmei"), "version output should contain 'wanmei': {stdout}");
}

#[test]
fn test_help_flag() {
    let (code, stdout, _) = run(&["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Wanmei site CLI"), "help should mention the CLI: {stdout}");
    assert!(stdout.contains("build"), "help should list 'build'");
    assert!(stdout.contains("smoke"), "help should list 'smoke'");
}

#[test]
fn test_smoke_help_lists_load_timeout() {
    let (code, stdout, _) = run(&["smoke", "--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("--load-timeout-ms"), "stdout: {stdout}");
    assert!(stdout.contains("30000"), "default budget should be shown: {stdout}");
}

#[test]
fn test_unknown_driver_is_rejected() {
    let (code, _, stderr) = run(&["smoke", "--driver", "firefox"]);
    assert_eq!(code, 2, "clap usage errors exit 2");
    assert!(stderr.contains("firefox"));
}

// ── build ────────────────────────────────────────────────────────────

#[test]
fn test_build_copies_site_into_dist() {
    let dir = site(PAGE);
    let (code, stdout, stderr) = run_in(dir.path(), &["build"]);
    assert_eq!(code, 0, "build failed: {stderr}");
    assert!(stdout.contains("Build complete"), "stdout: {stdout}");

    let dist = dir.path().join("dist");
    assert_eq!(fs::read(dist.join("index.html")).unwrap(), PAGE.as_bytes());
    assert_eq!(
        fs::read(dist.join("assets/css/style.css")).unwrap(),
        fs::read(dir.path().join("assets/css/style.css")).unwrap()
    );
    assert_eq!(
        fs::read(dist.join("png/logo.png")).unwrap(),
        fs::read(dir.path().join("png/logo.png")).unwrap()
    );
}

#[test]
fn test_build_removes_stale_output() {
    let dir = site(PAGE);
    let dist = dir.path().join("dist");
    fs::create_dir_all(&dist).unwrap();
    fs::write(dist.join("old.html"), "stale").unwrap();

    let (code, _, stderr) = run_in(dir.path(), &["build"]);
    assert_eq!(code, 0, "build failed: {stderr}");
    assert!(!dist.join("old.html").exists(), "stale file should be gone");
    assert!(dist.join("index.html").exists());
}

#[test]
fn test_build_with_explicit_root_and_out() {
    let dir = site(PAGE);
    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("public");
    let root = dir.path().to_str().unwrap();

    let (code, _, stderr) = run(&["build", "--root", root, "--out", target.to_str().unwrap()]);
    assert_eq!(code, 0, "build failed: {stderr}");
    assert!(target.join("index.html").exists());
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn test_build_refuses_root_as_output() {
    let dir = site(PAGE);
    let (code, _, stderr) = run_in(dir.path(), &["build", "--out", "."]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Error"), "stderr: {stderr}");
    assert!(dir.path().join("index.html").exists(), "sources must survive");
}

// ── smoke ────────────────────────────────────────────────────────────

#[test]
fn test_smoke_static_reports_landmarks() {
    let dir = site(PAGE);
    let (code, stdout, stderr) = run_in(dir.path(), &["smoke", "--driver", "static", "--settle-ms", "10"]);
    assert_eq!(code, 0, "smoke failed: {stderr}");
    assert!(stdout.contains("万媒师 - AI 营销助手"), "title missing: {stdout}");
    assert!(stdout.contains("✓ 导航栏 found"));
    assert!(stdout.contains("✓ 定价方案 found"));
    assert!(stdout.contains("nav links: 2"));
    assert!(stdout.contains("Smoke test complete"));
}

#[test]
fn test_smoke_missing_section_is_reported_but_passes() {
    let dir = site(&PAGE.replace(r#"<section id="pricing"><div class="pricing-card">Pro</div></section>"#, ""));
    let (code, stdout, stderr) = run_in(dir.path(), &["smoke", "--driver", "static", "--settle-ms", "10"]);
    assert_eq!(code, 0, "non-strict smoke should exit 0: {stderr}");
    assert!(stdout.contains("✗ 定价方案 not found"), "stdout: {stdout}");
}

#[test]
fn test_smoke_strict_fails_on_missing_section() {
    let dir = site(&PAGE.replace(r#"<footer class="footer"></footer>"#, ""));
    let (code, _, stderr) = run_in(
        dir.path(),
        &["smoke", "--driver", "static", "--settle-ms", "10", "--strict"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("--strict"), "stderr: {stderr}");
}

#[test]
fn test_smoke_json_output() {
    let dir = site(PAGE);
    let page = dir.path().join("index.html");
    let (code, stdout, stderr) = run(&[
        "smoke",
        "--driver",
        "static",
        "--settle-ms",
        "10",
        "--json",
        "--page",
        page.to_str().unwrap(),
    ]);
    assert_eq!(code, 0, "smoke failed: {stderr}");

    let report: serde_json::Value = serde_json::from_str(&stdout).expect("stdout should be JSON");
    assert_eq!(report["driver"], "static");
    assert_eq!(report["checks"].as_array().unwrap().len(), 9);
    assert_eq!(report["download_buttons"], 1);
    assert!(report["url"].as_str().unwrap().starts_with("file://"));
}

#[test]
fn test_smoke_missing_page_is_a_flow_error() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_in(dir.path(), &["smoke", "--driver", "static", "--settle-ms", "10"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("smoke flow aborted"), "stdout: {stdout}");

    let (code, _, _) = run_in(
        dir.path(),
        &["smoke", "--driver", "static", "--settle-ms", "10", "--strict"],
    );
    assert_eq!(code, 1);
}

#[test]
fn test_smoke_chrome_launch_failure_exits_1() {
    let dir = site(PAGE);
    let (code, _, stderr) = run_in(
        dir.path(),
        &["smoke", "--chrome", "/nonexistent/wanmei-chrome", "--settle-ms", "10"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("browser"), "stderr: {stderr}");
}

// ── shipped site ─────────────────────────────────────────────────────

fn shipped_site() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../site")
}

#[test]
fn test_shipped_site_passes_strict_static_smoke() {
    let page = shipped_site().join("index.html");
    let (code, stdout, stderr) = run(&[
        "smoke",
        "--driver",
        "static",
        "--settle-ms",
        "10",
        "--strict",
        "--page",
        page.to_str().unwrap(),
    ]);
    assert_eq!(code, 0, "stdout: {stdout}\nstderr: {stderr}");
    assert!(stdout.contains("nav links: 5"));
    assert!(stdout.contains("download buttons: 3"));
}

#[test]
fn test_shipped_site_builds() {
    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("dist");
    let root = shipped_site();
    let (code, _, stderr) = run(&[
        "build",
        "--root",
        root.to_str().unwrap(),
        "--out",
        target.to_str().unwrap(),
    ]);
    assert_eq!(code, 0, "build failed: {stderr}");
    assert!(target.join("index.html").exists());
    assert!(target.join("assets/css/style.css").exists());
    assert!(target.join("png/logo.png").exists());
}
