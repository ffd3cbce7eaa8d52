//! `wanmei`: build and smoke-test the Wanmei landing page.
//!
//! `wanmei build` stages the site into a fresh output directory.
//! `wanmei smoke` loads the page in a headless browser (or the offline
//! static driver) and reports missing landmarks and page errors.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod config;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use url::Url;
use wanmei_smoke::{ChromeDriver, ChromeOptions, SmokeOptions, SmokeReport, StaticDriver, run_smoke};
use wanmei_stage::{DEFAULT_OUT_DIR, SiteBuilder};
use wanmei_ui::download::DownloadFlow;
use wanmei_ui::locale::Locale;
use wanmei_ui::{ClientEnv, SiteOptions};

use crate::config::CliConfig;

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ── CLI structure ────────────────────────────────────────────────────

/// Wanmei site tooling.
#[derive(Parser)]
#[command(
    name = "wanmei",
    version,
    about = "Wanmei site CLI: build the landing page and smoke-test it",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         WANMEI_ROOT         Project root for build (default: .)\n  \
         WANMEI_OUT_DIR      Build output directory (default: <root>/dist)\n  \
         WANMEI_CHROME       Browser executable for smoke\n  \
         WANMEI_LOAD_TIMEOUT_MS  Page load budget for smoke (default: 30000)\n  \
         WANMEI_LOG_LEVEL    Log filter (default: warn)\n  \
         WANMEI_LOG_FORMAT   pretty or json (default: pretty)\n\n\
         {DIM}Examples:{RESET}\n  \
         wanmei build\n  \
         wanmei build --root site --out public\n  \
         wanmei smoke --page dist/index.html\n  \
         wanmei smoke --driver static --strict"
    ),
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage index.html, assets/ and png/ into a clean output directory.
    Build {
        /// Project root holding the site sources.
        #[arg(long, env = "WANMEI_ROOT", default_value = ".")]
        root: PathBuf,
        /// Output directory; deleted and recreated on every build.
        #[arg(long, env = "WANMEI_OUT_DIR")]
        out: Option<PathBuf>,
    },
    /// Load the page in a browser and check that it is intact.
    Smoke {
        /// Page to load (default: ./index.html).
        #[arg(long)]
        page: Option<PathBuf>,
        /// Page driver.
        #[arg(long, value_enum, default_value_t = Driver::Chrome)]
        driver: Driver,
        /// Browser executable (auto-detected when unset).
        #[arg(long, env = "WANMEI_CHROME")]
        chrome: Option<PathBuf>,
        /// Budget in milliseconds for loading the page until the network is idle.
        #[arg(long, env = "WANMEI_LOAD_TIMEOUT_MS", default_value_t = default_load_timeout_ms())]
        load_timeout_ms: u64,
        /// Wait after load in milliseconds; interaction steps wait half.
        #[arg(long, default_value_t = wanmei_smoke::DEFAULT_SETTLE_MS)]
        settle_ms: u64,
        /// Download flow assumed by the static driver.
        #[arg(long, default_value = "dropdown")]
        flow: DownloadFlow,
        /// Locale assumed by the static driver.
        #[arg(long, default_value = "zh-CN")]
        locale: Locale,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
        /// Exit 1 if a check fails or the page logged errors.
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Driver {
    /// Headless Chromium.
    Chrome,
    /// Offline HTML parse plus the in-memory interaction layer.
    Static,
}

// ── Output helpers ───────────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    println!("{BOLD}{CYAN}{icon} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn kv_line(key: &str, value: &str) {
    println!("  {DIM}{key:<20}{RESET} {WHITE}{value}{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn warning(msg: &str) {
    println!("{YELLOW}{BOLD}⚠{RESET} {YELLOW}{msg}{RESET}");
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    CliConfig::from_env().init_tracing();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Build { root, out } => cmd_build(&root, out).await,
        Commands::Smoke {
            page,
            driver,
            chrome,
            load_timeout_ms,
            settle_ms,
            flow,
            locale,
            json,
            strict,
        } => {
            let page_url = page_url(page)?;
            debug!(url = %page_url, ?driver, "smoke target");
            let mut options = SmokeOptions::new(page_url);
            options.settle_ms = settle_ms;
            let report = match driver {
                Driver::Chrome => {
                    let mut driver = ChromeDriver::launch(&ChromeOptions {
                        executable: chrome,
                        load_timeout: Duration::from_millis(load_timeout_ms),
                    })
                        .await
                        .context("cannot start the smoke test browser")?;
                    run_smoke(&mut driver, &options).await
                }
                Driver::Static => {
                    let env = ClientEnv::new(wanmei_smoke::STATIC_USER_AGENT, wanmei_smoke::STATIC_PLATFORM);
                    let mut driver = StaticDriver::new(env, SiteOptions { flow, locale });
                    run_smoke(&mut driver, &options).await
                }
            };
            print_report(&report, json)?;
            if strict && !report.is_clean() {
                bail!("smoke test found problems (--strict)");
            }
            Ok(())
        }
    }
}

// ── build ────────────────────────────────────────────────────────────

async fn cmd_build(root: &Path, out: Option<PathBuf>) -> Result<()> {
    let out = out.unwrap_or_else(|| root.join(DEFAULT_OUT_DIR));
    header("📦", "Build");
    kv_line("Root", &root.display().to_string());
    kv_line("Output", &out.display().to_string());
    println!();

    let summary = SiteBuilder::new(root, &out)
        .build()
        .await
        .with_context(|| format!("build failed for '{}'", root.display()))?;
    debug!(?summary, "build finished");

    success(&format!("Build complete! Output directory: {}", out.display()));
    kv_line("Copied", &summary.to_string());
    Ok(())
}

// ── smoke ────────────────────────────────────────────────────────────

/// `file://` URL of the page to load, relative paths resolved against the
/// current directory.
fn default_load_timeout_ms() -> u64 {
    u64::try_from(wanmei_smoke::DEFAULT_LOAD_TIMEOUT.as_millis()).unwrap_or(u64::MAX)
}

fn page_url(page: Option<PathBuf>) -> Result<Url> {
    let page = page.unwrap_or_else(|| PathBuf::from("index.html"));
    let absolute = std::path::absolute(&page)
        .with_context(|| format!("cannot resolve page path '{}'", page.display()))?;
    Url::from_file_path(&absolute)
        .map_err(|()| anyhow::anyhow!("cannot build a file URL for '{}'", absolute.display()))
}

fn print_report(report: &SmokeReport, json: bool) -> Result<()> {
    if json {
        let body = serde_json::to_string_pretty(report).context("failed to serialize report")?;
        println!("{body}");
        return Ok(());
    }

    header("🧪", "Smoke Test");
    print!("{report}");
    println!();
    if report.is_clean() {
        success("Smoke test complete");
    } else {
        warning("Smoke test complete with problems");
    }
    Ok(())
}
