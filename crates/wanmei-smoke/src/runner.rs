//! The smoke flow.

use tracing::{info, warn};
use url::Url;

use crate::checks::{self, CHECKS};
use crate::driver::PageDriver;
use crate::report::{CheckResult, SmokeReport, StepOutcome};
use crate::DriverError;

/// Default wait after the page loads.
pub const DEFAULT_SETTLE_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct SmokeOptions {
    pub url: Url,
    /// Wait after load; each interaction step waits half of it.
    pub settle_ms: u64,
}

impl SmokeOptions {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            settle_ms: DEFAULT_SETTLE_MS,
        }
    }

    #[must_use]
    pub fn step_ms(&self) -> u64 {
        self.settle_ms / 2
    }
}

/// Run the smoke flow against `driver` and close it.
///
/// Never fails: query failures are recorded per check or step, an error that
/// aborts the flow lands in [`SmokeReport::flow_error`], and the driver is
/// closed on every path.
pub async fn run_smoke<D>(driver: &mut D, options: &SmokeOptions) -> SmokeReport
where
    D: PageDriver + ?Sized,
{
    let mut report = SmokeReport::new(driver.name(), options.url.as_str());
    info!(driver = driver.name(), url = %options.url, "smoke test starting");

    if let Err(e) = run_flow(driver, options, &mut report).await {
        warn!(error = %e, "smoke flow aborted");
        report.flow_error = Some(e.to_string());
    }

    let console = driver.console_messages().await;
    report.record_console(console);
    report.page_errors = driver.page_errors().await;

    if let Err(e) = driver.close().await {
        warn!(error = %e, "driver did not close cleanly");
        report.close_error = Some(e.to_string());
    }

    info!(
        missing = report.missing().len(),
        console_errors = report.console_errors.len(),
        page_errors = report.page_errors.len(),
        "smoke test finished"
    );
    report
}

async fn run_flow<D>(driver: &mut D, options: &SmokeOptions, report: &mut SmokeReport) -> Result<(), DriverError>
where
    D: PageDriver + ?Sized,
{
    driver.goto(&options.url).await?;
    driver.wait(options.settle_ms).await;

    match driver.title().await {
        Ok(title) => report.title = Some(title),
        Err(e) => warn!(error = %e, "could not read title"),
    }

    for check in CHECKS {
        let result = match driver.exists(check.selector).await {
            Ok(found) => CheckResult::found(check, found),
            Err(e) => CheckResult::failed(check, e.to_string()),
        };
        report.checks.push(result);
    }

    report.nav_links = driver.count(checks::NAV_LINKS).await.ok();
    report.download_buttons = driver.count(checks::DOWNLOAD_BUTTONS).await.ok();

    let step = options.step_ms();
    if report.download_buttons.unwrap_or(0) > 0 {
        let outcome = click(driver, checks::DOWNLOAD_BUTTONS).await;
        report.step("click first download button", outcome);
        driver.wait(step).await;
    } else {
        report.step(
            "click first download button",
            StepOutcome::Skipped(format!("no {}", checks::DOWNLOAD_BUTTONS)),
        );
    }

    let (width, height) = checks::MOBILE_VIEWPORT;
    driver.set_viewport(width, height).await?;
    report.step(&format!("resize to {width}x{height}"), StepOutcome::Done);
    driver.wait(step).await;

    let outcome = click(driver, checks::NAV_TOGGLE).await;
    let clicked = outcome == StepOutcome::Done;
    report.step("toggle mobile menu", outcome);
    if clicked {
        driver.wait(step).await;
    }

    let (width, height) = checks::DESKTOP_VIEWPORT;
    driver.set_viewport(width, height).await?;
    report.step(&format!("resize to {width}x{height}"), StepOutcome::Done);
    driver.wait(step).await;
    Ok(())
}

async fn click<D>(driver: &mut D, selector: &str) -> StepOutcome
where
    D: PageDriver + ?Sized,
{
    match driver.click_first(selector).await {
        Ok(true) => StepOutcome::Done,
        Ok(false) => StepOutcome::Skipped(format!("no {selector}")),
        Err(e) => StepOutcome::Failed(e.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::driver::{ConsoleLevel, ConsoleMessage};

    /// Scripted driver: every selector in `present` matches once.
    #[derive(Default)]
    struct Scripted {
        present: Vec<&'static str>,
        fail_goto: bool,
        stall_goto: bool,
        clicks: Vec<String>,
        viewports: Vec<(u32, u32)>,
        closed: bool,
    }

    impl Scripted {
        fn has(&self, selector: &str) -> bool {
            self.present.iter().any(|s| *s == selector)
        }
    }

    #[async_trait]
    impl PageDriver for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn goto(&mut self, url: &Url) -> Result<(), DriverError> {
            if self.fail_goto {
                return Err(DriverError::Navigation {
                    url: url.to_string(),
                    reason: "net::ERR_FILE_NOT_FOUND".to_owned(),
                });
            }
            if self.stall_goto {
                return Err(DriverError::Timeout {
                    url: url.to_string(),
                    phase: "network idle",
                    after_ms: 30_000,
                });
            }
            Ok(())
        }

        async fn title(&mut self) -> Result<String, DriverError> {
            Ok("万媒师".to_owned())
        }

        async fn count(&mut self, selector: &str) -> Result<usize, DriverError> {
            Ok(usize::from(self.has(selector)))
        }

        async fn click_first(&mut self, selector: &str) -> Result<bool, DriverError> {
            if !self.has(selector) {
                return Ok(false);
            }
            self.clicks.push(selector.to_owned());
            Ok(true)
        }

        async fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), DriverError> {
            self.viewports.push((width, height));
            Ok(())
        }

        async fn wait(&mut self, _ms: u64) {}

        async fn console_messages(&mut self) -> Vec<ConsoleMessage> {
            vec![ConsoleMessage::new(ConsoleLevel::Warning, "slow image")]
        }

        async fn page_errors(&mut self) -> Vec<String> {
            Vec::new()
        }

        async fn close(&mut self) -> Result<(), DriverError> {
            self.closed = true;
            Ok(())
        }
    }

    fn options() -> SmokeOptions {
        SmokeOptions::new(Url::parse("file:///site/index.html").unwrap())
    }

    #[tokio::test]
    async fn missing_section_is_reported_and_flow_completes() {
        let mut driver = Scripted {
            present: CHECKS
                .iter()
                .map(|c| c.selector)
                .filter(|s| *s != "#pricing")
                .chain([checks::DOWNLOAD_BUTTONS, checks::NAV_TOGGLE])
                .collect(),
            ..Scripted::default()
        };
        let report = run_smoke(&mut driver, &options()).await;

        assert_eq!(report.checks.len(), 9);
        let missing = report.missing();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].name, "定价方案");
        assert!(!report.check("#pricing").unwrap().found);
        assert!(report.check("#download").unwrap().found);
        assert_eq!(driver.clicks, vec![checks::DOWNLOAD_BUTTONS, checks::NAV_TOGGLE]);
        assert_eq!(driver.viewports, vec![(375, 667), (1920, 1080)]);
        assert_eq!(report.console_warnings.len(), 1);
        assert!(report.flow_error.is_none());
        assert!(driver.closed);
    }

    #[tokio::test]
    async fn load_failure_still_closes_driver() {
        let mut driver = Scripted {
            fail_goto: true,
            ..Scripted::default()
        };
        let report = run_smoke(&mut driver, &options()).await;
        assert!(report.flow_error.is_some());
        assert!(report.checks.is_empty());
        assert!(driver.closed);
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn load_timeout_is_a_flow_error_and_driver_closes() {
        let mut driver = Scripted {
            stall_goto: true,
            ..Scripted::default()
        };
        let report = run_smoke(&mut driver, &options()).await;
        let flow_error = report.flow_error.as_deref().unwrap();
        assert!(flow_error.contains("timed out during network idle"), "{flow_error}");
        assert!(report.checks.is_empty());
        assert!(driver.closed);
    }

    #[tokio::test]
    async fn absent_buttons_are_skipped() {
        let mut driver = Scripted::default();
        let report = run_smoke(&mut driver, &options()).await;
        assert!(driver.clicks.is_empty());
        assert!(
            report
                .steps
                .iter()
                .any(|s| matches!(s.outcome, StepOutcome::Skipped(_)))
        );
    }

    #[test]
    fn step_wait_is_half_the_settle_time() {
        assert_eq!(options().step_ms(), 500);
    }
}
