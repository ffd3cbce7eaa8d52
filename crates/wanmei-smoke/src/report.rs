//! Smoke test results.

use std::fmt;

use serde::Serialize;

use crate::checks::Check;
use crate::driver::{ConsoleLevel, ConsoleMessage};

/// Result of one selector check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub selector: &'static str,
    pub name: &'static str,
    pub found: bool,
    /// Set when the query itself failed; `found` is then `false`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckResult {
    #[must_use]
    pub fn found(check: Check, found: bool) -> Self {
        Self {
            selector: check.selector,
            name: check.name,
            found,
            error: None,
        }
    }

    #[must_use]
    pub fn failed(check: Check, error: String) -> Self {
        Self {
            selector: check.selector,
            name: check.name,
            found: false,
            error: Some(error),
        }
    }
}

/// Outcome of one interaction step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "lowercase")]
pub enum StepOutcome {
    Done,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub name: String,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Everything one smoke run observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SmokeReport {
    pub driver: String,
    pub url: String,
    pub title: Option<String>,
    pub checks: Vec<CheckResult>,
    pub nav_links: Option<usize>,
    pub download_buttons: Option<usize>,
    pub steps: Vec<StepResult>,
    pub console_errors: Vec<String>,
    pub console_warnings: Vec<String>,
    pub page_errors: Vec<String>,
    /// Error that aborted the flow, if any.
    pub flow_error: Option<String>,
    /// Error from shutting the driver down, if any.
    pub close_error: Option<String>,
}

impl SmokeReport {
    #[must_use]
    pub fn new(driver: &str, url: &str) -> Self {
        Self {
            driver: driver.to_owned(),
            url: url.to_owned(),
            ..Self::default()
        }
    }

    pub fn step(&mut self, name: &str, outcome: StepOutcome) {
        self.steps.push(StepResult {
            name: name.to_owned(),
            outcome,
        });
    }

    /// Sort console messages into errors and warnings; other levels are dropped.
    pub fn record_console(&mut self, messages: Vec<ConsoleMessage>) {
        for message in messages {
            match message.level {
                ConsoleLevel::Error => self.console_errors.push(message.text),
                ConsoleLevel::Warning => self.console_warnings.push(message.text),
                ConsoleLevel::Debug | ConsoleLevel::Log | ConsoleLevel::Info => {}
            }
        }
    }

    #[must_use]
    pub fn check(&self, selector: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.selector == selector)
    }

    #[must_use]
    pub fn missing(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.found).collect()
    }

    /// A console error shows the browser refused a script because the page
    /// was opened from `file://`. Module scripts and wasm need an HTTP origin.
    #[must_use]
    pub fn file_scripts_blocked(&self) -> bool {
        self.url.starts_with("file://")
            && self
                .console_errors
                .iter()
                .any(|e| e.contains("origin 'null'") || e.contains("CORS"))
    }

    /// No failed check, failed step, flow error, console error or page error.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.flow_error.is_none()
            && self.missing().is_empty()
            && !self
                .steps
                .iter()
                .any(|s| matches!(s.outcome, StepOutcome::Failed(_)))
            && self.console_errors.is_empty()
            && self.page_errors.is_empty()
    }
}

impl fmt::Display for SmokeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "page: {} (driver: {})", self.url, self.driver)?;
        if let Some(title) = &self.title {
            writeln!(f, "title: {title}")?;
        }

        if !self.checks.is_empty() {
            writeln!(f, "\nchecks:")?;
        }
        for check in &self.checks {
            match (&check.error, check.found) {
                (Some(e), _) => writeln!(f, "  ✗ {} check failed: {e}", check.name)?,
                (None, true) => writeln!(f, "  ✓ {} found", check.name)?,
                (None, false) => writeln!(f, "  ✗ {} not found", check.name)?,
            }
        }

        if let Some(n) = self.nav_links {
            writeln!(f, "\nnav links: {n}")?;
        }
        if let Some(n) = self.download_buttons {
            writeln!(f, "download buttons: {n}")?;
        }

        if !self.steps.is_empty() {
            writeln!(f, "\nsteps:")?;
        }
        for step in &self.steps {
            match &step.outcome {
                StepOutcome::Done => writeln!(f, "  ✓ {}", step.name)?,
                StepOutcome::Skipped(why) => writeln!(f, "  - {} (skipped: {why})", step.name)?,
                StepOutcome::Failed(e) => writeln!(f, "  ✗ {}: {e}", step.name)?,
            }
        }

        writeln!(f)?;
        if self.console_errors.is_empty() {
            writeln!(f, "✓ no console errors")?;
        } else {
            writeln!(f, "console errors:")?;
            for e in &self.console_errors {
                writeln!(f, "  - {e}")?;
            }
            if self.file_scripts_blocked() {
                writeln!(
                    f,
                    "  note: expected for file:// pages; serve the directory over HTTP to run the page script"
                )?;
            }
        }
        if !self.console_warnings.is_empty() {
            writeln!(f, "console warnings: {}", self.console_warnings.len())?;
        }
        if self.page_errors.is_empty() {
            writeln!(f, "✓ no page errors")?;
        } else {
            writeln!(f, "page errors:")?;
            for e in &self.page_errors {
                writeln!(f, "  - {e}")?;
            }
        }

        if let Some(e) = &self.flow_error {
            writeln!(f, "\n✗ smoke flow aborted: {e}")?;
        }
        if let Some(e) = &self.close_error {
            writeln!(f, "✗ {e}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CHECKS;

    #[test]
    fn missing_check_is_reported_by_name() {
        let mut report = SmokeReport::new("static", "file:///site/index.html");
        report.checks.push(CheckResult::found(CHECKS[0], true));
        report.checks.push(CheckResult::found(CHECKS[4], false));

        let text = report.to_string();
        assert!(text.contains("✓ 导航栏 found"));
        assert!(text.contains("✗ 定价方案 not found"));
        assert!(!report.is_clean());
    }

    #[test]
    fn console_levels_are_sorted() {
        let mut report = SmokeReport::new("chrome", "file:///x");
        report.record_console(vec![
            ConsoleMessage::new(ConsoleLevel::Log, "hello"),
            ConsoleMessage::new(ConsoleLevel::Warning, "deprecated"),
            ConsoleMessage::new(ConsoleLevel::Error, "boom"),
        ]);
        assert_eq!(report.console_errors, vec!["boom".to_owned()]);
        assert_eq!(report.console_warnings, vec!["deprecated".to_owned()]);
        assert!(!report.is_clean());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn json_shape_is_stable() {
        let mut report = SmokeReport::new("static", "file:///x");
        report.checks.push(CheckResult::found(CHECKS[3], true));
        report.step("toggle mobile menu", StepOutcome::Skipped("no .nav-toggle".to_owned()));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["driver"], "static");
        assert_eq!(json["checks"][0]["selector"], "#download");
        assert_eq!(json["checks"][0]["name"], "下载专区");
        assert!(json["checks"][0].get("error").is_none());
        assert_eq!(json["steps"][0]["outcome"], "skipped");
        assert_eq!(json["steps"][0]["detail"], "no .nav-toggle");
    }

    #[test]
    fn blocked_module_script_under_file_url_is_explained() {
        let blocked = "Access to script at 'file:///site/assets/js/wanmei_web.js' from origin 'null' \
                       has been blocked by CORS policy";
        let mut report = SmokeReport::new("chrome", "file:///site/index.html");
        report.console_errors.push(blocked.to_owned());
        assert!(report.file_scripts_blocked());
        assert!(report.to_string().contains("note: expected for file:// pages"));
        assert!(!report.is_clean());

        let mut served = SmokeReport::new("chrome", "http://localhost:8000/");
        served.console_errors.push(blocked.to_owned());
        assert!(!served.file_scripts_blocked());
        assert!(!served.to_string().contains("note:"));
    }

    #[test]
    fn skipped_steps_keep_report_clean() {
        let mut report = SmokeReport::new("static", "file:///x");
        report.step("toggle mobile menu", StepOutcome::Skipped("no .nav-toggle".to_owned()));
        assert!(report.is_clean());
        report.step("click", StepOutcome::Failed("detached".to_owned()));
        assert!(!report.is_clean());
    }
}
