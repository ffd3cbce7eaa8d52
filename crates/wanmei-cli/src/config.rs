//! CLI configuration from the environment.
//!
//! Only settings that apply to every subcommand live here; per-command
//! options (`WANMEI_ROOT`, `WANMEI_OUT_DIR`, `WANMEI_CHROME`) are read by
//! `clap` alongside their flags.

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Process-wide settings.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is unset (e.g. `info`, `wanmei_stage=debug`).
    pub log_level: String,
    pub log_format: LogFormat,
}

impl CliConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `WANMEI_LOG_LEVEL`: log filter (default: `warn`)
    /// - `WANMEI_LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
    ///
    /// `RUST_LOG`, when set, takes precedence over `WANMEI_LOG_LEVEL`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let log_level = lookup("WANMEI_LOG_LEVEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "warn".to_owned());

        let log_format = match lookup("WANMEI_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Self {
            log_level,
            log_format,
        }
    }

    /// Install the global tracing subscriber. Logs go to stderr so that
    /// stdout carries only command output.
    pub fn init_tracing(&self) {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&self.log_level));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        match self.log_format {
            LogFormat::Json => builder.json().init(),
            LogFormat::Pretty => builder.with_target(false).init(),
        }
    }
}
