//! Headless Chromium driver over the DevTools protocol.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    self, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::js_protocol::runtime::{
    self, ConsoleApiCalledType, EventConsoleApiCalled, EventExceptionThrown, RemoteObject,
};
use futures_util::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout_at};
use tracing::{debug, info, warn};
use url::Url;

use crate::DriverError;
use crate::checks::DESKTOP_VIEWPORT;
use crate::driver::{ConsoleLevel, ConsoleMessage, PageDriver};

/// Default budget for loading a page until the network is idle.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// How long the network must stay quiet before a page counts as loaded.
const NETWORK_QUIET: Duration = Duration::from_millis(500);
const IDLE_POLL: Duration = Duration::from_millis(50);

/// How to start the browser.
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    /// Browser executable; auto-detected when `None`.
    pub executable: Option<PathBuf>,
    /// Budget for navigation plus the network-idle wait.
    pub load_timeout: Duration,
}

impl Default for ChromeOptions {
    fn default() -> Self {
        Self {
            executable: None,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }
}

pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    listeners: Vec<JoinHandle<()>>,
    console: Arc<Mutex<Vec<ConsoleMessage>>>,
    errors: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    load_timeout: Duration,
    closed: bool,
}

impl std::fmt::Debug for ChromeDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChromeDriver")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

fn protocol(e: impl std::fmt::Display) -> DriverError {
    DriverError::Protocol {
        reason: e.to_string(),
    }
}

impl ChromeDriver {
    /// Launch a headless browser and open a blank page with console and
    /// exception listeners attached.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Launch`] if the browser cannot be started and
    /// [`DriverError::Protocol`] if the page cannot be prepared.
    pub async fn launch(options: &ChromeOptions) -> Result<Self, DriverError> {
        let (width, height) = DESKTOP_VIEWPORT;
        let mut builder = BrowserConfig::builder()
            .new_headless_mode()
            .window_size(width, height)
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        if let Some(path) = &options.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|reason| DriverError::Launch { reason })?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::Launch {
                reason: e.to_string(),
            })?;
        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });
        info!("headless browser launched");

        let page = browser.new_page("about:blank").await.map_err(protocol)?;
        page.execute(runtime::EnableParams::default())
            .await
            .map_err(protocol)?;
        page.execute(network::EnableParams::default())
            .await
            .map_err(protocol)?;

        let console = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let mut listeners = track_network(&page, &in_flight).await?;

        let mut console_events = page
            .event_listener::<EventConsoleApiCalled>()
            .await
            .map_err(protocol)?;
        let sink = Arc::clone(&console);
        listeners.push(tokio::spawn(async move {
            while let Some(event) = console_events.next().await {
                let message = console_message(&event);
                debug!(level = ?message.level, text = %message.text, "page console");
                sink.lock().await.push(message);
            }
        }));

        let mut exceptions = page
            .event_listener::<EventExceptionThrown>()
            .await
            .map_err(protocol)?;
        let sink = Arc::clone(&errors);
        listeners.push(tokio::spawn(async move {
            while let Some(event) = exceptions.next().await {
                let text = page_error_text(&event);
                warn!(error = %text, "uncaught page error");
                sink.lock().await.push(text);
            }
        }));

        Ok(Self {
            browser,
            page,
            handler,
            listeners,
            console,
            errors,
            in_flight,
            load_timeout: options.load_timeout,
            closed: false,
        })
    }

    /// Poll the in-flight counter until the network has been quiet for
    /// [`NETWORK_QUIET`] or `deadline` passes. Returns `false` on timeout.
    async fn wait_for_network_idle(&self, deadline: Instant) -> bool {
        let mut window = IdleWindow::new(NETWORK_QUIET);
        loop {
            let now = Instant::now();
            if now > deadline {
                return false;
            }
            if window.observe(self.in_flight.load(Ordering::Relaxed), now) {
                return true;
            }
            sleep(IDLE_POLL).await;
        }
    }
}

/// Count requests in flight from `Network.requestWillBeSent` until the
/// matching `loadingFinished` or `loadingFailed`.
async fn track_network(
    page: &Page,
    in_flight: &Arc<AtomicUsize>,
) -> Result<Vec<JoinHandle<()>>, DriverError> {
    let mut will_be_sent = page
        .event_listener::<EventRequestWillBeSent>()
        .await
        .map_err(protocol)?;
    let mut finished = page
        .event_listener::<EventLoadingFinished>()
        .await
        .map_err(protocol)?;
    let mut failed = page
        .event_listener::<EventLoadingFailed>()
        .await
        .map_err(protocol)?;

    let started = Arc::clone(in_flight);
    let done = Arc::clone(in_flight);
    let aborted = Arc::clone(in_flight);
    Ok(vec![
        tokio::spawn(async move {
            while will_be_sent.next().await.is_some() {
                started.fetch_add(1, Ordering::Relaxed);
            }
        }),
        tokio::spawn(async move {
            while finished.next().await.is_some() {
                settle_one(&done);
            }
        }),
        tokio::spawn(async move {
            while failed.next().await.is_some() {
                settle_one(&aborted);
            }
        }),
    ])
}

/// Requests sent before tracking started can finish afterwards; never wrap.
fn settle_one(in_flight: &AtomicUsize) {
    let _ = in_flight.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_sub(1)));
}

/// Quiet-period detector for the network-idle wait.
#[derive(Debug)]
struct IdleWindow {
    quiet: Duration,
    idle_since: Option<Instant>,
}

impl IdleWindow {
    fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            idle_since: None,
        }
    }

    /// Record a sample of the in-flight count at `now`. True once the count
    /// has stayed at zero for the whole quiet period.
    fn observe(&mut self, in_flight: usize, now: Instant) -> bool {
        if in_flight > 0 {
            self.idle_since = None;
            return false;
        }
        let since = *self.idle_since.get_or_insert(now);
        now.duration_since(since) >= self.quiet
    }
}

fn console_message(event: &EventConsoleApiCalled) -> ConsoleMessage {
    ConsoleMessage::new(console_level(&event.r#type), console_text(&event.args))
}

/// The thrown value's description, else the exception summary.
fn page_error_text(event: &EventExceptionThrown) -> String {
    let details = &event.exception_details;
    details
        .exception
        .as_ref()
        .and_then(|e| e.description.clone())
        .unwrap_or_else(|| details.text.clone())
}

fn console_level(kind: &ConsoleApiCalledType) -> ConsoleLevel {
    match kind {
        ConsoleApiCalledType::Error | ConsoleApiCalledType::Assert => ConsoleLevel::Error,
        ConsoleApiCalledType::Warning => ConsoleLevel::Warning,
        ConsoleApiCalledType::Info => ConsoleLevel::Info,
        ConsoleApiCalledType::Debug => ConsoleLevel::Debug,
        _ => ConsoleLevel::Log,
    }
}

/// Join console arguments the way the browser console prints them.
fn console_text(args: &[RemoteObject]) -> String {
    args.iter()
        .map(|arg| match (&arg.value, &arg.description) {
            (Some(serde_json::Value::String(s)), _) => s.clone(),
            (Some(value), _) => value.to_string(),
            (None, Some(description)) => description.clone(),
            (None, None) => String::new(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl PageDriver for ChromeDriver {
    fn name(&self) -> &'static str {
        "chrome"
    }

    async fn goto(&mut self, url: &Url) -> Result<(), DriverError> {
        let timed_out = |phase: &'static str| DriverError::Timeout {
            url: url.to_string(),
            phase,
            after_ms: u64::try_from(self.load_timeout.as_millis()).unwrap_or(u64::MAX),
        };
        let deadline = Instant::now() + self.load_timeout;

        match timeout_at(deadline, self.page.goto(url.as_str())).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(DriverError::Navigation {
                    url: url.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => return Err(timed_out("navigation")),
        }
        if !self.wait_for_network_idle(deadline).await {
            return Err(timed_out("network idle"));
        }
        debug!(%url, "page loaded and network idle");
        Ok(())
    }

    async fn title(&mut self) -> Result<String, DriverError> {
        let title = self.page.get_title().await.map_err(protocol)?;
        Ok(title.unwrap_or_default())
    }

    async fn count(&mut self, selector: &str) -> Result<usize, DriverError> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| DriverError::Query {
                selector: selector.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(elements.len())
    }

    async fn click_first(&mut self, selector: &str) -> Result<bool, DriverError> {
        let click_err = |e: chromiumoxide::error::CdpError| DriverError::Click {
            selector: selector.to_owned(),
            reason: e.to_string(),
        };
        let elements = self.page.find_elements(selector).await.map_err(click_err)?;
        let Some(element) = elements.into_iter().next() else {
            return Ok(false);
        };
        element.click().await.map_err(click_err)?;
        Ok(true)
    }

    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), DriverError> {
        let params = SetDeviceMetricsOverrideParams::new(i64::from(width), i64::from(height), 1.0, false);
        self.page
            .execute(params)
            .await
            .map_err(|e| DriverError::Viewport {
                width,
                height,
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn console_messages(&mut self) -> Vec<ConsoleMessage> {
        self.console.lock().await.clone()
    }

    async fn page_errors(&mut self) -> Vec<String> {
        self.errors.lock().await.clone()
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        for listener in self.listeners.drain(..) {
            listener.abort();
        }
        let closed = self.browser.close().await.map_err(|e| DriverError::Close {
            reason: e.to_string(),
        });
        if let Err(e) = self.browser.wait().await {
            warn!(error = %e, "browser process did not exit cleanly");
        }
        self.handler.abort();
        info!("headless browser closed");
        closed.map(|_| ())
    }
}
