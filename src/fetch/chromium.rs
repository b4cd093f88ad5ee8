//! Chromium-backed rendering capability over the DevTools protocol.
//!
//! One [`ChromiumRenderer`] is created at process start and closed at
//! shutdown; each candidate URL gets its own page (browsing context) from
//! it. Pages block image/stylesheet/font/media requests at the
//! network-interception layer, present a desktop user agent, and wait
//! only for the DOM rather than every sub-resource.
//!
//! The renderer either launches a local headless Chromium or connects to
//! an already-running Chrome via its debug endpoint.

use crate::config::PipelineConfig;
use crate::fetch::{Renderer, RenderingSession, SessionError};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::fetch::{
    ContinueRequestParams, EnableParams, EventRequestPaused, FailRequestParams, RequestPattern,
};
use chromiumoxide::cdp::browser_protocol::network::{
    ErrorReason, EventResponseReceived, ResourceType, SetUserAgentOverrideParams,
};
use chromiumoxide::handler::HandlerConfig;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Common Chrome executable locations, checked before falling back to
/// `which`.
const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
];

/// Long-lived handle to a Chromium instance.
///
/// Create once with [`ChromiumRenderer::launch`], mint one session per
/// URL through the [`Renderer`] impl, and release the browser with
/// [`ChromiumRenderer::close`] at shutdown.
pub struct ChromiumRenderer {
    browser: Browser,
    handler_task: JoinHandle<()>,
    user_agent: String,
}

impl ChromiumRenderer {
    /// Launch a local headless Chromium, or connect to the remote debug
    /// endpoint named in the config.
    #[instrument(level = "info", skip_all)]
    pub async fn launch(config: &PipelineConfig) -> Result<Self, SessionError> {
        if let Some(remote_url) = config.remote_browser_url.clone() {
            return Self::connect_remote(&remote_url, config).await;
        }

        let chrome_path = find_chrome()?;
        info!(path = %chrome_path.display(), headless = config.headless, "Launching browser");

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .request_timeout(config.navigation_timeout());

        // with_head means NOT headless, confusingly
        if !config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--disable-background-networking")
            .arg("--disable-sync")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--no-sandbox");

        for arg in &config.chrome_args {
            builder = builder.arg(arg);
        }

        let browser_config = builder
            .build()
            .map_err(|e| SessionError::Browser(format!("invalid browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| SessionError::Browser(format!("failed to launch browser: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Connect to an already-running Chrome through its debug endpoint.
    async fn connect_remote(url: &str, config: &PipelineConfig) -> Result<Self, SessionError> {
        info!(%url, "Connecting to remote browser");

        // The WebSocket URL has to be discovered via /json/version.
        let http_url = url.replace("ws://", "http://").replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let client = reqwest::Client::new();
        let version: serde_json::Value = client
            .get(&version_url)
            .send()
            .await
            .map_err(|e| SessionError::Browser(format!("failed to reach remote browser: {e}")))?
            .json()
            .await
            .map_err(|e| SessionError::Browser(format!("bad version response: {e}")))?;

        let ws_url = version
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                SessionError::Browser("no webSocketDebuggerUrl in version response".to_string())
            })?;

        let handler_config = HandlerConfig {
            request_timeout: config.navigation_timeout(),
            ..Default::default()
        };

        let (browser, mut handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .map_err(|e| SessionError::Browser(format!("failed to connect: {e}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
            user_agent: config.user_agent.clone(),
        })
    }

    /// Shut the browser down and stop its event loop.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "Browser close reported an error");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn launch_session(&self) -> Result<Box<dyn RenderingSession>, SessionError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| SessionError::Browser(format!("failed to open page: {e}")))?;

        // Wrap the page before any further setup so that an error or an
        // abandoned launch future releases it through Drop.
        let session = ChromiumSession { page, closed: false };

        session
            .page
            .set_user_agent(SetUserAgentOverrideParams::new(self.user_agent.clone()))
            .await
            .map_err(|e| SessionError::Browser(format!("failed to set user agent: {e}")))?;

        block_heavy_resources(&session.page).await?;

        Ok(Box::new(session))
    }
}

/// Fail image/stylesheet/font/media requests before they download.
///
/// Uses the CDP Fetch domain: every request pauses, and a background task
/// fails the blocked resource types and continues the rest. The task ends
/// when the page goes away and its event stream closes.
async fn block_heavy_resources(page: &Page) -> Result<(), SessionError> {
    let pattern = RequestPattern::builder().url_pattern("*").build();
    page.execute(EnableParams::builder().patterns(vec![pattern]).build())
        .await
        .map_err(|e| SessionError::Browser(format!("failed to enable interception: {e}")))?;

    let mut paused = page
        .event_listener::<EventRequestPaused>()
        .await
        .map_err(|e| SessionError::Browser(format!("failed to listen for requests: {e}")))?;

    let page = page.clone();
    tokio::spawn(async move {
        while let Some(event) = paused.next().await {
            let blocked = matches!(
                event.resource_type,
                ResourceType::Image
                    | ResourceType::Stylesheet
                    | ResourceType::Font
                    | ResourceType::Media
            );
            let handled = if blocked {
                page.execute(FailRequestParams::new(
                    event.request_id.clone(),
                    ErrorReason::BlockedByClient,
                ))
                .await
                .map(|_| ())
            } else {
                page.execute(ContinueRequestParams::new(event.request_id.clone()))
                    .await
                    .map(|_| ())
            };
            if handled.is_err() {
                break;
            }
        }
    });

    Ok(())
}

/// One Chromium page, exclusive to a single in-flight URL.
///
/// `close` is the normal teardown; if the session is dropped without it
/// (a deadline cutting off session setup, for example), Drop schedules
/// the page closure so the browser target does not outlive the fetch.
struct ChromiumSession {
    page: Page,
    closed: bool,
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        if !self.closed {
            let page = self.page.clone();
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    let _ = page.close().await;
                });
            }
        }
    }
}

#[async_trait]
impl RenderingSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<Option<u16>, SessionError> {
        let mut responses = self
            .page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| SessionError::Browser(format!("failed to listen for responses: {e}")))?;

        self.page
            .goto(url)
            .await
            .map_err(|e| SessionError::Navigation(e.to_string()))?;

        // The main document's response has been observed by now; drain the
        // buffered events briefly to pick up its status.
        let mut status = None;
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_millis(250), responses.next()).await
        {
            if event.r#type == ResourceType::Document {
                status = Some(event.response.status as u16);
            }
        }

        Ok(status)
    }

    async fn wait_for_any(&mut self, selectors: &[&str], timeout: Duration) -> bool {
        let combined = selectors.join(", ");
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.page.find_element(combined.clone()).await.is_ok() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
        false
    }

    async fn content(&mut self) -> Result<String, SessionError> {
        self.page
            .content()
            .await
            .map_err(|e| SessionError::Browser(format!("failed to read page content: {e}")))
    }

    async fn close(&mut self) {
        self.closed = true;
        if let Err(e) = self.page.clone().close().await {
            debug!(error = %e, "Page close reported an error");
        }
    }
}

/// Locate a Chrome/Chromium executable on this host.
fn find_chrome() -> Result<PathBuf, SessionError> {
    for path in CHROME_PATHS {
        let p = std::path::Path::new(path);
        if p.exists() {
            return Ok(p.to_path_buf());
        }
    }

    for cmd in &["google-chrome", "google-chrome-stable", "chromium", "chromium-browser"] {
        if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Ok(PathBuf::from(path));
                }
            }
        }
    }

    Err(SessionError::Browser(
        "Chrome/Chromium not found; install it or set remote_browser_url".to_string(),
    ))
}
