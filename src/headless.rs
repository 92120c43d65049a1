//! Headless host.
//!
//! Runs the shell without a native UI: platform services are backed by the
//! configuration and by logging, and host events arrive as newline-delimited
//! JSON on an input stream:
//!
//! ```text
//! {"type":"message","data":"{\"key\":\"goBack\"}"}
//! {"type":"navigated","url":"https://eodiro.com/"}
//! {"type":"theme","dark":true}
//! {"type":"keyboard","visible":true}
//! {"type":"nav_scrolled","scrolled":false}
//! {"type":"notification_tapped","data":{"body":{"type":"notice","url":"..."}}}
//! ```
//!
//! Useful for exercising a web build against a real backend from a terminal.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;

use crate::alert::{Alert, AlertPresenter};
use crate::api::HttpApiClient;
use crate::bridge::RouteOutcome;
use crate::chrome::{KeyboardEvent, StatusBar, StatusBarStyle, Theme};
use crate::config::Config;
use crate::device::HostDevice;
use crate::navigation::WebSurface;
use crate::notifications::{ForegroundPresentation, NotificationCenter, UrlOpener};
use crate::permission::{NotificationCapability, NotificationPermissions, PermissionState};
use crate::push::PushTokenService;
use crate::shell::{Collaborators, Shell};

/// One host event read from the input stream.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// The content posted a bridge message.
    Message {
        /// Raw payload, exactly as posted.
        data: String,
    },
    /// The surface navigated.
    Navigated {
        /// New URL.
        url: String,
    },
    /// The system theme changed.
    Theme {
        /// Dark appearance.
        dark: bool,
    },
    /// The keyboard appeared or hid.
    Keyboard {
        /// Keyboard now visible.
        visible: bool,
    },
    /// The content's navigation bar scrolled.
    NavScrolled {
        /// Scrolled away from the top.
        scrolled: bool,
    },
    /// The user tapped a notification.
    NotificationTapped {
        /// Notification content data.
        data: serde_json::Value,
    },
}

/// Navigations the headless surface performed on its own (back navigation).
pub type SurfaceNavigations = mpsc::UnboundedReceiver<String>;

/// Surface that only keeps a history stack.
///
/// Loads and reported navigations push onto the stack; going back pops it
/// and reports the page it landed on through [`SurfaceNavigations`].
#[derive(Debug)]
pub struct HeadlessSurface {
    history: Mutex<Vec<String>>,
    navigations: mpsc::UnboundedSender<String>,
}

impl HeadlessSurface {
    /// Empty surface and the stream of navigations it performs.
    pub fn new() -> (Self, SurfaceNavigations) {
        let (navigations, rx) = mpsc::unbounded_channel();
        let surface = Self {
            history: Mutex::new(Vec::new()),
            navigations,
        };
        (surface, rx)
    }

    /// Most recent history entry.
    pub fn current(&self) -> Option<String> {
        self.history.lock().ok()?.last().cloned()
    }
}

impl WebSurface for HeadlessSurface {
    fn load(&self, uri: &str) {
        if let Ok(mut history) = self.history.lock() {
            history.push(uri.to_string());
        }
    }

    fn go_back(&self) {
        let Ok(mut history) = self.history.lock() else {
            return;
        };
        if history.len() < 2 {
            log::debug!("[Surface] No back history");
            return;
        }
        history.pop();
        if let Some(url) = history.last() {
            log::info!("[Surface] Back to {url}");
            // The receiver lives as long as the event loop.
            let _ = self.navigations.send(url.clone());
        }
    }

    fn visited(&self, url: &str) {
        let Ok(mut history) = self.history.lock() else {
            return;
        };
        if history.last().map(String::as_str) != Some(url) {
            history.push(url.to_string());
        }
    }
}

/// Permission service answering from configuration.
#[derive(Debug)]
pub struct ConfiguredPermissions {
    state: Mutex<PermissionState>,
    grant_on_request: bool,
    prompts: AtomicUsize,
}

impl ConfiguredPermissions {
    /// Service starting at `state`; prompts grant when `grant_on_request`.
    pub fn new(state: PermissionState, grant_on_request: bool) -> Self {
        Self {
            state: Mutex::new(state),
            grant_on_request,
            prompts: AtomicUsize::new(0),
        }
    }

    /// How many times the user was prompted.
    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationPermissions for ConfiguredPermissions {
    async fn check(&self) -> Result<PermissionState> {
        self.state
            .lock()
            .map(|state| *state)
            .map_err(|e| anyhow::anyhow!("permission state poisoned: {e}"))
    }

    async fn request(&self, capabilities: &[NotificationCapability]) -> Result<PermissionState> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        let answer = if self.grant_on_request {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        log::info!("[Permission] Prompted for {capabilities:?}: {answer}");
        let mut state = self
            .state
            .lock()
            .map_err(|e| anyhow::anyhow!("permission state poisoned: {e}"))?;
        *state = answer;
        Ok(answer)
    }
}

/// Push service issuing the configured token (empty when none).
#[derive(Debug, Clone, Default)]
pub struct ConfiguredPushTokens {
    token: Option<String>,
}

impl ConfiguredPushTokens {
    /// Service issuing `token`.
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl PushTokenService for ConfiguredPushTokens {
    async fn fetch_token(&self, experience_id: &str) -> Result<String> {
        log::debug!("[Push] Issuing configured token for {experience_id}");
        Ok(self.token.clone().unwrap_or_default())
    }
}

/// Alerts written to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleAlerts;

impl AlertPresenter for ConsoleAlerts {
    fn present(&self, alert: &Alert) {
        log::warn!("[Alert] {}: {}", alert.title(), alert.message());
        eprintln!("{}\n  {}", alert.title(), alert.message());
    }
}

/// Status bar that logs style and spacer changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogStatusBar;

impl StatusBar for LogStatusBar {
    fn set_style(&self, style: StatusBarStyle, animated: bool) {
        log::info!("[Chrome] Status bar {style} (animated={animated})");
    }

    fn set_spacer_color(&self, color: &str) {
        log::debug!("[Chrome] Spacer {color}");
    }
}

/// Notification center that logs the installed policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationCenter;

impl NotificationCenter for LogNotificationCenter {
    fn set_foreground_presentation(&self, presentation: ForegroundPresentation) {
        log::info!("[Notifications] Foreground presentation {presentation:?}");
    }
}

/// URL opener that logs instead of launching a browser.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogUrlOpener;

impl UrlOpener for LogUrlOpener {
    fn open_url(&self, url: &str) -> Result<()> {
        log::info!("[Notifications] Open {url}");
        Ok(())
    }
}

/// Headless collaborators for `config`, plus the surface's own navigations
/// to feed into [`run`].
pub fn collaborators(config: &Config) -> Result<(Collaborators, SurfaceNavigations)> {
    let device = match &config.device_id {
        Some(id) => HostDevice::new(id.clone(), !config.simulated),
        None => HostDevice::from_host(!config.simulated),
    };
    let api = HttpApiClient::new(Duration::from_secs(config.request_timeout_secs))
        .context("Failed to build HTTP client")?;
    let (surface, navigations) = HeadlessSurface::new();

    let collaborators = Collaborators {
        surface: Arc::new(surface),
        permissions: Arc::new(ConfiguredPermissions::new(
            config.permission,
            config.grant_on_request,
        )),
        push: Arc::new(ConfiguredPushTokens::new(config.push_token.clone())),
        device: Arc::new(device),
        api: Arc::new(api),
        alerts: Arc::new(ConsoleAlerts),
        status_bar: Arc::new(LogStatusBar),
        notification_center: Arc::new(LogNotificationCenter),
        url_opener: Arc::new(LogUrlOpener),
    };
    Ok((collaborators, navigations))
}

/// Apply one event. Bridge messages are spawned onto `flows`.
pub fn dispatch(shell: &mut Shell, event: HostEvent, flows: &mut JoinSet<RouteOutcome>) {
    match event {
        HostEvent::Message { data } => {
            flows.spawn(shell.message_task(data));
        }
        HostEvent::Navigated { url } => shell.on_navigation(&url),
        HostEvent::Theme { dark } => shell.on_theme_change(Theme::from_dark(dark)),
        HostEvent::Keyboard { visible } => shell.on_keyboard(if visible {
            KeyboardEvent::WillShow
        } else {
            KeyboardEvent::DidHide
        }),
        HostEvent::NavScrolled { scrolled } => shell.on_nav_scrolled(scrolled),
        HostEvent::NotificationTapped { data } => {
            shell.on_notification_tapped(&data);
        }
    }
}

/// Drive `shell` from newline-delimited JSON events until `input` ends.
///
/// Each bridge message outcome is passed to `on_outcome` as soon as its flow
/// finishes. Returns every outcome once all flows finished.
pub async fn run<R, F>(
    shell: &mut Shell,
    input: R,
    mut navigations: SurfaceNavigations,
    mut on_outcome: F,
) -> Result<Vec<RouteOutcome>>
where
    R: AsyncBufRead + Unpin,
    F: FnMut(&RouteOutcome),
{
    let mut lines = input.lines();
    let mut flows = JoinSet::new();
    let mut outcomes = Vec::new();
    let mut finished = |joined: Result<RouteOutcome, JoinError>| match joined {
        Ok(outcome) => {
            log::debug!("Bridge message finished: {outcome:?}");
            on_outcome(&outcome);
            outcomes.push(outcome);
        }
        Err(e) => log::error!("Bridge message task failed: {e}"),
    };

    loop {
        let settle = shell.settle_deadline();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read host event")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<HostEvent>(&line) {
                    Ok(event) => dispatch(shell, event, &mut flows),
                    Err(e) => log::debug!("Skipping malformed host event: {e}"),
                }
            }
            Some(joined) = flows.join_next(), if !flows.is_empty() => finished(joined),
            Some(url) = navigations.recv() => shell.on_navigation(&url),
            () = tokio::time::sleep_until(settle.unwrap_or_else(Instant::now)), if settle.is_some() => {
                shell.settle_theme();
            }
        }
    }

    if shell.settle_deadline().is_some() {
        shell.settle_theme();
    }

    while let Some(joined) = flows.join_next().await {
        finished(joined);
    }
    while let Ok(url) = navigations.try_recv() {
        shell.on_navigation(&url);
    }
    Ok(outcomes)
}
