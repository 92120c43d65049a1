//! Application context.
//!
//! [`Shell`] owns the per-process state (current location, chrome style,
//! "notifications usable" flag) and exposes one entry point per host event.
//! It is driven from a single event loop; registration flows are handed out
//! as independent futures so they can interleave with later events.
//!
//! # Launch sequence
//!
//! 1. Load the start URL into the surface.
//! 2. Apply the status bar style for the initial theme.
//! 3. Install the foreground notification policy.
//! 4. Negotiate notification permission in the background; the flag flips
//!    when it resolves.

use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::alert::AlertPresenter;
use crate::api::ApiClient;
use crate::bridge::{BridgeRouter, RouteOutcome};
use crate::chrome::{ChromeSynchronizer, KeyboardEvent, StatusBar, Theme};
use crate::config::Config;
use crate::device::DeviceIdentity;
use crate::navigation::{NavigationLocation, WebSurface};
use crate::notifications::{
    handle_notification_tap, NotificationCenter, UrlOpener, FOREGROUND_PRESENTATION,
};
use crate::permission::{
    ensure_notification_permission, NotificationPermissions, NotificationsUsable, PermissionState,
};
use crate::push::{PushTokenService, TokenProvisioner};
use crate::registration::DeviceRegistrar;

/// Platform services the shell talks to.
pub struct Collaborators {
    /// Embedded browser surface.
    pub surface: Arc<dyn WebSurface>,
    /// OS notification permission service.
    pub permissions: Arc<dyn NotificationPermissions>,
    /// OS push-token service.
    pub push: Arc<dyn PushTokenService>,
    /// Device identity source.
    pub device: Arc<dyn DeviceIdentity>,
    /// Backend API client.
    pub api: Arc<dyn ApiClient>,
    /// User-facing alerts.
    pub alerts: Arc<dyn AlertPresenter>,
    /// Status bar.
    pub status_bar: Arc<dyn StatusBar>,
    /// Notification presentation.
    pub notification_center: Arc<dyn NotificationCenter>,
    /// System URL handler.
    pub url_opener: Arc<dyn UrlOpener>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// The host application context.
pub struct Shell {
    config: Config,
    router: Arc<BridgeRouter>,
    surface: Arc<dyn WebSurface>,
    permissions: Arc<dyn NotificationPermissions>,
    notification_center: Arc<dyn NotificationCenter>,
    url_opener: Arc<dyn UrlOpener>,
    notifications: NotificationsUsable,
    location: NavigationLocation,
    chrome: ChromeSynchronizer,
    settle_at: Option<Instant>,
}

impl std::fmt::Debug for Shell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shell")
            .field("location", &self.location)
            .field("chrome", &self.chrome)
            .field("notifications", &self.notifications)
            .field("settle_at", &self.settle_at)
            .finish_non_exhaustive()
    }
}

impl Shell {
    /// Wire a shell from configuration, platform services and the initial theme.
    pub fn new(config: Config, collaborators: Collaborators, theme: Theme) -> Self {
        let notifications = NotificationsUsable::default();
        let registrar = DeviceRegistrar::new(
            collaborators.device,
            TokenProvisioner::new(collaborators.push, config.experience_id.clone()),
            collaborators.api,
            collaborators.alerts,
            notifications.clone(),
        );
        let router = BridgeRouter::new(Arc::clone(&collaborators.surface), registrar);

        Self {
            location: NavigationLocation::new(config.start_url.clone()),
            chrome: ChromeSynchronizer::new(collaborators.status_bar, theme),
            router: Arc::new(router),
            surface: collaborators.surface,
            permissions: collaborators.permissions,
            notification_center: collaborators.notification_center,
            url_opener: collaborators.url_opener,
            notifications,
            settle_at: None,
            config,
        }
    }

    /// Run the launch sequence. Must be called inside a tokio runtime.
    ///
    /// Returns the background permission negotiation; nothing waits on it.
    pub fn launch(&mut self) -> JoinHandle<PermissionState> {
        log::info!("Loading {}", self.config.start_url);
        self.surface.load(&self.config.start_url);
        self.on_theme_change(self.chrome.theme());
        self.notification_center
            .set_foreground_presentation(FOREGROUND_PRESENTATION);

        let permissions = Arc::clone(&self.permissions);
        let notifications = self.notifications.clone();
        tokio::spawn(async move {
            let state = ensure_notification_permission(permissions.as_ref()).await;
            notifications.record(state);
            state
        })
    }

    /// Handle a bridge payload inline.
    pub async fn handle_message(&self, raw: &str) -> RouteOutcome {
        self.router.handle(raw, &self.location).await
    }

    /// Detach handling of a bridge payload from the event loop.
    ///
    /// The location is captured now, when the message arrived.
    pub fn message_task(&self, raw: String) -> impl Future<Output = RouteOutcome> + Send + 'static {
        let router = Arc::clone(&self.router);
        let location = self.location.clone();
        async move { router.handle(&raw, &location).await }
    }

    /// The surface reported a navigation state change.
    pub fn on_navigation(&mut self, url: &str) {
        self.location.update(url);
        self.surface.visited(url);
    }

    /// The system theme changed.
    ///
    /// The style is applied now and again once the settle delay elapses.
    pub fn on_theme_change(&mut self, theme: Theme) {
        self.chrome.on_theme_change(theme);
        self.settle_at = Some(Instant::now() + self.config.theme_settle_delay());
    }

    /// When the pending theme settle is due, if any.
    pub fn settle_deadline(&self) -> Option<Instant> {
        self.settle_at
    }

    /// Reapply the current style after a theme change settled.
    pub fn settle_theme(&mut self) {
        self.settle_at = None;
        self.chrome.reapply();
    }

    /// The keyboard overlay appeared or hid.
    pub fn on_keyboard(&self, event: KeyboardEvent) {
        self.chrome.on_keyboard(event);
    }

    /// The content's navigation bar scrolled or returned to the top.
    pub fn on_nav_scrolled(&mut self, scrolled: bool) {
        self.chrome.set_nav_scrolled(scrolled);
    }

    /// The user tapped a notification carrying `data`.
    pub fn on_notification_tapped(&self, data: &serde_json::Value) -> Option<String> {
        handle_notification_tap(data, self.url_opener.as_ref())
    }

    /// Current content location.
    pub fn location(&self) -> &NavigationLocation {
        &self.location
    }

    /// Chrome state.
    pub fn chrome(&self) -> &ChromeSynchronizer {
        &self.chrome
    }

    /// Whether permission negotiation has resolved to granted so far.
    pub fn notifications_usable(&self) -> bool {
        self.notifications.get()
    }

    /// Effective configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
