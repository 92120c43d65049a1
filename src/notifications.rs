//! Incoming push notification handling.
//!
//! While the app is in the foreground, notifications are shown with an alert
//! and a sound and leave the badge alone. Tapping a `notice` notification
//! opens the URL it carries; every other payload is ignored.

use serde::Deserialize;

/// How a notification is presented while the app is in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForegroundPresentation {
    /// Show the alert banner.
    pub show_alert: bool,
    /// Play the notification sound.
    pub play_sound: bool,
    /// Update the app icon badge.
    pub set_badge: bool,
}

/// Policy installed at launch.
pub const FOREGROUND_PRESENTATION: ForegroundPresentation = ForegroundPresentation {
    show_alert: true,
    play_sound: true,
    set_badge: false,
};

/// Platform notification center.
pub trait NotificationCenter: Send + Sync {
    /// Install the foreground presentation policy.
    fn set_foreground_presentation(&self, presentation: ForegroundPresentation);
}

/// Opens URLs with the system handler.
pub trait UrlOpener: Send + Sync {
    /// Open `url` outside the embedded surface.
    fn open_url(&self, url: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Deserialize)]
struct NotificationData {
    body: NotificationBody,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum NotificationBody {
    #[serde(rename = "notice")]
    Notice { url: String },
    #[serde(other)]
    Other,
}

/// Handle a tap on a notification whose content data is `data`.
///
/// Returns the URL that was opened, if any. Malformed payloads are ignored.
pub fn handle_notification_tap(data: &serde_json::Value, opener: &dyn UrlOpener) -> Option<String> {
    let parsed = match NotificationData::deserialize(data) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("[Notifications] Ignoring notification payload: {e}");
            return None;
        }
    };

    let NotificationBody::Notice { url } = parsed.body else {
        return None;
    };

    match opener.open_url(&url) {
        Ok(()) => {
            log::info!("[Notifications] Opened notice {url}");
            Some(url)
        }
        Err(e) => {
            log::warn!("[Notifications] Failed to open {url}: {e:#}");
            None
        }
    }
}
