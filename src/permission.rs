//! Notification permission negotiation.
//!
//! Runs once at launch: reads the current OS permission and, only when it is
//! not already granted, issues a single combined request for alert, sound and
//! badge. A denied or undetermined result is a normal terminal state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// OS notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// The user has not been asked yet (or the answer is unknown).
    #[default]
    Undetermined,
    /// Notifications are allowed.
    Granted,
    /// Notifications are blocked.
    Denied,
}

impl PermissionState {
    /// Collapsed view used for gating: granted vs. not granted.
    #[must_use]
    pub fn is_granted(self) -> bool {
        self == Self::Granted
    }
}

impl std::fmt::Display for PermissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Undetermined => write!(f, "undetermined"),
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

impl std::str::FromStr for PermissionState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "undetermined" => Ok(Self::Undetermined),
            "granted" => Ok(Self::Granted),
            "denied" => Ok(Self::Denied),
            other => anyhow::bail!("unknown permission state: {other}"),
        }
    }
}

/// A notification capability that can be requested from the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationCapability {
    /// On-screen alerts.
    Alert,
    /// Notification sounds.
    Sound,
    /// App icon badge.
    Badge,
}

/// Capabilities requested in the single launch-time prompt.
pub const REQUESTED_CAPABILITIES: [NotificationCapability; 3] = [
    NotificationCapability::Alert,
    NotificationCapability::Sound,
    NotificationCapability::Badge,
];

/// OS permission service.
///
/// `request` may suspend for as long as the OS dialog is on screen.
#[async_trait]
pub trait NotificationPermissions: Send + Sync {
    /// Read the current permission without prompting.
    async fn check(&self) -> anyhow::Result<PermissionState>;

    /// Prompt the user for the given capabilities and return the result.
    async fn request(
        &self,
        capabilities: &[NotificationCapability],
    ) -> anyhow::Result<PermissionState>;
}

/// "Notifications usable" flag shared with the registration flow.
///
/// Unresolved until negotiation finishes. Readers that need the answer wait
/// for it with [`Self::resolved`] instead of reading a premature `false`.
#[derive(Debug, Clone)]
pub struct NotificationsUsable(Arc<watch::Sender<Option<PermissionState>>>);

impl Default for NotificationsUsable {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self(Arc::new(tx))
    }
}

impl NotificationsUsable {
    /// Record the negotiated permission and wake every waiter.
    pub fn record(&self, state: PermissionState) {
        self.0.send_replace(Some(state));
    }

    /// Whether negotiation has resolved yet.
    pub fn is_resolved(&self) -> bool {
        self.0.borrow().is_some()
    }

    /// Whether notifications were granted, as far as is known right now.
    pub fn get(&self) -> bool {
        self.0.borrow().is_some_and(PermissionState::is_granted)
    }

    /// Wait for negotiation to resolve, then report whether it granted.
    pub async fn resolved(&self) -> bool {
        let mut rx = self.0.subscribe();
        let granted = match rx.wait_for(Option::is_some).await {
            Ok(state) => state.is_some_and(PermissionState::is_granted),
            Err(e) => {
                log::warn!("[Permission] Negotiation result channel closed: {e}");
                false
            }
        };
        granted
    }
}

/// Make sure notification permission has been negotiated.
///
/// Never prompts when permission is already granted and never retries.
/// Collaborator failures are logged and collapse to `Undetermined`.
pub async fn ensure_notification_permission(
    permissions: &dyn NotificationPermissions,
) -> PermissionState {
    let existing = match permissions.check().await {
        Ok(state) => state,
        Err(e) => {
            log::warn!("[Permission] Failed to read notification permission: {e:#}");
            PermissionState::Undetermined
        }
    };

    if existing.is_granted() {
        log::debug!("[Permission] Notifications already granted");
        return existing;
    }

    let state = match permissions.request(&REQUESTED_CAPABILITIES).await {
        Ok(state) => state,
        Err(e) => {
            log::warn!("[Permission] Notification permission request failed: {e:#}");
            PermissionState::Undetermined
        }
    };

    log::info!("[Permission] Notification permission: {existing} -> {state}");
    state
}
