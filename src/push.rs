//! Push token provisioning.
//!
//! Tokens come from the platform notification service, scoped by the
//! build-time experience identifier. Simulated devices never contact the
//! service.

use async_trait::async_trait;
use std::sync::Arc;

use crate::device::DeviceIdentity;

/// Platform push-token service.
#[async_trait]
pub trait PushTokenService: Send + Sync {
    /// Fetch the push token for this app. May be empty.
    async fn fetch_token(&self, experience_id: &str) -> anyhow::Result<String>;
}

/// Obtains push tokens under the preconditions the registration flow needs.
pub struct TokenProvisioner {
    service: Arc<dyn PushTokenService>,
    experience_id: String,
}

impl std::fmt::Debug for TokenProvisioner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvisioner")
            .field("experience_id", &self.experience_id)
            .finish_non_exhaustive()
    }
}

impl TokenProvisioner {
    /// Provisioner scoped to `experience_id`.
    pub fn new(service: Arc<dyn PushTokenService>, experience_id: impl Into<String>) -> Self {
        Self {
            service,
            experience_id: experience_id.into(),
        }
    }

    /// Obtain a usable push token, or `None`.
    ///
    /// Returns `None` without contacting the service when the device is not
    /// live or notifications are not usable. Service errors and empty tokens
    /// also yield `None`.
    pub async fn provision(
        &self,
        device: &dyn DeviceIdentity,
        notifications_usable: bool,
    ) -> Option<String> {
        if !device.is_live_device() {
            log::info!("[Push] Not a live device, skipping push token");
            return None;
        }

        if !notifications_usable {
            log::info!("[Push] Notification permission not granted, skipping push token");
            return None;
        }

        match self.service.fetch_token(&self.experience_id).await {
            Ok(token) if !token.is_empty() => {
                log::debug!("[Push] Obtained push token {}...", token_prefix(&token));
                Some(token)
            }
            Ok(_) => {
                log::warn!("[Push] Push service returned an empty token");
                None
            }
            Err(e) => {
                log::warn!("[Push] Failed to fetch push token: {e:#}");
                None
            }
        }
    }
}

/// Short prefix safe to log.
pub(crate) fn token_prefix(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(12)
        .map_or(token.len(), |(i, _)| i);
    &token[..end]
}
