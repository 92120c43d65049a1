//! Push device registration flow.
//!
//! Triggered by an `auth` bridge message. Steps run strictly in order and
//! stop at the first failed precondition:
//!
//! 1. The user must be signed in (with a non-empty access token) and the
//!    content must name a backend.
//! 2. The device must be live and notifications usable; otherwise the push
//!    service is never contacted. On a live device the flow waits for
//!    permission negotiation to resolve before deciding.
//! 3. A push token is fetched from the platform push service.
//! 4. `(deviceId, pushToken, accessToken)` is composed.
//! 5. One `addDevice` call goes to the backend at `apiHost`.
//! 6. A backend-reported error is shown to the user verbatim.
//!
//! There is no retry and no de-duplication: overlapping `auth` messages run
//! independent flows.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::alert::{Alert, AlertPresenter};
use crate::api::{ApiClient, ApiRequest};
use crate::bridge::AuthProps;
use crate::device::DeviceIdentity;
use crate::permission::NotificationsUsable;
use crate::push::{token_prefix, TokenProvisioner};

/// What a single registration flow ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The backend accepted the registration.
    Registered,
    /// Not signed in, no access token, or no backend address.
    SkippedNotSigned,
    /// No usable push token; the backend was not contacted.
    SkippedNoToken,
    /// The backend call failed; carries the raw reason.
    Failed(String),
}

/// Registration payload sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistration {
    /// Platform-stable device identifier.
    pub device_id: String,
    /// Push token from the platform notification service.
    pub push_token: String,
    /// Bearer credential of the signed-in user.
    pub access_token: String,
}

/// Runs registration flows against the collaborators it was built with.
pub struct DeviceRegistrar {
    device: Arc<dyn DeviceIdentity>,
    tokens: TokenProvisioner,
    api: Arc<dyn ApiClient>,
    alerts: Arc<dyn AlertPresenter>,
    notifications: NotificationsUsable,
}

impl std::fmt::Debug for DeviceRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceRegistrar")
            .field("tokens", &self.tokens)
            .field("notifications", &self.notifications)
            .finish_non_exhaustive()
    }
}

impl DeviceRegistrar {
    /// Build a registrar.
    pub fn new(
        device: Arc<dyn DeviceIdentity>,
        tokens: TokenProvisioner,
        api: Arc<dyn ApiClient>,
        alerts: Arc<dyn AlertPresenter>,
        notifications: NotificationsUsable,
    ) -> Self {
        Self {
            device,
            tokens,
            api,
            alerts,
            notifications,
        }
    }

    /// Run one registration flow.
    pub async fn register_device(
        &self,
        auth_props: Option<&AuthProps>,
        api_host: Option<&str>,
    ) -> RegistrationOutcome {
        let Some(props) = auth_props.filter(|props| props.is_signed) else {
            log::debug!("[Registration] Not signed in, skipping");
            return RegistrationOutcome::SkippedNotSigned;
        };
        let Some(access_token) = props.access_token() else {
            log::debug!("[Registration] Signed in without an access token, skipping");
            return RegistrationOutcome::SkippedNotSigned;
        };
        let Some(api_host) = api_host.filter(|host| !host.is_empty()) else {
            log::debug!("[Registration] No apiHost supplied, skipping");
            return RegistrationOutcome::SkippedNotSigned;
        };

        let notifications_usable = if self.device.is_live_device() {
            if !self.notifications.is_resolved() {
                log::debug!("[Registration] Waiting for notification permission");
            }
            self.notifications.resolved().await
        } else {
            false
        };

        let Some(push_token) = self
            .tokens
            .provision(self.device.as_ref(), notifications_usable)
            .await
        else {
            self.alerts.present(&Alert::PushTokenUnavailable);
            return RegistrationOutcome::SkippedNoToken;
        };

        let registration = DeviceRegistration {
            device_id: self.device.unique_id(),
            push_token,
            access_token: access_token.to_string(),
        };
        log::info!(
            "[Registration] Registering device {} (token {}...) with {}",
            registration.device_id,
            token_prefix(&registration.push_token),
            api_host
        );

        let reason = match self
            .api
            .call(api_host, &ApiRequest::AddDevice(registration))
            .await
        {
            Ok(response) => match response.err() {
                None => {
                    log::info!("[Registration] Device registered");
                    return RegistrationOutcome::Registered;
                }
                Some(err) => err,
            },
            Err(e) => e.to_string(),
        };

        log::warn!("[Registration] Device registration failed: {reason}");
        self.alerts.present(&Alert::RegistrationFailed {
            reason: reason.clone(),
        });
        RegistrationOutcome::Failed(reason)
    }
}
