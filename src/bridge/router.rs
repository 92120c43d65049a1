//! Dispatches decoded bridge messages to native actions.

use std::sync::Arc;

use super::BridgeMessage;
use crate::navigation::{NavigationLocation, WebSurface};
use crate::registration::{DeviceRegistrar, RegistrationOutcome};

/// What handling one raw payload amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Malformed JSON or schema mismatch; nothing happened.
    Dropped,
    /// Unknown key; nothing happened.
    Unknown(String),
    /// `auth` sent from a non-root page; nothing happened.
    OffRoot,
    /// Back navigation was issued to the surface.
    WentBack,
    /// A registration flow ran.
    Registration(RegistrationOutcome),
}

/// Routes bridge payloads from the embedded content.
///
/// Never fails and never surfaces anything for garbage input: the content is
/// untrusted.
pub struct BridgeRouter {
    surface: Arc<dyn WebSurface>,
    registrar: DeviceRegistrar,
}

impl std::fmt::Debug for BridgeRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeRouter")
            .field("registrar", &self.registrar)
            .finish_non_exhaustive()
    }
}

impl BridgeRouter {
    /// Router issuing navigation to `surface` and registrations to `registrar`.
    pub fn new(surface: Arc<dyn WebSurface>, registrar: DeviceRegistrar) -> Self {
        Self { surface, registrar }
    }

    /// Handle one raw payload received while the content was at `location`.
    pub async fn handle(&self, raw: &str, location: &NavigationLocation) -> RouteOutcome {
        let message = match BridgeMessage::parse(raw) {
            Ok(message) => message,
            Err(e) => {
                log::debug!("[Bridge] Dropping malformed message: {e}");
                return RouteOutcome::Dropped;
            }
        };

        match message {
            BridgeMessage::Auth(request) => {
                if !location.is_root() {
                    log::debug!("[Bridge] Ignoring auth from {}", location.url());
                    return RouteOutcome::OffRoot;
                }
                let outcome = self
                    .registrar
                    .register_device(request.auth_props.as_ref(), request.api_host.as_deref())
                    .await;
                RouteOutcome::Registration(outcome)
            }
            BridgeMessage::GoBack => {
                self.surface.go_back();
                RouteOutcome::WentBack
            }
            BridgeMessage::Unknown(key) => {
                log::debug!("[Bridge] Ignoring unknown message key {key:?}");
                RouteOutcome::Unknown(key)
            }
        }
    }
}
