//! User-facing alerts raised by the registration flow.

/// Something the user must be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// No usable push token could be obtained on this device.
    PushTokenUnavailable,
    /// The backend rejected (or never received) the device registration.
    RegistrationFailed {
        /// Raw reason, shown verbatim for diagnosability.
        reason: String,
    },
}

impl Alert {
    /// Alert title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::PushTokenUnavailable => "Error",
            Self::RegistrationFailed { .. } => "There was a problem registering this device.",
        }
    }

    /// Alert body.
    pub fn message(&self) -> String {
        match self {
            Self::PushTokenUnavailable => "Unable to get a push notification token.".to_string(),
            Self::RegistrationFailed { reason } => format!("ERR: {reason}"),
        }
    }
}

/// Presents alerts to the user. Fire-and-forget.
pub trait AlertPresenter: Send + Sync {
    /// Show `alert`.
    fn present(&self, alert: &Alert);
}
