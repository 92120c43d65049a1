//! Host device identity.
//!
//! The device identifier is owned by the platform, not by this crate. The
//! headless host derives a stable one from the machine's hostname.

use sha2::{Digest, Sha256};

/// Platform source of device identity.
pub trait DeviceIdentity: Send + Sync {
    /// Stable identifier for this install/device.
    fn unique_id(&self) -> String;

    /// `false` on simulators and emulators, where push tokens are unavailable.
    fn is_live_device(&self) -> bool;
}

/// Device identity for the headless host.
#[derive(Debug, Clone)]
pub struct HostDevice {
    id: String,
    live: bool,
}

impl HostDevice {
    /// Identity with an explicit identifier.
    pub fn new(id: impl Into<String>, live: bool) -> Self {
        Self {
            id: id.into(),
            live,
        }
    }

    /// Identity derived from the machine hostname.
    pub fn from_host(live: bool) -> Self {
        let host = hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "localhost".to_string());
        Self::new(Self::derive_id(&host), live)
    }

    /// First 16 bytes of SHA256("webshell:" + seed) as lowercase hex.
    fn derive_id(seed: &str) -> String {
        let hash = Sha256::digest(format!("webshell:{seed}").as_bytes());
        hash[..16].iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl DeviceIdentity for HostDevice {
    fn unique_id(&self) -> String {
        self.id.clone()
    }

    fn is_live_device(&self) -> bool {
        self.live
    }
}
