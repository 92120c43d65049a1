//! Webshell - native host shell for a remote web app.
//!
//! The shell hosts a remote page in an embedded browser surface and exposes
//! a few native capabilities to it over an asynchronous message bridge.
//!
//! # Architecture
//!
//! - **Bridge** - decodes content → host messages and routes them
//! - **Registration** - permission-gated push token + backend `addDevice` flow
//! - **Chrome** - status bar style kept in step with theme and keyboard
//! - **Shell** - application context that owns process-wide state
//! - **Headless** - config-backed platform services and a stdin event loop
//!
//! Platform services (browser surface, OS permissions, push tokens, device
//! identity, alerts) sit behind traits so each host build plugs in its own.
//!
//! # Modules
//!
//! - [`bridge`] - Bridge message types and router
//! - [`registration`] - Device registration flow
//! - [`permission`] - Notification permission negotiation
//! - [`config`] - Configuration loading/saving

pub mod alert;
pub mod api;
pub mod bridge;
pub mod chrome;
pub mod config;
pub mod device;
pub mod env;
pub mod headless;
pub mod navigation;
pub mod notifications;
pub mod permission;
pub mod push;
pub mod registration;
pub mod shell;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use bridge::{BridgeMessage, BridgeRouter, RouteOutcome};
pub use config::Config;
pub use permission::PermissionState;
pub use registration::{DeviceRegistrar, RegistrationOutcome};
pub use shell::{Collaborators, Shell};
