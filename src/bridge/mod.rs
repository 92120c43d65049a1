//! Web content → native host bridge.
//!
//! The embedded content posts JSON strings over the surface's generic
//! messaging channel. Each payload is decoded into a [`BridgeMessage`] and
//! routed by [`BridgeRouter`]:
//!
//! ```text
//! raw payload ──parse──► BridgeMessage ──route──► action
//!      │                      │
//!      └─ malformed: dropped  ├─ Auth    → registration flow (root path only)
//!                             ├─ GoBack  → surface back navigation
//!                             └─ Unknown → ignored
//! ```
//!
//! Adding a bridge action means adding a variant and a match arm.

pub mod router;
pub mod types;

pub use router::{BridgeRouter, RouteOutcome};
pub use types::{AuthProps, AuthRequest, AuthTokens, BridgeMessage};
