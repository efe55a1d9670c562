//! # parkhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ApiClient`: one authenticated request against the backend REST API
//!   - `FileStorage`: upload and delete stored images
//!   - `HistoryPublisher` / `StatusFeed`: push and subscribe to live status records
//! - Define **driving/inbound** use-cases:
//!   - `ParkingLotStore`: cached parking lots and per-lot history logs
//!   - `ImageSession`: reconcile an edited image list into storage operations
//!   - `HistoryListener`: apply live status records for the observed lot
//!   - `AuthService`, `UserDirectory`
//! - Provide **in-process infrastructure** (status bus, token cell, session
//!   container) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `parkhub-domain` only (plus `tokio` for channels and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
pub mod session;
pub mod status_bus;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;
