//! # parkhub-domain
//!
//! Pure domain model for the parkhub administration client.
//!
//! ## Responsibilities
//! - Foundational types: opaque backend identifiers, error conventions, timestamps
//! - Define **Parking lots** (the managed facility record and its enumerations)
//! - Define **Images** (persisted `{key, url}` pairs and not-yet-uploaded local files)
//! - Define **Status history** (immutable status/availability facts and the per-lot log)
//! - Define **Nodes** and **Users** referenced by a parking lot
//! - Define the **wire DTO** the backend accepts, and the pure sanitizer producing it
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod dto;
pub mod history;
pub mod image;
pub mod node;
pub mod parking_lot;
pub mod user;
