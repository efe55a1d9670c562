//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod auth_service;
pub mod file_storage;
pub mod history_listener;
pub mod image_session;
pub mod node_directory;
pub mod parking_lot_store;
pub mod tracker;
pub mod user_directory;
