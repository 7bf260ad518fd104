//! Elastic Core Library
//!
//! Shared types for the elastic client:
//! - Catalog records (`/_cat/indices` rows, health and status)
//! - Request header pairs and media types
//! - Client configuration

pub mod config;
pub mod models;

// Re-export commonly used types
pub use config::ClientConfig;
pub use models::*;
