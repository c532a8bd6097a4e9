//! # Jejak Common Library
//!
//! Shared code for the jejak services including:
//! - Error types (Error enum)
//! - Event types (JejakEvent enum) and the broadcast EventBus
//! - Configuration loading (environment / TOML resolution)

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
