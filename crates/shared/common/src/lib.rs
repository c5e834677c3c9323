//! Common utilities shared across the workspace crates.
//!
//! This crate provides:
//! - Unified error handling with HTTP mapping
//! - Configuration structures and environment helpers

pub mod config;
pub mod error;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
