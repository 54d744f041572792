// src/utils/mod.rs
//! Common utilities
//!
//! - **config**: Layered engine configuration
//! - **errors**: Engine error types

pub mod config;
pub mod errors;

pub use config::{EngineConfig, ObservabilityConfig};
pub use errors::{EngineError, Result};
