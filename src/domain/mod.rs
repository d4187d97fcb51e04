//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod engine;
pub mod error;
pub mod media;
pub mod size;
pub mod stats;
pub mod version;

// Re-export common types
pub use config::{AppConfig, Settings};
pub use engine::{AcquiredEngine, EngineSource, Platform};
pub use error::*;
pub use media::{MediaExtensions, MediaFiles, MediaKind, OutputPaths};
pub use stats::RunStats;
pub use version::Version;
