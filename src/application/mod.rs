//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod acquire;
pub mod ports;
pub mod tinify;

// Re-export use cases
pub use acquire::{AcquireCallbacks, AcquireError, AcquireInput, EngineAcquirer};
pub use tinify::{
    FileError, FileOutcome, TinifyCallbacks, TinifyError, TinifyOutput, TinifyUseCase,
};
