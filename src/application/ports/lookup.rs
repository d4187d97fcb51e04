//! Executable lookup port interface

use std::path::PathBuf;

/// Port for finding executables on the system search path
pub trait BinaryLookup: Send + Sync {
    /// Absolute path of `name`, or `None` when it is not installed
    fn find(&self, name: &str) -> Option<PathBuf>;
}
