//! PATH lookup backed by the `which` crate

use std::path::PathBuf;

use crate::application::ports::BinaryLookup;

#[derive(Debug, Clone, Copy, Default)]
pub struct WhichLookup;

impl WhichLookup {
    pub fn new() -> Self {
        Self
    }
}

impl BinaryLookup for WhichLookup {
    fn find(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}
