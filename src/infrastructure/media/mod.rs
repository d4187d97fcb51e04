//! Input tree traversal

mod walk;

pub use walk::walk;
