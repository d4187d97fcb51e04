//! Subprocess execution

mod runner;

pub use runner::TokioCommandRunner;
