//! Tinier - shrink a tree of images, audio and videos with ffmpeg
//!
//! This crate walks an input directory, transcodes every recognized media
//! file with ffmpeg into a mirrored output directory, keeps whichever of
//! input and output is smaller, and copies everything else unchanged.
//! A usable ffmpeg is found or downloaded before the batch starts.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Versions, platforms, settings, media classification and errors
//! - **Application**: Use cases (engine acquisition, batch shrinking) and port traits
//! - **Infrastructure**: Adapter implementations (processes, HTTP, archives, config file)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
