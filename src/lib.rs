//! badm - inspect and annotate redb databases.
//!
//! The library holds everything the `badm` binary does:
//!
//! - [`types`] - named decoders turning raw bytes into text
//! - [`config`] - the `~/.badm` document (selected database, bucket types, extensions)
//! - [`extension`] - WebAssembly modules contributing decoders
//! - [`store`] - read-only bucket access
//! - [`render`] - applying decoders to bucket entries
//! - [`commands`] - one function per CLI command

pub mod commands;
pub mod config;
pub mod error;
pub mod extension;
pub mod paths;
pub mod render;
pub mod store;
pub mod types;
pub mod ui;

pub use error::{Error, Result};
