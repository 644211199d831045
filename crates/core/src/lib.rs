//! Core types for the routed document storage connector
//!
//! This crate holds what every other layer needs:
//! - [`Error`]: the error taxonomy shared by all operations
//! - [`ConnectorConfig`]: the recognized options
//! - [`KeyRouter`]: key to collection/document-id routing

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod key;

pub use config::{ConnectorConfig, DEFAULT_COLLECTION};
pub use error::{Error, Result};
pub use key::{KeyRouter, Route};
