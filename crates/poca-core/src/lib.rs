//! Core domain + application logic for the poca photocard bot.
//!
//! This crate is intentionally framework-agnostic. Telegram lives behind a
//! port (trait) implemented in the adapter crate; persistence lives behind
//! store ports with a JSON-file implementation.

pub mod claim;
pub mod collection;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod reconcile;
pub mod store;
pub mod texts;

pub use errors::{Error, Result};
