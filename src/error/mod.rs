//! Error handling for the portal protocol clients
//!
//! This module defines the crate error type and the serialisable error kind
//! that failed purchase and winning-check results carry.

pub mod types;

pub use types::{Error, ErrorKind, Result};
