//! Utility functions and helpers
//!
//! This module contains utility functions used throughout the application.

pub mod dates;
pub mod version;

pub use dates::SearchWindow;
pub use version::VERSION;
