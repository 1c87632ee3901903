//! Configuration management for the portal clients
//!
//! This module handles loading and validating the portal endpoints, network
//! options and logging settings.

pub mod loader;
pub mod settings;

pub use loader::ConfigLoader;
pub use settings::{LoggingSettings, NetworkSettings, PortalSettings, Settings};
