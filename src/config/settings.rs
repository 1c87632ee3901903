//! Configuration settings structure
//!
//! Defines the main settings structure, its defaults, file loading and
//! environment overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Portal endpoints
    pub portal: PortalSettings,
    /// HTTP client configuration
    pub network: NetworkSettings,
    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Base URLs of the portal hosts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    /// Landing page host (round numbers)
    pub main_url: String,
    /// Account host (balance, purchase history)
    pub account_url: String,
    /// Lotto game host
    pub lotto_url: String,
    /// Pension game host
    pub pension_url: String,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User agent sent with every request
    pub user_agent: String,
    /// Optional proxy URL
    pub proxy: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level
    pub level: String,
    /// Enable verbose logging
    pub verbose: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            portal: PortalSettings::default(),
            network: NetworkSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            main_url: "https://www.dhlottery.co.kr".to_string(),
            account_url: "https://dhlottery.co.kr".to_string(),
            lotto_url: "https://ol.dhlottery.co.kr".to_string(),
            pension_url: "https://el.dhlottery.co.kr".to_string(),
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/109.0.0.0 Safari/537.36".to_string(),
            proxy: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
        }
    }
}

impl PortalSettings {
    /// Point every host at one base URL (used against mock servers)
    pub fn single_host(base: impl Into<String>) -> Self {
        let base = base.into();
        let base = base.trim_end_matches('/').to_string();
        Self {
            main_url: base.clone(),
            account_url: base.clone(),
            lotto_url: base.clone(),
            pension_url: base,
        }
    }
}

impl NetworkSettings {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| crate::Error::config(format!("Invalid config file {:?}: {}", path, e)))
    }

    /// Apply environment variable overrides on top of these settings
    pub fn merge_with_env(mut self) -> crate::Result<Self> {
        if let Ok(url) = std::env::var("LOTTO_PORTAL_MAIN_URL") {
            self.portal.main_url = url;
        }
        if let Ok(url) = std::env::var("LOTTO_PORTAL_ACCOUNT_URL") {
            self.portal.account_url = url;
        }
        if let Ok(url) = std::env::var("LOTTO_PORTAL_LOTTO_URL") {
            self.portal.lotto_url = url;
        }
        if let Ok(url) = std::env::var("LOTTO_PORTAL_PENSION_URL") {
            self.portal.pension_url = url;
        }

        if let Ok(timeout) = std::env::var("LOTTO_PORTAL_TIMEOUT_SECS") {
            self.network.timeout_secs = timeout
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid timeout: {}", e)))?;
        }
        if let Ok(agent) = std::env::var("LOTTO_PORTAL_USER_AGENT") {
            self.network.user_agent = agent;
        }
        if let Ok(proxy) = std::env::var("HTTPS_PROXY")
            .or_else(|_| std::env::var("HTTP_PROXY"))
            .or_else(|_| std::env::var("ALL_PROXY"))
        {
            self.network.proxy = Some(proxy);
        }

        if let Ok(level) = std::env::var("LOTTO_PORTAL_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> crate::Result<()> {
        for (name, value) in [
            ("portal.main_url", &self.portal.main_url),
            ("portal.account_url", &self.portal.account_url),
            ("portal.lotto_url", &self.portal.lotto_url),
            ("portal.pension_url", &self.portal.pension_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| crate::Error::config(format!("Invalid {}: {}", name, e)))?;
        }

        if self.network.timeout_secs == 0 {
            return Err(crate::Error::config("network.timeout_secs must be positive"));
        }

        if let Some(proxy) = &self.network.proxy {
            url::Url::parse(proxy)
                .map_err(|e| crate::Error::config(format!("Invalid proxy: {}", e)))?;
        }

        Ok(())
    }

    /// Default configuration file location
    pub fn default_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lotto-portal").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.portal.main_url, "https://www.dhlottery.co.kr");
        assert_eq!(settings.portal.pension_url, "https://el.dhlottery.co.kr");
        assert_eq!(settings.network.timeout_secs, 30);
        assert!(settings.network.proxy.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_single_host() {
        let portal = PortalSettings::single_host("http://127.0.0.1:8080/");
        assert_eq!(portal.main_url, "http://127.0.0.1:8080");
        assert_eq!(portal.account_url, portal.lotto_url);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut settings = Settings::new();
        settings.portal.lotto_url = "not a url".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("portal.lotto_url"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut settings = Settings::new();
        settings.network.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }
}
