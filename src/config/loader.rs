//! Configuration loading
//!
//! Settings come from three layers: built-in portal defaults, an optional
//! TOML file and `LOTTO_PORTAL_*` environment variables.

use crate::{Error, Result, config::Settings};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Resolves and layers the configuration sources
#[derive(Debug)]
pub struct ConfigLoader {
    defaults: Settings,
    default_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
            default_path: Settings::default_path(),
        }
    }

    /// Loader that never looks at the user's config directory
    pub fn without_default_path() -> Self {
        Self {
            default_path: None,
            ..Self::new()
        }
    }

    /// Load configuration with precedence order:
    /// 1. Environment variables (highest priority)
    /// 2. Configuration file
    /// 3. Default values (lowest priority)
    ///
    /// An explicitly given file must exist; the default location is only
    /// read when present.
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        let mut settings = self.defaults.clone();

        match config_file {
            Some(path) if !path.exists() => {
                return Err(Error::config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                settings = Settings::from_file(path)?;
            }
            None => {
                if let Some(path) = self.default_path.as_deref().filter(|p| p.exists()) {
                    info!("Loading configuration from {}", path.display());
                    settings = Settings::from_file(path)?;
                }
            }
        }

        settings = settings.merge_with_env()?;
        settings.validate()?;

        debug!("Portal hosts: {:?}", settings.portal);
        Ok(settings)
    }

    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_defaults() {
        let loader = ConfigLoader::without_default_path();
        let settings = loader.load(None).unwrap();

        assert_eq!(settings.portal.account_url, "https://dhlottery.co.kr");
        assert_eq!(loader.defaults().network.timeout_secs, 30);
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[portal]
lotto_url = "http://localhost:9000"

[network]
timeout_secs = 5
user_agent = "test-agent"
        "#
        )
        .unwrap();

        let loader = ConfigLoader::without_default_path();
        let settings = loader.load(Some(temp_file.path())).unwrap();

        assert_eq!(settings.portal.lotto_url, "http://localhost:9000");
        assert_eq!(settings.portal.main_url, "https://www.dhlottery.co.kr");
        assert_eq!(settings.network.timeout_secs, 5);
        assert_eq!(settings.network.user_agent, "test-agent");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let loader = ConfigLoader::without_default_path();
        let err = loader
            .load(Some(Path::new("/nonexistent/lotto-portal.toml")))
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_default_path_under_config_dir() {
        if let Some(path) = ConfigLoader::new().default_path {
            assert!(path.ends_with("lotto-portal/config.toml"));
        }
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[network]\ntimeout_secs = \"soon\"").unwrap();

        let loader = ConfigLoader::without_default_path();
        let err = loader.load(Some(temp_file.path())).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_env_var_override() {
        unsafe {
            std::env::set_var("LOTTO_PORTAL_LOG_LEVEL", "trace");
        }

        let loader = ConfigLoader::without_default_path();
        let settings = loader.load(None).unwrap();
        assert_eq!(settings.logging.level, "trace");

        unsafe {
            std::env::remove_var("LOTTO_PORTAL_LOG_LEVEL");
        }
    }
}
