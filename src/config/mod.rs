//! Configuration management for Taskdock

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Environment variable overriding the configured API host
pub const API_HOST_ENV: &str = "TASKDOCK_API_HOST";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Dashboard API host, e.g. `https://dashboard.example.com`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// Session cookie value sent with every request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,

    /// Signed-in user ID, used to tell own chat messages apart
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Poll cadence for `chat watch`, in seconds
    #[serde(default = "default_chat_poll_secs")]
    pub chat_poll_secs: u64,

    /// Debounce window for document autosave, in milliseconds
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,
}

fn default_chat_poll_secs() -> u64 {
    5
}

fn default_autosave_delay_ms() -> u64 {
    1500
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            format: None,
            chat_poll_secs: default_chat_poll_secs(),
            autosave_delay_ms: default_autosave_delay_ms(),
        }
    }
}

impl Preferences {
    pub fn chat_poll_interval(&self) -> Duration {
        Duration::from_secs(self.chat_poll_secs.max(1))
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".taskdock").join("config.yaml"))
    }

    /// Resolve an optional override to a concrete path
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an override path or the default location
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(&Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to an override path or the default location
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(&Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // The file holds the session cookie
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Apply CLI/env overrides on top of the file values
    pub fn apply_overrides(&mut self, api_host: Option<&str>) {
        if let Some(host) = api_host {
            self.api_host = Some(host.to_string());
        }
    }

    /// The API host with any trailing slash removed
    pub fn require_api_host(&self) -> Result<String> {
        self.api_host
            .as_deref()
            .map(|h| h.trim_end_matches('/').to_string())
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ConfigError::MissingApiHost.into())
    }

    /// Validate that a session is present
    pub fn validate_session(&self) -> Result<()> {
        match self.session.as_deref() {
            Some(s) if !s.is_empty() => Ok(()),
            _ => Err(ConfigError::MissingSession.into()),
        }
    }

    /// Forget the stored session
    pub fn clear_session(&mut self) {
        self.session = None;
        self.user_id = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_host.is_none());
        assert!(config.session.is_none());
        assert_eq!(config.preferences.chat_poll_secs, 5);
        assert_eq!(config.preferences.autosave_delay_ms, 1500);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config {
            api_host: Some("http://localhost:8000".to_string()),
            session: Some("abc".to_string()),
            user_id: Some("u1".to_string()),
            preferences: Preferences::default(),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_host.as_deref(), Some("http://localhost:8000"));
        assert_eq!(loaded.session.as_deref(), Some("abc"));
        assert_eq!(loaded.user_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = Config::load_from(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::NotFound)
        ));
    }

    #[test]
    fn test_preferences_default_when_absent() {
        let config: Config = serde_yaml::from_str("api_host: http://h\n").unwrap();
        assert_eq!(config.preferences.chat_poll_secs, 5);
        assert_eq!(
            config.preferences.autosave_delay(),
            Duration::from_millis(1500)
        );
    }

    #[test]
    fn test_require_api_host_trims_trailing_slash() {
        let mut config = Config::default();
        assert!(config.require_api_host().is_err());

        config.apply_overrides(Some("http://localhost:8000/"));
        assert_eq!(config.require_api_host().unwrap(), "http://localhost:8000");
    }

    #[test]
    fn test_validate_session() {
        let mut config = Config::default();
        assert!(config.validate_session().is_err());

        config.session = Some(String::new());
        assert!(config.validate_session().is_err());

        config.session = Some("token".into());
        assert!(config.validate_session().is_ok());

        config.clear_session();
        assert!(config.session.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        Config::default().save_to(&path).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
