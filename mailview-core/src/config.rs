//! Configuration management for mailview.

use std::fs;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::paths::AppPaths;

const APP_NAME: &str = "mailview";

/// Default poll interval in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the backend serving `/api/emails`.
    pub service_url: String,
    /// How often the email list is re-fetched, in milliseconds.
    pub poll_interval_ms: u64,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Compose defaults.
    #[serde(default)]
    pub compose: ComposeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:3000".to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            compose: ComposeConfig::default(),
        }
    }
}

/// Compose settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Sender address pre-filled in the compose form.
    pub from: String,
}

impl AppConfig {
    /// Load configuration from paths with environment overlay.
    pub fn load(paths: &AppPaths) -> Result<Self> {
        let env_prefix = env_prefix();
        let defaults = AppConfig::default();
        let mut builder = Config::builder()
            .set_default("service_url", defaults.service_url)?
            .set_default("poll_interval_ms", defaults.poll_interval_ms as i64)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("compose.from", "")?
            .add_source(
                File::from(paths.global_config.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                File::from(paths.local_config.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(&env_prefix)
                    .separator("__")
                    .try_parsing(true),
            );

        if let Some(cli_cfg) = &paths.cli_config {
            builder = builder.add_source(
                File::from(cli_cfg.as_path())
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the poller and client cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.service_url.trim().is_empty() {
            return Err(Error::Config("service_url must not be empty".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be greater than 0".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Write default config to a path.
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("creating config directory {parent:?}: {e}")))?;
        }
        let cfg = AppConfig::default();
        let toml = toml::to_string_pretty(&cfg)
            .map_err(|e| Error::Config(format!("serializing default config: {e}")))?;
        let mut content = String::new();
        content.push_str("# mailview configuration\n");
        content.push_str(
            "# Place this file at $XDG_CONFIG_HOME/mailview/config.toml (or ~/.config/mailview/config.toml)\n\n",
        );
        content.push_str(&toml);
        content.push('\n');
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("writing config file to {}: {e}", path.display())))
    }

    /// Ensure default config exists, creating it if necessary.
    pub fn ensure_default(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        Self::write_default(path)
    }
}

/// Generate environment variable prefix from app name.
fn env_prefix() -> String {
    APP_NAME
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn paths_in(temp: &TempDir, cli_config: Option<PathBuf>) -> AppPaths {
        AppPaths {
            global_config: temp.path().join("global.toml"),
            local_config: temp.path().join("local.toml"),
            cli_config,
            state_dir: temp.path().join("state"),
        }
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.service_url, "http://127.0.0.1:3000");
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.poll_interval(), Duration::from_millis(2000));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.compose.from.is_empty());
    }

    #[test]
    fn test_write_default_config() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("nested").join("config.toml");
        AppConfig::write_default(&config_path).unwrap();
        let content = fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("service_url"));
        assert!(content.contains("poll_interval_ms = 2000"));
    }

    #[test]
    fn test_ensure_default_keeps_existing() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        fs::write(&config_path, "poll_interval_ms = 500\n").unwrap();
        AppConfig::ensure_default(&config_path).unwrap();
        let content = fs::read_to_string(&config_path).unwrap();
        assert_eq!(content, "poll_interval_ms = 500\n");
    }

    #[test]
    fn test_load_from_cli_config() {
        let temp = TempDir::new().unwrap();
        let cli = temp.path().join("cli.toml");
        fs::write(
            &cli,
            "service_url = \"http://mail.test:8080\"\npoll_interval_ms = 750\n[compose]\nfrom = \"me@test\"\n",
        )
        .unwrap();
        let config = AppConfig::load(&paths_in(&temp, Some(cli))).unwrap();
        assert_eq!(config.service_url, "http://mail.test:8080");
        assert_eq!(config.poll_interval_ms, 750);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.compose.from, "me@test");
    }

    #[test]
    fn test_load_rejects_zero_interval() {
        let temp = TempDir::new().unwrap();
        let cli = temp.path().join("cli.toml");
        fs::write(&cli, "poll_interval_ms = 0\n").unwrap();
        let err = AppConfig::load(&paths_in(&temp, Some(cli))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let config = AppConfig {
            service_url: "  ".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_prefix() {
        assert_eq!(env_prefix(), "MAILVIEW");
    }
}
