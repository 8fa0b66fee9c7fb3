use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::error::YapYapError;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub clipboard: ClipboardConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectionConfig {
    /// Recognizer socket path. Unset means the per-user runtime directory.
    #[serde(default)]
    pub socket_path: Option<String>,
    /// Channel name announced on connect.
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
}

fn default_channel() -> String {
    "yapyap".to_string()
}

fn default_connect_timeout() -> u64 {
    3000
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            channel: default_channel(),
            connect_timeout_ms: default_connect_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// The query text is percent-encoded and appended to this prefix.
    #[serde(default = "default_search_url")]
    pub url_prefix: String,
}

fn default_search_url() -> String {
    "https://www.google.com/search?q=".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url_prefix: default_search_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClipboardConfig {
    /// Allow falling back to a `wl-copy` subprocess when the native
    /// protocol is unavailable.
    #[serde(default = "default_true")]
    pub wl_copy_fallback: bool,
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_settle_delay() -> u64 {
    50
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            wl_copy_fallback: true,
            settle_delay_ms: default_settle_delay(),
        }
    }
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        Self::validate_config_path(path)?;

        if !path.exists() {
            debug!("Config file not found at {:?}, creating default", path);
            let config = Self::default();
            config.save(path).await?;
            return Ok(config);
        }

        let content = fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.connection.channel.is_empty() {
            return Err(YapYapError::Config("channel name cannot be empty".to_string()).into());
        }
        if self.connection.connect_timeout_ms == 0 {
            return Err(
                YapYapError::Config("connect_timeout_ms must be greater than 0".to_string())
                    .into(),
            );
        }
        if self.connection.connect_timeout_ms > 30000 {
            return Err(
                YapYapError::Config("connect_timeout_ms cannot exceed 30000ms".to_string())
                    .into(),
            );
        }

        if let Some(path) = &self.connection.socket_path {
            if path.contains("..") {
                return Err(YapYapError::Config(
                    "socket_path cannot contain path traversal sequences".to_string(),
                )
                .into());
            }
        }

        if self.search.url_prefix.is_empty() {
            return Err(
                YapYapError::Config("search url_prefix cannot be empty".to_string()).into(),
            );
        }
        if !self.search.url_prefix.starts_with("http://")
            && !self.search.url_prefix.starts_with("https://")
        {
            return Err(YapYapError::Config(
                "search url_prefix must start with http:// or https://".to_string(),
            )
            .into());
        }

        if self.clipboard.settle_delay_ms > 10000 {
            return Err(
                YapYapError::Config("settle_delay_ms cannot exceed 10000ms".to_string()).into(),
            );
        }

        Ok(())
    }

    /// Validate that a config path is safe
    fn validate_config_path(path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy();
        if path_str.contains("..") {
            return Err(YapYapError::Config(
                "Config path cannot contain path traversal sequences".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_config_default_values() {
        let config = Config::default();
        assert_eq!(config.connection.channel, "yapyap");
        assert_eq!(config.connection.socket_path, None);
        assert_eq!(config.connection.connect_timeout_ms, 3000);
        assert_eq!(config.search.url_prefix, "https://www.google.com/search?q=");
        assert!(config.clipboard.wl_copy_fallback);
        assert_eq!(config.clipboard.settle_delay_ms, 50);
    }

    #[tokio::test]
    async fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test_config.toml");

        let mut config = Config::default();
        config.connection.socket_path = Some("/tmp/yap-test.sock".to_string());
        config.save(&config_path).await.unwrap();

        let loaded = Config::load(&config_path).await.unwrap();
        assert_eq!(loaded.connection.socket_path, config.connection.socket_path);
        assert_eq!(loaded.search.url_prefix, config.search.url_prefix);
    }

    #[tokio::test]
    async fn test_config_load_creates_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("yapyap/config.toml");

        let config = Config::load(&config_path).await.unwrap();
        assert!(config_path.exists());
        assert_eq!(config.connection.channel, "yapyap");
    }

    #[tokio::test]
    async fn test_config_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("partial.toml");
        tokio::fs::write(
            &config_path,
            "[search]\nurl_prefix = \"https://duckduckgo.com/?q=\"\n",
        )
        .await
        .unwrap();

        let config = Config::load(&config_path).await.unwrap();
        assert_eq!(config.search.url_prefix, "https://duckduckgo.com/?q=");
        assert_eq!(config.connection.channel, "yapyap");
        assert_eq!(config.clipboard.settle_delay_ms, 50);
    }

    #[tokio::test]
    async fn test_config_validation_empty_channel() {
        let mut config = Config::default();
        config.connection.channel = String::new();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_config_validation_timeout_bounds() {
        let mut config = Config::default();
        config.connection.connect_timeout_ms = 0;
        assert!(config.validate().is_err());

        config.connection.connect_timeout_ms = 60000;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_config_validation_socket_path_traversal() {
        let mut config = Config::default();
        config.connection.socket_path = Some("/run/user/1000/../0/x.sock".to_string());
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_config_validation_url_prefix() {
        let mut config = Config::default();
        config.search.url_prefix = String::new();
        assert!(config.validate().is_err());

        config.search.url_prefix = "ftp://example.com/?q=".to_string();
        assert!(config.validate().is_err());

        config.search.url_prefix = "http://localhost:8080/?q=".to_string();
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_config_validation_settle_delay() {
        let mut config = Config::default();
        config.clipboard.settle_delay_ms = 20000;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_config_validation_valid_values() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }
}
