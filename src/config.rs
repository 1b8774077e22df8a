use std::fs;
use std::path::PathBuf;
#[cfg(feature = "network")]
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::json_store::{DEFAULT_TABLE_FILE, JsonTable};
use crate::store::progress::ProgressStore;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub bank_dir: Option<String>,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
    #[serde(default = "default_export_page_lines")]
    pub export_page_lines: usize,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Http,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_store_file")]
    pub file_path: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_username() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "guest".to_string())
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_export_dir() -> String {
    dirs::document_dir()
        .or_else(dirs::data_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("examdrill")
        .to_string_lossy()
        .to_string()
}
fn default_export_page_lines() -> usize {
    40
}
fn default_store_file() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("examdrill")
        .join(DEFAULT_TABLE_FILE)
        .to_string_lossy()
        .to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            file_path: default_store_file(),
            url: None,
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: default_username(),
            theme: default_theme(),
            bank_dir: None,
            export_dir: default_export_dir(),
            export_page_lines: default_export_page_lines(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("examdrill")
            .join("config.toml")
    }

    pub fn bank_dir(&self) -> Option<PathBuf> {
        self.bank_dir.as_ref().map(PathBuf::from)
    }

    /// Clamp numeric settings and fix contradictory store settings.
    /// Call after deserialization and after CLI overrides.
    pub fn validate(&mut self) {
        self.export_page_lines = self.export_page_lines.clamp(10, 200);
        self.store.timeout_secs = self.store.timeout_secs.clamp(1, 120);
        if self.username.trim().is_empty() {
            self.username = default_username();
        }
        let has_url = self.store.url.as_deref().is_some_and(|u| !u.trim().is_empty());
        if self.store.backend == StoreBackend::Http && !has_url {
            warn!("store backend is http but no url is set, falling back to file");
            self.store.backend = StoreBackend::File;
        }
    }
}

impl StoreConfig {
    pub fn open(&self) -> Result<ProgressStore> {
        match self.backend {
            StoreBackend::File => {
                let table = JsonTable::with_path(PathBuf::from(&self.file_path))?;
                Ok(ProgressStore::new(Box::new(table)))
            }
            StoreBackend::Http => self.open_http(),
        }
    }

    #[cfg(feature = "network")]
    fn open_http(&self) -> Result<ProgressStore> {
        use crate::store::http::HttpTable;

        let url = self
            .url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("store url is not set"))?;
        let table = HttpTable::new(
            url,
            self.token.clone(),
            Duration::from_secs(self.timeout_secs),
        )?;
        Ok(ProgressStore::new(Box::new(table)))
    }

    #[cfg(not(feature = "network"))]
    fn open_http(&self) -> Result<ProgressStore> {
        anyhow::bail!("this build has no network support; use the file store backend")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.theme, "catppuccin-mocha");
        assert_eq!(config.export_page_lines, 40);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert!(config.store.file_path.ends_with(DEFAULT_TABLE_FILE));
        assert_eq!(config.store.timeout_secs, 10);
        assert!(config.bank_dir.is_none());
    }

    #[test]
    fn test_config_store_table() {
        let toml_str = r#"
username = "amy"

[store]
backend = "http"
url = "https://sheets.example.com/progress"
token = "secret"
timeout_secs = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.username, "amy");
        assert_eq!(config.store.backend, StoreBackend::Http);
        assert_eq!(config.store.url.as_deref(), Some("https://sheets.example.com/progress"));
        assert_eq!(config.store.token.as_deref(), Some("secret"));
        assert_eq!(config.store.timeout_secs, 5);
        assert!(!config.store.file_path.is_empty());
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(config.username, deserialized.username);
        assert_eq!(config.export_dir, deserialized.export_dir);
        assert_eq!(config.store.file_path, deserialized.store.file_path);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.export_page_lines = 3;
        config.store.timeout_secs = 0;
        config.validate();
        assert_eq!(config.export_page_lines, 10);
        assert_eq!(config.store.timeout_secs, 1);
    }

    #[test]
    fn test_validate_http_without_url_falls_back_to_file() {
        let mut config = Config::default();
        config.store.backend = StoreBackend::Http;
        config.store.url = Some("  ".to_string());
        config.validate();
        assert_eq!(config.store.backend, StoreBackend::File);
    }

    #[test]
    fn test_validate_blank_username_gets_default() {
        let mut config = Config::default();
        config.username = "   ".to_string();
        config.validate();
        assert!(!config.username.trim().is_empty());
    }
}
