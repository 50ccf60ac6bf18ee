use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::ui::Skin;

const BACKEND_URL_ENV: &str = "DOCUMIND_BACKEND_URL";

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_snippet_width() -> usize {
    120
}

fn default_accepted_extensions() -> Vec<String> {
    vec!["pdf".to_string(), "txt".to_string(), "md".to_string()]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub window: WindowConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// Root every endpoint path is joined onto, e.g. `http://localhost:8000/api/v1`.
    pub fn api_root(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UiConfig {
    #[serde(default)]
    pub skin: Skin,
    #[serde(default = "default_snippet_width")]
    pub snippet_width: usize,
    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            skin: Skin::default(),
            snippet_width: default_snippet_width(),
            accepted_extensions: default_accepted_extensions(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            backend: BackendConfig {
                base_url: "http://localhost:8000".to_string(),
                api_prefix: default_api_prefix(),
                timeout_secs: default_timeout_secs(),
            },
            window: WindowConfig {
                width: 960,
                height: 720,
                min_width: 480,
                min_height: 400,
            },
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = Self::get_config_path();

        let mut config = if config_path.exists() {
            match fs::read_to_string(&config_path) {
                Ok(contents) => Self::parse(&contents).unwrap_or_else(|e| {
                    tracing::warn!(path = %config_path.display(), "error parsing config: {e}; using defaults");
                    Config::default()
                }),
                Err(e) => {
                    tracing::warn!(path = %config_path.display(), "error reading config: {e}; using defaults");
                    Config::default()
                }
            }
        } else {
            // Create config directory if it doesn't exist
            if let Some(parent) = config_path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            Config::default()
        };

        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            config.apply_backend_override(url);
        }

        config
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    fn apply_backend_override(&mut self, url: String) {
        if !url.trim().is_empty() {
            tracing::debug!(%url, "backend url overridden from {BACKEND_URL_ENV}");
            self.backend.base_url = url;
        }
    }

    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.toml")
    }

    pub fn get_config_dir() -> PathBuf {
        if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home).join(".config/documind")
        } else {
            PathBuf::from(".")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_file_fills_defaults() {
        let config = Config::parse(
            r#"
            [backend]
            base_url = "http://rag.internal:9000/"

            [window]
            width = 1024
            height = 768
            min_width = 400
            min_height = 300
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.api_prefix, "/api/v1");
        assert_eq!(config.backend.timeout_secs, 120);
        assert_eq!(config.ui.skin, Skin::Classic);
        assert_eq!(config.ui.snippet_width, 120);
        assert_eq!(config.ui.accepted_extensions, vec!["pdf", "txt", "md"]);
        assert_eq!(config.backend.api_root(), "http://rag.internal:9000/api/v1");
    }

    #[test]
    fn test_ui_section() {
        let config = Config::parse(
            r#"
            [backend]
            base_url = "http://localhost:8000"
            api_prefix = "v2"
            timeout_secs = 5

            [window]
            width = 800
            height = 600
            min_width = 400
            min_height = 300

            [ui]
            skin = "compact"
            snippet_width = 40
            "#,
        )
        .unwrap();

        assert_eq!(config.ui.skin, Skin::Compact);
        assert_eq!(config.ui.snippet_width, 40);
        assert_eq!(config.backend.timeout(), Duration::from_secs(5));
        assert_eq!(config.backend.api_root(), "http://localhost:8000/v2");
    }

    #[test]
    fn test_missing_backend_is_an_error() {
        assert!(Config::parse("[window]\nwidth = 1\nheight = 1\nmin_width = 1\nmin_height = 1\n").is_err());
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let mut config = Config::default();
        config.apply_backend_override("  ".to_string());
        assert_eq!(config.backend.base_url, "http://localhost:8000");

        config.apply_backend_override("http://10.0.0.2:8000".to_string());
        assert_eq!(config.backend.base_url, "http://10.0.0.2:8000");
    }
}
