use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::errors::ApiError;

/// Typed application configuration.
///
/// Loaded from `config.yml` (path overridable with `SHOPTALK_CONFIG_PATH`),
/// then patched from the environment for deployment-specific values. A
/// missing file falls back to defaults; an unreadable or invalid file is a
/// configuration error and fatal at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub order_api: OrderApiSettings,
    pub catalog: CatalogSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of an OpenAI-compatible endpoint serving both chat
    /// completions and embeddings.
    pub base_url: String,
    pub api_key: Option<String>,
    pub chat_model: String,
    pub embedding_model: String,
    pub temperature: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrderApiSettings {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub csv_path: PathBuf,
    pub chunk_size: usize,
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8088".to_string(),
            api_key: None,
            chat_model: "gemini-2.0-flash".to_string(),
            embedding_model: "all-minilm-l6-v2".to_string(),
            temperature: Some(0.0),
        }
    }
}

impl Default for OrderApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/data".to_string(),
        }
    }
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("data/product_information.csv"),
            chunk_size: 500,
            top_k: 5,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            llm: LlmSettings::default(),
            order_api: OrderApiSettings::default(),
            catalog: CatalogSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, ApiError> {
        let path = config_path();
        let mut settings = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| {
                ApiError::Configuration(format!("failed to read {}: {}", path.display(), e))
            })?;
            serde_yaml::from_str(&raw).map_err(|e| {
                ApiError::Configuration(format!("failed to parse {}: {}", path.display(), e))
            })?
        } else {
            Settings::default()
        };
        settings.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    /// Environment overrides for values that differ per deployment or are
    /// secrets that do not belong in the config file.
    fn apply_env(&mut self) {
        if let Some(url) = non_empty_env("SHOPTALK_LLM_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(key) = non_empty_env("SHOPTALK_LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = non_empty_env("ORDER_API_URL") {
            self.order_api.base_url = url;
        }
        if let Some(path) = non_empty_env("SHOPTALK_CATALOG_PATH") {
            self.catalog.csv_path = PathBuf::from(path);
        }
        if let Some(port) = non_empty_env("PORT").and_then(|val| val.parse::<u16>().ok()) {
            self.server.port = port;
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.llm.base_url.trim().is_empty() {
            return Err(ApiError::Configuration(
                "llm.base_url must not be empty".to_string(),
            ));
        }
        if self.order_api.base_url.trim().is_empty() {
            return Err(ApiError::Configuration(
                "order_api.base_url must not be empty".to_string(),
            ));
        }
        if self.catalog.chunk_size == 0 {
            return Err(ApiError::Configuration(
                "catalog.chunk_size must be positive".to_string(),
            ));
        }
        if self.catalog.top_k == 0 {
            return Err(ApiError::Configuration(
                "catalog.top_k must be positive".to_string(),
            ));
        }
        if !self.catalog.csv_path.exists() {
            return Err(ApiError::Configuration(format!(
                "catalog file not found: {}",
                self.catalog.csv_path.display()
            )));
        }
        Ok(())
    }
}

fn config_path() -> PathBuf {
    if let Ok(path) = env::var("SHOPTALK_CONFIG_PATH") {
        return PathBuf::from(path);
    }
    Path::new("config.yml").to_path_buf()
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|val| !val.trim().is_empty())
}
