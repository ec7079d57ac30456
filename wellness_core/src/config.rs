//! Configuration file support for the wellness tools.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/wellness/config.toml`.

use crate::{files, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Stem of the single-table file (`<table>.jsonl`)
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            table: default_table(),
        }
    }
}

/// Text/vision generation backend configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_model_id")]
    pub model_id: String,

    #[serde(default = "default_anthropic_version")]
    pub anthropic_version: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// HTTP endpoint that accepts the Messages-API request body.
    /// `{model_id}` is replaced with the configured model id.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token for `endpoint`; `WELLNESS_API_KEY` is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// External program that receives the request JSON on stdin and
    /// prints the response JSON on stdout
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            anthropic_version: default_anthropic_version(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            endpoint: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            command: None,
            args: Vec::new(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local/share"))
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    base.join("wellness")
}

fn default_table() -> String {
    "wellness-app".into()
}

fn default_model_id() -> String {
    "anthropic.claude-3-sonnet-20240229-v1:0".into()
}

fn default_anthropic_version() -> String {
    "bedrock-2023-05-31".into()
}

fn default_max_tokens() -> u32 {
    400
}

fn default_temperature() -> f64 {
    1.0
}

fn default_top_k() -> u32 {
    250
}

fn default_top_p() -> f64 {
    0.999
}

fn default_timeout_secs() -> u64 {
    60
}

impl GenerationConfig {
    /// The configured API key, falling back to `WELLNESS_API_KEY`
    pub fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("WELLNESS_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// The endpoint URL with `{model_id}` filled in
    pub fn endpoint_url(&self) -> Option<String> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| url.replace("{model_id}", &self.model_id))
    }
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values the generation backend would refuse
    pub fn validate(&self) -> Result<()> {
        if self.data.table.trim().is_empty() {
            return Err(Error::Config("data.table must not be empty".into()));
        }
        if self.generation.max_tokens == 0 {
            return Err(Error::Config("generation.max_tokens must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.generation.temperature) {
            return Err(Error::Config(
                "generation.temperature must be between 0 and 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.generation.top_p) {
            return Err(Error::Config("generation.top_p must be between 0 and 1".into()));
        }
        if let Some(url) = self.generation.endpoint_url() {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(Error::Config(format!(
                    "generation.endpoint must be an http(s) URL (got {:?})",
                    url
                )));
            }
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            std::env::var("HOME")
                .map(|home| PathBuf::from(home).join(".config"))
                .unwrap_or_else(|_| PathBuf::from("."))
        });
        base.join("wellness").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        files::replace_atomic(path, contents.as_bytes())?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.table, "wellness-app");
        assert_eq!(config.generation.max_tokens, 400);
        assert_eq!(config.generation.top_k, 250);
        assert!(config.generation.command.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.generation.command = Some("llm-bridge".into());
        config.generation.args = vec!["--json".into()];
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.generation.command.as_deref(), Some("llm-bridge"));
        assert_eq!(parsed.generation.args, vec!["--json"]);
        assert_eq!(parsed.data.table, config.data.table);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[generation]
max_tokens = 800
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.generation.max_tokens, 800);
        assert_eq!(config.generation.top_p, 0.999); // default
        assert_eq!(config.data.table, "wellness-app"); // default
    }

    #[test]
    fn test_invalid_temperature_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[generation]\ntemperature = 3.5\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_endpoint_model_placeholder() {
        let toml_str = r#"
[generation]
model_id = "my-model"
endpoint = "https://runtime.example.com/model/{model_id}/invoke"
api_key = "secret"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.generation.endpoint_url().as_deref(),
            Some("https://runtime.example.com/model/my-model/invoke")
        );
        assert_eq!(config.generation.api_key().as_deref(), Some("secret"));
        assert_eq!(config.generation.timeout_secs, 60);
    }

    #[test]
    fn test_non_http_endpoint_rejected() {
        let mut config = Config::default();
        config.generation.endpoint = Some("ftp://example.com".into());
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }
}
