use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ai: AiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub model: String,
    pub api_url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".promptforge")
            .join("config.yaml")
    }

    /// Load the config file if present, falling back to defaults on a
    /// missing or unreadable file. The API key always falls back to the
    /// OPENAI_API_KEY environment variable when the file leaves it empty.
    pub fn load_or_default() -> Config {
        let mut config = match Self::load_from_file(Self::config_path()) {
            Ok(config) => config,
            Err(_) => Config::default(),
        };

        if config.ai.api_key.trim().is_empty() {
            config.ai.api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        }

        config
    }

    pub fn save(&self) -> Result<()> {
        self.save_to_file(Self::config_path())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai: AiConfig {
                model: "gpt-4o".to_string(),
                api_url: "https://api.openai.com/v1".to_string(),
                api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_through_yaml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config {
            ai: AiConfig {
                model: "gpt-3.5-turbo".to_string(),
                api_url: "http://localhost:9999/v1".to_string(),
                api_key: "test-key".to_string(),
            },
        };
        config.save_to_file(&path).expect("save");

        let loaded = Config::load_from_file(&path).expect("load");
        assert_eq!(loaded.ai.model, config.ai.model);
        assert_eq!(loaded.ai.api_url, config.ai.api_url);
        assert_eq!(loaded.ai.api_key, config.ai.api_key);
    }

    #[test]
    fn missing_api_key_field_defaults_to_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.yaml");
        fs::write(&path, "ai:\n  model: gpt-4o\n  api_url: https://api.openai.com/v1\n")
            .expect("write");

        let loaded = Config::load_from_file(&path).expect("load");
        assert_eq!(loaded.ai.api_key, "");
    }
}
