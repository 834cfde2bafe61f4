//! Configuration management for the skill bridge engine

use crate::error::{Result, SkillBridgeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub models: ModelConfig,
    pub matching: MatchingConfig,
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub embedding_backend: EmbeddingBackend,
    /// HuggingFace repo id or local folder of a Model2Vec model
    pub embedding_model: String,
    pub hash_dimension: usize,
    pub batch_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    Model2vec,
    Hash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    pub fuzzy_threshold: f64,
    pub domain_penalty: f64,
    pub display_cap: usize,
    pub learning_path_cap: usize,
    /// Optional TOML catalog replacing the built-in role and domain tables
    pub catalog_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub index_dir: PathBuf,
    pub top_k: usize,
    pub keep_generations: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// External command (program followed by arguments) fed the prompt on stdin
    pub command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        let index_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skill-bridge")
            .join("index");

        Self {
            models: ModelConfig {
                embedding_backend: EmbeddingBackend::Model2vec,
                embedding_model: "minishlab/potion-base-8M".to_string(),
                hash_dimension: 256,
                batch_size: 32,
            },
            matching: MatchingConfig {
                fuzzy_threshold: 0.7,
                domain_penalty: 30.0,
                display_cap: 5,
                learning_path_cap: 8,
                catalog_path: None,
            },
            retrieval: RetrievalConfig {
                index_dir,
                top_k: 5,
                keep_generations: 2,
            },
            generation: GenerationConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
            },
        }
    }
}

impl Config {
    /// Load from `config_path`, writing defaults there on first run
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| SkillBridgeError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SkillBridgeError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("skill-bridge")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.matching.fuzzy_threshold) {
            return Err(SkillBridgeError::Configuration(format!(
                "matching.fuzzy_threshold must be within [0, 1], got {}",
                self.matching.fuzzy_threshold
            )));
        }
        if self.matching.domain_penalty < 0.0 {
            return Err(SkillBridgeError::Configuration(
                "matching.domain_penalty must not be negative".to_string(),
            ));
        }
        if self.models.batch_size == 0 || self.models.hash_dimension == 0 {
            return Err(SkillBridgeError::Configuration(
                "models.batch_size and models.hash_dimension must be positive".to_string(),
            ));
        }
        if self.retrieval.keep_generations == 0 {
            return Err(SkillBridgeError::Configuration(
                "retrieval.keep_generations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.matching.fuzzy_threshold, 0.7);
        assert_eq!(config.matching.domain_penalty, 30.0);
        assert_eq!(config.retrieval.top_k, 5);
    }

    #[test]
    fn test_first_load_writes_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.matching.display_cap, 5);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.models.embedding_model, config.models.embedding_model);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.matching.fuzzy_threshold = 1.5;
        config.save_to(&path).unwrap();

        let result = Config::load_from(&path);
        assert!(matches!(result, Err(SkillBridgeError::Configuration(_))));
    }
}
