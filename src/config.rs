use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration loaded from settings.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tagging: TaggingConfig,
    #[serde(default)]
    pub vision: VisionConfig,
}

/// Tag normalization limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggingConfig {
    /// Minimum confidence for external labels, as a fraction
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    /// Maximum number of tags kept per file
    #[serde(default = "default_max_tags")]
    pub max_tags: usize,
}

/// External label service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Whether the external augmenter may be used at all
    #[serde(default)]
    pub enabled: bool,
    /// Annotation endpoint base URL
    #[serde(default = "default_vision_endpoint")]
    pub endpoint: String,
    /// API key; falls back to the TAGWISE_VISION_API_KEY env var
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_min_confidence() -> f32 {
    0.7
}

fn default_max_tags() -> usize {
    15
}

fn default_vision_endpoint() -> String {
    "https://vision.googleapis.com".to_string()
}

impl Default for TaggingConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            max_tags: default_max_tags(),
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_vision_endpoint(),
            api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from default locations or return defaults
    pub fn load() -> Result<Self> {
        let default_paths = [
            PathBuf::from("config/settings.toml"),
            PathBuf::from("./config/settings.toml"),
            PathBuf::from("~/.config/tagwise/settings.toml"),
        ];

        for path in &default_paths {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// Reject out-of-range limits before any analysis runs
    pub fn validate(&self) -> Result<()> {
        if self.tagging.max_tags == 0 {
            bail!("tagging.max_tags must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.tagging.min_confidence) {
            bail!(
                "tagging.min_confidence must be within 0.0..=1.0, got {}",
                self.tagging.min_confidence
            );
        }
        Ok(())
    }

    /// Get the vision API key from config or environment variable
    pub fn vision_api_key(&self) -> Option<String> {
        self.vision
            .api_key
            .clone()
            .or_else(|| std::env::var("TAGWISE_VISION_API_KEY").ok())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tagging: TaggingConfig::default(),
            vision: VisionConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.tagging.min_confidence, 0.7);
        assert_eq!(config.tagging.max_tags, 15);
        assert!(!config.vision.enabled);
    }

    #[test]
    fn test_config_from_file() {
        let temp_file = std::env::temp_dir().join("tagwise_test_config.toml");
        std::fs::write(
            &temp_file,
            r#"
[tagging]
min_confidence = 0.5
max_tags = 10

[vision]
enabled = true
endpoint = "http://localhost:9099"
api_key = "test-key"
"#,
        )
        .unwrap();

        let config = Config::from_file(&temp_file).unwrap();
        assert_eq!(config.tagging.min_confidence, 0.5);
        assert_eq!(config.tagging.max_tags, 10);
        assert!(config.vision.enabled);
        assert_eq!(config.vision.endpoint, "http://localhost:9099");
        assert_eq!(config.vision_api_key(), Some("test-key".to_string()));
    }

    #[test]
    fn test_config_partial_file_uses_defaults() {
        let temp_file = std::env::temp_dir().join("tagwise_test_partial.toml");
        std::fs::write(&temp_file, "[vision]\nenabled = true\n").unwrap();

        let config = Config::from_file(&temp_file).unwrap();
        assert_eq!(config.tagging.max_tags, 15);
        assert_eq!(config.tagging.min_confidence, 0.7);
        assert!(config.vision.enabled);
    }

    #[test]
    fn test_config_rejects_zero_max_tags() {
        let config = Config {
            tagging: TaggingConfig {
                min_confidence: 0.7,
                max_tags: 0,
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_out_of_range_confidence() {
        let config = Config {
            tagging: TaggingConfig {
                min_confidence: 1.5,
                max_tags: 15,
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            tagging: TaggingConfig {
                min_confidence: -0.1,
                max_tags: 15,
            },
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
