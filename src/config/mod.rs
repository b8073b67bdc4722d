//! Configuration management for sectionrank
//!
//! Handles loading, validation, profiles and environment overrides. The
//! resulting `Config` is built once per process and handed explicitly to
//! the components that need it.

use crate::error::{Result, SectionRankError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Schema version this build understands
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileOverrides>,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Where collections are read from and results written to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory whose sub-directories are collections
    pub input_dir: PathBuf,
    /// Directory receiving one JSON record per collection
    pub output_dir: PathBuf,
    /// Shared directory of outline files; outlines sit next to each PDF when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_dir: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input_docs"),
            output_dir: PathBuf::from("outputs"),
            outline_dir: None,
        }
    }
}

/// Ranking pipeline parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Minimum whitespace tokens for a heading title to be scored
    pub min_title_tokens: usize,
    /// Deepest heading level admitted
    pub max_heading_level: u32,
    /// How many lexical results are passed to the semantic reranker
    pub lexical_window: usize,
    /// Final number of sections per collection
    pub top_k: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_title_tokens: 4,
            max_heading_level: 2,
            lexical_window: 20,
            top_k: 5,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model: String,
    /// Model cache; point at a pre-populated directory for offline runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub show_download_progress: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "all-MiniLM-L6-v2".to_string(),
            cache_dir: None,
            show_download_progress: false,
        }
    }
}

/// Run-level behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Dump extracted headings into each collection while it is processed
    pub write_heading_snapshot: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            write_heading_snapshot: true,
        }
    }
}

/// Profile-specific configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexical_window: Option<usize>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::read(path)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Load configuration with a specific profile applied
    pub fn load_with_profile(path: &Path, profile: &str) -> Result<Self> {
        let mut config = Self::read(path)?;
        config.apply_profile(profile)?;
        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SectionRankError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SectionRankError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| SectionRankError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply a profile's overrides to the configuration
    pub fn apply_profile(&mut self, profile: &str) -> Result<()> {
        let overrides = self
            .profiles
            .get(profile)
            .cloned()
            .ok_or_else(|| SectionRankError::ProfileNotFound {
                name: profile.to_string(),
            })?;

        if let Some(model) = overrides.embedding_model {
            self.embedding.model = model;
        }
        if let Some(top_k) = overrides.top_k {
            self.ranking.top_k = top_k;
        }
        if let Some(window) = overrides.lexical_window {
            self.ranking.lexical_window = window;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: SECTIONRANK_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(std::env::vars());
    }

    fn apply_overrides(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix("SECTIONRANK_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "RANKING__TOP_K" => {
                self.ranking.top_k = parse_usize(path, value)?;
            }
            "RANKING__LEXICAL_WINDOW" => {
                self.ranking.lexical_window = parse_usize(path, value)?;
            }
            "EMBEDDING__MODEL" => {
                self.embedding.model = value.to_string();
            }
            "EMBEDDING__CACHE_DIR" => {
                self.embedding.cache_dir = Some(PathBuf::from(value));
            }
            "PATHS__INPUT_DIR" => {
                self.paths.input_dir = PathBuf::from(value);
            }
            "PATHS__OUTPUT_DIR" => {
                self.paths.output_dir = PathBuf::from(value);
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            SectionRankError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("sectionrank").join("config.toml"))
    }
}

fn parse_usize(path: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| SectionRankError::InvalidConfigValue {
            path: path.to_string(),
            message: format!("Cannot parse '{}' as a positive integer", value),
        })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: SCHEMA_VERSION.to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            paths: PathsConfig::default(),
            ranking: RankingConfig::default(),
            embedding: EmbeddingConfig::default(),
            run: RunConfig::default(),
            profiles: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_roundtrip_through_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        Config::default().save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded.ranking.top_k, 5);
        assert_eq!(loaded.ranking.lexical_window, 20);
        assert_eq!(loaded.embedding.model, "all-MiniLM-L6-v2");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "[_meta]\nschema_version = \"1.0.0\"\n\n[ranking]\nmin_title_tokens = 3\nmax_heading_level = 1\nlexical_window = 10\ntop_k = 4\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.ranking.min_title_tokens, 3);
        assert_eq!(config.ranking.top_k, 4);
        assert_eq!(config.paths.output_dir, PathBuf::from("outputs"));
        assert!(config.run.write_heading_snapshot);
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load(Path::new("/nonexistent/sectionrank.toml"));
        assert!(matches!(result, Err(SectionRankError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_profile_overrides() {
        let mut config = Config::default();
        config.profiles.insert(
            "fast".to_string(),
            ProfileOverrides {
                embedding_model: Some("bge-small-en-v1.5".to_string()),
                top_k: Some(3),
                lexical_window: None,
            },
        );

        config.apply_profile("fast").unwrap();
        assert_eq!(config.embedding.model, "bge-small-en-v1.5");
        assert_eq!(config.ranking.top_k, 3);
        assert_eq!(config.ranking.lexical_window, 20);

        assert!(matches!(
            config.apply_profile("missing"),
            Err(SectionRankError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(vec![
            ("SECTIONRANK_RANKING__TOP_K".to_string(), "7".to_string()),
            ("SECTIONRANK_PATHS__OUTPUT_DIR".to_string(), "/tmp/out".to_string()),
            ("SECTIONRANK_RANKING__LEXICAL_WINDOW".to_string(), "many".to_string()),
            ("UNRELATED_VAR".to_string(), "1".to_string()),
        ]);

        assert_eq!(config.ranking.top_k, 7);
        assert_eq!(config.paths.output_dir, PathBuf::from("/tmp/out"));
        // Unparseable values are ignored
        assert_eq!(config.ranking.lexical_window, 20);
    }
}
