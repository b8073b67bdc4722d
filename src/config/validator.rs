use crate::config::{Config, SCHEMA_VERSION};
use crate::embedding::SUPPORTED_MODELS;
use crate::error::{Result, SectionRankError, ValidationError};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, collecting every violation
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        Self::validate_schema_version(config, &mut errors);
        Self::validate_paths(config, &mut errors);
        Self::validate_ranking(config, &mut errors);
        Self::validate_embedding(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SectionRankError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != SCHEMA_VERSION {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_paths(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.paths.input_dir.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "paths.input_dir",
                "Input directory cannot be empty",
            ));
        }

        if config.paths.output_dir.as_os_str().is_empty() {
            errors.push(ValidationError::new(
                "paths.output_dir",
                "Output directory cannot be empty",
            ));
        }
    }

    fn validate_ranking(config: &Config, errors: &mut Vec<ValidationError>) {
        let ranking = &config.ranking;

        if ranking.top_k == 0 {
            errors.push(ValidationError::new(
                "ranking.top_k",
                "top_k must be greater than 0",
            ));
        }

        if ranking.lexical_window < ranking.top_k {
            errors.push(ValidationError::new(
                "ranking.lexical_window",
                format!(
                    "lexical_window ({}) must be at least top_k ({})",
                    ranking.lexical_window, ranking.top_k
                ),
            ));
        }

        if ranking.min_title_tokens == 0 {
            errors.push(ValidationError::new(
                "ranking.min_title_tokens",
                "min_title_tokens must be greater than 0",
            ));
        }
    }

    fn validate_embedding(config: &Config, errors: &mut Vec<ValidationError>) {
        let model = &config.embedding.model;

        if model.is_empty() {
            errors.push(ValidationError::new(
                "embedding.model",
                "Model name cannot be empty",
            ));
        } else if !SUPPORTED_MODELS
            .iter()
            .any(|m| m.eq_ignore_ascii_case(model))
        {
            errors.push(ValidationError::new(
                "embedding.model",
                format!(
                    "Unknown model '{}'. Supported: {}",
                    model,
                    SUPPORTED_MODELS.join(", ")
                ),
            ));
        }
    }
}
