//! Outline extraction boundary
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{Outline, RawOutline};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("No outline found for {document} (expected {path})")]
    OutlineNotFound { document: String, path: PathBuf },

    #[error("Failed to read outline {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed outline {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Produces the headings and text spans of one document
///
/// Implementations must not panic on bad input; a failure for one document
/// is reported through the returned error and never affects its siblings.
pub trait OutlineExtractor {
    fn extract(&self, path: &Path, document_id: &str) -> Result<Outline, ExtractError>;
}

/// Reads outlines precomputed by an external layout tool
///
/// For `report.pdf` the outline is expected at `report.json`, either next to
/// the PDF or inside `outline_dir` when one is configured.
#[derive(Debug, Clone, Default)]
pub struct JsonOutlineExtractor {
    outline_dir: Option<PathBuf>,
}

impl JsonOutlineExtractor {
    pub fn new(outline_dir: Option<PathBuf>) -> Self {
        Self { outline_dir }
    }

    /// Location of the outline file for a document
    pub fn outline_path(&self, path: &Path) -> PathBuf {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = format!("{}.json", stem);

        match &self.outline_dir {
            Some(dir) => dir.join(file_name),
            None => path.with_file_name(file_name),
        }
    }
}

impl OutlineExtractor for JsonOutlineExtractor {
    fn extract(&self, path: &Path, document_id: &str) -> Result<Outline, ExtractError> {
        let outline_path = self.outline_path(path);
        if !outline_path.exists() {
            return Err(ExtractError::OutlineNotFound {
                document: document_id.to_string(),
                path: outline_path,
            });
        }

        let content = std::fs::read_to_string(&outline_path).map_err(|e| ExtractError::Io {
            path: outline_path.clone(),
            source: e,
        })?;

        let raw: RawOutline = serde_json::from_str(&content).map_err(|e| ExtractError::Parse {
            path: outline_path.clone(),
            source: e,
        })?;

        let outline = Outline::from_raw(raw, document_id);
        tracing::debug!(
            "Loaded outline for {}: {} headings, {} spans",
            document_id,
            outline.headings.len(),
            outline.spans.len()
        );

        Ok(outline)
    }
}
