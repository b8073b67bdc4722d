//! Per-collection result record and its serialization
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SectionRankError};

/// Everything produced for one collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionReport {
    pub collection_name: String,
    pub metadata: ReportMetadata,
    /// Selected sections in final rank order
    pub extracted_sections: Vec<ExtractedSection>,
    /// Reconstructed page text, aligned with `extracted_sections`
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    pub query_used: String,
    pub processing_timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    /// 1-based
    pub importance_rank: usize,
    pub page_number: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    pub page_number: u32,
}

impl CollectionReport {
    /// File name of the record inside the output directory
    pub fn file_name(&self) -> String {
        format!("{}.json", self.collection_name)
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SectionRankError::Json {
            source: e,
            context: format!("Failed to serialize result for {}", self.collection_name),
        })
    }

    /// Write the record to `<output_dir>/<collection_name>.json`
    pub fn write(&self, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir).map_err(|e| SectionRankError::Io {
            source: e,
            context: format!("Failed to create output directory: {:?}", output_dir),
        })?;

        let path = output_dir.join(self.file_name());
        std::fs::write(&path, self.to_json()?).map_err(|e| SectionRankError::Io {
            source: e,
            context: format!("Failed to write result file: {:?}", path),
        })?;

        Ok(path)
    }
}
