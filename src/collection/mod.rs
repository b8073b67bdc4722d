//! Collection processing: discovery, extraction, ranking and report assembly
//!
//! A collection is a directory of PDFs plus `persona.txt` and `job.txt`.
//! Failures are contained at the smallest boundary possible: a document that
//! can't be extracted only loses its own headings, and a collection that
//! can't be ranked or written never stops the rest of the run.

mod query;
mod report;

pub use query::{read_prompt_file, synthesize_query, JOB_FILE, PERSONA_FILE};
pub use report::{CollectionReport, ExtractedSection, ReportMetadata, SubsectionAnalysis};

use std::path::{Path, PathBuf};

use crate::assembly::assemble_page_text;
use crate::document::{new_span_map, ExtractError, Heading, Outline, OutlineExtractor, SpanMap};
use crate::error::{Result, SectionRankError};
use crate::ranking::SectionRanker;

/// Heading dump written into a collection while it is processed
pub const HEADING_SNAPSHOT_FILE: &str = ".temp_headings.json";

/// Extraction result for a single document
#[derive(Debug)]
pub struct DocumentOutcome {
    pub document: String,
    pub result: std::result::Result<Outline, ExtractError>,
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub collections: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Sub-directories of `input_dir`, sorted by name
pub fn discover_collections(input_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(input_dir).map_err(|e| SectionRankError::Io {
        source: e,
        context: format!("Failed to read input directory: {:?}", input_dir),
    })?;

    let mut collections: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    collections.sort();

    Ok(collections)
}

/// PDF file names in a collection (case-insensitive extension), sorted
pub fn list_documents(collection: &Path) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(collection).map_err(|e| SectionRankError::Io {
        source: e,
        context: format!("Failed to read collection directory: {:?}", collection),
    })?;

    let mut documents: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.to_lowercase().ends_with(".pdf"))
        .collect();
    documents.sort();

    Ok(documents)
}

/// Remove heading snapshots left in the given collections
pub fn cleanup_snapshots(collections: &[PathBuf]) {
    for collection in collections {
        let snapshot = collection.join(HEADING_SNAPSHOT_FILE);
        if !snapshot.exists() {
            tracing::debug!("No temporary file found in {}", collection.display());
            continue;
        }
        if let Err(e) = std::fs::remove_file(&snapshot) {
            tracing::warn!(
                "Error removing temporary file {}: {}",
                snapshot.display(),
                e
            );
        }
    }
}

fn collection_name(collection: &Path) -> String {
    collection
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| collection.display().to_string())
}

/// Local time as RFC 3339 with microseconds and the UTC offset
fn processing_timestamp() -> String {
    chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, false)
}

/// Turns collection directories into result records
pub struct CollectionProcessor {
    ranker: SectionRanker,
    extractor: Box<dyn OutlineExtractor>,
    write_snapshot: bool,
}

impl CollectionProcessor {
    pub fn new(ranker: SectionRanker, extractor: Box<dyn OutlineExtractor>) -> Self {
        Self {
            ranker,
            extractor,
            write_snapshot: false,
        }
    }

    /// Dump extracted headings to [`HEADING_SNAPSHOT_FILE`] in each collection
    pub fn with_heading_snapshot(mut self, enabled: bool) -> Self {
        self.write_snapshot = enabled;
        self
    }

    /// Extract every document, keeping one outcome per document
    pub fn extract_documents(&self, collection: &Path, documents: &[String]) -> Vec<DocumentOutcome> {
        documents
            .iter()
            .map(|document| {
                let path = collection.join(document);
                tracing::info!("Extracting outline from: {}", path.display());
                DocumentOutcome {
                    document: document.clone(),
                    result: self.extractor.extract(&path, document),
                }
            })
            .collect()
    }

    /// Process one collection
    ///
    /// Returns `Ok(None)` when the collection has no PDFs or no document
    /// yielded any heading; nothing should be written for it then.
    pub fn process(&self, collection: &Path) -> Result<Option<CollectionReport>> {
        let name = collection_name(collection);
        let documents = list_documents(collection)?;
        if documents.is_empty() {
            tracing::info!("No PDFs in {}, skipping", collection.display());
            return Ok(None);
        }

        let persona = read_prompt_file(&collection.join(PERSONA_FILE));
        let job = read_prompt_file(&collection.join(JOB_FILE));
        let query = synthesize_query(&persona, &job);
        if query.is_empty() {
            tracing::warn!(
                "No valid query could be formed for {}. Headings will not be ranked",
                collection.display()
            );
        }

        let (headings, span_map) = self.gather(self.extract_documents(collection, &documents));
        if headings.is_empty() {
            tracing::warn!(
                "No headings found in any PDF in {}. Skipping ranking and output for this collection",
                collection.display()
            );
            return Ok(None);
        }

        if self.write_snapshot {
            self.write_heading_snapshot(collection, &headings);
        }

        let ranked = self.ranker.rank(&headings, &query)?;

        let mut extracted_sections = Vec::with_capacity(ranked.len());
        let mut subsection_analysis = Vec::with_capacity(ranked.len());

        for (position, candidate) in ranked.into_iter().enumerate() {
            let heading = candidate.heading;
            let refined_text = assemble_page_text(&span_map, &heading.source, heading.page);
            if refined_text.is_empty() {
                tracing::warn!(
                    "No page text found for {}, page {}, section '{}'",
                    heading.source,
                    heading.page,
                    heading.text
                );
            }

            subsection_analysis.push(SubsectionAnalysis {
                document: heading.source.clone(),
                refined_text,
                page_number: heading.page,
            });
            extracted_sections.push(ExtractedSection {
                document: heading.source,
                section_title: heading.text,
                importance_rank: position + 1,
                page_number: heading.page,
            });
        }

        Ok(Some(CollectionReport {
            collection_name: name,
            metadata: ReportMetadata {
                input_documents: documents,
                persona,
                job_to_be_done: job,
                query_used: query,
                processing_timestamp: processing_timestamp(),
            },
            extracted_sections,
            subsection_analysis,
        }))
    }

    /// Process every collection under `input_dir`, writing records to `output_dir`
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<RunSummary> {
        let collections = discover_collections(input_dir)?;
        let mut summary = RunSummary {
            collections: collections.len(),
            ..RunSummary::default()
        };

        if collections.is_empty() {
            tracing::info!("No collections found in {}", input_dir.display());
            return Ok(summary);
        }

        for collection in &collections {
            tracing::info!("Processing collection: {}", collection.display());
            match self.process(collection) {
                Ok(Some(report)) => match report.write(output_dir) {
                    Ok(path) => {
                        tracing::info!("Wrote {}", path.display());
                        summary.written += 1;
                    }
                    Err(e) => {
                        tracing::error!(
                            "Error saving final result for {}: {}",
                            report.collection_name,
                            e
                        );
                        summary.failed += 1;
                    }
                },
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    tracing::error!("Failed to process {}: {}", collection.display(), e);
                    summary.failed += 1;
                }
            }
        }

        cleanup_snapshots(&collections);

        Ok(summary)
    }

    /// Merge successful outcomes into one heading list and a span map
    fn gather(&self, outcomes: Vec<DocumentOutcome>) -> (Vec<Heading>, SpanMap) {
        let mut headings = Vec::new();
        let mut span_map = new_span_map();

        for outcome in outcomes {
            match outcome.result {
                Ok(outline) => {
                    headings.extend(outline.headings);
                    span_map.insert(outcome.document, outline.spans);
                }
                Err(e) => {
                    tracing::warn!("Error extracting outline from {}: {}", outcome.document, e);
                }
            }
        }

        (headings, span_map)
    }

    fn write_heading_snapshot(&self, collection: &Path, headings: &[Heading]) {
        let path = collection.join(HEADING_SNAPSHOT_FILE);
        let written = serde_json::to_string_pretty(headings)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(&path, json).map_err(|e| e.to_string()));

        if let Err(e) = written {
            tracing::warn!("Error saving temporary headings file {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_documents_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        for name in ["b.pdf", "A.PDF", "notes.txt", "persona.txt", "c.Pdf"] {
            std::fs::write(temp.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(temp.path().join("dir.pdf")).unwrap();

        let documents = list_documents(temp.path()).unwrap();
        assert_eq!(documents, vec!["A.PDF", "b.pdf", "c.Pdf"]);
    }

    #[test]
    fn test_discover_collections() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("second")).unwrap();
        std::fs::create_dir(temp.path().join("first")).unwrap();
        std::fs::write(temp.path().join("stray.txt"), b"").unwrap();

        let collections = discover_collections(temp.path()).unwrap();
        let names: Vec<String> = collections.iter().map(|c| collection_name(c)).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[test]
    fn test_discover_missing_input_dir() {
        let result = discover_collections(Path::new("/nonexistent/input_docs"));
        assert!(matches!(result, Err(SectionRankError::Io { .. })));
    }

    #[test]
    fn test_processing_timestamp_is_rfc3339() {
        let stamp = processing_timestamp();
        let parsed = chrono::DateTime::parse_from_rfc3339(&stamp).unwrap();
        assert_eq!(parsed.timestamp_subsec_nanos() % 1_000, 0);
        assert!(!stamp.ends_with('Z'));
    }

    #[test]
    fn test_cleanup_snapshots() {
        let temp = TempDir::new().unwrap();
        let with = temp.path().join("with");
        let without = temp.path().join("without");
        std::fs::create_dir(&with).unwrap();
        std::fs::create_dir(&without).unwrap();
        std::fs::write(with.join(HEADING_SNAPSHOT_FILE), "[]").unwrap();

        cleanup_snapshots(&[with.clone(), without]);
        assert!(!with.join(HEADING_SNAPSHOT_FILE).exists());
    }
}
