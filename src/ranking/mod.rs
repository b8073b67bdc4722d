//! Two-stage section ranking
//!
//! Headings pass through admission, then BM25 over the admitted titles, then
//! embedding similarity over the lexical shortlist. Each stage only ever
//! narrows or reorders what the previous one produced.

mod admission;
mod lexical;
mod semantic;

pub use admission::{admit, AdmissionFilter};
pub use lexical::{rank_lexical, LexicalRanker};
pub use semantic::{rerank_semantic, SemanticReranker};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::RankingConfig;
use crate::document::Heading;
use crate::embedding::{EmbeddingError, EmbeddingProvider};

#[derive(Error, Debug)]
pub enum RankError {
    #[error("Keyword index error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),

    #[error("Keyword index error: {0}")]
    Index(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Embedding count mismatch: expected {expected}, got {actual}")]
    EmbeddingCount { expected: usize, actual: usize },
}

/// A heading carrying the scores assigned to it so far
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub heading: Heading,
    /// BM25 score against the query (higher is better)
    pub bm25_score: f32,
    /// Cosine similarity to the query; 0 until reranked
    pub semantic_score: f32,
}

impl ScoredCandidate {
    pub fn lexical(heading: Heading, bm25_score: f32) -> Self {
        Self {
            heading,
            bm25_score,
            semantic_score: 0.0,
        }
    }
}

/// Runs the full ranking pipeline with one configuration and one model
///
/// Built once per process and reused for every collection.
pub struct SectionRanker {
    config: RankingConfig,
    admission: AdmissionFilter,
    lexical: LexicalRanker,
    semantic: SemanticReranker,
}

impl SectionRanker {
    pub fn new(config: RankingConfig, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            admission: AdmissionFilter::from_config(&config),
            lexical: LexicalRanker::from_config(&config),
            semantic: SemanticReranker::new(provider),
            config,
        }
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    /// Rank headings against the query, returning at most `top_k` sections
    ///
    /// With an empty query there is nothing to score against: the first
    /// `top_k` admitted headings are returned in extraction order with zero
    /// scores.
    pub fn rank(
        &self,
        headings: &[Heading],
        query: &str,
    ) -> Result<Vec<ScoredCandidate>, RankError> {
        let admitted: Vec<Heading> = self
            .admission
            .filter(headings)
            .into_iter()
            .cloned()
            .collect();

        tracing::debug!(
            "Admitted {} of {} headings",
            admitted.len(),
            headings.len()
        );

        if query.is_empty() {
            tracing::info!("Skipping ranking: no query. Using admitted headings in extraction order");
            let passthrough = admitted
                .into_iter()
                .map(|h| ScoredCandidate::lexical(h, 0.0))
                .collect();
            return self.semantic.rerank(passthrough, query, self.config.top_k);
        }

        let mut shortlist = self.lexical.rank(&admitted, query)?;
        shortlist.truncate(self.config.lexical_window);

        tracing::info!(
            "Reranking {} candidates semantically (top {}) with {}",
            shortlist.len(),
            self.config.top_k,
            self.semantic.model_name()
        );

        self.semantic.rerank(shortlist, query, self.config.top_k)
    }
}
