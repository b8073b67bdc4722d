//! Embedding-based reranking of the lexical shortlist

use std::sync::Arc;

use super::{RankError, ScoredCandidate};
use crate::embedding::{cosine_similarity, EmbeddingProvider};

/// Reorders candidates by cosine similarity between title and query embeddings
pub struct SemanticReranker {
    provider: Arc<dyn EmbeddingProvider>,
}

impl SemanticReranker {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { provider }
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Rerank candidates and keep the best `k`
    ///
    /// The lexical score of each candidate is carried through untouched. An
    /// empty query skips embedding entirely: the first `k` candidates are
    /// returned in their given order with a semantic score of 0.
    pub fn rerank(
        &self,
        candidates: Vec<ScoredCandidate>,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredCandidate>, RankError> {
        if query.is_empty() {
            return Ok(candidates
                .into_iter()
                .take(k)
                .map(|mut candidate| {
                    candidate.semantic_score = 0.0;
                    candidate
                })
                .collect());
        }

        if candidates.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.provider.embed(query)?;

        let titles: Vec<String> = candidates.iter().map(|c| c.heading.text.clone()).collect();
        let title_embeddings = self.provider.embed_batch(&titles)?;

        if title_embeddings.len() != candidates.len() {
            return Err(RankError::EmbeddingCount {
                expected: candidates.len(),
                actual: title_embeddings.len(),
            });
        }

        let mut scored: Vec<ScoredCandidate> = candidates
            .into_iter()
            .zip(title_embeddings.iter())
            .map(|(mut candidate, embedding)| {
                candidate.semantic_score = cosine_similarity(&query_embedding, embedding);
                candidate
            })
            .collect();

        scored.sort_by(|a, b| {
            b.semantic_score
                .partial_cmp(&a.semantic_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);

        Ok(scored)
    }
}

/// Rerank `candidates` with `provider`, keeping at most `k`
pub fn rerank_semantic(
    provider: Arc<dyn EmbeddingProvider>,
    candidates: Vec<ScoredCandidate>,
    query: &str,
    k: usize,
) -> Result<Vec<ScoredCandidate>, RankError> {
    SemanticReranker::new(provider).rerank(candidates, query, k)
}
