//! Embedding generation for the semantic reranker
//!
//! Architecture:
//! - EmbeddingProvider trait for abstraction (real model or test doubles)
//! - FastEmbedProvider for local embedding (all-MiniLM-L6-v2, 384-dim by default)
//! - cosine_similarity for scoring embeddings against each other

mod provider;

pub use provider::{EmbeddingError, EmbeddingProvider, FastEmbedProvider, SUPPORTED_MODELS};

/// Cosine similarity between two embeddings
///
/// Returns 0.0 for mismatched lengths or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        0.0
    } else {
        dot / (mag_a * mag_b)
    }
}
