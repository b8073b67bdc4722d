//! Integration test: admission, BM25 and semantic reranking end to end
//!
//! Uses a deterministic bag-of-words embedder so the tests run without a
//! model download; the real model is exercised by the ignored test at the end.

use sectionrank::config::RankingConfig;
use sectionrank::document::Heading;
use sectionrank::embedding::{EmbeddingError, EmbeddingProvider, FastEmbedProvider};
use sectionrank::ranking::{admit, rank_lexical, rerank_semantic, ScoredCandidate, SectionRanker};
use std::sync::Arc;

/// Hashes lowercase words into a small fixed-size count vector
struct HashingEmbedder {
    dims: usize,
}

impl HashingEmbedder {
    fn new() -> Self {
        Self { dims: 64 }
    }

    fn bucket(&self, word: &str) -> usize {
        word.bytes()
            .fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize))
            % self.dims
    }
}

impl EmbeddingProvider for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0; self.dims];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[self.bucket(&word.to_lowercase())] += 1.0;
        }
        Ok(vector)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dims
    }

    fn model_name(&self) -> &str {
        "hashing-test"
    }
}

fn travel_headings() -> Vec<Heading> {
    vec![
        Heading::new("Comprehensive Guide to Major Cities in the South of France", 1, 1, "cities.pdf"),
        Heading::new("History", 1, 2, "history.pdf"),
        Heading::new("Coastal Adventures on the Mediterranean Beaches", 1, 2, "things.pdf"),
        Heading::new("Culinary Experiences and Local Wine Tasting", 2, 6, "cuisine.pdf"),
        Heading::new("Nightlife and Entertainment for Groups of Friends", 1, 11, "things.pdf"),
        Heading::new("General Packing Tips and Tricks for Travel", 2, 2, "tips.pdf"),
        Heading::new("Detailed Opening Hours for Every Museum Listed", 3, 4, "cities.pdf"),
        Heading::new("Budget Friendly Hotels for College Students", 1, 8, "hotels.pdf"),
    ]
}

#[test]
fn test_admission_scenario() {
    let accepted = Heading::new("Introduction to Data Systems", 1, 0, "a.pdf");
    let rejected = Heading::new("See page 2", 1, 0, "a.pdf");

    assert!(admit(&accepted));
    assert!(!admit(&rejected));
}

#[test]
fn test_lexical_returns_each_admitted_heading_once() {
    let headings = travel_headings();
    let admitted: Vec<Heading> = headings.iter().filter(|h| admit(h)).cloned().collect();

    let ranked = rank_lexical(&admitted, "plan a trip for college friends with hotels").unwrap();
    assert_eq!(ranked.len(), admitted.len());

    for pair in ranked.windows(2) {
        assert!(pair[0].bm25_score >= pair[1].bm25_score);
    }
    for heading in &admitted {
        let count = ranked.iter().filter(|c| &c.heading == heading).count();
        assert_eq!(count, 1, "{} should appear exactly once", heading.text);
    }
}

#[test]
fn test_rerank_bounded_and_sorted() {
    let headings = travel_headings();
    let admitted: Vec<Heading> = headings.iter().filter(|h| admit(h)).cloned().collect();
    let lexical = rank_lexical(&admitted, "beaches and nightlife for friends").unwrap();

    for k in [0, 1, 3, 10] {
        let reranked = rerank_semantic(
            Arc::new(HashingEmbedder::new()),
            lexical.clone(),
            "beaches and nightlife for friends",
            k,
        )
        .unwrap();

        assert!(reranked.len() <= k);
        assert_eq!(reranked.len(), k.min(lexical.len()));
        for pair in reranked.windows(2) {
            assert!(pair[0].semantic_score >= pair[1].semantic_score);
        }
    }
}

#[test]
fn test_empty_query_returns_first_k_unchanged() {
    let candidates: Vec<ScoredCandidate> = travel_headings()
        .into_iter()
        .filter(|h| admit(h))
        .map(|h| ScoredCandidate::lexical(h, 0.0))
        .collect();

    let reranked = rerank_semantic(Arc::new(HashingEmbedder::new()), candidates.clone(), "", 5).unwrap();

    assert_eq!(reranked.len(), 5);
    for (out, original) in reranked.iter().zip(candidates.iter()) {
        assert_eq!(out.heading, original.heading);
        assert_eq!(out.semantic_score, 0.0);
    }
}

#[test]
fn test_section_ranker_pipeline() {
    let config = RankingConfig {
        top_k: 3,
        lexical_window: 5,
        ..RankingConfig::default()
    };
    let ranker = SectionRanker::new(config, Arc::new(HashingEmbedder::new()));

    let ranked = ranker
        .rank(
            &travel_headings(),
            "As a Travel Planner, find beaches and nightlife for a group of college friends",
        )
        .unwrap();

    assert_eq!(ranked.len(), 3);
    assert!(ranked.iter().all(|c| admit(&c.heading)));
    assert!(ranked
        .iter()
        .all(|c| c.heading.text != "Detailed Opening Hours for Every Museum Listed"));
    for pair in ranked.windows(2) {
        assert!(pair[0].semantic_score >= pair[1].semantic_score);
    }
}

#[test]
fn test_section_ranker_without_query() {
    let ranker = SectionRanker::new(RankingConfig::default(), Arc::new(HashingEmbedder::new()));
    let ranked = ranker.rank(&travel_headings(), "").unwrap();

    let titles: Vec<&str> = ranked.iter().map(|c| c.heading.text.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Comprehensive Guide to Major Cities in the South of France",
            "Coastal Adventures on the Mediterranean Beaches",
            "Culinary Experiences and Local Wine Tasting",
            "Nightlife and Entertainment for Groups of Friends",
            "General Packing Tips and Tricks for Travel",
        ]
    );
    assert!(ranked.iter().all(|c| c.semantic_score == 0.0));
}

#[test]
#[ignore] // Requires model download
fn test_real_model_prefers_paraphrase() {
    let provider = FastEmbedProvider::with_default_model().expect("Failed to initialize model");
    let ranker = SectionRanker::new(RankingConfig::default(), Arc::new(provider));

    let headings = vec![
        Heading::new("Evening Entertainment and Bars for Young Adults", 1, 3, "fun.pdf"),
        Heading::new("Installing Plumbing Fixtures in Old Houses", 1, 1, "diy.pdf"),
        Heading::new("Guide to Nightlife for Groups of Friends", 1, 5, "fun.pdf"),
    ];

    let ranked = ranker
        .rank(&headings, "As a student, find places to go out at night with friends")
        .unwrap();

    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[2].heading.text, "Installing Plumbing Fixtures in Old Houses");
}
