//! BM25 ranking of heading titles using an in-memory tantivy index
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Schema, Value, INDEXED, STORED, TEXT};
use tantivy::tokenizer::TokenStream;
use tantivy::{doc, Index, IndexWriter, TantivyDocument, Term};

use super::{RankError, ScoredCandidate};
use crate::config::RankingConfig;
use crate::document::Heading;

/// Writer arena size; tantivy requires at least 15MB per writer thread
const WRITER_MEMORY_BYTES: usize = 20_000_000;

/// Scores titles against a query with BM25 over the titles themselves
///
/// The corpus is exactly the candidate titles of one call, so term
/// statistics reflect how rare a word is among the competing headings.
#[derive(Debug, Clone, Copy)]
pub struct LexicalRanker {
    min_title_tokens: usize,
}

impl LexicalRanker {
    pub fn new(min_title_tokens: usize) -> Self {
        Self { min_title_tokens }
    }

    pub fn from_config(config: &RankingConfig) -> Self {
        Self::new(config.min_title_tokens)
    }

    /// Score every heading and return them sorted by descending BM25 score
    ///
    /// Titles shorter than the minimum token count are dropped. Equal scores
    /// keep their input order.
    pub fn rank(&self, headings: &[Heading], query: &str) -> Result<Vec<ScoredCandidate>, RankError> {
        let corpus: Vec<&Heading> = headings
            .iter()
            .filter(|h| h.token_count() >= self.min_title_tokens)
            .collect();

        if corpus.is_empty() {
            return Ok(Vec::new());
        }

        let index = TitleIndex::build(&corpus)?;
        let query_tokens = index.tokenize(query)?;
        let scores = if query_tokens.is_empty() {
            vec![0.0; corpus.len()]
        } else {
            index.score(&query_tokens)?
        };

        let mut ranked: Vec<ScoredCandidate> = corpus
            .into_iter()
            .zip(scores)
            .map(|(heading, score)| ScoredCandidate::lexical(heading.clone(), score))
            .collect();

        // Stable sort: ties stay in extraction order
        ranked.sort_by(|a, b| {
            b.bm25_score
                .partial_cmp(&a.bm25_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::debug!(
            "Lexical ranking scored {} titles against {} query tokens",
            ranked.len(),
            query_tokens.len()
        );

        Ok(ranked)
    }
}

impl Default for LexicalRanker {
    fn default() -> Self {
        Self::from_config(&RankingConfig::default())
    }
}

/// Lexical ranking with the default title-length guard
pub fn rank_lexical(headings: &[Heading], query: &str) -> Result<Vec<ScoredCandidate>, RankError> {
    LexicalRanker::default().rank(headings, query)
}

/// Throwaway index over one batch of titles; document ids are corpus positions
struct TitleIndex {
    index: Index,
    id_field: Field,
    text_field: Field,
    len: usize,
}

impl TitleIndex {
    fn build(corpus: &[&Heading]) -> Result<Self, RankError> {
        let mut schema_builder = Schema::builder();
        let id_field = schema_builder.add_u64_field("id", INDEXED | STORED);
        let text_field = schema_builder.add_text_field("text", TEXT);
        let schema = schema_builder.build();

        let index = Index::create_in_ram(schema);
        let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;

        for (position, heading) in corpus.iter().enumerate() {
            writer.add_document(doc!(
                id_field => position as u64,
                text_field => heading.text.as_str(),
            ))?;
        }
        writer.commit()?;

        Ok(Self {
            index,
            id_field,
            text_field,
            len: corpus.len(),
        })
    }

    /// Split text with the same analyzer the titles were indexed with
    /// (alphanumeric runs, lowercased)
    fn tokenize(&self, text: &str) -> Result<Vec<String>, RankError> {
        let mut analyzer = self.index.tokenizer_for_field(self.text_field)?;
        let mut stream = analyzer.token_stream(text);

        let mut tokens = Vec::new();
        while stream.advance() {
            tokens.push(stream.token().text.clone());
        }
        Ok(tokens)
    }

    /// BM25 score per corpus position; titles matching no token score 0
    fn score(&self, query_tokens: &[String]) -> Result<Vec<f32>, RankError> {
        let reader = self.index.reader()?;
        let searcher = reader.searcher();

        // One SHOULD clause per token, so repeated query words weigh more
        let clauses: Vec<(Occur, Box<dyn Query>)> = query_tokens
            .iter()
            .map(|token| {
                let term = Term::from_field_text(self.text_field, token);
                let query: Box<dyn Query> =
                    Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                (Occur::Should, query)
            })
            .collect();
        let query = BooleanQuery::new(clauses);

        let top_docs = searcher.search(&query, &TopDocs::with_limit(self.len))?;

        let mut scores = vec![0.0; self.len];
        for (score, doc_address) in top_docs {
            let retrieved: TantivyDocument = searcher.doc(doc_address)?;
            let position = retrieved
                .get_first(self.id_field)
                .and_then(|v| v.as_u64())
                .ok_or_else(|| RankError::Index("Missing or invalid id field".to_string()))?;

            let slot = scores.get_mut(position as usize).ok_or_else(|| {
                RankError::Index(format!("Document id {} outside corpus", position))
            })?;
            *slot = score;
        }

        Ok(scores)
    }
}
