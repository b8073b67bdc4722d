//! sectionrank - persona-driven section ranking for document collections
//!
//! Selects, from a batch of multi-page documents, the few sections most
//! relevant to a persona and a job to be done, and rebuilds the text of the
//! page each selected section sits on. Ranking is two-staged: BM25 over the
//! admitted heading titles narrows the field, then embedding similarity
//! reorders the shortlist.

pub mod assembly;
pub mod cli;
pub mod collection;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod ranking;

pub use error::{Result, SectionRankError};
