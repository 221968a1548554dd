//! Retrieval Provider — the interface stages use to pull grounding text.
//!
//! Two call shapes matter: an unfiltered query over the job-description
//! collection, and a candidate-filtered query over the resume collection so
//! one candidate's resume never bleeds into another's context.
//!
//! Chunks are transient: produced per call, concatenated into a context
//! string, handed to the generation provider, dropped.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

pub mod keyword;

pub use keyword::KeywordRetriever;

/// Collection holding job-description chunks.
pub const JD_COLLECTION: &str = "job_description";
/// Collection holding resume chunks, one candidate per `candidate_id`.
pub const RESUME_COLLECTION: &str = "resumes";

/// What kind of document a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Jd,
    Resume,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub doc_type: DocType,
    pub source_file: String,
    /// Set for resume chunks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,
}

/// An opaque text fragment plus its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// Equality predicate over chunk metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataFilter {
    CandidateId(String),
}

impl MetadataFilter {
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        match self {
            MetadataFilter::CandidateId(id) => metadata.candidate_id.as_deref() == Some(id),
        }
    }
}

/// The retrieval seam. Production is the in-memory keyword index; tests
/// substitute stubs the same way they do for the generator.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Adds chunks to a collection. Later queries rank against everything
    /// ingested so far.
    async fn ingest(
        &self,
        collection: &str,
        chunks: Vec<RetrievalChunk>,
    ) -> Result<(), PipelineError>;

    /// Returns up to `k` chunks ranked by similarity to `query`, most
    /// similar first. An empty result is valid — empty corpus or nothing
    /// relevant — and is not an error.
    async fn query(
        &self,
        collection: &str,
        query: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<RetrievalChunk>, PipelineError>;
}

/// Concatenates chunk texts in rank order into the context string handed to
/// the generation provider. Empty input yields an empty context.
pub fn join_context(chunks: &[RetrievalChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
