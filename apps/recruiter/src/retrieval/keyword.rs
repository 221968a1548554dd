//! In-memory keyword retriever — the default `Retriever` backend.
//!
//! Pure-Rust, fast, deterministic, fully testable. Chunks are ranked by
//! cosine similarity between lowercase term-frequency maps of the query and
//! the chunk text. Ties break by ingestion order, so ranking is stable
//! within one index build. A vector-store backend can replace this behind
//! the same trait without touching any stage.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::errors::PipelineError;
use crate::retrieval::{MetadataFilter, RetrievalChunk, Retriever};

struct StoredChunk {
    chunk: RetrievalChunk,
    terms: HashMap<String, f32>,
    norm: f32,
}

#[derive(Default)]
pub struct KeywordRetriever {
    collections: RwLock<HashMap<String, Vec<StoredChunk>>>,
}

impl KeywordRetriever {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Retriever for KeywordRetriever {
    async fn ingest(
        &self,
        collection: &str,
        chunks: Vec<RetrievalChunk>,
    ) -> Result<(), PipelineError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| PipelineError::Validation("retrieval index lock poisoned".to_string()))?;
        let stored = collections.entry(collection.to_string()).or_default();
        for chunk in chunks {
            let terms = term_frequencies(&chunk.text);
            let norm = vector_norm(&terms);
            stored.push(StoredChunk { chunk, terms, norm });
        }
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        query: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> Result<Vec<RetrievalChunk>, PipelineError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| PipelineError::Validation("retrieval index lock poisoned".to_string()))?;

        let Some(stored) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let query_terms = term_frequencies(query);
        let query_norm = vector_norm(&query_terms);

        let mut scored: Vec<(f32, usize)> = stored
            .iter()
            .enumerate()
            .filter(|(_, s)| filter.map_or(true, |f| f.matches(&s.chunk.metadata)))
            .map(|(i, s)| (cosine(&query_terms, query_norm, &s.terms, s.norm), i))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        // Descending score, ascending ingestion index on ties.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, i)| stored[i].chunk.clone())
            .collect())
    }
}

fn term_frequencies(text: &str) -> HashMap<String, f32> {
    let mut terms: HashMap<String, f32> = HashMap::new();
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
    {
        *terms.entry(token.to_lowercase()).or_insert(0.0) += 1.0;
    }
    terms
}

fn vector_norm(terms: &HashMap<String, f32>) -> f32 {
    terms.values().map(|v| v * v).sum::<f32>().sqrt()
}

fn cosine(a: &HashMap<String, f32>, a_norm: f32, b: &HashMap<String, f32>, b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = a
        .iter()
        .filter_map(|(term, av)| b.get(term).map(|bv| av * bv))
        .sum();
    dot / (a_norm * b_norm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::{ChunkMetadata, DocType, RESUME_COLLECTION};

    fn resume_chunk(text: &str, candidate_id: &str) -> RetrievalChunk {
        RetrievalChunk {
            text: text.to_string(),
            metadata: ChunkMetadata {
                doc_type: DocType::Resume,
                source_file: format!("{candidate_id}.txt"),
                candidate_id: Some(candidate_id.to_string()),
            },
        }
    }

    #[tokio::test]
    async fn test_most_similar_chunk_ranks_first() {
        let retriever = KeywordRetriever::new();
        retriever
            .ingest(
                RESUME_COLLECTION,
                vec![
                    resume_chunk("ten years of gardening and landscaping", "a"),
                    resume_chunk("rust systems programming and async tokio services", "a"),
                ],
            )
            .await
            .unwrap();

        let results = retriever
            .query(RESUME_COLLECTION, "rust async programming", 2, None)
            .await
            .unwrap();
        assert!(results[0].text.contains("rust systems"));
    }

    #[tokio::test]
    async fn test_candidate_filter_isolates_resumes() {
        let retriever = KeywordRetriever::new();
        retriever
            .ingest(
                RESUME_COLLECTION,
                vec![
                    resume_chunk("rust engineer with kafka experience", "alice"),
                    resume_chunk("rust engineer with kubernetes experience", "bob"),
                ],
            )
            .await
            .unwrap();

        let filter = MetadataFilter::CandidateId("alice".to_string());
        let results = retriever
            .query(RESUME_COLLECTION, "rust engineer", 10, Some(&filter))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata.candidate_id.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_ties_keep_ingestion_order() {
        let retriever = KeywordRetriever::new();
        retriever
            .ingest(
                RESUME_COLLECTION,
                vec![
                    resume_chunk("rust rust", "first"),
                    resume_chunk("rust rust", "second"),
                ],
            )
            .await
            .unwrap();

        let results = retriever
            .query(RESUME_COLLECTION, "rust", 2, None)
            .await
            .unwrap();
        assert_eq!(results[0].metadata.candidate_id.as_deref(), Some("first"));
        assert_eq!(results[1].metadata.candidate_id.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_unknown_collection_returns_empty() {
        let retriever = KeywordRetriever::new();
        let results = retriever.query("nope", "anything", 5, None).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_k_larger_than_corpus_returns_all_matches() {
        let retriever = KeywordRetriever::new();
        retriever
            .ingest(RESUME_COLLECTION, vec![resume_chunk("rust", "a")])
            .await
            .unwrap();
        let results = retriever
            .query(RESUME_COLLECTION, "rust", 100, None)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_no_term_overlap_yields_empty_result() {
        let retriever = KeywordRetriever::new();
        retriever
            .ingest(RESUME_COLLECTION, vec![resume_chunk("gardening", "a")])
            .await
            .unwrap();
        let results = retriever
            .query(RESUME_COLLECTION, "kubernetes", 5, None)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
