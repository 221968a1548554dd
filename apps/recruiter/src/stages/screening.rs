//! Screening stage — ranks every candidate against the job description.
//!
//! Flow: retrieve JD context once (shared across candidates) → per
//! candidate, retrieve that candidate's resume context and request exactly
//! one CandidateMatch → stable-sort descending by match_score.
//!
//! Failure policy: one failed generation aborts the whole stage. There is
//! no partial ranking; callers wanting resilience retry the stage.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::llm_client::{generate_structured, Generator};
use crate::models::{CandidateMatch, ScreeningResult};
use crate::retrieval::{
    join_context, MetadataFilter, Retriever, JD_COLLECTION, RESUME_COLLECTION,
};
use crate::stages::prompts::{SCREENING_PROMPT_TEMPLATE, SCREENING_SYSTEM};

/// Chunks of JD and resume context fetched per screening call.
const SCREENING_CONTEXT_K: usize = 6;

pub struct ScreeningStage {
    generator: Arc<dyn Generator>,
    retriever: Arc<dyn Retriever>,
}

impl ScreeningStage {
    pub fn new(generator: Arc<dyn Generator>, retriever: Arc<dyn Retriever>) -> Self {
        Self {
            generator,
            retriever,
        }
    }

    /// Screens `candidate_ids` against the JD reachable via `jd_query`.
    /// An empty candidate list is not an error: it yields an empty ranking,
    /// which the orchestrator turns into a short-circuited run.
    pub async fn run(
        &self,
        jd_query: &str,
        candidate_ids: &[String],
    ) -> Result<ScreeningResult, PipelineError> {
        if candidate_ids.is_empty() {
            warn!("No candidates supplied; screening produces an empty ranking");
            return Ok(ScreeningResult::from_matches(Vec::new()));
        }

        let jd_chunks = self
            .retriever
            .query(JD_COLLECTION, jd_query, SCREENING_CONTEXT_K, None)
            .await?;
        let jd_context = join_context(&jd_chunks);

        let mut matches = Vec::with_capacity(candidate_ids.len());

        for candidate_id in candidate_ids {
            let filter = MetadataFilter::CandidateId(candidate_id.clone());
            let resume_chunks = self
                .retriever
                .query(
                    RESUME_COLLECTION,
                    jd_query,
                    SCREENING_CONTEXT_K,
                    Some(&filter),
                )
                .await?;
            let resume_context = join_context(&resume_chunks);

            let prompt = SCREENING_PROMPT_TEMPLATE
                .replace("{jd_context}", &jd_context)
                .replace("{resume_context}", &resume_context)
                .replace("{candidate_id}", candidate_id);

            let m: CandidateMatch =
                generate_structured(self.generator.as_ref(), &prompt, SCREENING_SYSTEM).await?;
            info!(
                "Screened candidate '{}': {}/100",
                m.candidate_id, m.match_score
            );
            matches.push(m);
        }

        Ok(ScreeningResult::from_matches(matches))
    }
}
