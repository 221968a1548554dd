//! Question-generation stage — one generation call producing the interview
//! question set for the selected candidate.
//!
//! Retrieval uses a wider k than screening: questions must span more of the
//! role than a single match score does. The output's question texts become
//! lookup keys for answer collection and evaluation, so they are carried
//! verbatim from here on.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::llm_client::{generate_structured, Generator};
use crate::models::QuestionSet;
use crate::retrieval::{join_context, Retriever, JD_COLLECTION};
use crate::stages::prompts::{QUESTIONS_PROMPT_TEMPLATE, QUESTIONS_SYSTEM};

/// Wider than screening's k — question coverage needs more of the JD.
const QUESTIONS_CONTEXT_K: usize = 8;

pub struct QuestionGenerationStage {
    generator: Arc<dyn Generator>,
    retriever: Arc<dyn Retriever>,
}

impl QuestionGenerationStage {
    pub fn new(generator: Arc<dyn Generator>, retriever: Arc<dyn Retriever>) -> Self {
        Self {
            generator,
            retriever,
        }
    }

    /// Generates `num_questions` questions for `candidate_id`. The count is
    /// best-effort: a provider returning a different count is logged, not
    /// failed, and downstream contracts key off the actual set length.
    pub async fn run(
        &self,
        candidate_id: &str,
        jd_query: &str,
        num_questions: usize,
    ) -> Result<QuestionSet, PipelineError> {
        let jd_chunks = self
            .retriever
            .query(JD_COLLECTION, jd_query, QUESTIONS_CONTEXT_K, None)
            .await?;
        let jd_context = join_context(&jd_chunks);

        let prompt = QUESTIONS_PROMPT_TEMPLATE
            .replace("{jd_context}", &jd_context)
            .replace("{candidate_id}", candidate_id)
            .replace("{num_questions}", &num_questions.to_string());

        let set: QuestionSet =
            generate_structured(self.generator.as_ref(), &prompt, QUESTIONS_SYSTEM).await?;

        if set.questions.len() != num_questions {
            warn!(
                "Requested {} questions, provider returned {}",
                num_questions,
                set.questions.len()
            );
        }
        info!(
            "Generated {} interview questions for '{}'",
            set.questions.len(),
            set.candidate_id
        );

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_support::{EmptyRetriever, ScriptedGenerator};
    use serde_json::json;

    #[tokio::test]
    async fn test_returns_requested_question_count() {
        let questions: Vec<_> = (0..6)
            .map(|i| {
                json!({
                    "question": format!("Q{i}?"),
                    "skill_tested": "rust",
                    "expected_answer_outline": ["a", "b"]
                })
            })
            .collect();
        let generator = Arc::new(ScriptedGenerator::new(vec![json!({
            "candidate_id": "alice",
            "questions": questions
        })]));
        let stage = QuestionGenerationStage::new(generator, Arc::new(EmptyRetriever));

        let set = stage.run("alice", "rust engineer", 6).await.unwrap();
        assert_eq!(set.questions.len(), 6);
        assert_eq!(set.candidate_id, "alice");
    }

    #[tokio::test]
    async fn test_malformed_question_set_is_schema_violation() {
        let generator = Arc::new(ScriptedGenerator::new(vec![json!({
            "candidate_id": "alice",
            "questions": [{"question": "Q?", "skill_tested": "rust", "expected_answer_outline": []}]
        })]));
        let stage = QuestionGenerationStage::new(generator, Arc::new(EmptyRetriever));

        let err = stage.run("alice", "rust engineer", 1).await;
        assert!(matches!(err, Err(PipelineError::SchemaViolation(_))));
    }
}
