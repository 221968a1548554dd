//! Answer-evaluation stage — scores supplied answers against the generated
//! question set in a single generation call.
//!
//! One bundle per question pairs the question, its expected outline, and
//! the supplied answer (empty string when the candidate skipped it). The
//! provider must return one detailed item per bundle in the same order;
//! this stage verifies that contract and never reorders or re-keys on the
//! provider's behalf — a mismatch is a schema violation, not something to
//! silently patch.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::errors::PipelineError;
use crate::llm_client::{generate_structured, Generator};
use crate::models::{AnswerEvaluationResult, QuestionSet};
use crate::retrieval::{join_context, Retriever, JD_COLLECTION};
use crate::stages::prompts::{EVALUATION_PROMPT_TEMPLATE, EVALUATION_SYSTEM};

const EVALUATION_CONTEXT_K: usize = 6;

/// One question/answer pair sent to the evaluator.
#[derive(Debug, Serialize)]
struct EvaluationBundle<'a> {
    question: &'a str,
    skill_tested: &'a str,
    expected_answer_outline: &'a [String],
    answer: &'a str,
}

pub struct AnswerEvaluationStage {
    generator: Arc<dyn Generator>,
    retriever: Arc<dyn Retriever>,
}

impl AnswerEvaluationStage {
    pub fn new(generator: Arc<dyn Generator>, retriever: Arc<dyn Retriever>) -> Self {
        Self {
            generator,
            retriever,
        }
    }

    /// Evaluates `answers` (question text → answer text; missing keys are
    /// unanswered) against `questions`.
    pub async fn run(
        &self,
        candidate_id: &str,
        jd_query: &str,
        questions: &QuestionSet,
        answers: &BTreeMap<String, String>,
    ) -> Result<AnswerEvaluationResult, PipelineError> {
        let jd_chunks = self
            .retriever
            .query(JD_COLLECTION, jd_query, EVALUATION_CONTEXT_K, None)
            .await?;
        let jd_context = join_context(&jd_chunks);

        let bundles: Vec<EvaluationBundle<'_>> = questions
            .questions
            .iter()
            .map(|q| EvaluationBundle {
                question: &q.question,
                skill_tested: &q.skill_tested,
                expected_answer_outline: &q.expected_answer_outline,
                answer: answers.get(&q.question).map(String::as_str).unwrap_or(""),
            })
            .collect();
        let bundles_json = serde_json::to_string_pretty(&bundles)?;

        let prompt = EVALUATION_PROMPT_TEMPLATE
            .replace("{jd_context}", &jd_context)
            .replace("{candidate_id}", candidate_id)
            .replace("{bundles_json}", &bundles_json);

        let result: AnswerEvaluationResult =
            generate_structured(self.generator.as_ref(), &prompt, EVALUATION_SYSTEM).await?;

        verify_alignment(questions, &result)?;
        info!(
            "Evaluated {} answers for '{}': {}/100, verdict {:?}",
            result.detailed.len(),
            candidate_id,
            result.overall_score,
            result.final_verdict
        );

        Ok(result)
    }
}

/// The detailed sequence must mirror the question set: same length, same
/// order, question text verbatim.
fn verify_alignment(
    questions: &QuestionSet,
    result: &AnswerEvaluationResult,
) -> Result<(), PipelineError> {
    if result.detailed.len() != questions.questions.len() {
        return Err(PipelineError::SchemaViolation(format!(
            "evaluation returned {} items for {} questions",
            result.detailed.len(),
            questions.questions.len()
        )));
    }
    for (item, question) in result.detailed.iter().zip(&questions.questions) {
        if item.question != question.question {
            return Err(PipelineError::SchemaViolation(format!(
                "evaluation item order mismatch: expected '{}', got '{}'",
                question.question, item.question
            )));
        }
    }
    Ok(())
}
