//! Learning-plan stage — synthesizes a remediation plan from screening gaps
//! and interview weak points.
//!
//! Weak points are the missing_points of every evaluation item scored at or
//! below the weak threshold. Duplicates are kept deliberately: a point
//! missed across several questions should weigh more in the plan prompt.

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::llm_client::{generate_structured, Generator};
use crate::models::{AnswerEvaluationResult, LearningPlan, ScreeningResult};
use crate::stages::prompts::{LEARNING_PLAN_PROMPT_TEMPLATE, LEARNING_PLAN_SYSTEM};

/// Default per-question score at or below which missing points feed the
/// plan. 6/10 is convention; override via `WEAK_SCORE_THRESHOLD`.
pub const DEFAULT_WEAK_THRESHOLD: u8 = 6;

pub struct LearningPlanStage {
    generator: Arc<dyn Generator>,
    weak_threshold: u8,
}

impl LearningPlanStage {
    pub fn new(generator: Arc<dyn Generator>, weak_threshold: u8) -> Self {
        Self {
            generator,
            weak_threshold,
        }
    }

    /// Builds the plan for `candidate_id` from the screening gaps matching
    /// that id (empty when the id is not in the ranking — a soft condition,
    /// not an error) plus the evaluation's weak points.
    pub async fn run(
        &self,
        candidate_id: &str,
        screening: Option<&ScreeningResult>,
        evaluation: &AnswerEvaluationResult,
    ) -> Result<LearningPlan, PipelineError> {
        let gaps: Vec<String> = match screening.and_then(|s| s.gaps_for(candidate_id)) {
            Some(gaps) => gaps.to_vec(),
            None => {
                warn!(
                    "Candidate '{}' not found in screening ranking; using empty gap list",
                    candidate_id
                );
                Vec::new()
            }
        };

        let weak_points = extract_weak_points(evaluation, self.weak_threshold);
        info!(
            "Learning plan inputs for '{}': {} gaps, {} weak points (threshold {})",
            candidate_id,
            gaps.len(),
            weak_points.len(),
            self.weak_threshold
        );

        let prompt = LEARNING_PLAN_PROMPT_TEMPLATE
            .replace("{candidate_id}", candidate_id)
            .replace("{gaps}", &bullet_list(&gaps))
            .replace("{weak_points}", &bullet_list(&weak_points));

        generate_structured(self.generator.as_ref(), &prompt, LEARNING_PLAN_SYSTEM).await
    }
}

/// Collects missing_points from every item scored ≤ threshold, in item
/// order, duplicates allowed.
fn extract_weak_points(evaluation: &AnswerEvaluationResult, threshold: u8) -> Vec<String> {
    evaluation
        .detailed
        .iter()
        .filter(|item| item.score <= threshold)
        .flat_map(|item| item.missing_points.iter().cloned())
        .collect()
}

fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return "(none)".to_string();
    }
    items
        .iter()
        .map(|i| format!("- {i}"))
        .collect::<Vec<_>>()
        .join("\n")
}
