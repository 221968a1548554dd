//! Report aggregator — re-scores a finished pipeline run.
//!
//! Two independent tracks: the reference-based metric track over the
//! answered questions (metrics.rs, no judge model) and the judgment track
//! (judge.rs, four critiques plus a roll-up). The result is one nested
//! report plus a flattened single-row projection of the same structure.

use tracing::info;

use crate::errors::PipelineError;
use crate::llm_client::Generator;
use crate::models::RunArtifact;

pub mod flatten;
pub mod judge;
pub mod metrics;

use judge::{
    judge_evaluation, judge_learning_plan, judge_overall, judge_questions, judge_screening,
    sections_value, EvaluationCritique, LearningPlanCritique, OverallEvaluation, QuestionCritique,
    ScreeningCritique,
};
use chrono::{DateTime, Utc};
use metrics::{build_records, evaluate_records, CandidateAnswerEvaluation};
use serde::{Deserialize, Serialize};

/// The full quality report over one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemReport {
    pub generated_at: DateTime<Utc>,
    pub candidate_answer_evaluation: CandidateAnswerEvaluation,
    pub screening_agent_evaluation: ScreeningCritique,
    pub question_generation_agent_evaluation: QuestionCritique,
    pub evaluation_agent_evaluation: EvaluationCritique,
    pub learning_plan_agent_evaluation: LearningPlanCritique,
    pub overall_system_evaluation: OverallEvaluation,
}

impl SystemReport {
    /// The single-row tabular projection: dotted-path columns over this
    /// report, rendered as CSV.
    pub fn to_csv(&self) -> Result<String, PipelineError> {
        let value = serde_json::to_value(self)?;
        Ok(flatten::to_csv(&flatten::flatten(&value)))
    }
}

/// Runs both tracks over a finished run. The judge calls go through the
/// same generation seam as the pipeline stages, so they share failure
/// semantics: an unparseable critique is fatal, never patched.
pub async fn build_report(
    generator: &dyn Generator,
    artifact: &RunArtifact,
) -> Result<SystemReport, PipelineError> {
    let records = build_records(artifact);
    info!(
        "Reference track: {} answered of {} questions",
        records.len(),
        artifact.questions.questions.len()
    );
    let candidate_answer_evaluation = evaluate_records(&records);

    let screening = judge_screening(generator, artifact).await?;
    let questions = judge_questions(generator, artifact).await?;
    let evaluation = judge_evaluation(generator, artifact).await?;
    let learning_plan = judge_learning_plan(generator, artifact).await?;

    let sections = sections_value(
        &candidate_answer_evaluation,
        &screening,
        &questions,
        &evaluation,
        &learning_plan,
    )?;
    let overall = judge_overall(generator, &sections).await?;
    info!(
        "Overall system verdict: {:?} ({})",
        overall.final_verdict, overall.overall_score
    );

    Ok(SystemReport {
        generated_at: Utc::now(),
        candidate_answer_evaluation,
        screening_agent_evaluation: screening,
        question_generation_agent_evaluation: questions,
        evaluation_agent_evaluation: evaluation,
        learning_plan_agent_evaluation: learning_plan,
        overall_system_evaluation: overall,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AnswerEvaluationItem, AnswerEvaluationResult, CandidateMatch, InterviewQuestion,
        LearningPlan, QuestionSet, ScreeningResult, Verdict, WeeklyPlanEntry,
    };
    use crate::stages::test_support::ScriptedGenerator;
    use serde_json::json;

    fn sample_artifact() -> RunArtifact {
        RunArtifact {
            screening: ScreeningResult::from_matches(vec![CandidateMatch::new(
                "alice".into(),
                82,
                vec!["rust".into()],
                vec!["kafka".into()],
                "strong".into(),
            )
            .unwrap()]),
            questions: QuestionSet {
                candidate_id: "alice".into(),
                questions: vec![InterviewQuestion {
                    question: "Explain ownership".into(),
                    skill_tested: "rust".into(),
                    expected_answer_outline: vec!["moves".into(), "borrows".into()],
                }],
            },
            evaluation: AnswerEvaluationResult {
                candidate_id: "alice".into(),
                overall_score: 70,
                detailed: vec![AnswerEvaluationItem {
                    question: "Explain ownership".into(),
                    answer: "ownership moves borrows".into(),
                    score: 7,
                    feedback: "good".into(),
                    missing_points: vec![],
                    retrieved_contexts: None,
                }],
                final_verdict: Verdict::StrongConsider,
            },
            learning_plan: LearningPlan {
                candidate_id: Some("alice".into()),
                summary: None,
                plan_by_week: vec![WeeklyPlanEntry {
                    week: 1,
                    goals: vec!["kafka basics".into()],
                    topics: vec![],
                    resources: vec![],
                }],
                practice_projects: None,
                recommended_resources: vec![],
                focus_areas: None,
            },
        }
    }

    fn judge_responses() -> Vec<serde_json::Value> {
        vec![
            json!({
                "score": 4, "fairness": "high", "consistency": "high",
                "strengths": ["evidence-based"], "improvement_areas": [],
                "justification": "ok"
            }),
            json!({
                "score": 3, "coverage": "good", "difficulty_balance": "fair",
                "missing_topics": ["testing"], "justification": "ok"
            }),
            json!({
                "score": 4, "feedback_quality": "high", "actionability": "medium",
                "strengths": [], "weaknesses": [], "justification": "ok"
            }),
            json!({
                "score": 3, "alignment_with_gaps": "high", "progression_quality": "good",
                "practical_value": "medium", "justification": "ok"
            }),
            json!({
                "overall_score": 3.6,
                "summary_for_non_technical_readers": "Works, with rough edges.",
                "system_strengths": ["grounded"], "system_weaknesses": ["sparse answers"],
                "final_verdict": "Partially Ready"
            }),
        ]
    }

    #[tokio::test]
    async fn test_report_carries_all_six_sections() {
        let generator = ScriptedGenerator::new(judge_responses());
        let report = build_report(&generator, &sample_artifact()).await.unwrap();

        assert!(report.candidate_answer_evaluation.score > 0.0);
        assert_eq!(report.screening_agent_evaluation.score, 4);
        assert_eq!(report.question_generation_agent_evaluation.score, 3);
        assert_eq!(report.evaluation_agent_evaluation.score, 4);
        assert_eq!(report.learning_plan_agent_evaluation.score, 3);
        assert_eq!(
            report.overall_system_evaluation.final_verdict,
            judge::Readiness::PartiallyReady
        );
    }

    #[tokio::test]
    async fn test_report_serializes_with_contract_keys() {
        let generator = ScriptedGenerator::new(judge_responses());
        let report = build_report(&generator, &sample_artifact()).await.unwrap();
        let value = serde_json::to_value(&report).unwrap();

        for key in [
            "candidate_answer_evaluation",
            "screening_agent_evaluation",
            "question_generation_agent_evaluation",
            "evaluation_agent_evaluation",
            "learning_plan_agent_evaluation",
            "overall_system_evaluation",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }

    #[tokio::test]
    async fn test_csv_projection_is_single_row() {
        let generator = ScriptedGenerator::new(judge_responses());
        let report = build_report(&generator, &sample_artifact()).await.unwrap();
        let csv = report.to_csv().unwrap();
        let lines: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("candidate_answer_evaluation.detailed_metrics.faithfulness"));
        assert!(lines[0].contains("overall_system_evaluation.final_verdict"));
    }

    #[tokio::test]
    async fn test_malformed_critique_is_fatal() {
        let generator = ScriptedGenerator::new(vec![json!({"score": "not a number"})]);
        let err = build_report(&generator, &sample_artifact()).await;
        assert!(matches!(err, Err(PipelineError::SchemaViolation(_))));
    }
}
