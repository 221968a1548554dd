//! Judgment track — four independent LLM-as-judge critiques (screening
//! ranking, question set, evaluation detail, learning plan) plus one
//! roll-up summary synthesizing everything into a readiness verdict for
//! non-technical readers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::PipelineError;
use crate::llm_client::{generate_structured, Generator};
use crate::models::RunArtifact;
use crate::report::metrics::CandidateAnswerEvaluation;

const JUDGE_SYSTEM: &str = "You are an impartial evaluator of an automated hiring system. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

const SCREENING_JUDGE_TEMPLATE: &str = r#"Evaluate the screening agent that produced this candidate ranking.
Return ONLY valid JSON with this exact shape:
{
  "score": 3,
  "fairness": "low | medium | high",
  "consistency": "low | medium | high",
  "strengths": ["..."],
  "improvement_areas": ["..."],
  "justification": "..."
}
score is an integer 1-5.

DATA:
{data}"#;

const QUESTIONS_JUDGE_TEMPLATE: &str = r#"Evaluate the question generation agent that produced these interview questions.
Return ONLY valid JSON with this exact shape:
{
  "score": 3,
  "coverage": "poor | fair | good",
  "difficulty_balance": "poor | fair | good",
  "missing_topics": ["..."],
  "justification": "..."
}
score is an integer 1-5.

DATA:
{data}"#;

const EVALUATION_JUDGE_TEMPLATE: &str = r#"Evaluate the interview evaluation agent that produced this per-question feedback.
Return ONLY valid JSON with this exact shape:
{
  "score": 3,
  "feedback_quality": "low | medium | high",
  "actionability": "low | medium | high",
  "strengths": ["..."],
  "weaknesses": ["..."],
  "justification": "..."
}
score is an integer 1-5.

DATA:
{data}"#;

const LEARNING_PLAN_JUDGE_TEMPLATE: &str = r#"Evaluate the learning plan agent that produced this remediation plan.
Return ONLY valid JSON with this exact shape:
{
  "score": 3,
  "alignment_with_gaps": "low | medium | high",
  "progression_quality": "poor | fair | good",
  "practical_value": "low | medium | high",
  "justification": "..."
}
score is an integer 1-5.

DATA:
{data}"#;

const OVERALL_TEMPLATE: &str = r#"Given the following evaluations of an automated hiring system, write a clear summary for non-technical readers.
Return ONLY valid JSON with this exact shape:
{
  "overall_score": 3.5,
  "summary_for_non_technical_readers": "...",
  "system_strengths": ["..."],
  "system_weaknesses": ["..."],
  "final_verdict": "Not Ready | Partially Ready | Ready"
}

DATA:
{data}"#;

/// Fixed three-valued readiness verdict for the roll-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
    #[serde(rename = "Not Ready")]
    NotReady,
    #[serde(rename = "Partially Ready")]
    PartiallyReady,
    Ready,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningCritique {
    pub score: u8,
    pub fairness: String,
    pub consistency: String,
    pub strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionCritique {
    pub score: u8,
    pub coverage: String,
    pub difficulty_balance: String,
    pub missing_topics: Vec<String>,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCritique {
    pub score: u8,
    pub feedback_quality: String,
    pub actionability: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPlanCritique {
    pub score: u8,
    pub alignment_with_gaps: String,
    pub progression_quality: String,
    pub practical_value: String,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallEvaluation {
    pub overall_score: f64,
    pub summary_for_non_technical_readers: String,
    pub system_strengths: Vec<String>,
    pub system_weaknesses: Vec<String>,
    pub final_verdict: Readiness,
}

fn fill(template: &str, data: &impl Serialize) -> Result<String, PipelineError> {
    Ok(template.replace("{data}", &serde_json::to_string_pretty(data)?))
}

pub async fn judge_screening(
    generator: &dyn Generator,
    artifact: &RunArtifact,
) -> Result<ScreeningCritique, PipelineError> {
    let prompt = fill(
        SCREENING_JUDGE_TEMPLATE,
        &artifact.screening.ranked_candidates,
    )?;
    generate_structured(generator, &prompt, JUDGE_SYSTEM).await
}

pub async fn judge_questions(
    generator: &dyn Generator,
    artifact: &RunArtifact,
) -> Result<QuestionCritique, PipelineError> {
    let prompt = fill(QUESTIONS_JUDGE_TEMPLATE, &artifact.questions.questions)?;
    generate_structured(generator, &prompt, JUDGE_SYSTEM).await
}

pub async fn judge_evaluation(
    generator: &dyn Generator,
    artifact: &RunArtifact,
) -> Result<EvaluationCritique, PipelineError> {
    let prompt = fill(EVALUATION_JUDGE_TEMPLATE, &artifact.evaluation.detailed)?;
    generate_structured(generator, &prompt, JUDGE_SYSTEM).await
}

pub async fn judge_learning_plan(
    generator: &dyn Generator,
    artifact: &RunArtifact,
) -> Result<LearningPlanCritique, PipelineError> {
    let prompt = fill(LEARNING_PLAN_JUDGE_TEMPLATE, &artifact.learning_plan)?;
    generate_structured(generator, &prompt, JUDGE_SYSTEM).await
}

/// The fifth call: synthesizes all prior sections (including the
/// reference-based composite) into the overall verdict.
pub async fn judge_overall(
    generator: &dyn Generator,
    sections: &Value,
) -> Result<OverallEvaluation, PipelineError> {
    let prompt = fill(OVERALL_TEMPLATE, sections)?;
    generate_structured(generator, &prompt, JUDGE_SYSTEM).await
}

// Used by the report assembler to thread the answer-track section into the
// overall prompt without re-serializing the whole report by hand.
pub fn sections_value(
    answers: &CandidateAnswerEvaluation,
    screening: &ScreeningCritique,
    questions: &QuestionCritique,
    evaluation: &EvaluationCritique,
    learning_plan: &LearningPlanCritique,
) -> Result<Value, PipelineError> {
    Ok(serde_json::json!({
        "candidate_answer_evaluation": answers,
        "screening_agent_evaluation": screening,
        "question_generation_agent_evaluation": questions,
        "evaluation_agent_evaluation": evaluation,
        "learning_plan_agent_evaluation": learning_plan,
    }))
}
