//! Data model for the hiring pipeline.
//!
//! Every shape that crosses a stage boundary or gets persisted lives here.
//! Range-checked fields (match_score, per-answer score, overall score) are
//! enforced both in constructors and during deserialization, so an
//! out-of-range value coming back from the generation provider is a hard
//! schema violation — never silently clamped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;

// ────────────────────────────────────────────────────────────────────────────
// Screening
// ────────────────────────────────────────────────────────────────────────────

/// One candidate scored against the job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CandidateMatchWire")]
pub struct CandidateMatch {
    pub candidate_id: String,
    /// 0–100 inclusive. Construction fails outside that range.
    pub match_score: u8,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub summary: String,
}

#[derive(Deserialize)]
struct CandidateMatchWire {
    candidate_id: String,
    match_score: u8,
    strengths: Vec<String>,
    gaps: Vec<String>,
    summary: String,
}

impl CandidateMatch {
    pub fn new(
        candidate_id: String,
        match_score: u8,
        strengths: Vec<String>,
        gaps: Vec<String>,
        summary: String,
    ) -> Result<Self, PipelineError> {
        if match_score > 100 {
            return Err(PipelineError::SchemaViolation(format!(
                "match_score {match_score} out of range 0-100 for candidate '{candidate_id}'"
            )));
        }
        Ok(Self {
            candidate_id,
            match_score,
            strengths,
            gaps,
            summary,
        })
    }
}

impl TryFrom<CandidateMatchWire> for CandidateMatch {
    type Error = String;

    fn try_from(w: CandidateMatchWire) -> Result<Self, Self::Error> {
        CandidateMatch::new(w.candidate_id, w.match_score, w.strengths, w.gaps, w.summary)
            .map_err(|e| e.to_string())
    }
}

/// Screening output: all candidates ranked by match_score descending.
/// Ties keep generation order (stable sort).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub ranked_candidates: Vec<CandidateMatch>,
}

impl ScreeningResult {
    /// Builds a result from unsorted matches, ranking best-first.
    pub fn from_matches(mut matches: Vec<CandidateMatch>) -> Self {
        // Vec::sort_by_key is stable, so equal scores keep their input order.
        matches.sort_by_key(|m| std::cmp::Reverse(m.match_score));
        Self {
            ranked_candidates: matches,
        }
    }

    /// The top-ranked candidate id, if any candidate was screened.
    pub fn top_candidate_id(&self) -> Option<&str> {
        self.ranked_candidates
            .first()
            .map(|m| m.candidate_id.as_str())
    }

    /// Gap statements for one candidate. `None` when the id is not in the
    /// ranking — callers treat that as an empty gap list, not an error.
    pub fn gaps_for(&self, candidate_id: &str) -> Option<&[String]> {
        self.ranked_candidates
            .iter()
            .find(|m| m.candidate_id == candidate_id)
            .map(|m| m.gaps.as_slice())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Interview questions
// ────────────────────────────────────────────────────────────────────────────

/// One interview question with the outline a good answer should cover.
/// The outline feeds answer evaluation and the report aggregator, so it
/// must be non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "InterviewQuestionWire")]
pub struct InterviewQuestion {
    pub question: String,
    pub skill_tested: String,
    pub expected_answer_outline: Vec<String>,
}

#[derive(Deserialize)]
struct InterviewQuestionWire {
    question: String,
    skill_tested: String,
    expected_answer_outline: Vec<String>,
}

impl TryFrom<InterviewQuestionWire> for InterviewQuestion {
    type Error = String;

    fn try_from(w: InterviewQuestionWire) -> Result<Self, Self::Error> {
        if w.expected_answer_outline.is_empty() {
            return Err(format!(
                "question '{}' has an empty expected_answer_outline",
                w.question
            ));
        }
        Ok(Self {
            question: w.question,
            skill_tested: w.skill_tested,
            expected_answer_outline: w.expected_answer_outline,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub candidate_id: String,
    pub questions: Vec<InterviewQuestion>,
}

// ────────────────────────────────────────────────────────────────────────────
// Answer evaluation
// ────────────────────────────────────────────────────────────────────────────

/// Fixed three-valued hiring verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Hire,
    #[serde(rename = "Strong Consider")]
    StrongConsider,
    #[serde(rename = "No Hire")]
    NoHire,
}

/// Per-question evaluation. An empty `answer` means the question went
/// unanswered; it is still scored and listed in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnswerEvaluationItemWire")]
pub struct AnswerEvaluationItem {
    pub question: String,
    pub answer: String,
    /// 0–10 inclusive.
    pub score: u8,
    pub feedback: String,
    pub missing_points: Vec<String>,
    /// Contexts retrieved while evaluating, when the run stored them. The
    /// report aggregator falls back to the expected outline otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieved_contexts: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct AnswerEvaluationItemWire {
    question: String,
    answer: String,
    score: u8,
    feedback: String,
    missing_points: Vec<String>,
    #[serde(default)]
    retrieved_contexts: Option<Vec<String>>,
}

impl TryFrom<AnswerEvaluationItemWire> for AnswerEvaluationItem {
    type Error = String;

    fn try_from(w: AnswerEvaluationItemWire) -> Result<Self, Self::Error> {
        if w.score > 10 {
            return Err(format!(
                "answer score {} out of range 0-10 for question '{}'",
                w.score, w.question
            ));
        }
        Ok(Self {
            question: w.question,
            answer: w.answer,
            score: w.score,
            feedback: w.feedback,
            missing_points: w.missing_points,
            retrieved_contexts: w.retrieved_contexts,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AnswerEvaluationResultWire")]
pub struct AnswerEvaluationResult {
    pub candidate_id: String,
    /// 0–100 inclusive.
    pub overall_score: u8,
    /// One item per question, in question-set order. The evaluation stage
    /// enforces length and order against the QuestionSet.
    pub detailed: Vec<AnswerEvaluationItem>,
    pub final_verdict: Verdict,
}

#[derive(Deserialize)]
struct AnswerEvaluationResultWire {
    candidate_id: String,
    overall_score: u8,
    detailed: Vec<AnswerEvaluationItem>,
    final_verdict: Verdict,
}

impl TryFrom<AnswerEvaluationResultWire> for AnswerEvaluationResult {
    type Error = String;

    fn try_from(w: AnswerEvaluationResultWire) -> Result<Self, Self::Error> {
        if w.overall_score > 100 {
            return Err(format!(
                "overall_score {} out of range 0-100 for candidate '{}'",
                w.overall_score, w.candidate_id
            ));
        }
        Ok(Self {
            candidate_id: w.candidate_id,
            overall_score: w.overall_score,
            detailed: w.detailed,
            final_verdict: w.final_verdict,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Learning plan
// ────────────────────────────────────────────────────────────────────────────

/// One week of the remediation plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPlanEntry {
    /// 1-based week number.
    pub week: u32,
    pub goals: Vec<String>,
    pub topics: Vec<String>,
    pub resources: Vec<String>,
}

/// A recommended resource as a label + locator pair.
///
/// Models sometimes emit these as `"Label: https://…"` strings instead of
/// objects; both shapes are accepted at the boundary and normalized here —
/// the ambiguity never propagates past deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ResourceRefWire")]
pub struct ResourceRef {
    pub label: String,
    pub url: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResourceRefWire {
    Pair { label: String, url: String },
    Text(String),
}

impl From<ResourceRefWire> for ResourceRef {
    fn from(w: ResourceRefWire) -> Self {
        match w {
            ResourceRefWire::Pair { label, url } => Self { label, url },
            ResourceRefWire::Text(text) => split_labelled_resource(&text),
        }
    }
}

/// Splits `"Label: https://example.com"` into its parts. A string with no
/// locator becomes a label with an empty url.
fn split_labelled_resource(text: &str) -> ResourceRef {
    if let Some(idx) = text.find("http") {
        let label = text[..idx].trim_end_matches([' ', ':', '-']).trim();
        return ResourceRef {
            label: label.to_string(),
            url: text[idx..].trim().to_string(),
        };
    }
    if let Some((label, rest)) = text.split_once(": ") {
        return ResourceRef {
            label: label.trim().to_string(),
            url: rest.trim().to_string(),
        };
    }
    ResourceRef {
        label: text.trim().to_string(),
        url: String::new(),
    }
}

/// Weekly entries arrive either as a list of structured entries or as a
/// `{"Week 1": [tasks…]}` map, depending on how the model felt that day.
/// Both normalize to `Vec<WeeklyPlanEntry>` immediately.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlanByWeekWire {
    Entries(Vec<WeeklyPlanEntry>),
    ByName(BTreeMap<String, Vec<String>>),
}

fn normalize_plan_by_week(wire: PlanByWeekWire) -> Vec<WeeklyPlanEntry> {
    match wire {
        PlanByWeekWire::Entries(entries) => entries,
        PlanByWeekWire::ByName(map) => map
            .into_iter()
            .enumerate()
            .map(|(i, (name, tasks))| WeeklyPlanEntry {
                week: parse_week_number(&name).unwrap_or(i as u32 + 1),
                goals: tasks,
                topics: Vec::new(),
                resources: Vec::new(),
            })
            .collect(),
    }
}

fn parse_week_number(name: &str) -> Option<u32> {
    name.chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .ok()
}

/// Personalized remediation plan for the selected candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LearningPlanWire")]
pub struct LearningPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Typically four weeks.
    pub plan_by_week: Vec<WeeklyPlanEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_projects: Option<Vec<String>>,
    pub recommended_resources: Vec<ResourceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_areas: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct LearningPlanWire {
    #[serde(default)]
    candidate_id: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    plan_by_week: PlanByWeekWire,
    #[serde(default)]
    practice_projects: Option<Vec<String>>,
    #[serde(default)]
    recommended_resources: Vec<ResourceRef>,
    #[serde(default)]
    focus_areas: Option<Vec<String>>,
}

impl From<LearningPlanWire> for LearningPlan {
    fn from(w: LearningPlanWire) -> Self {
        Self {
            candidate_id: w.candidate_id,
            summary: w.summary,
            plan_by_week: normalize_plan_by_week(w.plan_by_week),
            practice_projects: w.practice_projects,
            recommended_resources: w.recommended_resources,
            focus_areas: w.focus_areas,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline state & persisted artifact
// ────────────────────────────────────────────────────────────────────────────

/// The single mutable record threaded through the orchestrator.
///
/// A field is populated only after its producing stage has run; stages read
/// what they need and write only the fields they own. The whole record is
/// serializable so a run can pause for answer collection and resume later
/// from a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub jd_query: String,
    pub candidate_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screening: Option<ScreeningResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_candidate_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<QuestionSet>,
    /// Question text → answer text, filled in between the two phases.
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<AnswerEvaluationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_plan: Option<LearningPlan>,
}

impl PipelineState {
    pub fn new(jd_query: String, candidate_ids: Vec<String>) -> Self {
        Self {
            jd_query,
            candidate_ids,
            screening: None,
            selected_candidate_id: None,
            questions: None,
            answers: BTreeMap::new(),
            evaluation: None,
            learning_plan: None,
        }
    }
}

/// The persisted output of one finished run — the report aggregator's sole
/// input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunArtifact {
    pub screening: ScreeningResult,
    pub questions: QuestionSet,
    pub evaluation: AnswerEvaluationResult,
    pub learning_plan: LearningPlan,
}

impl RunArtifact {
    /// Extracts the artifact from a finished state. `None` while any stage
    /// output is missing (including the empty-candidate short-circuit,
    /// where downstream stages never ran).
    pub fn from_state(state: &PipelineState) -> Option<Self> {
        Some(Self {
            screening: state.screening.clone()?,
            questions: state.questions.clone()?,
            evaluation: state.evaluation.clone()?,
            learning_plan: state.learning_plan.clone()?,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
