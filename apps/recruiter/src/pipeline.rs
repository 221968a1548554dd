//! Pipeline orchestrator — a fixed four-stage sequential state machine.
//!
//! ScreenResumes → GenerateQuestions → [answers collected externally] →
//! EvaluateAnswers → LearningPlan → Done. Transitions are unconditional;
//! there is no branching, retry, or cycle. The run pauses at the
//! human-in-the-loop boundary by serializing the state and resuming later
//! from the snapshot with the answer map filled in.
//!
//! The orchestrator owns the state for the duration of a phase: stages
//! receive it piecewise, and each phase returns the updated record.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::PipelineError;
use crate::llm_client::Generator;
use crate::models::PipelineState;
use crate::retrieval::Retriever;
use crate::stages::{
    AnswerEvaluationStage, LearningPlanStage, QuestionGenerationStage, ScreeningStage,
};

/// The orchestrator's position in the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ScreenResumes,
    GenerateQuestions,
    EvaluateAnswers,
    LearningPlan,
    Done,
}

impl Stage {
    pub fn next(self) -> Stage {
        match self {
            Stage::ScreenResumes => Stage::GenerateQuestions,
            Stage::GenerateQuestions => Stage::EvaluateAnswers,
            Stage::EvaluateAnswers => Stage::LearningPlan,
            Stage::LearningPlan => Stage::Done,
            Stage::Done => Stage::Done,
        }
    }
}

pub struct Pipeline {
    screening: ScreeningStage,
    questions: QuestionGenerationStage,
    evaluation: AnswerEvaluationStage,
    learning_plan: LearningPlanStage,
    question_count: usize,
}

impl Pipeline {
    pub fn new(
        generator: Arc<dyn Generator>,
        retriever: Arc<dyn Retriever>,
        question_count: usize,
        weak_threshold: u8,
    ) -> Self {
        Self {
            screening: ScreeningStage::new(generator.clone(), retriever.clone()),
            questions: QuestionGenerationStage::new(generator.clone(), retriever.clone()),
            evaluation: AnswerEvaluationStage::new(generator.clone(), retriever),
            learning_plan: LearningPlanStage::new(generator, weak_threshold),
            question_count,
        }
    }

    /// Phase one: ScreenResumes then GenerateQuestions.
    ///
    /// The selected candidate is the top entry of the sorted ranking. With
    /// no candidates there is nothing to interview: the phase completes
    /// with screening recorded and everything downstream left unset.
    pub async fn run_screening_phase(
        &self,
        mut state: PipelineState,
    ) -> Result<PipelineState, PipelineError> {
        info!("Stage {:?}", Stage::ScreenResumes);
        let screening = self
            .screening
            .run(&state.jd_query, &state.candidate_ids)
            .await?;
        state.selected_candidate_id = screening.top_candidate_id().map(str::to_string);
        state.screening = Some(screening);

        let Some(candidate_id) = state.selected_candidate_id.clone() else {
            warn!("Empty candidate set; skipping the rest of the run");
            return Ok(state);
        };

        info!("Stage {:?}", Stage::GenerateQuestions);
        let questions = self
            .questions
            .run(&candidate_id, &state.jd_query, self.question_count)
            .await?;
        state.questions = Some(questions);

        Ok(state)
    }

    /// Phase two: EvaluateAnswers then LearningPlan, resumed after answer
    /// collection — possibly in a different process, from a snapshot.
    ///
    /// A state short-circuited in phase one (no selected candidate, no
    /// questions) passes through unchanged: skip, empty output.
    pub async fn run_evaluation_phase(
        &self,
        mut state: PipelineState,
    ) -> Result<PipelineState, PipelineError> {
        let (Some(candidate_id), Some(questions)) = (
            state.selected_candidate_id.clone(),
            state.questions.clone(),
        ) else {
            warn!("No selected candidate or question set; nothing to evaluate");
            return Ok(state);
        };

        info!("Stage {:?}", Stage::EvaluateAnswers);
        let evaluation = self
            .evaluation
            .run(&candidate_id, &state.jd_query, &questions, &state.answers)
            .await?;

        info!("Stage {:?}", Stage::LearningPlan);
        let plan = self
            .learning_plan
            .run(&candidate_id, state.screening.as_ref(), &evaluation)
            .await?;
        state.evaluation = Some(evaluation);
        state.learning_plan = Some(plan);

        info!("Stage {:?}", Stage::Done);
        Ok(state)
    }
}

/// Writes a resumable state snapshot.
pub fn save_state(path: &Path, state: &PipelineState) -> Result<(), PipelineError> {
    fs::write(path, serde_json::to_string_pretty(state)?)?;
    Ok(())
}

/// Reloads a state snapshot written by `save_state`.
pub fn load_state(path: &Path) -> Result<PipelineState, PipelineError> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_support::{EmptyRetriever, ScriptedGenerator};
    use serde_json::json;

    fn match_json(id: &str, score: u8) -> serde_json::Value {
        json!({
            "candidate_id": id,
            "match_score": score,
            "strengths": ["s"],
            "gaps": ["gap"],
            "summary": "ok"
        })
    }

    fn questions_json(id: &str) -> serde_json::Value {
        json!({
            "candidate_id": id,
            "questions": [
                {"question": "Q1?", "skill_tested": "rust", "expected_answer_outline": ["o1"]},
                {"question": "Q2?", "skill_tested": "async", "expected_answer_outline": ["o2"]}
            ]
        })
    }

    fn evaluation_json(id: &str) -> serde_json::Value {
        json!({
            "candidate_id": id,
            "overall_score": 55,
            "detailed": [
                {"question": "Q1?", "answer": "a1", "score": 6, "feedback": "", "missing_points": ["mp"]},
                {"question": "Q2?", "answer": "", "score": 0, "feedback": "", "missing_points": []}
            ],
            "final_verdict": "Strong Consider"
        })
    }

    fn plan_json(id: &str) -> serde_json::Value {
        json!({
            "candidate_id": id,
            "plan_by_week": [{"week": 1, "goals": ["g"], "topics": [], "resources": []}],
            "recommended_resources": []
        })
    }

    fn pipeline(responses: Vec<serde_json::Value>) -> Pipeline {
        Pipeline::new(
            Arc::new(ScriptedGenerator::new(responses)),
            Arc::new(EmptyRetriever),
            2,
            6,
        )
    }

    #[tokio::test]
    async fn test_full_run_populates_every_field() {
        let p = pipeline(vec![
            match_json("alice", 70),
            match_json("bob", 90),
            questions_json("bob"),
            evaluation_json("bob"),
            plan_json("bob"),
        ]);
        let state = PipelineState::new(
            "rust engineer".into(),
            vec!["alice".into(), "bob".into()],
        );

        let mut state = p.run_screening_phase(state).await.unwrap();
        assert_eq!(state.selected_candidate_id.as_deref(), Some("bob"));
        assert!(state.questions.is_some());
        assert!(state.evaluation.is_none());

        state
            .answers
            .insert("Q1?".to_string(), "a1".to_string());

        let state = p.run_evaluation_phase(state).await.unwrap();
        assert!(state.evaluation.is_some());
        assert!(state.learning_plan.is_some());
    }

    #[tokio::test]
    async fn test_empty_candidate_set_short_circuits() {
        let p = pipeline(vec![]);
        let state = PipelineState::new("rust engineer".into(), vec![]);

        let state = p.run_screening_phase(state).await.unwrap();
        assert!(state.screening.is_some());
        assert!(state.selected_candidate_id.is_none());
        assert!(state.questions.is_none());

        // Phase two must not crash — it skips with empty output.
        let state = p.run_evaluation_phase(state).await.unwrap();
        assert!(state.evaluation.is_none());
        assert!(state.learning_plan.is_none());
    }

    #[tokio::test]
    async fn test_resumed_run_matches_uninterrupted_run() {
        let phase_one = vec![match_json("alice", 80), questions_json("alice")];
        let phase_two = vec![evaluation_json("alice"), plan_json("alice")];

        // Uninterrupted: one pipeline carries straight through.
        let p = pipeline([phase_one.clone(), phase_two.clone()].concat());
        let state = PipelineState::new("rust engineer".into(), vec!["alice".into()]);
        let mut direct = p.run_screening_phase(state.clone()).await.unwrap();
        direct.answers.insert("Q1?".into(), "a1".into());
        let direct = p.run_evaluation_phase(direct).await.unwrap();

        // Interrupted: snapshot to disk after phase one, reload, resume.
        let p1 = pipeline(phase_one);
        let mut paused = p1.run_screening_phase(state).await.unwrap();
        paused.answers.insert("Q1?".into(), "a1".into());

        let dir = tempfile::tempdir().unwrap();
        let snapshot = dir.path().join("state.json");
        save_state(&snapshot, &paused).unwrap();
        let reloaded = load_state(&snapshot).unwrap();

        let p2 = pipeline(phase_two);
        let resumed = p2.run_evaluation_phase(reloaded).await.unwrap();

        assert_eq!(direct, resumed);
    }

    #[test]
    fn test_stage_progression_is_fixed() {
        assert_eq!(Stage::ScreenResumes.next(), Stage::GenerateQuestions);
        assert_eq!(Stage::GenerateQuestions.next(), Stage::EvaluateAnswers);
        assert_eq!(Stage::EvaluateAnswers.next(), Stage::LearningPlan);
        assert_eq!(Stage::LearningPlan.next(), Stage::Done);
        assert_eq!(Stage::Done.next(), Stage::Done);
    }
}
