//! Reference-based scoring track.
//!
//! One record per answered question (whitespace-only answers are skipped):
//! the answer, a contexts list (the run's retrieved contexts when stored,
//! else the expected outline joined into a single fallback string), and a
//! reference (the outline joined). Three metrics run over the record set,
//! each averaged to its own mean, and the composite is the mean of the
//! means scaled to 0–5.
//!
//! Metrics are deterministic lexical measures — cosine over lowercase
//! term-frequency maps and a token-support ratio — so the track runs
//! offline with no judge model.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::RunArtifact;

/// One answered question prepared for metric computation.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub question: String,
    pub answer: String,
    pub contexts: Vec<String>,
    pub reference: String,
}

/// Per-metric means, each rounded to 3 decimals in the report projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedMetrics {
    pub answer_relevancy: f64,
    pub faithfulness: f64,
    pub context_precision: f64,
}

/// The reference-based track's section of the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAnswerEvaluation {
    /// Composite 0–5, one decimal.
    pub score: f64,
    pub what_was_evaluated: String,
    pub detailed_metrics: DetailedMetrics,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub justification: String,
}

/// Builds metric records from a finished run. Questions whose answer trims
/// to empty are excluded; a question absent from the question set has no
/// reference and is likewise excluded.
pub fn build_records(artifact: &RunArtifact) -> Vec<MetricRecord> {
    let outline_map: HashMap<&str, String> = artifact
        .questions
        .questions
        .iter()
        .map(|q| {
            (
                q.question.as_str(),
                q.expected_answer_outline.join(" "),
            )
        })
        .collect();

    artifact
        .evaluation
        .detailed
        .iter()
        .filter(|item| !item.answer.trim().is_empty())
        .filter_map(|item| {
            let reference = outline_map.get(item.question.as_str())?.clone();
            // Fall back to the reference when the run stored no contexts:
            // the metric still runs, at the cost of scoring faithfulness
            // against the same text used as ground truth.
            let contexts = item
                .retrieved_contexts
                .clone()
                .unwrap_or_else(|| vec![reference.clone()]);
            Some(MetricRecord {
                question: item.question.clone(),
                answer: item.answer.clone(),
                contexts,
                reference,
            })
        })
        .collect()
}

/// Computes the three metric means and the composite score. Zero records
/// (every answer empty) means all means are 0.0 and the composite is 0.0.
pub fn evaluate_records(records: &[MetricRecord]) -> CandidateAnswerEvaluation {
    let relevancy = mean(records.iter().map(|r| answer_relevancy(r)));
    let faith = mean(records.iter().map(|r| faithfulness(r)));
    let precision = mean(records.iter().map(|r| context_precision(r)));

    let composite = round_to(((relevancy + faith + precision) / 3.0) * 5.0, 1);

    CandidateAnswerEvaluation {
        score: composite,
        what_was_evaluated:
            "Relevancy, Faithfulness (No Hallucinations), and Context Precision.".to_string(),
        detailed_metrics: DetailedMetrics {
            answer_relevancy: round_to(relevancy, 3),
            faithfulness: round_to(faith, 3),
            context_precision: round_to(precision, 3),
        },
        strengths: vec![
            "Uses Faithfulness to ensure answers aren't inventing facts".to_string(),
            "Uses Context Precision to ensure retrieved material matches the reference".to_string(),
        ],
        weaknesses: vec![
            "Low faithfulness means the answer ignored the provided material".to_string(),
            "Unanswered questions are excluded and do not drag the averages down".to_string(),
        ],
        justification: format!(
            "The candidate scored {composite}/5 based on how relevant each answer was to its \
             question, how factual it was relative to the available material, and how precisely \
             the material matched the expected answer."
        ),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Individual metrics
// ────────────────────────────────────────────────────────────────────────────

/// How much the answer is about the question: TF-cosine(question, answer).
fn answer_relevancy(record: &MetricRecord) -> f64 {
    cosine(
        &term_frequencies(&record.question),
        &term_frequencies(&record.answer),
    )
}

/// Share of the answer's content tokens supported by the contexts.
fn faithfulness(record: &MetricRecord) -> f64 {
    let answer_terms: Vec<String> = tokens(&record.answer);
    if answer_terms.is_empty() {
        return 0.0;
    }
    let context_vocab: HashSet<String> = record.contexts.iter().flat_map(|c| tokens(c)).collect();
    let supported = answer_terms
        .iter()
        .filter(|t| context_vocab.contains(*t))
        .count();
    supported as f64 / answer_terms.len() as f64
}

/// How precisely the retrieved contexts match the reference: mean
/// TF-cosine(context, reference) over the contexts list.
fn context_precision(record: &MetricRecord) -> f64 {
    let reference = term_frequencies(&record.reference);
    mean(
        record
            .contexts
            .iter()
            .map(|c| cosine(&term_frequencies(c), &reference)),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Lexical helpers
// ────────────────────────────────────────────────────────────────────────────

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(str::to_lowercase)
        .collect()
}

fn term_frequencies(text: &str) -> HashMap<String, f64> {
    let mut terms: HashMap<String, f64> = HashMap::new();
    for token in tokens(text) {
        *terms.entry(token).or_insert(0.0) += 1.0;
    }
    terms
}

fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let norm_a: f64 = a.values().map(|v| v * v).sum::<f64>().sqrt();
    let norm_b: f64 = b.values().map(|v| v * v).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f64 = a
        .iter()
        .filter_map(|(term, av)| b.get(term).map(|bv| av * bv))
        .sum();
    dot / (norm_a * norm_b)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let collected: Vec<f64> = values.collect();
    if collected.is_empty() {
        return 0.0;
    }
    collected.iter().sum::<f64>() / collected.len() as f64
}

pub(crate) fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AnswerEvaluationItem, AnswerEvaluationResult, CandidateMatch, InterviewQuestion,
        LearningPlan, QuestionSet, ScreeningResult, Verdict,
    };

    fn artifact(items: Vec<AnswerEvaluationItem>) -> RunArtifact {
        let questions = items
            .iter()
            .map(|i| InterviewQuestion {
                question: i.question.clone(),
                skill_tested: "rust".into(),
                expected_answer_outline: vec!["ownership moves values".into()],
            })
            .collect();
        RunArtifact {
            screening: ScreeningResult::from_matches(vec![CandidateMatch::new(
                "alice".into(),
                80,
                vec![],
                vec![],
                String::new(),
            )
            .unwrap()]),
            questions: QuestionSet {
                candidate_id: "alice".into(),
                questions,
            },
            evaluation: AnswerEvaluationResult {
                candidate_id: "alice".into(),
                overall_score: 50,
                detailed: items,
                final_verdict: Verdict::StrongConsider,
            },
            learning_plan: LearningPlan {
                candidate_id: Some("alice".into()),
                summary: None,
                plan_by_week: vec![],
                practice_projects: None,
                recommended_resources: vec![],
                focus_areas: None,
            },
        }
    }

    fn item(question: &str, answer: &str) -> AnswerEvaluationItem {
        AnswerEvaluationItem {
            question: question.into(),
            answer: answer.into(),
            score: 5,
            feedback: String::new(),
            missing_points: vec![],
            retrieved_contexts: None,
        }
    }

    #[test]
    fn test_whitespace_only_answers_are_excluded() {
        let a = artifact(vec![item("Q1?", "   \n"), item("Q2?", "real answer")]);
        let records = build_records(&a);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question, "Q2?");
    }

    #[test]
    fn test_fallback_context_is_the_joined_outline() {
        let a = artifact(vec![item("Q1?", "ownership")]);
        let records = build_records(&a);
        assert_eq!(records[0].contexts, vec!["ownership moves values"]);
        assert_eq!(records[0].reference, "ownership moves values");
    }

    #[test]
    fn test_stored_contexts_take_precedence() {
        let mut it = item("Q1?", "ownership");
        it.retrieved_contexts = Some(vec!["retrieved chunk".into()]);
        let a = artifact(vec![it]);
        let records = build_records(&a);
        assert_eq!(records[0].contexts, vec!["retrieved chunk"]);
    }

    #[test]
    fn test_all_answers_empty_scores_zero() {
        let a = artifact(vec![item("Q1?", ""), item("Q2?", "  ")]);
        let evaluation = evaluate_records(&build_records(&a));
        assert_eq!(evaluation.score, 0.0);
        assert_eq!(evaluation.detailed_metrics.answer_relevancy, 0.0);
        assert_eq!(evaluation.detailed_metrics.faithfulness, 0.0);
        assert_eq!(evaluation.detailed_metrics.context_precision, 0.0);
    }

    #[test]
    fn test_composite_is_mean_of_means_times_five() {
        // 0.8, 0.6 and 1.0 average to 0.8; scaled to 5 and rounded → 4.0.
        assert_eq!(round_to(((0.8 + 0.6 + 1.0) / 3.0) * 5.0, 1), 4.0);
    }

    #[test]
    fn test_faithful_answer_scores_one() {
        let record = MetricRecord {
            question: "what is ownership".into(),
            answer: "ownership moves values".into(),
            contexts: vec!["ownership moves values between bindings".into()],
            reference: "ownership moves values".into(),
        };
        assert_eq!(faithfulness(&record), 1.0);
    }

    #[test]
    fn test_unsupported_answer_scores_zero_faithfulness() {
        let record = MetricRecord {
            question: "what is ownership".into(),
            answer: "penguins juggle".into(),
            contexts: vec!["ownership moves values".into()],
            reference: "ownership moves values".into(),
        };
        assert_eq!(faithfulness(&record), 0.0);
    }

    #[test]
    fn test_identical_context_and_reference_has_full_precision() {
        let record = MetricRecord {
            question: "q".into(),
            answer: "a".into(),
            contexts: vec!["ownership moves values".into()],
            reference: "ownership moves values".into(),
        };
        assert!((context_precision(&record) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rounding_to_three_decimals() {
        assert_eq!(round_to(0.123456, 3), 0.123);
        assert_eq!(round_to(0.9995, 3), 1.0);
    }
}
