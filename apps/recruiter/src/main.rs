//! Pipeline CLI.
//!
//! Default run: ingest the JD and resumes, screen candidates, generate
//! questions, collect answers interactively, evaluate, produce the
//! learning plan, and write `final_output.json` plus a resumable state
//! snapshot.
//!
//! Resumed run (`--resume state.json --answers answers.json`): reload a
//! snapshot taken after question generation and run only the evaluation
//! and learning-plan stages.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recruiter::config::Config;
use recruiter::ingest::{ingest_all, list_candidate_ids};
use recruiter::llm_client::LlmClient;
use recruiter::models::{
    AnswerEvaluationResult, LearningPlan, PipelineState, QuestionSet, RunArtifact, ScreeningResult,
};
use recruiter::pipeline::{load_state, save_state, Pipeline};
use recruiter::retrieval::KeywordRetriever;

const JD_QUERY: &str = "Find best candidate fit for this job and identify gaps.";
const STATE_SNAPSHOT: &str = "pipeline_state.json";
const FINAL_OUTPUT: &str = "final_output.json";

struct Args {
    resume_state: Option<PathBuf>,
    answers_file: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        resume_state: None,
        answers_file: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        match flag.as_str() {
            "--resume" => {
                args.resume_state = Some(PathBuf::from(
                    it.next().context("--resume requires a state file path")?,
                ));
            }
            "--answers" => {
                args.answers_file = Some(PathBuf::from(
                    it.next().context("--answers requires an answers file path")?,
                ));
            }
            other => bail!("unknown argument '{other}' (expected --resume / --answers)"),
        }
    }
    if args.answers_file.is_some() && args.resume_state.is_none() {
        bail!("--answers only makes sense together with --resume");
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting recruiter v{}", env!("CARGO_PKG_VERSION"));
    let args = parse_args()?;

    let llm = Arc::new(LlmClient::new(config.anthropic_api_key.clone()));
    let retriever = Arc::new(KeywordRetriever::new());
    let pipeline = Pipeline::new(
        llm,
        retriever.clone(),
        config.question_count,
        config.weak_score_threshold,
    );

    // Both run modes need the index: the evaluation stage retrieves JD
    // context too.
    info!("Ingesting JD + resumes");
    ingest_all(
        retriever.as_ref(),
        &config.jd_path(),
        &config.resumes_dir(),
    )
    .await?;

    let state = match &args.resume_state {
        Some(snapshot) => {
            let mut state = load_state(snapshot)?;
            if let Some(answers_file) = &args.answers_file {
                state.answers = read_answers_file(answers_file)?;
            }
            info!("Resumed state from {}", snapshot.display());
            state
        }
        None => {
            let candidate_ids = list_candidate_ids(&config.resumes_dir())?;
            info!("Found {} candidate resumes", candidate_ids.len());
            let state = PipelineState::new(JD_QUERY.to_string(), candidate_ids);

            let mut state = pipeline.run_screening_phase(state).await?;

            if let Some(screening) = &state.screening {
                print_screening(screening);
            }
            match &state.questions {
                Some(questions) => {
                    print_questions(questions);
                    save_state(Path::new(STATE_SNAPSHOT), &state)?;
                    info!("State snapshot written to {STATE_SNAPSHOT}");
                    state.answers = collect_answers(questions)?;
                }
                None => {
                    println!("No candidates to interview; nothing further to do.");
                    return Ok(());
                }
            }
            state
        }
    };

    let state = pipeline.run_evaluation_phase(state).await?;

    if let Some(evaluation) = &state.evaluation {
        print_evaluation(evaluation);
    }
    if let Some(plan) = &state.learning_plan {
        print_learning_plan(plan);
    }

    match RunArtifact::from_state(&state) {
        Some(artifact) => {
            fs::write(FINAL_OUTPUT, serde_json::to_string_pretty(&artifact)?)?;
            println!("\nSaved {FINAL_OUTPUT}");
        }
        None => info!("Run finished without a complete artifact; nothing persisted"),
    }

    Ok(())
}

fn read_answers_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read answers file '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not a question → answer JSON object", path.display()))
}

/// Reads one answer per question from stdin, keyed by the verbatim
/// question text so the evaluation stage can line answers up later.
fn collect_answers(questions: &QuestionSet) -> Result<BTreeMap<String, String>> {
    println!("\nNow enter candidate answers (press Enter after each answer).\n");
    let stdin = io::stdin();
    let mut answers = BTreeMap::new();
    for q in &questions.questions {
        print!("Answer for: {}\n> ", q.question);
        io::stdout().flush()?;
        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
        answers.insert(q.question.clone(), line.trim_end().to_string());
    }
    Ok(answers)
}

fn print_screening(screening: &ScreeningResult) {
    println!("\n=== Ranked Candidates ===");
    for c in &screening.ranked_candidates {
        println!("- {}: {}/100", c.candidate_id, c.match_score);
        println!("  Strengths: {}", preview(&c.strengths));
        println!("  Gaps: {}\n", preview(&c.gaps));
    }
}

fn print_questions(questions: &QuestionSet) {
    println!("Selected top candidate: {}\n", questions.candidate_id);
    println!("=== Interview Questions ===");
    for (i, q) in questions.questions.iter().enumerate() {
        println!("{}. {} (Skill: {})", i + 1, q.question, q.skill_tested);
    }
}

fn print_evaluation(evaluation: &AnswerEvaluationResult) {
    println!("\n=== Evaluation ===");
    println!("Overall Score: {}/100", evaluation.overall_score);
    println!("Verdict: {:?}\n", evaluation.final_verdict);
    for item in &evaluation.detailed {
        println!("Q: {}", item.question);
        println!("Score: {}/10", item.score);
        println!("Feedback: {}", item.feedback);
        if !item.missing_points.is_empty() {
            println!("Missing: {}", item.missing_points.join(", "));
        }
        println!("{}", "-".repeat(50));
    }
}

fn print_learning_plan(plan: &LearningPlan) {
    println!("\n=== Learning Plan ===");
    if let Some(focus) = &plan.focus_areas {
        println!("Focus Areas: {}", focus.join(", "));
    }
    for entry in &plan.plan_by_week {
        println!("\nWeek {}:", entry.week);
        for goal in &entry.goals {
            println!("- {goal}");
        }
        if !entry.topics.is_empty() {
            println!("  Topics: {}", entry.topics.join(", "));
        }
    }
    if let Some(projects) = &plan.practice_projects {
        println!("\nPractice Projects:");
        for p in projects {
            println!("- {p}");
        }
    }
    if !plan.recommended_resources.is_empty() {
        println!("\nResources:");
        for r in &plan.recommended_resources {
            if r.url.is_empty() {
                println!("- {}", r.label);
            } else {
                println!("- {}: {}", r.label, r.url);
            }
        }
    }
}

fn preview(items: &[String]) -> String {
    let shown: Vec<&str> = items.iter().take(3).map(String::as_str).collect();
    if items.len() > 3 {
        format!("{} ...", shown.join(", "))
    } else {
        shown.join(", ")
    }
}
