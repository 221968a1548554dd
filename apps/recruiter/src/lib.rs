//! Recruiter — an LLM-backed hiring pipeline and its self-evaluation
//! reporter.
//!
//! The pipeline ranks resumes against a job description, generates
//! interview questions for the top candidate, scores collected answers,
//! and synthesizes a learning plan, threading one `PipelineState` through
//! a fixed stage sequence. The report aggregator re-scores a finished run
//! with reference-based metrics and LLM-as-judge critiques.

pub mod config;
pub mod errors;
pub mod ingest;
pub mod llm_client;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod retrieval;
pub mod stages;
