// All LLM prompt constants for the pipeline stages.
// Each template documents the placeholders replaced before sending.

/// System prompt for resume screening — enforces JSON-only output.
pub const SCREENING_SYSTEM: &str = "You are a strict recruitment screening expert. \
    Score candidate match to the job description. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Screening prompt template. Replace `{jd_context}`, `{resume_context}`,
/// `{candidate_id}` before sending.
pub const SCREENING_PROMPT_TEMPLATE: &str = r#"JOB DESCRIPTION CONTEXT:
{jd_context}

CANDIDATE RESUME CONTEXT:
{resume_context}

Candidate ID: {candidate_id}

Score this single candidate against the job description. Return a JSON object with this EXACT schema (no extra fields):
{
  "candidate_id": "{candidate_id}",
  "match_score": 0,
  "strengths": ["..."],
  "gaps": ["..."],
  "summary": "..."
}

Rules:
- match_score is an integer 0-100
- strengths and gaps are grounded in the resume context only — no invention
- summary is 2-3 sentences"#;

/// System prompt for interview question generation.
pub const QUESTIONS_SYSTEM: &str = "You are an interviewer designing an interview for this role. \
    Create practical questions and include what a good answer should contain. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Question generation template. Replace `{jd_context}`, `{candidate_id}`,
/// `{num_questions}`.
pub const QUESTIONS_PROMPT_TEMPLATE: &str = r#"JOB DESCRIPTION CONTEXT:
{jd_context}

Candidate ID: {candidate_id}

Create exactly {num_questions} interview questions spanning the role's must-have skills and responsibilities. Return a JSON object with this EXACT schema:
{
  "candidate_id": "{candidate_id}",
  "questions": [
    {
      "question": "...",
      "skill_tested": "...",
      "expected_answer_outline": ["...", "..."]
    }
  ]
}

Rules:
- exactly {num_questions} questions
- every expected_answer_outline has at least two talking points
- questions must be answerable verbally, no whiteboard-only puzzles"#;

/// System prompt for answer evaluation.
pub const EVALUATION_SYSTEM: &str = "You are a strict technical evaluator. \
    Score answers based on correctness, completeness, and relevance to the job description. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Answer evaluation template. Replace `{jd_context}`, `{candidate_id}`,
/// `{bundles_json}`.
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"JOB DESCRIPTION CONTEXT:
{jd_context}

Candidate ID: {candidate_id}

Evaluate these question/answer bundles (an empty answer means the question went unanswered and scores accordingly):
{bundles_json}

Return a JSON object with this EXACT schema:
{
  "candidate_id": "{candidate_id}",
  "overall_score": 0,
  "detailed": [
    {
      "question": "...",
      "answer": "...",
      "score": 0,
      "feedback": "...",
      "missing_points": ["..."]
    }
  ],
  "final_verdict": "Hire"
}

HARD RULES:
1. `detailed` has exactly one entry per bundle, in the SAME order, with `question` copied verbatim
2. each score is an integer 0-10
3. overall_score is an integer 0-100
4. final_verdict is exactly one of: "Hire", "Strong Consider", "No Hire""#;

/// System prompt for learning plan synthesis.
pub const LEARNING_PLAN_SYSTEM: &str = "You are a career coach. \
    Create a step-by-step learning plan, practical with weekly goals and suggested resources. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Learning plan template. Replace `{candidate_id}`, `{gaps}`,
/// `{weak_points}`.
pub const LEARNING_PLAN_PROMPT_TEMPLATE: &str = r#"Candidate ID: {candidate_id}

Skill gaps from resume screening:
{gaps}

Weak points from interview evaluation:
{weak_points}

Create a 4-week remediation plan. Return a JSON object with this EXACT schema:
{
  "candidate_id": "{candidate_id}",
  "summary": "...",
  "focus_areas": ["..."],
  "plan_by_week": [
    {"week": 1, "goals": ["..."], "topics": ["..."], "resources": ["..."]}
  ],
  "practice_projects": ["..."],
  "recommended_resources": [
    {"label": "...", "url": "https://..."}
  ]
}

Rules:
- four weekly entries, week numbered 1 through 4
- every recommended resource carries a label and a real, well-known URL"#;
