// Pipeline stages. Each stage is a plain struct holding its injected
// collaborators (generation provider + retriever) and exposing one `run`
// method that reads from and writes to the pipeline state fields it owns.
// No stage calls the Anthropic API or the index directly.

pub mod evaluation;
pub mod learning_plan;
pub mod prompts;
pub mod questions;
pub mod screening;

pub use evaluation::AnswerEvaluationStage;
pub use learning_plan::LearningPlanStage;
pub use questions::QuestionGenerationStage;
pub use screening::ScreeningStage;
