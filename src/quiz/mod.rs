//! Quiz session engine.
//!
//! Builds quiz sessions from filtered word pools, records answers with
//! idempotent re-answer correction, derives retry sessions from missed
//! questions, and aggregates session history for display and for the
//! study-plan scheduler.

pub mod answer;
pub mod cascade;
pub mod history;
pub mod pool;
pub mod retry;
pub mod session;

pub use answer::{QuizProgress, progress, submit_answer};
pub use cascade::delete_word;
pub use history::{ExamOutcome, HistoryItem, exam_outcomes, list_history};
pub use pool::{PoolParams, select_pool};
pub use retry::{RetryParams, retry_session};
pub use session::{QuestionView, QuizStart, StartParams, start_session};
