pub mod question;
pub mod submission;
pub mod test_attempt;
pub mod user;
pub use question::{AnswerKey, ItemId, Question, QuestionType};
pub use test::{EvaluationMethod, Test, TestStatus};
pub use test_attempt::{AttemptStatus, GradingRecord, TestAttempt};
pub use user::UserRole;
