pub mod answer_grader;
pub mod answer_redaction;
pub mod attempt_scorer;
pub mod test_attempt_service;
pub mod test_service;

pub use answer_grader::{AnswerGrader, GradeResult};
pub use answer_redaction::AnswerKeyRedactor;
pub use attempt_scorer::{AttemptOutcome, AttemptScorer};
pub use test_attempt_service::TestAttemptService;
pub use test_service::TestService;
