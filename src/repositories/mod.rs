pub mod test_attempt_repository;
pub mod test_repository;

pub use test_attempt_repository::{MongoTestAttemptRepository, TestAttemptRepository};
pub use test_repository::{MongoTestRepository, TestRepository};

#[cfg(test)]
pub use test_attempt_repository::MockTestAttemptRepository;
#[cfg(test)]
pub use test_repository::MockTestRepository;
