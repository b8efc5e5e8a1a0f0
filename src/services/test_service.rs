use std::sync::Arc;

use validator::Validate;

use crate::{
    auth::{require_author_role, require_owner_or_admin, Claims},
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{Question, Test},
        dto::{
            request::{check_passing_score, CreateTestRequest, QuestionRequest, UpdateTestRequest},
            response::ShareLinkResponse,
        },
    },
    repositories::{TestAttemptRepository, TestRepository},
};

/// Authoring operations. Only the author of a test or an admin may touch it.
pub struct TestService {
    tests: Arc<dyn TestRepository>,
    attempts: Arc<dyn TestAttemptRepository>,
    config: Arc<Config>,
}

impl TestService {
    pub fn new(
        tests: Arc<dyn TestRepository>,
        attempts: Arc<dyn TestAttemptRepository>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            tests,
            attempts,
            config,
        }
    }

    pub async fn create_test(&self, actor: &Claims, request: CreateTestRequest) -> AppResult<Test> {
        require_author_role(actor)?;
        request.validate()?;
        check_passing_score(request.evaluation_method, request.passing_score)?;

        let mut test = Test::new(&actor.sub, &request.title);
        test.description = request.description;
        test.time_limit = request.time_limit;
        test.passing_score = request.passing_score;
        test.evaluation_method = request.evaluation_method;
        test.status = request.status;
        if let Some(message) = request.success_message {
            test.success_message = message;
        }
        if let Some(message) = request.failure_message {
            test.failure_message = message;
        }

        let test = self.tests.create(test).await?;
        log::info!("Test '{}' created by '{}'", test.id, actor.sub);
        Ok(test)
    }

    /// Admins see every test, employers their own.
    pub async fn list_tests(&self, actor: &Claims) -> AppResult<Vec<Test>> {
        require_author_role(actor)?;

        if actor.is_admin() {
            self.tests.list_all().await
        } else {
            self.tests.list_by_author(&actor.sub).await
        }
    }

    pub async fn get_test(&self, actor: &Claims, id: &str) -> AppResult<Test> {
        let test = self
            .tests
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test with id '{}' not found", id)))?;

        require_owner_or_admin(actor, &test.author_id)?;
        Ok(test)
    }

    pub async fn update_test(
        &self,
        actor: &Claims,
        id: &str,
        request: UpdateTestRequest,
    ) -> AppResult<Test> {
        request.validate()?;
        let mut test = self.get_test(actor, id).await?;

        if let Some(title) = request.title {
            test.title = title;
        }
        if let Some(description) = request.description {
            test.description = description;
        }
        if let Some(time_limit) = request.time_limit {
            test.time_limit = time_limit;
        }
        if let Some(passing_score) = request.passing_score {
            test.passing_score = passing_score;
        }
        if let Some(method) = request.evaluation_method {
            test.evaluation_method = method;
        }
        if let Some(message) = request.success_message {
            test.success_message = message;
        }
        if let Some(message) = request.failure_message {
            test.failure_message = message;
        }
        if let Some(status) = request.status {
            test.status = status;
        }
        check_passing_score(test.evaluation_method, test.passing_score)?;

        if !self.tests.update_details(&test).await? {
            return Err(AppError::NotFound(format!("Test with id '{}' not found", id)));
        }
        log::info!("Test '{}' updated by '{}'", test.id, actor.sub);
        Ok(test)
    }

    /// Deletes the test together with every attempt made on it.
    pub async fn delete_test(&self, actor: &Claims, id: &str) -> AppResult<()> {
        let test = self.get_test(actor, id).await?;

        if !self.tests.delete(&test.id).await? {
            return Err(AppError::NotFound(format!("Test with id '{}' not found", id)));
        }
        let removed = self.attempts.delete_by_test(&test.id).await?;
        log::info!(
            "Test '{}' deleted by '{}' along with {} attempt(s)",
            test.id,
            actor.sub,
            removed
        );
        Ok(())
    }

    pub async fn share_link(&self, actor: &Claims, id: &str) -> AppResult<ShareLinkResponse> {
        let test = self.get_test(actor, id).await?;

        Ok(ShareLinkResponse {
            url: self.config.share_url(&test.public_id),
            test_id: test.id,
            public_id: test.public_id,
        })
    }

    pub async fn get_public_test(&self, public_id: &str) -> AppResult<Test> {
        self.tests
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Test '{}' not found", public_id)))
    }

    /// Appends a question. Without an explicit `order_num` it goes after the last one.
    pub async fn add_question(
        &self,
        actor: &Claims,
        test_id: &str,
        request: QuestionRequest,
    ) -> AppResult<Question> {
        request.validate_all()?;
        let test = self.get_test(actor, test_id).await?;

        let order_num = request.order_num.unwrap_or_else(|| test.next_order_num());
        let question = Question::new(&request.text, request.points, order_num, request.answer_key);

        if !self.tests.push_question(&test.id, question.clone()).await? {
            return Err(AppError::NotFound(format!("Test with id '{}' not found", test_id)));
        }
        log::info!("Question '{}' added to test '{}'", question.id, test.id);
        Ok(question)
    }

    pub async fn list_questions(&self, actor: &Claims, test_id: &str) -> AppResult<Vec<Question>> {
        let test = self.get_test(actor, test_id).await?;
        Ok(test.ordered_questions().into_iter().cloned().collect())
    }

    pub async fn update_question(
        &self,
        actor: &Claims,
        test_id: &str,
        question_id: &str,
        request: QuestionRequest,
    ) -> AppResult<Question> {
        request.validate_all()?;
        let test = self.get_test(actor, test_id).await?;
        let existing = Self::find_question(&test, question_id)?;
        self.ensure_unanswered(&test, question_id).await?;

        let question = Question {
            id: existing.id.clone(),
            text: request.text,
            points: request.points,
            order_num: request.order_num.unwrap_or(existing.order_num),
            answer_key: request.answer_key,
        };

        if !self.tests.replace_question(&test.id, question.clone()).await? {
            return Err(AppError::NotFound(format!(
                "Question '{}' not found in test '{}'",
                question_id, test_id
            )));
        }
        log::info!("Question '{}' of test '{}' updated", question.id, test.id);
        Ok(question)
    }

    pub async fn delete_question(
        &self,
        actor: &Claims,
        test_id: &str,
        question_id: &str,
    ) -> AppResult<()> {
        let test = self.get_test(actor, test_id).await?;
        Self::find_question(&test, question_id)?;
        self.ensure_unanswered(&test, question_id).await?;

        if !self.tests.remove_question(&test.id, question_id).await? {
            return Err(AppError::NotFound(format!(
                "Question '{}' not found in test '{}'",
                question_id, test_id
            )));
        }
        log::info!("Question '{}' removed from test '{}'", question_id, test.id);
        Ok(())
    }

    fn find_question<'a>(test: &'a Test, question_id: &str) -> AppResult<&'a Question> {
        test.question(question_id).ok_or_else(|| {
            AppError::NotFound(format!(
                "Question '{}' not found in test '{}'",
                question_id, test.id
            ))
        })
    }

    /// Graded questions are frozen so recorded points keep matching their question.
    async fn ensure_unanswered(&self, test: &Test, question_id: &str) -> AppResult<()> {
        if self.attempts.question_has_answers(&test.id, question_id).await? {
            log::warn!(
                "Rejected change to answered question '{}' of test '{}'",
                question_id,
                test.id
            );
            return Err(AppError::InvalidState(format!(
                "Question '{}' already has answers and can no longer change",
                question_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::{AnswerKey, EvaluationMethod, TestStatus};
    use crate::repositories::{MockTestAttemptRepository, MockTestRepository};
    use crate::test_utils::fixtures::{
        admin_claims, employer_claims, input_key, input_question, sample_test, student_claims,
    };
    use mockall::predicate::eq;

    fn service(tests: MockTestRepository, attempts: MockTestAttemptRepository) -> TestService {
        TestService::new(
            Arc::new(tests),
            Arc::new(attempts),
            Arc::new(Config::test_config()),
        )
    }

    fn create_request(title: &str) -> CreateTestRequest {
        CreateTestRequest {
            title: title.to_string(),
            description: String::new(),
            time_limit: 0,
            passing_score: 0,
            evaluation_method: EvaluationMethod::Points,
            success_message: None,
            failure_message: None,
            status: TestStatus::Published,
        }
    }

    fn question_request(order_num: Option<i32>) -> QuestionRequest {
        QuestionRequest {
            text: "Capital of France?".to_string(),
            points: 2,
            order_num,
            answer_key: AnswerKey::Input(input_key(&["Paris"], false)),
        }
    }

    fn repo_with(test: Test) -> MockTestRepository {
        let mut tests = MockTestRepository::new();
        tests
            .expect_find_by_id()
            .with(eq(test.id.clone()))
            .returning(move |_| Ok(Some(test.clone())));
        tests
    }

    #[tokio::test]
    async fn test_create_test_sets_author_and_messages() {
        let mut tests = MockTestRepository::new();
        tests.expect_create().times(1).returning(|test| Ok(test));
        let service = service(tests, MockTestAttemptRepository::new());

        let mut request = create_request("Rust basics");
        request.success_message = Some("Well done".to_string());
        let test = service
            .create_test(&employer_claims("emp-1"), request)
            .await
            .unwrap();

        assert_eq!(test.author_id, "emp-1");
        assert_eq!(test.success_message, "Well done");
        assert_eq!(
            test.failure_message,
            crate::models::domain::test::DEFAULT_FAILURE_MESSAGE
        );
        assert_ne!(test.public_id, test.id);
    }

    #[tokio::test]
    async fn test_create_test_forbidden_for_students() {
        let mut tests = MockTestRepository::new();
        tests.expect_create().never();
        let service = service(tests, MockTestAttemptRepository::new());

        let result = service
            .create_test(&student_claims("stu-1"), create_request("Nope"))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_test_rejects_percent_above_hundred() {
        let service = service(MockTestRepository::new(), MockTestAttemptRepository::new());
        let mut request = create_request("Percent");
        request.evaluation_method = EvaluationMethod::Percent;
        request.passing_score = 150;

        let result = service.create_test(&employer_claims("emp-1"), request).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_list_tests_scopes_by_role() {
        let mut tests = MockTestRepository::new();
        tests
            .expect_list_by_author()
            .with(eq("emp-1"))
            .times(1)
            .returning(|author| Ok(vec![sample_test(author)]));
        tests
            .expect_list_all()
            .times(1)
            .returning(|| Ok(vec![sample_test("a"), sample_test("b")]));
        let service = service(tests, MockTestAttemptRepository::new());

        assert_eq!(service.list_tests(&employer_claims("emp-1")).await.unwrap().len(), 1);
        assert_eq!(service.list_tests(&admin_claims("root")).await.unwrap().len(), 2);
        assert!(matches!(
            service.list_tests(&student_claims("stu-1")).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_get_test_requires_owner_or_admin() {
        let test = sample_test("emp-1");
        let id = test.id.clone();
        let service = service(repo_with(test), MockTestAttemptRepository::new());

        assert!(service.get_test(&employer_claims("emp-1"), &id).await.is_ok());
        assert!(service.get_test(&admin_claims("root"), &id).await.is_ok());
        assert!(matches!(
            service.get_test(&employer_claims("emp-2"), &id).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_get_test_missing_is_not_found() {
        let mut tests = MockTestRepository::new();
        tests.expect_find_by_id().returning(|_| Ok(None));
        let service = service(tests, MockTestAttemptRepository::new());

        let result = service.get_test(&employer_claims("emp-1"), "missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_test_applies_only_given_fields() {
        let test = sample_test("emp-1");
        let id = test.id.clone();
        let mut tests = repo_with(test);
        tests
            .expect_update_details()
            .withf(|t| t.title == "Renamed" && t.description == "Ownership and borrowing")
            .times(1)
            .returning(|_| Ok(true));
        let service = service(tests, MockTestAttemptRepository::new());

        let request = UpdateTestRequest {
            title: Some("Renamed".to_string()),
            status: Some(TestStatus::Closed),
            ..Default::default()
        };
        let updated = service
            .update_test(&employer_claims("emp-1"), &id, request)
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.status, TestStatus::Closed);
    }

    #[tokio::test]
    async fn test_delete_test_removes_attempts() {
        let test = sample_test("emp-1");
        let id = test.id.clone();
        let mut tests = repo_with(test);
        tests.expect_delete().times(1).returning(|_| Ok(true));
        let mut attempts = MockTestAttemptRepository::new();
        attempts
            .expect_delete_by_test()
            .with(eq(id.clone()))
            .times(1)
            .returning(|_| Ok(3));
        let service = service(tests, attempts);

        assert!(service.delete_test(&employer_claims("emp-1"), &id).await.is_ok());
    }

    #[tokio::test]
    async fn test_share_link_uses_public_id() {
        let test = sample_test("emp-1");
        let id = test.id.clone();
        let public_id = test.public_id.clone();
        let service = service(repo_with(test), MockTestAttemptRepository::new());

        let link = service
            .share_link(&employer_claims("emp-1"), &id)
            .await
            .unwrap();

        assert_eq!(link.public_id, public_id);
        assert_eq!(link.url, format!("https://tests.example.com/tests/{}", public_id));
    }

    #[tokio::test]
    async fn test_add_question_appends_after_last() {
        let mut test = sample_test("emp-1");
        let mut existing = input_question(1);
        existing.order_num = 4;
        test.questions = vec![existing];
        let id = test.id.clone();

        let mut tests = repo_with(test);
        tests
            .expect_push_question()
            .withf(|_, q| q.order_num == 5 && q.points == 2)
            .times(1)
            .returning(|_, _| Ok(true));
        let service = service(tests, MockTestAttemptRepository::new());

        let question = service
            .add_question(&employer_claims("emp-1"), &id, question_request(None))
            .await
            .unwrap();
        assert_eq!(question.order_num, 5);
    }

    #[tokio::test]
    async fn test_add_question_to_empty_test_starts_at_one() {
        let test = sample_test("emp-1");
        let id = test.id.clone();
        let mut tests = repo_with(test);
        tests.expect_push_question().returning(|_, _| Ok(true));
        let service = service(tests, MockTestAttemptRepository::new());

        let question = service
            .add_question(&employer_claims("emp-1"), &id, question_request(None))
            .await
            .unwrap();
        assert_eq!(question.order_num, 1);
    }

    #[tokio::test]
    async fn test_add_question_rejects_invalid_key() {
        let test = sample_test("emp-1");
        let id = test.id.clone();
        let mut tests = repo_with(test);
        tests.expect_push_question().never();
        let service = service(tests, MockTestAttemptRepository::new());

        let mut request = question_request(None);
        request.answer_key = AnswerKey::Input(input_key(&[], false));
        let result = service
            .add_question(&employer_claims("emp-1"), &id, request)
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_add_question_rejects_oversized_points() {
        let test = sample_test("emp-1");
        let id = test.id.clone();
        let mut tests = repo_with(test);
        tests.expect_push_question().never();
        let service = service(tests, MockTestAttemptRepository::new());

        let mut request = question_request(None);
        request.points = i32::MAX;
        let result = service
            .add_question(&employer_claims("emp-1"), &id, request)
            .await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_update_answered_question_is_invalid_state() {
        let mut test = sample_test("emp-1");
        let question = input_question(1);
        let question_id = question.id.clone();
        test.questions = vec![question];
        let id = test.id.clone();

        let mut tests = repo_with(test);
        tests.expect_replace_question().never();
        let mut attempts = MockTestAttemptRepository::new();
        attempts
            .expect_question_has_answers()
            .returning(|_, _| Ok(true));
        let service = service(tests, attempts);

        let result = service
            .update_question(&employer_claims("emp-1"), &id, &question_id, question_request(None))
            .await;
        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_update_unanswered_question_keeps_id_and_order() {
        let mut test = sample_test("emp-1");
        let mut question = input_question(1);
        question.order_num = 3;
        let question_id = question.id.clone();
        test.questions = vec![question];
        let id = test.id.clone();

        let mut tests = repo_with(test);
        tests.expect_replace_question().returning(|_, _| Ok(true));
        let mut attempts = MockTestAttemptRepository::new();
        attempts
            .expect_question_has_answers()
            .returning(|_, _| Ok(false));
        let service = service(tests, attempts);

        let updated = service
            .update_question(&employer_claims("emp-1"), &id, &question_id, question_request(None))
            .await
            .unwrap();
        assert_eq!(updated.id, question_id);
        assert_eq!(updated.order_num, 3);
        assert_eq!(updated.points, 2);
    }

    #[tokio::test]
    async fn test_delete_unknown_question_is_not_found() {
        let test = sample_test("emp-1");
        let id = test.id.clone();
        let service = service(repo_with(test), MockTestAttemptRepository::new());

        let result = service
            .delete_question(&employer_claims("emp-1"), &id, "nope")
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_questions_sorted_by_order_num() {
        let mut test = sample_test("emp-1");
        let mut second = input_question(1);
        second.order_num = 2;
        let mut first = input_question(1);
        first.order_num = 1;
        test.questions = vec![second, first];
        let id = test.id.clone();
        let service = service(repo_with(test), MockTestAttemptRepository::new());

        let questions = service
            .list_questions(&admin_claims("root"), &id)
            .await
            .unwrap();
        let orders: Vec<i32> = questions.iter().map(|q| q.order_num).collect();
        assert_eq!(orders, vec![1, 2]);
    }
}
