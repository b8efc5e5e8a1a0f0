#[cfg(test)]
pub mod fixtures {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use serde_json::json;

    use crate::auth::Claims;
    use crate::models::domain::question::{
        AnswerKey, ChoiceKey, ChoiceOption, InputKey, MatchKey, MatchSide, SequenceItem,
        SequenceKey,
    };
    use crate::models::domain::{GradingRecord, ItemId, Question, Test, UserRole};

    /// Options labelled "Option {id}", marked correct as given.
    pub fn choice_key(options: &[(i64, bool)]) -> ChoiceKey {
        ChoiceKey {
            options: options
                .iter()
                .map(|(id, correct)| ChoiceOption {
                    id: ItemId::Number(*id),
                    label: format!("Option {}", id),
                    is_correct: Some(*correct),
                })
                .collect(),
        }
    }

    pub fn input_key(answers: &[&str], case_sensitive: bool) -> InputKey {
        InputKey {
            correct_answers: Some(answers.iter().map(|a| a.to_string()).collect()),
            case_sensitive,
        }
    }

    /// One left and one right side per pair, plus the pairs as the correct matches.
    pub fn match_key(pairs: &[(&str, &str)]) -> MatchKey {
        MatchKey {
            left: pairs
                .iter()
                .map(|(left, _)| MatchSide {
                    id: ItemId::from(*left),
                    label: format!("Left {}", left),
                })
                .collect(),
            right: pairs
                .iter()
                .map(|(_, right)| MatchSide {
                    id: ItemId::from(*right),
                    label: format!("Right {}", right),
                })
                .collect(),
            correct_matches: Some(
                pairs
                    .iter()
                    .map(|(left, right)| (left.to_string(), ItemId::from(*right)))
                    .collect::<BTreeMap<_, _>>(),
            ),
        }
    }

    /// Items given as `(id, correct_order)` in authored position.
    pub fn sequence_key(items: &[(i64, i64)]) -> SequenceKey {
        SequenceKey {
            items: items
                .iter()
                .map(|(id, order)| SequenceItem {
                    id: ItemId::Number(*id),
                    label: format!("Step {}", id),
                    correct_order: Some(*order),
                })
                .collect(),
        }
    }

    pub fn question_with(answer_key: AnswerKey, points: i32) -> Question {
        Question::new("Sample question", points, 1, answer_key)
    }

    /// Input question whose only correct answer is "answer".
    pub fn input_question(points: i32) -> Question {
        question_with(AnswerKey::Input(input_key(&["answer"], false)), points)
    }

    pub fn sample_test(author_id: &str) -> Test {
        let mut test = Test::new(author_id, "Rust fundamentals");
        test.description = "Ownership and borrowing".to_string();
        test
    }

    pub fn graded(question_id: &str, points: i32) -> GradingRecord {
        GradingRecord {
            question_id: question_id.to_string(),
            selected_answer: json!("answer"),
            is_correct: points > 0,
            points_awarded: points,
            answered_at: Utc::now(),
        }
    }

    pub fn claims_for(user_id: &str, role: UserRole) -> Claims {
        Claims {
            sub: user_id.to_string(),
            email: format!("{}@example.com", user_id),
            role,
            iat: 0,
            exp: 9999999999,
        }
    }

    pub fn student_claims(user_id: &str) -> Claims {
        claims_for(user_id, UserRole::Student)
    }

    pub fn employer_claims(user_id: &str) -> Claims {
        claims_for(user_id, UserRole::Employer)
    }

    pub fn admin_claims(user_id: &str) -> Claims {
        claims_for(user_id, UserRole::Admin)
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    use crate::errors::AppError;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }

    pub fn assert_invalid_state<T: std::fmt::Debug>(result: Result<T, AppError>) {
        assert!(
            matches!(result, Err(AppError::InvalidState(_))),
            "Expected InvalidState, got: {:?}",
            result
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::test_helpers::*;
    use crate::models::domain::ItemId;
    use actix_web::http::StatusCode;

    #[test]
    fn test_choice_key_fixture_marks_correct_options() {
        let key = choice_key(&[(1, false), (2, true)]);
        assert_eq!(key.options.len(), 2);
        assert_eq!(key.options[0].label, "Option 1");
        assert_eq!(key.correct_ids().into_iter().collect::<Vec<_>>(), vec![ItemId::Number(2)]);
    }

    #[test]
    fn test_match_key_fixture_has_both_sides() {
        let key = match_key(&[("1", "a"), ("2", "b")]);
        assert_eq!(key.left.len(), 2);
        assert_eq!(key.right.len(), 2);
        assert_eq!(key.correct_matches.map(|m| m.len()), Some(2));
    }

    #[test]
    fn test_claims_fixtures_roles() {
        assert!(!student_claims("s").role.can_author());
        assert!(employer_claims("e").role.can_author());
        assert!(admin_claims("a").is_admin());
    }

    #[test]
    fn test_helpers_assert_error_status() {
        assert_error_status(StatusCode::BAD_REQUEST);
        assert_error_status(StatusCode::CONFLICT);
    }

    #[test]
    fn test_helpers_assert_success_status() {
        assert_success_status(StatusCode::OK);
        assert_success_status(StatusCode::CREATED);
    }
}
