use serde_json::Value;

use crate::models::domain::question::{AnswerKey, ChoiceKey, InputKey, MatchKey, Question, SequenceKey};
use crate::models::domain::submission::{
    MatchAnswer, MultiChoice, SequenceAnswer, SingleChoice, TextAnswer,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GradeResult {
    pub is_correct: bool,
    pub points_awarded: i32,
}

pub struct AnswerGrader;

impl AnswerGrader {
    /// Grade a submitted answer against the question's key.
    ///
    /// All or nothing: a correct answer earns the question's full points,
    /// anything else (including a value of the wrong shape) earns 0.
    pub fn grade(question: &Question, submitted_answer: &Value) -> GradeResult {
        let is_correct = match &question.answer_key {
            AnswerKey::Single(key) => Self::grade_single(key, submitted_answer),
            AnswerKey::Multi(key) => Self::grade_multi(key, submitted_answer),
            AnswerKey::Input(key) => Self::grade_input(key, submitted_answer),
            AnswerKey::Match(key) => Self::grade_match(key, submitted_answer),
            AnswerKey::Sequence(key) => Self::grade_sequence(key, submitted_answer),
            AnswerKey::Unsupported { .. } => false,
        };

        GradeResult {
            is_correct,
            points_awarded: if is_correct { question.points } else { 0 },
        }
    }

    fn grade_single(key: &ChoiceKey, submitted: &Value) -> bool {
        let Some(SingleChoice(selected)) = SingleChoice::from_value(submitted) else {
            return false;
        };
        key.options
            .iter()
            .any(|option| option.id == selected && option.is_correct.unwrap_or(false))
    }

    fn grade_multi(key: &ChoiceKey, submitted: &Value) -> bool {
        MultiChoice::from_value(submitted)
            .is_some_and(|MultiChoice(selected)| selected == key.correct_ids())
    }

    fn grade_input(key: &InputKey, submitted: &Value) -> bool {
        let TextAnswer(text) = TextAnswer::from_value(submitted);
        let correct_answers = key.correct_answers.as_deref().unwrap_or_default();

        if key.case_sensitive {
            correct_answers.iter().any(|answer| *answer == text)
        } else {
            let text = text.to_lowercase();
            correct_answers
                .iter()
                .any(|answer| answer.to_lowercase() == text)
        }
    }

    fn grade_match(key: &MatchKey, submitted: &Value) -> bool {
        let Some(correct) = key.correct_matches.as_ref() else {
            return false;
        };
        MatchAnswer::from_value(submitted).is_some_and(|MatchAnswer(matches)| &matches == correct)
    }

    fn grade_sequence(key: &SequenceKey, submitted: &Value) -> bool {
        SequenceAnswer::from_value(submitted)
            .is_some_and(|SequenceAnswer(order)| order == key.expected_order())
    }
}
