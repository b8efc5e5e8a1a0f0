use crate::models::domain::question::{
    AnswerKey, ChoiceKey, ChoiceOption, InputKey, MatchKey, SequenceItem, SequenceKey,
};

pub struct AnswerKeyRedactor;

impl AnswerKeyRedactor {
    /// Copy of `answer_key` with every grading-only field removed, safe to show a test-taker.
    pub fn redact(answer_key: &AnswerKey) -> AnswerKey {
        match answer_key {
            AnswerKey::Single(key) => AnswerKey::Single(Self::redact_choices(key)),
            AnswerKey::Multi(key) => AnswerKey::Multi(Self::redact_choices(key)),
            AnswerKey::Input(key) => AnswerKey::Input(InputKey {
                correct_answers: None,
                case_sensitive: key.case_sensitive,
            }),
            AnswerKey::Match(key) => AnswerKey::Match(MatchKey {
                left: key.left.clone(),
                right: key.right.clone(),
                correct_matches: None,
            }),
            AnswerKey::Sequence(key) => AnswerKey::Sequence(SequenceKey {
                items: key
                    .items
                    .iter()
                    .map(|item| SequenceItem {
                        id: item.id.clone(),
                        label: item.label.clone(),
                        correct_order: None,
                    })
                    .collect(),
            }),
            AnswerKey::Unsupported { .. } => answer_key.clone(),
        }
    }

    fn redact_choices(key: &ChoiceKey) -> ChoiceKey {
        ChoiceKey {
            options: key
                .options
                .iter()
                .map(|option| ChoiceOption {
                    id: option.id.clone(),
                    label: option.label.clone(),
                    is_correct: None,
                })
                .collect(),
        }
    }
}
