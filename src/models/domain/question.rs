use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// Identifier of an option, a match side or a sequence item.
///
/// Authors may use numbers or strings; values only compare equal when both the
/// kind and the value match, so `1` and `"1"` are different ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl From<i64> for ItemId {
    fn from(value: i64) -> Self {
        ItemId::Number(value)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        ItemId::Text(value.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, async_graphql::Enum)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Single,
    Multi,
    Input,
    Match,
    Sequence,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Single => "single",
            QuestionType::Multi => "multi",
            QuestionType::Input => "input",
            QuestionType::Match => "match",
            QuestionType::Sequence => "sequence",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChoiceOption {
    pub id: ItemId,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

/// Answer key shared by `single` and `multi` questions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChoiceKey {
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
}

impl ChoiceKey {
    pub fn correct_ids(&self) -> BTreeSet<ItemId> {
        self.options
            .iter()
            .filter(|option| option.is_correct.unwrap_or(false))
            .map(|option| option.id.clone())
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct InputKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_answers: Option<Vec<String>>,
    #[serde(default)]
    pub case_sensitive: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct MatchSide {
    pub id: ItemId,
    #[serde(default)]
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MatchKey {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub left: Vec<MatchSide>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub right: Vec<MatchSide>,
    /// Left id (as written in the JSON object key) to right id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_matches: Option<BTreeMap<String, ItemId>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SequenceItem {
    pub id: ItemId,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_order: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SequenceKey {
    #[serde(default)]
    pub items: Vec<SequenceItem>,
}

impl SequenceKey {
    /// Item ids ordered by `correct_order`. Equal positions keep their authored order.
    pub fn expected_order(&self) -> Vec<ItemId> {
        let mut items: Vec<&SequenceItem> = self.items.iter().collect();
        items.sort_by_key(|item| item.correct_order);
        items.into_iter().map(|item| item.id.clone()).collect()
    }
}

/// The grading data of a question, one variant per question type.
///
/// Stored documents carry it as `{"type": ..., "answer_key": {...}}`. A type
/// this service does not know is kept verbatim in `Unsupported` so older
/// records still load.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "RawAnswerKey", into = "RawAnswerKey")]
pub enum AnswerKey {
    Single(ChoiceKey),
    Multi(ChoiceKey),
    Input(InputKey),
    Match(MatchKey),
    Sequence(SequenceKey),
    Unsupported { kind: String, data: Value },
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RawAnswerKey {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub answer_key: Value,
}

impl TryFrom<RawAnswerKey> for AnswerKey {
    type Error = serde_json::Error;

    fn try_from(raw: RawAnswerKey) -> Result<Self, Self::Error> {
        let data = match raw.answer_key {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let key = match raw.kind.as_str() {
            "single" => AnswerKey::Single(serde_json::from_value(data)?),
            "multi" => AnswerKey::Multi(serde_json::from_value(data)?),
            "input" => AnswerKey::Input(serde_json::from_value(data)?),
            "match" => AnswerKey::Match(serde_json::from_value(data)?),
            "sequence" => AnswerKey::Sequence(serde_json::from_value(data)?),
            _ => AnswerKey::Unsupported {
                kind: raw.kind,
                data,
            },
        };
        Ok(key)
    }
}

impl From<AnswerKey> for RawAnswerKey {
    fn from(key: AnswerKey) -> Self {
        let kind = key.type_name().to_string();
        let answer_key = match key {
            AnswerKey::Single(k) | AnswerKey::Multi(k) => serde_json::to_value(k),
            AnswerKey::Input(k) => serde_json::to_value(k),
            AnswerKey::Match(k) => serde_json::to_value(k),
            AnswerKey::Sequence(k) => serde_json::to_value(k),
            AnswerKey::Unsupported { data, .. } => Ok(data),
        };

        RawAnswerKey {
            kind,
            answer_key: answer_key.unwrap_or(Value::Null),
        }
    }
}

impl AnswerKey {
    pub fn question_type(&self) -> Option<QuestionType> {
        match self {
            AnswerKey::Single(_) => Some(QuestionType::Single),
            AnswerKey::Multi(_) => Some(QuestionType::Multi),
            AnswerKey::Input(_) => Some(QuestionType::Input),
            AnswerKey::Match(_) => Some(QuestionType::Match),
            AnswerKey::Sequence(_) => Some(QuestionType::Sequence),
            AnswerKey::Unsupported { .. } => None,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            AnswerKey::Unsupported { kind, .. } => kind,
            other => other
                .question_type()
                .map(|t| t.as_str())
                .unwrap_or_default(),
        }
    }

    /// The key body without its type tag, as sent over the wire.
    pub fn to_json(&self) -> Value {
        RawAnswerKey::from(self.clone()).answer_key
    }

    /// Checks that a key submitted by an author can actually be graded.
    pub fn validate_for_authoring(&self) -> AppResult<()> {
        match self {
            AnswerKey::Single(key) | AnswerKey::Multi(key) => {
                if key.options.is_empty() {
                    return Err(AppError::ValidationError(
                        "Choice questions need at least one option".to_string(),
                    ));
                }
                let unique: BTreeSet<&ItemId> = key.options.iter().map(|o| &o.id).collect();
                if unique.len() != key.options.len() {
                    return Err(AppError::ValidationError(
                        "Option ids must be unique".to_string(),
                    ));
                }
                if key.correct_ids().is_empty() {
                    return Err(AppError::ValidationError(
                        "At least one option must be marked correct".to_string(),
                    ));
                }
            }
            AnswerKey::Input(key) => {
                if key.correct_answers.as_ref().map_or(true, |answers| answers.is_empty()) {
                    return Err(AppError::ValidationError(
                        "Input questions need at least one correct answer".to_string(),
                    ));
                }
            }
            AnswerKey::Match(key) => {
                if key.correct_matches.as_ref().map_or(true, |matches| matches.is_empty()) {
                    return Err(AppError::ValidationError(
                        "Match questions need correct_matches".to_string(),
                    ));
                }
            }
            AnswerKey::Sequence(key) => {
                if key.items.is_empty() {
                    return Err(AppError::ValidationError(
                        "Sequence questions need at least one item".to_string(),
                    ));
                }
                if key.items.iter().any(|item| item.correct_order.is_none()) {
                    return Err(AppError::ValidationError(
                        "Every sequence item needs a correct_order".to_string(),
                    ));
                }
            }
            AnswerKey::Unsupported { kind, .. } => {
                return Err(AppError::ValidationError(format!(
                    "Unsupported question type '{}'",
                    kind
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub text: String,
    pub points: i32,
    pub order_num: i32,
    #[serde(flatten)]
    pub answer_key: AnswerKey,
}

impl Question {
    pub fn new(text: &str, points: i32, order_num: i32, answer_key: AnswerKey) -> Self {
        Question {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            points,
            order_num,
            answer_key,
        }
    }
}
