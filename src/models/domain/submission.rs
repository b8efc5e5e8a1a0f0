//! Typed views of a raw submitted answer, one per question type.
//!
//! Each parser returns `None` when the value does not have the shape its
//! question type expects. Callers treat that as a wrong answer.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::models::domain::question::ItemId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SingleChoice(pub ItemId);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiChoice(pub BTreeSet<ItemId>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextAnswer(pub String);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchAnswer(pub BTreeMap<String, ItemId>);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceAnswer(pub Vec<ItemId>);

fn item_id(value: &Value) -> Option<ItemId> {
    match value {
        Value::Number(n) => n.as_i64().map(ItemId::Number),
        Value::String(s) => Some(ItemId::Text(s.clone())),
        _ => None,
    }
}

impl SingleChoice {
    pub fn from_value(value: &Value) -> Option<Self> {
        item_id(value).map(SingleChoice)
    }
}

impl MultiChoice {
    pub fn from_value(value: &Value) -> Option<Self> {
        value
            .as_array()?
            .iter()
            .map(item_id)
            .collect::<Option<BTreeSet<_>>>()
            .map(MultiChoice)
    }
}

impl TextAnswer {
    /// Any value is accepted: strings as-is, everything else by its display form
    /// (`True`, `None`, `[1, 'a']`). Always trimmed.
    pub fn from_value(value: &Value) -> Self {
        let text = match value {
            Value::String(s) => s.clone(),
            other => display_form(other),
        };
        TextAnswer(text.trim().to_string())
    }
}

fn display_form(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(display_form).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(key, value)| format!("'{}': {}", key, display_form(value)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

impl MatchAnswer {
    pub fn from_value(value: &Value) -> Option<Self> {
        value
            .as_object()?
            .iter()
            .map(|(left, right)| item_id(right).map(|right| (left.clone(), right)))
            .collect::<Option<BTreeMap<_, _>>>()
            .map(MatchAnswer)
    }
}

impl SequenceAnswer {
    pub fn from_value(value: &Value) -> Option<Self> {
        value
            .as_array()?
            .iter()
            .map(item_id)
            .collect::<Option<Vec<_>>>()
            .map(SequenceAnswer)
    }
}
