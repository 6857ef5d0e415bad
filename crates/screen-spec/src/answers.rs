use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::numeric::format_number;

/// Flat answer map keyed by field id.
///
/// The map is owned by the flow controller and survives across screens. The
/// engine only ever reads it; writes go through [`crate::ScreenHost`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(Map<String, Value>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from any JSON value; anything but an object yields an empty map.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn get(&self, field_id: &str) -> Option<&Value> {
        self.0.get(field_id)
    }

    pub fn insert(&mut self, field_id: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field_id.into(), value)
    }

    pub fn remove(&mut self, field_id: &str) -> Option<Value> {
        self.0.remove(field_id)
    }

    /// Whether the field holds a non-empty answer.
    pub fn is_answered(&self, field_id: &str) -> bool {
        !is_empty_answer(self.get(field_id))
    }

    /// The answer rendered the way the condition language compares it.
    pub fn display_value(&self, field_id: &str) -> String {
        display_string(self.get(field_id))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }

    /// Encodes the answers as a CBOR snapshot.
    pub fn to_cbor(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(&self.0)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, serde_cbor::Error> {
        serde_cbor::from_slice(bytes).map(Self)
    }
}

impl From<Map<String, Value>> for AnswerMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for AnswerMap {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }
}

/// Missing, `null`, `""` and `[]` all count as unanswered.
pub fn is_empty_answer(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

/// Renders an answer as a string using script-style coercion: a missing
/// answer is `"undefined"`, arrays join their items with `,`.
pub fn display_string(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(value) => coerce(value),
    }
}

fn coerce(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::String(text) => text.clone(),
        Value::Number(number) => match (number.as_i64(), number.as_u64(), number.as_f64()) {
            (Some(int), _, _) => int.to_string(),
            (_, Some(uint), _) => uint.to_string(),
            (_, _, Some(float)) => format_number(float),
            _ => number.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => coerce(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}
