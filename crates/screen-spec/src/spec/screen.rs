use std::borrow::Cow;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::field::{ChoiceOption, Field, FieldNode, FieldType};

/// Kinds of screen in an intake flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScreenType {
    TextInput,
    SingleSelect,
    MultiSelect,
    Composite,
    Consent,
    Terminal,
    Interstitial,
}

impl ScreenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenType::TextInput => "text_input",
            ScreenType::SingleSelect => "single_select",
            ScreenType::MultiSelect => "multi_select",
            ScreenType::Composite => "composite",
            ScreenType::Consent => "consent",
            ScreenType::Terminal => "terminal",
            ScreenType::Interstitial => "interstitial",
        }
    }

    /// Field type of the implicit field on single-answer screens.
    fn implicit_field_type(&self) -> Option<FieldType> {
        match self {
            ScreenType::TextInput => Some(FieldType::Text),
            ScreenType::SingleSelect => Some(FieldType::SingleSelect),
            ScreenType::MultiSelect => Some(FieldType::MultiSelect),
            _ => None,
        }
    }
}

/// "At most `limit` of `fields` may equal `'yes'`."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationRule {
    pub fields: Vec<String>,
    pub limit: usize,
    pub error: String,
}

/// Screen-level rules applied on submit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ScreenValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_currently_taking: Option<ValidationRule>,
}

fn default_delay_ms() -> u64 {
    400
}

/// Deferred submit after certain selections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AutoAdvance {
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Values that trigger the advance; empty means any selection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub on_values: Vec<String>,
}

impl AutoAdvance {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn triggers(&self, value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::String(text) if text.is_empty() => false,
            Value::Array(items) if items.is_empty() => false,
            _ if self.on_values.is_empty() => true,
            Value::String(text) => self.on_values.contains(text),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .any(|item| self.on_values.iter().any(|value| value == item)),
            _ => false,
        }
    }
}

fn default_required() -> bool {
    true
}

/// A single screen of the questionnaire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScreenSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ScreenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Answer key of single-answer screens; defaults to the screen id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ScreenValidation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_advance: Option<AutoAdvance>,
}

impl ScreenSpec {
    pub fn new(id: impl Into<String>, kind: ScreenType) -> Self {
        Self {
            id: id.into(),
            kind,
            title: None,
            description: None,
            field_id: None,
            required: true,
            options: Vec::new(),
            fields: Vec::new(),
            validation: None,
            auto_advance: None,
        }
    }

    /// A composite screen over the given fields.
    pub fn composite(id: impl Into<String>, fields: Vec<FieldNode>) -> Self {
        Self {
            fields,
            ..Self::new(id, ScreenType::Composite)
        }
    }

    pub fn answer_key(&self) -> &str {
        self.field_id.as_deref().unwrap_or(&self.id)
    }

    /// The field tree the engine walks for this screen.
    ///
    /// Single-answer screens without explicit fields get one implicit field;
    /// terminal and interstitial screens have none.
    pub fn field_nodes(&self) -> Cow<'_, [FieldNode]> {
        match self.kind {
            ScreenType::Terminal | ScreenType::Interstitial => Cow::Borrowed(&[]),
            kind if self.fields.is_empty() => match kind.implicit_field_type() {
                Some(field_type) => {
                    let mut field = Field::new(self.answer_key(), field_type);
                    field.required = self.required;
                    field.label = self.title.clone();
                    field.options = self.options.clone();
                    Cow::Owned(vec![field.into()])
                }
                None => Cow::Borrowed(&[]),
            },
            _ => Cow::Borrowed(&self.fields),
        }
    }

    pub fn aggregate_rule(&self) -> Option<&ValidationRule> {
        self.validation
            .as_ref()
            .and_then(|validation| validation.max_currently_taking.as_ref())
    }
}
