use fancy_regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;

use crate::condition::Condition;

/// Supported input types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Email,
    Password,
    Number,
    SingleSelect,
    MultiSelect,
    Checkbox,
    ConsentItem,
    MedicationDetailsGroup,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Number => "number",
            FieldType::SingleSelect => "single_select",
            FieldType::MultiSelect => "multi_select",
            FieldType::Checkbox => "checkbox",
            FieldType::ConsentItem => "consent_item",
            FieldType::MedicationDetailsGroup => "medication_details_group",
        }
    }

    /// Group fields carry nested fields instead of an answer of their own.
    pub fn is_group(&self) -> bool {
        matches!(self, FieldType::MedicationDetailsGroup)
    }

    pub fn has_options(&self) -> bool {
        matches!(self, FieldType::SingleSelect | FieldType::MultiSelect)
    }
}

/// A selectable option, written either as a bare value or as an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ChoiceOption {
    Value(String),
    Detailed {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
}

impl ChoiceOption {
    pub fn value(&self) -> &str {
        match self {
            ChoiceOption::Value(value) | ChoiceOption::Detailed { value, .. } => value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ChoiceOption::Detailed {
                label: Some(label), ..
            } => label,
            other => other.value(),
        }
    }
}

impl From<&str> for ChoiceOption {
    fn from(value: &str) -> Self {
        ChoiceOption::Value(value.to_string())
    }
}

/// Document link shown next to a consent item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConsentLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConditionalDisplay {
    #[schemars(with = "String")]
    pub show_if: Condition,
}

/// A `validation.pattern` compiled when the schema is loaded.
///
/// Backed by a backtracking engine so look-around and backreferences work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValidationPattern(Regex);

impl ValidationPattern {
    pub fn new(pattern: &str) -> Result<Self, fancy_regex::Error> {
        Regex::new(pattern).map(Self)
    }

    /// A match that aborts at runtime (backtrack limit) counts as a miss.
    pub fn is_match(&self, text: &str) -> bool {
        match self.0.is_match(text) {
            Ok(matched) => matched,
            Err(err) => {
                tracing::warn!(pattern = self.as_str(), error = %err, "pattern match aborted");
                false
            }
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for ValidationPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl TryFrom<String> for ValidationPattern {
    type Error = fancy_regex::Error;

    fn try_from(pattern: String) -> Result<Self, Self::Error> {
        Self::new(&pattern)
    }
}

impl From<ValidationPattern> for String {
    fn from(pattern: ValidationPattern) -> Self {
        pattern.as_str().to_string()
    }
}

/// Reference to another field for `greater_than_field` / `less_than_field`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldComparison {
    Field(String),
    Rule {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl FieldComparison {
    pub fn field(&self) -> &str {
        match self {
            FieldComparison::Field(field) | FieldComparison::Rule { field, .. } => field,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FieldComparison::Rule { error, .. } => error.as_deref(),
            FieldComparison::Field(_) => None,
        }
    }
}

/// Per-field validation rules.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub pattern: Option<ValidationPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greater_than_field: Option<FieldComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub less_than_field: Option<FieldComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldValidation {
    pub(crate) fn has_range(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Field ids this rule set compares against.
    pub fn referenced_fields(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("matches", self.matches.as_deref()),
            (
                "greater_than_field",
                self.greater_than_field.as_ref().map(FieldComparison::field),
            ),
            (
                "less_than_field",
                self.less_than_field.as_ref().map(FieldComparison::field),
            ),
        ]
        .into_iter()
        .filter_map(|(rule, target)| target.map(|target| (rule, target)))
    }
}

/// A single input descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Field {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_display: Option<ConditionalDisplay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChoiceOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub multiline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<ConsentLink>,
    /// Nested fields of a `medication_details_group`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldNode>,
}

impl Field {
    pub fn new(id: impl Into<String>, kind: FieldType) -> Self {
        Self {
            id: id.into(),
            kind,
            label: None,
            placeholder: None,
            help_text: None,
            required: false,
            conditional_display: None,
            validation: None,
            options: Vec::new(),
            mask: None,
            multiline: false,
            rows: None,
            suffix: None,
            min: None,
            max: None,
            links: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn show_if(mut self, condition: &str) -> Self {
        self.conditional_display = Some(ConditionalDisplay {
            show_if: Condition::parse(condition),
        });
        self
    }

    pub fn with_validation(mut self, validation: FieldValidation) -> Self {
        self.validation = Some(validation);
        self
    }

    pub fn with_options<I, O>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<ChoiceOption>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldNode>) -> Self {
        self.fields = fields;
        self
    }

    /// Label for display, falling back to the id.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Either one field or a row of fields rendered side by side.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldNode {
    Row(Vec<FieldNode>),
    Field(Box<Field>),
}

// Dispatches on the JSON shape so field errors (bad patterns, unknown types)
// surface with their own message instead of an untagged-enum mismatch.
impl<'de> Deserialize<'de> for FieldNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(D::Error::custom))
                .collect::<Result<Vec<_>, _>>()
                .map(FieldNode::Row),
            other => serde_json::from_value::<Field>(other)
                .map(|field| FieldNode::Field(Box::new(field)))
                .map_err(D::Error::custom),
        }
    }
}

impl From<Field> for FieldNode {
    fn from(field: Field) -> Self {
        FieldNode::Field(Box::new(field))
    }
}

impl FieldNode {
    pub fn row<I: IntoIterator<Item = Field>>(fields: I) -> Self {
        FieldNode::Row(fields.into_iter().map(FieldNode::from).collect())
    }
}
