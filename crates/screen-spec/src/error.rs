use thiserror::Error;

/// Authoring errors in a questionnaire schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to parse schema: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("screen '{0}' is not defined")]
    UnknownScreen(String),
    #[error("screen id '{0}' is declared more than once")]
    DuplicateScreen(String),
    #[error("screen '{screen}' declares field '{field}' more than once")]
    DuplicateField { screen: String, field: String },
    #[error("field '{field}' on screen '{screen}' needs at least one option")]
    MissingOptions { screen: String, field: String },
    #[error("group field '{field}' on screen '{screen}' has no nested fields")]
    EmptyGroup { screen: String, field: String },
    #[error("field '{field}' on screen '{screen}' references unknown field '{target}' in {rule}")]
    UnknownReference {
        screen: String,
        field: String,
        rule: &'static str,
        target: String,
    },
    #[error("aggregate rule on screen '{0}' lists no fields")]
    EmptyRule(String),
    #[error("aggregate rule on screen '{screen}' names unknown field '{field}'")]
    UnknownRuleField { screen: String, field: String },
}
