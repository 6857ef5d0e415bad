use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::spec::screen::ScreenSpec;

/// Top-level intake questionnaire definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QuestionnaireSpec {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub screens: Vec<ScreenSpec>,
}

impl QuestionnaireSpec {
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn screen(&self, id: &str) -> Option<&ScreenSpec> {
        self.screens.iter().find(|screen| screen.id == id)
    }

    pub fn require_screen(&self, id: &str) -> Result<&ScreenSpec, SchemaError> {
        self.screen(id)
            .ok_or_else(|| SchemaError::UnknownScreen(id.to_string()))
    }
}
