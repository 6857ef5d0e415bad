use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use screen_spec::{
    AnswerMap, ErrorMap, QuestionnaireSpec, SchemaError, ScreenSpec, build_render_payload,
    check_questionnaire, render_json_ui as screen_render_json_ui,
    render_text as screen_render_text,
};

const DEFAULT_QUESTIONNAIRE: &str = include_str!("../../screen-spec/tests/fixtures/intake.json");

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("invalid questionnaire: {0}")]
    Schema(#[from] SchemaError),
    #[error("screen '{0}' is not available")]
    ScreenUnavailable(String),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

#[derive(Debug, Deserialize, Serialize, Default)]
struct ComponentConfig {
    #[serde(default)]
    questionnaire_json: Option<String>,
}

fn load_questionnaire(config_json: &str) -> Result<QuestionnaireSpec, ComponentError> {
    let config = if config_json.trim().is_empty() {
        ComponentConfig::default()
    } else {
        serde_json::from_str(config_json).map_err(ComponentError::ConfigParse)?
    };

    let spec_json = config
        .questionnaire_json
        .as_deref()
        .unwrap_or(DEFAULT_QUESTIONNAIRE);

    let spec = QuestionnaireSpec::from_json(spec_json)?;
    tracing::debug!(questionnaire = %spec.id, screens = spec.screens.len(), "questionnaire loaded");
    Ok(spec)
}

fn ensure_screen(config_json: &str, screen_id: &str) -> Result<ScreenSpec, ComponentError> {
    load_questionnaire(config_json)?
        .screens
        .into_iter()
        .find(|screen| screen.id == screen_id)
        .ok_or_else(|| ComponentError::ScreenUnavailable(screen_id.to_string()))
}

fn parse_answers(answers_json: &str) -> AnswerMap {
    serde_json::from_str(answers_json)
        .map(AnswerMap::from_value)
        .unwrap_or_default()
}

fn parse_errors(errors_json: &str) -> ErrorMap {
    let mut errors = ErrorMap::new();
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(errors_json) {
        for (field_id, message) in map {
            if let Value::String(message) = message {
                errors.insert(field_id, message);
            }
        }
    }
    errors
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

/// The screen definition as JSON.
pub fn describe(config_json: &str, screen_id: &str) -> String {
    respond(
        ensure_screen(config_json, screen_id)
            .and_then(|screen| serde_json::to_value(screen).map_err(ComponentError::JsonEncode)),
    )
}

/// Authoring checks over the whole questionnaire.
pub fn check_schema(config_json: &str) -> String {
    respond(load_questionnaire(config_json).and_then(|spec| {
        check_questionnaire(&spec)?;
        Ok(json!({ "ok": true, "screens": spec.screens.len() }))
    }))
}

/// Submit-time validation of a screen.
pub fn validate_screen(config_json: &str, screen_id: &str, answers_json: &str) -> String {
    respond(ensure_screen(config_json, screen_id).and_then(|screen| {
        let answers = parse_answers(answers_json);
        serde_json::to_value(screen.validate(&answers)).map_err(ComponentError::JsonEncode)
    }))
}

/// Blur-time validation of one field.
pub fn validate_field(
    config_json: &str,
    screen_id: &str,
    field_id: &str,
    answers_json: &str,
) -> String {
    respond(ensure_screen(config_json, screen_id).map(|screen| {
        let answers = parse_answers(answers_json);
        json!({
            "field_id": field_id,
            "error": screen.validate_field(field_id, &answers),
        })
    }))
}

/// Live completeness for enabling the continue control.
pub fn check_complete(config_json: &str, screen_id: &str, answers_json: &str) -> String {
    respond(ensure_screen(config_json, screen_id).map(|screen| {
        let answers = parse_answers(answers_json);
        json!({
            "complete": screen.is_complete(&answers),
            "progress": screen.progress(&answers),
        })
    }))
}

pub fn render_json_ui(
    config_json: &str,
    screen_id: &str,
    answers_json: &str,
    errors_json: &str,
) -> String {
    respond(ensure_screen(config_json, screen_id).map(|screen| {
        let payload = build_render_payload(
            &screen,
            &parse_answers(answers_json),
            &parse_errors(errors_json),
        );
        screen_render_json_ui(&payload)
    }))
}

pub fn render_text(
    config_json: &str,
    screen_id: &str,
    answers_json: &str,
    errors_json: &str,
) -> String {
    respond_string(ensure_screen(config_json, screen_id).map(|screen| {
        let payload = build_render_payload(
            &screen,
            &parse_answers(answers_json),
            &parse_errors(errors_json),
        );
        screen_render_text(&payload)
    }))
}
