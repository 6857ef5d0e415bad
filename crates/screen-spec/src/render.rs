use serde_json::{Map, Value, json};

use crate::{
    answers::{AnswerMap, display_string},
    error_map::ErrorMap,
    spec::{
        field::{ChoiceOption, ConsentLink, FieldType},
        screen::{ScreenSpec, ScreenType},
    },
    tree::Walk,
    validate::Progress,
};

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Some visible required field is still unanswered.
    NeedInput,
    /// Every visible required field is answered.
    Complete,
}

impl RenderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderStatus::NeedInput => "need_input",
            RenderStatus::Complete => "complete",
        }
    }
}

/// Describes a single visible field for render outputs.
#[derive(Debug, Clone)]
pub struct RenderField {
    pub id: String,
    pub kind: FieldType,
    pub label: String,
    pub required: bool,
    pub depth: usize,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub suffix: Option<String>,
    pub mask: Option<String>,
    pub multiline: bool,
    pub rows: Option<u32>,
    pub current_value: Option<Value>,
    pub error: Option<String>,
    pub options: Vec<ChoiceOption>,
    pub links: Vec<ConsentLink>,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct RenderPayload {
    pub screen_id: String,
    pub screen_type: ScreenType,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: RenderStatus,
    pub can_continue: bool,
    pub progress: Progress,
    pub fields: Vec<RenderField>,
}

impl RenderPayload {
    pub fn visible_count(&self) -> usize {
        self.fields.len()
    }
}

/// Build the renderer payload from a screen, the current answers and the
/// screen's error map.
pub fn build_render_payload(
    screen: &ScreenSpec,
    answers: &AnswerMap,
    errors: &ErrorMap,
) -> RenderPayload {
    let nodes = screen.field_nodes();
    let fields = Walk::visible(&nodes, answers)
        .map(|visit| {
            let field = visit.field;
            RenderField {
                id: field.id.clone(),
                kind: field.kind,
                label: field.display_label().to_string(),
                required: field.required,
                depth: visit.depth,
                placeholder: field.placeholder.clone(),
                help_text: field.help_text.clone(),
                suffix: field.suffix.clone(),
                mask: field.mask.clone(),
                multiline: field.multiline,
                rows: field.rows,
                current_value: answers.get(&field.id).cloned(),
                error: errors.get(&field.id).map(str::to_string),
                options: field.options.clone(),
                links: field.links.clone(),
            }
        })
        .collect::<Vec<_>>();

    let can_continue = screen.is_complete(answers);
    let status = if can_continue {
        RenderStatus::Complete
    } else {
        RenderStatus::NeedInput
    };

    RenderPayload {
        screen_id: screen.id.clone(),
        screen_type: screen.kind,
        title: screen.title.clone(),
        description: screen.description.clone(),
        status,
        can_continue,
        progress: screen.progress(answers),
        fields,
    }
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &RenderPayload) -> Value {
    let fields = payload
        .fields
        .iter()
        .map(|field| {
            let mut map = Map::new();
            map.insert("id".into(), Value::String(field.id.clone()));
            map.insert("type".into(), Value::String(field.kind.as_str().to_string()));
            map.insert("label".into(), Value::String(field.label.clone()));
            map.insert("required".into(), Value::Bool(field.required));
            map.insert("depth".into(), Value::from(field.depth));
            for (key, value) in [
                ("placeholder", &field.placeholder),
                ("help_text", &field.help_text),
                ("suffix", &field.suffix),
                ("mask", &field.mask),
                ("error", &field.error),
            ] {
                if let Some(value) = value {
                    map.insert(key.into(), Value::String(value.clone()));
                }
            }
            if field.multiline {
                map.insert("multiline".into(), Value::Bool(true));
            }
            if let Some(rows) = field.rows {
                map.insert("rows".into(), Value::from(rows));
            }
            if let Some(current_value) = &field.current_value {
                map.insert("current_value".into(), current_value.clone());
            }
            if !field.options.is_empty() {
                map.insert(
                    "options".into(),
                    Value::Array(
                        field
                            .options
                            .iter()
                            .map(|option| {
                                json!({
                                    "value": option.value(),
                                    "label": option.label(),
                                })
                            })
                            .collect(),
                    ),
                );
            }
            if !field.links.is_empty() {
                map.insert(
                    "links".into(),
                    Value::Array(
                        field
                            .links
                            .iter()
                            .map(|link| json!({ "label": link.label, "url": link.url }))
                            .collect(),
                    ),
                );
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "screen_id": payload.screen_id,
        "screen_type": payload.screen_type.as_str(),
        "title": payload.title,
        "description": payload.description,
        "status": payload.status.as_str(),
        "can_continue": payload.can_continue,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
        },
        "fields": fields,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &RenderPayload) -> String {
    let mut lines = Vec::new();
    match &payload.title {
        Some(title) => lines.push(format!("Screen: {} ({})", title, payload.screen_id)),
        None => lines.push(format!("Screen: {}", payload.screen_id)),
    }
    lines.push(format!(
        "Status: {} ({}/{})",
        payload.status.as_str(),
        payload.progress.answered,
        payload.progress.total
    ));
    if let Some(description) = &payload.description {
        lines.push(description.clone());
    }

    if payload.fields.is_empty() {
        lines.push("No input on this screen.".to_string());
    } else {
        lines.push("Visible fields:".to_string());
    }
    for field in &payload.fields {
        let indent = "  ".repeat(field.depth);
        let mut entry = format!("{} - {} ({})", indent, field.id, field.label);
        if field.required {
            entry.push_str(" [required]");
        }
        if let Some(current_value) = &field.current_value {
            entry.push_str(&format!(" = {}", value_to_display(current_value)));
        }
        lines.push(entry);
        if let Some(error) = &field.error {
            lines.push(format!("{}   ! {}", indent, error));
        }
    }

    lines.push(if payload.can_continue {
        "Continue: enabled".to_string()
    } else {
        "Continue: disabled".to_string()
    });

    lines.join("\n")
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::Array(_) => format!("[{}]", display_string(Some(value))),
        other => display_string(Some(other)),
    }
}
