use serde::Serialize;
use serde_json::Value;

use crate::answers::AnswerMap;
use crate::error_map::ErrorMap;
use crate::field_rules::validate_field;
use crate::spec::field::{Field, FieldNode, FieldType};
use crate::spec::screen::{ScreenSpec, ValidationRule};
use crate::tree::{FieldTree, Walk, walk_visible};

/// Outcome of validating a whole screen on submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenValidationResult {
    pub errors: ErrorMap,
    pub all_valid: bool,
}

/// Answered/total counters over visible required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
}

/// Validates every visible field. Group fields are not validated themselves;
/// their nested fields are.
pub fn validate_all_fields(nodes: &[FieldNode], answers: &AnswerMap) -> ScreenValidationResult {
    let mut errors = ErrorMap::new();
    walk_visible(nodes, answers, |field| {
        if field.kind.is_group() {
            return;
        }
        if let Some(error) = validate_field(field, answers.get(&field.id), answers) {
            tracing::trace!(field = %field.id, %error, "field failed validation");
            errors.insert(field.id.as_str(), error);
        }
    });
    let all_valid = errors.is_empty();
    ScreenValidationResult { errors, all_valid }
}

/// Submit-time validation of a screen, including its aggregate rule.
pub fn validate_all(screen: &ScreenSpec, answers: &AnswerMap) -> ScreenValidationResult {
    let nodes = screen.field_nodes();
    let mut result = validate_all_fields(&nodes, answers);
    if let Some(rule) = screen.aggregate_rule() {
        apply_max_yes_rule(rule, answers, &mut result);
    }
    tracing::debug!(
        screen = %screen.id,
        errors = result.errors.len(),
        all_valid = result.all_valid,
        "validated screen"
    );
    result
}

/// Enforces "at most `limit` of the listed fields equal `'yes'`". When the
/// limit is exceeded every `'yes'` field gets the rule's error, replacing
/// any per-field error it already had.
pub fn apply_max_yes_rule(
    rule: &ValidationRule,
    answers: &AnswerMap,
    result: &mut ScreenValidationResult,
) {
    let yes: Vec<&str> = rule
        .fields
        .iter()
        .map(String::as_str)
        .filter(|field_id| answers.get(field_id).and_then(Value::as_str) == Some("yes"))
        .collect();
    if yes.len() <= rule.limit {
        return;
    }
    tracing::debug!(count = yes.len(), limit = rule.limit, "aggregate yes limit exceeded");
    for field_id in yes {
        result.errors.insert(field_id, rule.error.as_str());
    }
    result.all_valid = false;
}

/// Blur-time validation of one field, looked up anywhere in the tree.
pub fn validate_one(nodes: &[FieldNode], field_id: &str, answers: &AnswerMap) -> Option<String> {
    let field = FieldTree::new(nodes).find(field_id)?;
    validate_field(field, answers.get(field_id), answers)
}

/// Whether a required field counts as answered. Consent items need `true`.
pub fn is_field_answered(field: &Field, answers: &AnswerMap) -> bool {
    match field.kind {
        FieldType::ConsentItem => answers.get(&field.id) == Some(&Value::Bool(true)),
        _ => answers.is_answered(&field.id),
    }
}

fn counts_towards_completion(field: &Field) -> bool {
    field.required && !field.kind.is_group()
}

/// Live completeness: every visible required field is answered. Looser than
/// [`validate_all_fields`]; patterns and ranges are not checked.
pub fn is_complete(nodes: &[FieldNode], answers: &AnswerMap) -> bool {
    Walk::visible(nodes, answers)
        .map(|visit| visit.field)
        .filter(|field| counts_towards_completion(field))
        .all(|field| is_field_answered(field, answers))
}

pub fn progress(nodes: &[FieldNode], answers: &AnswerMap) -> Progress {
    let (answered, total) = Walk::visible(nodes, answers)
        .map(|visit| visit.field)
        .filter(|field| counts_towards_completion(field))
        .fold((0, 0), |(answered, total), field| {
            (
                answered + usize::from(is_field_answered(field, answers)),
                total + 1,
            )
        });
    Progress { answered, total }
}

impl ScreenSpec {
    pub fn validate(&self, answers: &AnswerMap) -> ScreenValidationResult {
        validate_all(self, answers)
    }

    pub fn validate_field(&self, field_id: &str, answers: &AnswerMap) -> Option<String> {
        validate_one(&self.field_nodes(), field_id, answers)
    }

    pub fn is_complete(&self, answers: &AnswerMap) -> bool {
        is_complete(&self.field_nodes(), answers)
    }

    pub fn progress(&self, answers: &AnswerMap) -> Progress {
        progress(&self.field_nodes(), answers)
    }
}
