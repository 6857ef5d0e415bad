//! Per-field validation.
//!
//! Rules run in a fixed order and the first failure wins: consent, required,
//! pattern, `matches`, number parsing and `validation.min`/`max`, cross-field
//! comparisons, then the field's own `min`/`max` as a fallback range.

use serde_json::Value;

use crate::answers::{AnswerMap, is_empty_answer};
use crate::numeric::{format_number, parse_answer_number};
use crate::spec::field::{Field, FieldType, FieldValidation};

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const CONSENT_REQUIRED_MESSAGE: &str = "This consent is required to continue.";
pub const INVALID_NUMBER_MESSAGE: &str = "Please enter a valid number.";
pub const INVALID_FORMAT_MESSAGE: &str = "Please enter a valid value.";
pub const MISMATCH_MESSAGE: &str = "Values do not match.";

/// Validates one field's value. Returns the user-facing error, if any.
pub fn validate_field(field: &Field, value: Option<&Value>, answers: &AnswerMap) -> Option<String> {
    if field.kind == FieldType::ConsentItem
        && field.required
        && value != Some(&Value::Bool(true))
    {
        return Some(CONSENT_REQUIRED_MESSAGE.to_string());
    }

    let value = match value {
        Some(value) if !is_empty_answer(Some(value)) => value,
        _ => return field.required.then(|| REQUIRED_MESSAGE.to_string()),
    };

    let rules = field.validation.as_ref();

    if let Some(rules) = rules {
        if let Some(pattern) = &rules.pattern
            && let Some(text) = value.as_str()
            && !pattern.is_match(text)
        {
            return Some(message_or(rules, INVALID_FORMAT_MESSAGE));
        }

        if let Some(other) = &rules.matches
            && answers.get(other) != Some(value)
        {
            return Some(message_or(rules, MISMATCH_MESSAGE));
        }
    }

    let number = parse_answer_number(Some(value));

    if field.kind == FieldType::Number {
        if number.is_nan() {
            return Some(INVALID_NUMBER_MESSAGE.to_string());
        }
        if let Some(rules) = rules
            && let Some(error) = check_range(number, rules.min, rules.max, rules.error.as_deref())
        {
            return Some(error);
        }
    }

    if !number.is_nan()
        && let Some(rules) = rules
    {
        if let Some(comparison) = &rules.greater_than_field
            && let Some(other) = comparable_answer(answers, comparison.field())
            && number <= other
        {
            return Some(
                comparison
                    .error()
                    .or(rules.error.as_deref())
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        format!("Value must be greater than {}.", format_number(other))
                    }),
            );
        }

        if let Some(comparison) = &rules.less_than_field
            && let Some(other) = comparable_answer(answers, comparison.field())
            && number >= other
        {
            return Some(
                comparison
                    .error()
                    .or(rules.error.as_deref())
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Value must be less than {}.", format_number(other))),
            );
        }
    }

    if field.kind == FieldType::Number && !rules.is_some_and(FieldValidation::has_range) {
        return check_range(number, field.min, field.max, None);
    }

    None
}

fn message_or(rules: &FieldValidation, fallback: &str) -> String {
    rules.error.clone().unwrap_or_else(|| fallback.to_string())
}

fn check_range(number: f64, min: Option<f64>, max: Option<f64>, error: Option<&str>) -> Option<String> {
    if let Some(min) = min
        && number < min
    {
        return Some(
            error
                .map(str::to_string)
                .unwrap_or_else(|| format!("Value must be at least {}.", format_number(min))),
        );
    }
    if let Some(max) = max
        && number > max
    {
        return Some(
            error
                .map(str::to_string)
                .unwrap_or_else(|| format!("Value must be no more than {}.", format_number(max))),
        );
    }
    None
}

/// The referenced field's number, when it holds a non-empty, numeric answer.
fn comparable_answer(answers: &AnswerMap, field_id: &str) -> Option<f64> {
    let value = answers.get(field_id);
    if is_empty_answer(value) {
        return None;
    }
    let number = parse_answer_number(value);
    (!number.is_nan()).then_some(number)
}
