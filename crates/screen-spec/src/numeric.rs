use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::answers::display_string;

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:Infinity|(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("float prefix pattern compiles")
});

/// Lenient float parsing: skips leading whitespace and reads the longest
/// numeric prefix, so `"45kg"` is 45. Returns NaN when there is no prefix.
pub fn parse_float(text: &str) -> f64 {
    let text = text.trim_start();
    let Some(found) = FLOAT_PREFIX.find(text) else {
        return f64::NAN;
    };
    match found.as_str() {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        prefix => prefix.parse().unwrap_or(f64::NAN),
    }
}

/// Parses an answer as a number through its string rendering.
pub fn parse_answer_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(f64::NAN),
        other => parse_float(&display_string(other)),
    }
}

/// Shortest rendering of a number: `18`, `1.5`, `Infinity`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else if (1e-6..1e21).contains(&value.abs()) {
        format!("{value}")
    } else {
        // Script runtimes print `1e+21` and `1.5e-7` here.
        let text = format!("{value:e}");
        match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_float_reads_numeric_prefix() {
        assert_eq!(parse_float("45"), 45.0);
        assert_eq!(parse_float("  12.5 lbs"), 12.5);
        assert_eq!(parse_float("45kg"), 45.0);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("5."), 5.0);
        assert_eq!(parse_float("1e3"), 1000.0);
        assert_eq!(parse_float("-3"), -3.0);
        assert_eq!(parse_float("Infinity"), f64::INFINITY);
        assert!(parse_float("abc").is_nan());
        assert!(parse_float("").is_nan());
        assert!(parse_float("e5").is_nan());
    }

    #[test]
    fn answers_parse_through_their_string_form() {
        assert_eq!(parse_answer_number(Some(&json!("200"))), 200.0);
        assert_eq!(parse_answer_number(Some(&json!(180))), 180.0);
        assert_eq!(parse_answer_number(Some(&json!(["7"]))), 7.0);
        assert!(parse_answer_number(Some(&json!(true))).is_nan());
        assert!(parse_answer_number(None).is_nan());
    }

    #[test]
    fn numbers_format_in_shortest_form() {
        assert_eq!(format_number(18.0), "18");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn format_number_uses_exponent_form_at_the_extremes() {
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
    }
}
