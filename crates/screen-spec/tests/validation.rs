use serde_json::{Value, json};

use screen_spec::{
    AnswerMap, Field, FieldComparison, FieldType, FieldValidation, QuestionnaireSpec, ScreenSpec,
    ScreenValidation, ValidationPattern, ValidationRule, is_field_answered, validate_all,
    validate_field,
};

fn intake() -> QuestionnaireSpec {
    QuestionnaireSpec::from_json(include_str!("fixtures/intake.json")).expect("fixture")
}

fn answers(value: Value) -> AnswerMap {
    AnswerMap::from_value(value)
}

fn healthy_history(goal: &str) -> AnswerMap {
    answers(json!({
        "goal": goal,
        "height_ft": "5",
        "height_in": "10",
        "current_weight": "200",
        "takes_glp1": "no"
    }))
}

#[test]
fn number_field_enforces_validation_range() {
    let field = Field::new("age", FieldType::Number)
        .required()
        .with_validation(FieldValidation {
            min: Some(18.0),
            max: Some(100.0),
            error: Some("Out of range".into()),
            ..Default::default()
        });
    let empty = AnswerMap::new();

    assert_eq!(
        validate_field(&field, Some(&json!("15")), &empty).as_deref(),
        Some("Out of range")
    );
    assert_eq!(validate_field(&field, Some(&json!("45")), &empty), None);
    assert_eq!(
        validate_field(&field, Some(&json!("abc")), &empty).as_deref(),
        Some("Please enter a valid number.")
    );
    assert_eq!(
        validate_field(&field, None, &empty).as_deref(),
        Some("This field is required.")
    );
}

#[test]
fn consent_requires_strict_true() {
    let field = Field::new("consent", FieldType::ConsentItem).required();
    let empty = AnswerMap::new();

    assert_eq!(
        validate_field(&field, Some(&json!(false)), &empty).as_deref(),
        Some("This consent is required to continue.")
    );
    assert_eq!(
        validate_field(&field, Some(&json!("true")), &empty).as_deref(),
        Some("This consent is required to continue.")
    );
    assert_eq!(validate_field(&field, Some(&json!(true)), &empty), None);

    let optional = Field::new("marketing", FieldType::ConsentItem);
    assert_eq!(validate_field(&optional, Some(&json!(false)), &empty), None);
    assert_eq!(validate_field(&optional, None, &empty), None);
}

#[test]
fn hidden_required_fields_do_not_block_submit() {
    let spec = intake();
    let screen = spec.screen("medical_history").expect("screen");
    let answers = healthy_history("gain_muscle");

    let result = validate_all(screen, &answers);
    assert!(result.all_valid, "unexpected errors: {:?}", result.errors);
    assert!(result.errors.is_empty());
    assert!(screen.is_complete(&answers));
}

#[test]
fn hidden_fields_with_stale_values_are_ignored() {
    let spec = intake();
    let screen = spec.screen("medical_history").expect("screen");
    let mut answers = healthy_history("gain_muscle");
    answers.insert("goal_weight", json!("999"));
    answers.insert("medication_name", json!(""));

    assert!(validate_all(screen, &answers).all_valid);
}

#[test]
fn revealed_required_field_blocks_submit() {
    let spec = intake();
    let screen = spec.screen("medical_history").expect("screen");
    let answers = healthy_history("lose_weight");

    let result = validate_all(screen, &answers);
    assert!(!result.all_valid);
    assert_eq!(result.errors.get("goal_weight"), Some("This field is required."));
    assert!(!screen.is_complete(&answers));
}

#[test]
fn goal_weight_must_be_below_current_weight() {
    let spec = intake();
    let screen = spec.screen("medical_history").expect("screen");
    let mut answers = healthy_history("lose_weight");

    answers.insert("goal_weight", json!("210"));
    assert_eq!(
        screen.validate_field("goal_weight", &answers).as_deref(),
        Some("Goal weight must be less than your current weight.")
    );

    answers.insert("goal_weight", json!("180"));
    assert_eq!(screen.validate_field("goal_weight", &answers), None);
    assert!(validate_all(screen, &answers).all_valid);
}

#[test]
fn cross_field_rule_waits_for_the_other_field() {
    let spec = intake();
    let screen = spec.screen("medical_history").expect("screen");
    let mut answers = healthy_history("lose_weight");
    answers.insert("current_weight", json!(""));
    answers.insert("goal_weight", json!("210"));

    let result = validate_all(screen, &answers);
    assert_eq!(result.errors.get("goal_weight"), None);
    assert_eq!(
        result.errors.get("current_weight"),
        Some("This field is required.")
    );
}

#[test]
fn group_fields_validate_their_children_in_order() {
    let spec = intake();
    let screen = spec.screen("medical_history").expect("screen");
    let mut answers = healthy_history("gain_muscle");
    answers.insert("takes_glp1", json!("yes"));

    let result = validate_all(screen, &answers);
    assert!(!result.all_valid);
    let ids: Vec<&str> = result.errors.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec!["medication_name", "dose", "last_dose_date"]);
    assert!(!result.errors.contains("glp1_details"));
    assert!(!screen.is_complete(&answers));

    answers.insert("medication_name", json!("Wegovy"));
    answers.insert("dose", json!("0.25"));
    answers.insert("last_dose_date", json!("01/02/2026"));
    assert!(validate_all(screen, &answers).all_valid);
    assert!(screen.is_complete(&answers));
}

#[test]
fn too_many_yes_answers_mark_every_yes_field() {
    let spec = intake();
    let screen = spec.screen("medical_history").expect("screen");
    let mut answers = healthy_history("gain_muscle");
    answers.insert("conditions", json!(["type_2_diabetes"]));
    answers.insert("diabetes_meds", json!("yes"));
    answers.insert("takes_glp1", json!("yes"));
    answers.insert("medication_name", json!("Wegovy"));
    answers.insert("dose", json!("0.25"));
    answers.insert("last_dose_date", json!("01/02/2026"));

    // Completeness ignores the aggregate rule.
    assert!(screen.is_complete(&answers));

    let result = validate_all(screen, &answers);
    assert!(!result.all_valid);
    assert_eq!(result.errors.len(), 2);
    for field in ["diabetes_meds", "takes_glp1"] {
        assert_eq!(
            result.errors.get(field),
            Some("Please list only one medication you are currently taking.")
        );
    }

    answers.insert("diabetes_meds", json!("no"));
    assert!(validate_all(screen, &answers).all_valid);
}

#[test]
fn aggregate_rule_overwrites_field_errors() {
    let mut screen = ScreenSpec::composite(
        "meds",
        vec![
            Field::new("a", FieldType::Text)
                .with_validation(FieldValidation {
                    pattern: Some(ValidationPattern::new("^no$").expect("pattern")),
                    error: Some("Answer must be no".into()),
                    ..Default::default()
                })
                .into(),
            Field::new("b", FieldType::Text).into(),
        ],
    );
    let answers = answers(json!({ "a": "yes", "b": "yes" }));
    assert_eq!(
        validate_all(&screen, &answers).errors.get("a"),
        Some("Answer must be no")
    );

    screen.validation = Some(ScreenValidation {
        max_currently_taking: Some(ValidationRule {
            fields: vec!["a".into(), "b".into()],
            limit: 1,
            error: "Too many".into(),
        }),
    });
    let result = validate_all(&screen, &answers);
    assert!(!result.all_valid);
    assert_eq!(result.errors.first(), Some(("a", "Too many")));
    assert_eq!(result.errors.get("b"), Some("Too many"));
}

#[test]
fn blur_validation_is_idempotent_and_reaches_nested_fields() {
    let spec = intake();
    let screen = spec.screen("medical_history").expect("screen");
    let answers = answers(json!({ "takes_glp1": "yes", "dose": "abc" }));

    let first = screen.validate_field("dose", &answers);
    let second = screen.validate_field("dose", &answers);
    assert_eq!(first.as_deref(), Some("Please enter a valid number."));
    assert_eq!(first, second);
    assert_eq!(screen.validate_field("unknown", &answers), None);
}

#[test]
fn account_rules_cover_pattern_and_matches() {
    let spec = intake();
    let screen = spec.screen("account").expect("screen");

    let bad = answers(json!({
        "email": "not-an-email",
        "password": "short",
        "confirm_password": "shorter"
    }));
    let result = validate_all(screen, &bad);
    assert_eq!(
        result.errors.get("email"),
        Some("Please enter a valid email address.")
    );
    assert_eq!(
        result.errors.get("password"),
        Some("Password must be at least 8 characters.")
    );
    assert_eq!(
        result.errors.get("confirm_password"),
        Some("Passwords must match.")
    );

    let good = answers(json!({
        "email": "pat@example.com",
        "password": "correct horse",
        "confirm_password": "correct horse"
    }));
    assert!(validate_all(screen, &good).all_valid);
}

#[test]
fn greater_than_field_falls_back_to_default_message() {
    let field = Field::new("max_dose", FieldType::Number).with_validation(FieldValidation {
        greater_than_field: Some(FieldComparison::Field("min_dose".into())),
        ..Default::default()
    });
    let answers = answers(json!({ "min_dose": "5" }));

    assert_eq!(
        validate_field(&field, Some(&json!("5")), &answers).as_deref(),
        Some("Value must be greater than 5.")
    );
    assert_eq!(validate_field(&field, Some(&json!("7.5")), &answers), None);
}

#[test]
fn cross_field_comparison_applies_to_numeric_text() {
    let field = Field::new("goal", FieldType::Text).with_validation(FieldValidation {
        less_than_field: Some(FieldComparison::Field("current".into())),
        error: Some("Too high".into()),
        ..Default::default()
    });
    let answers = answers(json!({ "current": 150 }));

    assert_eq!(
        validate_field(&field, Some(&json!("160")), &answers).as_deref(),
        Some("Too high")
    );
    assert_eq!(validate_field(&field, Some(&json!("about 160")), &answers), None);
}

#[test]
fn malformed_pattern_fails_schema_loading() {
    let result = serde_json::from_value::<ScreenSpec>(json!({
        "id": "broken",
        "type": "composite",
        "fields": [
            { "id": "x", "type": "text", "validation": { "pattern": "(" } }
        ]
    }));
    let error = result.expect_err("pattern should not compile");
    assert!(error.to_string().contains("regex parse error"), "{error}");
}

fn password_questionnaire(pattern: &str) -> String {
    json!({
        "id": "signup",
        "title": "Sign up",
        "version": "1",
        "screens": [
            {
                "id": "goal",
                "type": "single_select",
                "title": "Goal",
                "options": ["lose_weight", "maintain"]
            },
            {
                "id": "account",
                "type": "composite",
                "title": "Account",
                "fields": [
                    {
                        "id": "password",
                        "type": "password",
                        "required": true,
                        "validation": { "pattern": pattern, "error": "Include a digit." }
                    }
                ]
            }
        ]
    })
    .to_string()
}

#[test]
fn lookahead_patterns_load_and_validate() {
    let spec = QuestionnaireSpec::from_json(&password_questionnaire("^(?=.*[0-9]).{8,}$"))
        .expect("lookahead pattern loads");
    assert!(spec.screen("goal").is_some());
    let screen = spec.screen("account").expect("account screen");

    let weak = answers(json!({ "password": "password" }));
    assert_eq!(
        screen.validate_field("password", &weak).as_deref(),
        Some("Include a digit.")
    );

    let strong = answers(json!({ "password": "passw0rd" }));
    assert_eq!(screen.validate_field("password", &strong), None);
}

#[test]
fn malformed_patterns_still_fail_to_load() {
    let error = QuestionnaireSpec::from_json(&password_questionnaire("^(unclosed"))
        .expect_err("unbalanced group");
    assert!(error.to_string().starts_with("failed to parse schema"));
}

#[test]
fn pattern_failure_is_reported_before_number_range() {
    let field = Field::new("age", FieldType::Number).with_validation(FieldValidation {
        pattern: Some(ValidationPattern::new("^[0-9]+$").expect("pattern")),
        min: Some(18.0),
        ..Default::default()
    });
    let empty = AnswerMap::new();

    // "1x" breaks the pattern and, read as 1, is also below the minimum.
    assert_eq!(
        validate_field(&field, Some(&json!("1x")), &empty).as_deref(),
        Some("Please enter a valid value.")
    );
    assert_eq!(
        validate_field(&field, Some(&json!("12")), &empty).as_deref(),
        Some("Value must be at least 18.")
    );
}

#[test]
fn answered_means_non_empty_or_strictly_true_consent() {
    let allergies = Field::new("allergies", FieldType::Text);
    let consent = Field::new("consent_telehealth", FieldType::ConsentItem);
    let answers = answers(json!({
        "allergies": "",
        "conditions": [],
        "consent_telehealth": "true"
    }));

    assert!(!is_field_answered(&allergies, &answers));
    assert!(!is_field_answered(
        &Field::new("conditions", FieldType::MultiSelect),
        &answers
    ));
    assert!(!is_field_answered(&consent, &answers));

    let answered = AnswerMap::from_value(json!({
        "allergies": "none",
        "consent_telehealth": true
    }));
    assert!(is_field_answered(&allergies, &answered));
    assert!(is_field_answered(&consent, &answered));
}
