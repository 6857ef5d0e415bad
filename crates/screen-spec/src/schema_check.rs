use std::collections::BTreeSet;

use crate::error::SchemaError;
use crate::spec::{QuestionnaireSpec, ScreenSpec};
use crate::tree::flatten;

/// Structural checks within one screen.
pub fn check_screen(screen: &ScreenSpec) -> Result<(), SchemaError> {
    let nodes = screen.field_nodes();
    let fields = flatten(&nodes);
    let mut seen = BTreeSet::new();

    for field in &fields {
        if !seen.insert(field.id.as_str()) {
            return Err(SchemaError::DuplicateField {
                screen: screen.id.clone(),
                field: field.id.clone(),
            });
        }
        if field.kind.has_options() && field.options.is_empty() {
            return Err(SchemaError::MissingOptions {
                screen: screen.id.clone(),
                field: field.id.clone(),
            });
        }
        if field.kind.is_group() && field.fields.is_empty() {
            return Err(SchemaError::EmptyGroup {
                screen: screen.id.clone(),
                field: field.id.clone(),
            });
        }
    }

    if let Some(rule) = screen.aggregate_rule() {
        if rule.fields.is_empty() {
            return Err(SchemaError::EmptyRule(screen.id.clone()));
        }
        if let Some(unknown) = rule
            .fields
            .iter()
            .find(|field_id| !seen.contains(field_id.as_str()))
        {
            return Err(SchemaError::UnknownRuleField {
                screen: screen.id.clone(),
                field: unknown.clone(),
            });
        }
    }

    Ok(())
}

/// Checks every screen, then cross-field references across the whole
/// questionnaire. Conditions may name answers from any screen, so dangling
/// condition references are only logged.
pub fn check_questionnaire(spec: &QuestionnaireSpec) -> Result<(), SchemaError> {
    let mut screen_ids = BTreeSet::new();
    for screen in &spec.screens {
        if !screen_ids.insert(screen.id.as_str()) {
            return Err(SchemaError::DuplicateScreen(screen.id.clone()));
        }
        check_screen(screen)?;
    }

    let trees: Vec<_> = spec.screens.iter().map(ScreenSpec::field_nodes).collect();
    let known: BTreeSet<&str> = trees
        .iter()
        .flat_map(|nodes| flatten(nodes))
        .map(|field| field.id.as_str())
        .collect();

    for (screen, nodes) in spec.screens.iter().zip(&trees) {
        for field in flatten(nodes) {
            if let Some(validation) = &field.validation {
                for (rule, target) in validation.referenced_fields() {
                    if !known.contains(target) {
                        return Err(SchemaError::UnknownReference {
                            screen: screen.id.clone(),
                            field: field.id.clone(),
                            rule,
                            target: target.to_string(),
                        });
                    }
                }
            }
            if let Some(display) = &field.conditional_display {
                for target in display
                    .show_if
                    .referenced_fields()
                    .filter(|target| !known.contains(target))
                {
                    tracing::warn!(
                        screen = %screen.id,
                        field = %field.id,
                        target,
                        "condition references a field no screen declares"
                    );
                }
            }
        }
    }

    Ok(())
}
