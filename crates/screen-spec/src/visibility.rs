use std::collections::{BTreeMap, BTreeSet};

use crate::answers::AnswerMap;
use crate::spec::field::{Field, FieldNode};
use crate::tree::{FieldTree, flatten};

pub type VisibilityMap = BTreeMap<String, bool>;

/// Whether a field's own condition holds. Fields without one always show.
pub fn should_show(field: &Field, answers: &AnswerMap) -> bool {
    field
        .conditional_display
        .as_ref()
        .is_none_or(|display| display.show_if.evaluate(answers))
}

/// Effective visibility of every field in the tree; children of a hidden
/// group are hidden too.
pub fn resolve_visibility(nodes: &[FieldNode], answers: &AnswerMap) -> VisibilityMap {
    let visible: BTreeSet<&str> = FieldTree::new(nodes)
        .visible(answers)
        .map(|field| field.id.as_str())
        .collect();
    flatten(nodes)
        .into_iter()
        .map(|field| (field.id.clone(), visible.contains(field.id.as_str())))
        .collect()
}
