#![allow(missing_docs)]

pub mod answers;
pub mod condition;
pub mod error;
pub mod error_map;
pub mod field_rules;
pub mod numeric;
pub mod render;
pub mod schema_check;
pub mod session;
pub mod spec;
pub mod tree;
pub mod validate;
pub mod visibility;

pub use answers::{AnswerMap, display_string, is_empty_answer};
pub use condition::{Clause, Combinator, Condition};
pub use error::SchemaError;
pub use error_map::ErrorMap;
pub use field_rules::validate_field;
pub use render::{
    RenderField, RenderPayload, RenderStatus, build_render_payload, render_json_ui, render_text,
};
pub use schema_check::{check_questionnaire, check_screen};
pub use session::{AutoAdvanceTimer, ScreenHost, ScreenSession, SubmitOutcome};
pub use spec::{
    AutoAdvance, ChoiceOption, ConditionalDisplay, ConsentLink, Field, FieldComparison, FieldNode,
    FieldType, FieldValidation, QuestionnaireSpec, ScreenSpec, ScreenType, ScreenValidation,
    ValidationPattern, ValidationRule,
};
pub use tree::{FieldTree, FieldVisit, Walk, flatten, walk_visible};
pub use validate::{
    Progress, ScreenValidationResult, apply_max_yes_rule, is_complete, is_field_answered,
    progress, validate_all, validate_all_fields, validate_one,
};
pub use visibility::{VisibilityMap, resolve_visibility, should_show};
