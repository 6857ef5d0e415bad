pub mod field;
pub mod questionnaire;
pub mod screen;

pub use field::{
    ChoiceOption, ConditionalDisplay, ConsentLink, Field, FieldComparison, FieldNode, FieldType,
    FieldValidation, ValidationPattern,
};
pub use questionnaire::QuestionnaireSpec;
pub use screen::{AutoAdvance, ScreenSpec, ScreenType, ScreenValidation, ValidationRule};
