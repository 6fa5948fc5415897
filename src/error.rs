//! Domain errors for schema validation and answer handling

use thiserror::Error;

/// Reasons a schema fails loose validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("schema declares no axes")]
    NoAxes,

    #[error("schema declares {0} axes (at most {max})", max = crate::schema::MAX_AXES)]
    TooManyAxes(usize),

    #[error("schema has no phases")]
    NoPhases,

    #[error("schema has no questions")]
    NoQuestions,

    #[error("duplicate axis id '{0}'")]
    DuplicateAxis(String),

    #[error("duplicate question id '{0}'")]
    DuplicateQuestion(String),

    #[error("{context} references unknown axis '{axis}'")]
    UnknownAxis { context: String, axis: String },

    #[error("question '{0}' needs at least two options")]
    TooFewOptions(String),

    #[error("question '{id}': {reason}")]
    InvalidSlider { id: String, reason: String },

    #[error("question '{id}': invalid keyword pattern '{pattern}'")]
    InvalidKeyword { id: String, pattern: String },

    #[error("question '{0}' must have a positive weight")]
    InvalidWeight(String),

    #[error("archetype rules declare no {0}")]
    EmptyArchetypes(&'static str),
}

/// Reasons an answer or a runner operation is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuizError {
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),

    #[error("question '{id}' expects a {expected} answer")]
    KindMismatch { id: String, expected: &'static str },

    #[error("choose an option between 1 and {count}")]
    ChoiceOutOfRange { count: usize },

    #[error("'{0}' matches no option")]
    NoSuchOption(String),

    #[error("{value} is outside the range {min} to {max}")]
    SliderOutOfRange { value: f64, min: f64, max: f64 },

    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("answer is empty")]
    EmptyAnswer,

    #[error("answer is {len} characters long (at most {max})")]
    TooLong { len: usize, max: usize },

    #[error("question '{0}' is required and cannot be skipped")]
    Required(String),

    #[error("all questions have been visited")]
    Finished,

    #[error("unanswered required questions: {}", .0.join(", "))]
    Incomplete(Vec<String>),
}
