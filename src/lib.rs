//! MCIF: self-assessment quiz engine
//!
//! This library loads a quiz schema (phases of text, choice and slider
//! questions), walks it one question at a time, scores the answers over a
//! handful of named axes and assigns an archetype label to the result.

pub mod config;
pub mod error;
pub mod history;
pub mod quiz;
pub mod reporter;
pub mod schema;
pub mod scoring;
pub mod session;
pub mod terminal;

pub use error::{QuizError, SchemaError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded answer to one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    /// Id of the answered question
    pub question_id: String,
    /// Raw answer value
    pub value: AnswerValue,
    /// When the answer was given
    #[serde(default = "Utc::now")]
    pub answered_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(question_id: impl Into<String>, value: AnswerValue) -> Self {
        Self {
            question_id: question_id.into(),
            value,
            answered_at: Utc::now(),
        }
    }
}

/// Raw value of an answer, shaped by the question kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AnswerValue {
    /// Free text
    Text(String),
    /// Index of the chosen option (0-based)
    Choice(usize),
    /// Slider position
    Slider(f64),
}

impl AnswerValue {
    /// Human-readable rendering of the value for the given question
    pub fn describe(&self, question: &schema::Question) -> String {
        match (self, &question.kind) {
            (AnswerValue::Choice(index), schema::QuestionKind::Choice(spec)) => spec
                .options
                .get(*index)
                .map(|o| o.label.clone())
                .unwrap_or_else(|| format!("option {}", index + 1)),
            (AnswerValue::Text(text), _) => text.clone(),
            (AnswerValue::Choice(index), _) => format!("option {}", index + 1),
            (AnswerValue::Slider(value), _) => format_number(*value),
        }
    }
}

/// Score for a single axis (0-100)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisScore {
    /// Axis id (e.g. "logic")
    pub axis: String,
    /// Display label
    pub label: String,
    /// Weighted mean of all contributions, clamped to 0-100
    pub score: f64,
    /// Sum of contribution weights
    pub weight: f64,
    /// Number of answers that contributed
    pub answered: usize,
}

/// Sum of all axis scores against its declared bound
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Composite {
    /// Sum of axis scores (0..=max)
    pub total: f64,
    /// 100 * number of axes
    pub max: f64,
    /// total / max as a percentage (0-100)
    pub percent: f64,
}

/// Axis scores in schema order plus the composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    pub axes: Vec<AxisScore>,
    pub composite: Composite,
}

impl ScoreCard {
    /// Score of a named axis
    pub fn axis(&self, id: &str) -> Option<f64> {
        self.axes.iter().find(|a| a.axis == id).map(|a| a.score)
    }
}

/// How an archetype was selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Nearest,
    Threshold,
    Dominant,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Nearest => write!(f, "nearest prototype"),
            Strategy::Threshold => write!(f, "threshold"),
            Strategy::Dominant => write!(f, "dominant axis"),
        }
    }
}

/// The archetype assigned to a score card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeMatch {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub strategy: Strategy,
    /// Closeness to the prototype (0-100), nearest strategy only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// Everything the results screen and exports show
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub schema_id: String,
    pub schema_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    pub completed_at: DateTime<Utc>,
    pub answers: Vec<Answer>,
    pub scores: ScoreCard,
    pub archetype: ArchetypeMatch,
}

/// Format a number without a trailing ".0" for whole values
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Public API: score a fixed set of answers against a schema.
///
/// Answers for unknown questions are ignored. The result is deterministic for
/// a given schema and answer list.
pub fn evaluate(schema: &schema::Schema, answers: &[Answer]) -> (ScoreCard, ArchetypeMatch) {
    let card = scoring::ScoreCalculator::score(schema, answers);
    let archetype = scoring::archetype::classify(schema, &card);
    (card, archetype)
}
