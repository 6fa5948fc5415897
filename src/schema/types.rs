//! Schema document types and loose validation

use crate::error::SchemaError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use super::MAX_AXES;

/// Root of a quiz schema document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Shown on the intro screen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    /// Shown above the results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outro: Option<String>,
    pub axes: Vec<AxisDef>,
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub archetypes: ArchetypeRules,
}

/// A named scoring dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisDef {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique across the whole schema
    pub id: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
    /// Multiplier applied to every contribution of this question
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

fn default_true() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

/// Input kind, tagged by `"type"` in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    Text(TextSpec),
    Choice(ChoiceSpec),
    Slider(SliderSpec),
}

impl QuestionKind {
    pub fn name(&self) -> &'static str {
        match self {
            QuestionKind::Text(_) => "text",
            QuestionKind::Choice(_) => "choice",
            QuestionKind::Slider(_) => "slider",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSpec {
    /// Axis id -> signed weight of the effort score
    #[serde(default)]
    pub axes: BTreeMap<String, f64>,
    /// Answer length that earns full effort
    #[serde(default = "default_target_length")]
    pub target_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<KeywordRule>,
}

fn default_target_length() -> usize {
    120
}

/// Bonus points for an axis when a text answer matches a pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordRule {
    pub pattern: Pattern,
    pub axis: String,
    pub points: f64,
}

/// Case-insensitive regular expression, compiled once and shared by clones
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern {
    source: String,
    #[serde(skip)]
    compiled: OnceLock<Option<Regex>>,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiled: OnceLock::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// `None` when the source does not compile
    pub fn regex(&self) -> Option<&Regex> {
        self.compiled
            .get_or_init(|| {
                RegexBuilder::new(&self.source)
                    .case_insensitive(true)
                    .build()
                    .ok()
            })
            .as_ref()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex().is_some_and(|re| re.is_match(text))
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceSpec {
    pub options: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub label: String,
    /// Axis id -> intensity (0-100)
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderSpec {
    pub min: f64,
    pub max: f64,
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<f64>,
    /// Axis id -> signed weight; negative weights invert the scale
    #[serde(default)]
    pub axes: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_label: Option<String>,
}

fn default_step() -> f64 {
    1.0
}

impl SliderSpec {
    /// Position of a value on the scale (0-100)
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / span * 100.0).clamp(0.0, 100.0)
    }

    /// Snap a value to the nearest step counted from `min`
    pub fn snap(&self, value: f64) -> f64 {
        if self.step <= 0.0 {
            return value;
        }
        let steps = ((value - self.min) / self.step).round();
        (self.min + steps * self.step).clamp(self.min, self.max)
    }
}

/// How the results screen picks an archetype
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum ArchetypeRules {
    /// Closest prototype vector wins
    Nearest { prototypes: Vec<Prototype> },
    /// First band whose minimum the basis value reaches
    #[serde(rename_all = "camelCase")]
    Threshold {
        /// "composite" or an axis id
        #[serde(default = "default_basis")]
        basis: String,
        bands: Vec<Band>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback: Option<Fallback>,
    },
    /// Highest axis wins
    Dominant {
        #[serde(default)]
        labels: BTreeMap<String, String>,
    },
}

fn default_basis() -> String {
    COMPOSITE_BASIS.to_string()
}

pub const COMPOSITE_BASIS: &str = "composite";

impl Default for ArchetypeRules {
    fn default() -> Self {
        ArchetypeRules::Dominant {
            labels: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prototype {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Axis id -> expected score; missing axes count as 50
    #[serde(default)]
    pub vector: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    pub min: f64,
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fallback {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Schema {
    /// All questions in order, with their phase
    pub fn questions(&self) -> impl Iterator<Item = (&Phase, &Question)> {
        self.phases
            .iter()
            .flat_map(|phase| phase.questions.iter().map(move |q| (phase, q)))
    }

    /// Number of question entries across all phases
    pub fn question_count(&self) -> usize {
        self.phases.iter().map(|p| p.questions.len()).sum()
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions().map(|(_, q)| q).find(|q| q.id == id)
    }

    pub fn axis(&self, id: &str) -> Option<&AxisDef> {
        self.axes.iter().find(|a| a.id == id)
    }

    /// Loose structural validation. Empty phases are allowed.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.axes.is_empty() {
            return Err(SchemaError::NoAxes);
        }
        if self.axes.len() > MAX_AXES {
            return Err(SchemaError::TooManyAxes(self.axes.len()));
        }
        let mut axis_ids = HashSet::new();
        for axis in &self.axes {
            if !axis_ids.insert(axis.id.as_str()) {
                return Err(SchemaError::DuplicateAxis(axis.id.clone()));
            }
        }
        if self.phases.is_empty() {
            return Err(SchemaError::NoPhases);
        }
        if self.question_count() == 0 {
            return Err(SchemaError::NoQuestions);
        }

        let check_axis = |context: String, axis: &str| -> Result<(), SchemaError> {
            if axis_ids.contains(axis) {
                Ok(())
            } else {
                Err(SchemaError::UnknownAxis {
                    context,
                    axis: axis.to_string(),
                })
            }
        };

        let mut question_ids = HashSet::new();
        for (_, question) in self.questions() {
            if !question_ids.insert(question.id.as_str()) {
                return Err(SchemaError::DuplicateQuestion(question.id.clone()));
            }
            if !(question.weight > 0.0) || !question.weight.is_finite() {
                return Err(SchemaError::InvalidWeight(question.id.clone()));
            }
            let context = format!("question '{}'", question.id);
            match &question.kind {
                QuestionKind::Text(spec) => {
                    for axis in spec.axes.keys() {
                        check_axis(context.clone(), axis)?;
                    }
                    for rule in &spec.keywords {
                        check_axis(context.clone(), &rule.axis)?;
                        if rule.pattern.regex().is_none() {
                            return Err(SchemaError::InvalidKeyword {
                                id: question.id.clone(),
                                pattern: rule.pattern.as_str().to_string(),
                            });
                        }
                    }
                }
                QuestionKind::Choice(spec) => {
                    if spec.options.len() < 2 {
                        return Err(SchemaError::TooFewOptions(question.id.clone()));
                    }
                    for option in &spec.options {
                        for axis in option.scores.keys() {
                            check_axis(context.clone(), axis)?;
                        }
                    }
                }
                QuestionKind::Slider(spec) => {
                    validate_slider(&question.id, spec)?;
                    for axis in spec.axes.keys() {
                        check_axis(context.clone(), axis)?;
                    }
                }
            }
        }

        match &self.archetypes {
            ArchetypeRules::Nearest { prototypes } => {
                if prototypes.is_empty() {
                    return Err(SchemaError::EmptyArchetypes("prototypes"));
                }
                for prototype in prototypes {
                    for axis in prototype.vector.keys() {
                        check_axis(format!("prototype '{}'", prototype.id), axis)?;
                    }
                }
            }
            ArchetypeRules::Threshold { basis, bands, .. } => {
                if bands.is_empty() {
                    return Err(SchemaError::EmptyArchetypes("bands"));
                }
                if basis != COMPOSITE_BASIS {
                    check_axis("threshold basis".to_string(), basis)?;
                }
            }
            ArchetypeRules::Dominant { labels } => {
                for axis in labels.keys() {
                    check_axis("dominant labels".to_string(), axis)?;
                }
            }
        }

        Ok(())
    }
}

fn validate_slider(id: &str, spec: &SliderSpec) -> Result<(), SchemaError> {
    let invalid = |reason: &str| SchemaError::InvalidSlider {
        id: id.to_string(),
        reason: reason.to_string(),
    };
    if !spec.min.is_finite() || !spec.max.is_finite() || spec.min >= spec.max {
        return Err(invalid("min must be below max"));
    }
    if !(spec.step > 0.0) || !spec.step.is_finite() {
        return Err(invalid("step must be positive"));
    }
    if let Some(default) = spec.default {
        if default < spec.min || default > spec.max {
            return Err(invalid("default lies outside the range"));
        }
    }
    Ok(())
}
