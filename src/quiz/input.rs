//! Answer validation and parsing of typed input

use crate::error::QuizError;
use crate::schema::{Question, QuestionKind};
use crate::AnswerValue;

/// Check a value against its question and return the normalized value.
///
/// Text is trimmed, slider values are snapped to the step.
pub fn validate_value(question: &Question, value: &AnswerValue) -> Result<AnswerValue, QuizError> {
    match (&question.kind, value) {
        (QuestionKind::Text(spec), AnswerValue::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(QuizError::EmptyAnswer);
            }
            let len = trimmed.chars().count();
            if let Some(max) = spec.max_length {
                if len > max {
                    return Err(QuizError::TooLong { len, max });
                }
            }
            Ok(AnswerValue::Text(trimmed.to_string()))
        }
        (QuestionKind::Choice(spec), AnswerValue::Choice(index)) => {
            if *index < spec.options.len() {
                Ok(AnswerValue::Choice(*index))
            } else {
                Err(QuizError::ChoiceOutOfRange {
                    count: spec.options.len(),
                })
            }
        }
        (QuestionKind::Slider(spec), AnswerValue::Slider(v)) => {
            if !v.is_finite() {
                return Err(QuizError::NotANumber(v.to_string()));
            }
            if *v < spec.min || *v > spec.max {
                return Err(QuizError::SliderOutOfRange {
                    value: *v,
                    min: spec.min,
                    max: spec.max,
                });
            }
            Ok(AnswerValue::Slider(spec.snap(*v)))
        }
        (kind, _) => Err(QuizError::KindMismatch {
            id: question.id.clone(),
            expected: kind.name(),
        }),
    }
}

/// Turn a line typed by the user into a validated answer value.
///
/// Choices accept a 1-based number or an option label (case-insensitive).
/// Empty slider input takes the slider's default when it has one.
pub fn parse_input(question: &Question, raw: &str) -> Result<AnswerValue, QuizError> {
    let input = raw.trim();
    let value = match &question.kind {
        QuestionKind::Text(_) => AnswerValue::Text(input.to_string()),
        QuestionKind::Choice(spec) => {
            if input.is_empty() {
                return Err(QuizError::EmptyAnswer);
            }
            if let Ok(n) = input.parse::<usize>() {
                if n == 0 || n > spec.options.len() {
                    return Err(QuizError::ChoiceOutOfRange {
                        count: spec.options.len(),
                    });
                }
                AnswerValue::Choice(n - 1)
            } else {
                let index = spec
                    .options
                    .iter()
                    .position(|o| o.label.eq_ignore_ascii_case(input))
                    .ok_or_else(|| QuizError::NoSuchOption(input.to_string()))?;
                AnswerValue::Choice(index)
            }
        }
        QuestionKind::Slider(spec) => {
            if input.is_empty() {
                match spec.default {
                    Some(default) => AnswerValue::Slider(default),
                    None => return Err(QuizError::EmptyAnswer),
                }
            } else {
                let v: f64 = input
                    .parse()
                    .map_err(|_| QuizError::NotANumber(input.to_string()))?;
                AnswerValue::Slider(v)
            }
        }
    };
    validate_value(question, &value)
}
