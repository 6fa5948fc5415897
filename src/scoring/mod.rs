//! Score calculation over schema axes

pub mod archetype;

use crate::schema::{Question, QuestionKind, Schema};
use crate::{Answer, AnswerValue, AxisScore, Composite, ScoreCard};
use std::collections::HashMap;

/// Axis scores below this get a recommendation
const LOW_AXIS_SCORE: f64 = 40.0;
/// Spread between strongest and weakest axis that counts as skewed
const SKEW_SPREAD: f64 = 50.0;

/// One weighted push on one axis from one answer
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub axis: String,
    /// 0-100
    pub intensity: f64,
    pub weight: f64,
}

#[derive(Default)]
struct Accumulator {
    weighted_sum: f64,
    weight: f64,
    answered: usize,
}

/// Calculator for axis scores
pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Contributions of a single answer. Values that do not fit the question
    /// (wrong kind, option out of range, non-finite numbers) contribute nothing.
    pub fn contributions(question: &Question, value: &AnswerValue) -> Vec<Contribution> {
        let qw = question.weight;
        match (&question.kind, value) {
            (QuestionKind::Choice(spec), AnswerValue::Choice(index)) => {
                let Some(option) = spec.options.get(*index) else {
                    return Vec::new();
                };
                option
                    .scores
                    .iter()
                    .map(|(axis, score)| Contribution {
                        axis: axis.clone(),
                        intensity: clamp_score(*score),
                        weight: qw,
                    })
                    .collect()
            }
            (QuestionKind::Slider(spec), AnswerValue::Slider(v)) if v.is_finite() => {
                let position = spec.normalize(*v);
                signed_contributions(&spec.axes, position, qw)
            }
            (QuestionKind::Text(spec), AnswerValue::Text(text)) => {
                let chars = text.trim().chars().count();
                let target = spec.target_length.max(1);
                let effort = (chars as f64 / target as f64).min(1.0) * 100.0;
                let mut contributions = signed_contributions(&spec.axes, effort, qw);

                let mut bonus: Vec<(String, f64)> = Vec::new();
                for rule in &spec.keywords {
                    if !rule.pattern.is_match(text) {
                        continue;
                    }
                    match bonus.iter_mut().find(|(axis, _)| *axis == rule.axis) {
                        Some((_, points)) => *points += rule.points,
                        None => bonus.push((rule.axis.clone(), rule.points)),
                    }
                }

                for (axis, points) in bonus {
                    match contributions.iter_mut().find(|c| c.axis == axis) {
                        Some(c) => c.intensity = clamp_score(c.intensity + points),
                        None => contributions.push(Contribution {
                            axis,
                            intensity: clamp_score(points),
                            weight: qw,
                        }),
                    }
                }
                contributions
            }
            _ => Vec::new(),
        }
    }

    /// Score all answers against the schema's axes.
    ///
    /// Each axis is the weighted mean of its contributions, clamped to 0-100 and
    /// rounded to one decimal. Axes nobody contributed to score 0.
    pub fn score(schema: &Schema, answers: &[Answer]) -> ScoreCard {
        let mut acc: HashMap<&str, Accumulator> = schema
            .axes
            .iter()
            .map(|a| (a.id.as_str(), Accumulator::default()))
            .collect();

        for answer in answers {
            let Some(question) = schema.question(&answer.question_id) else {
                log::debug!("ignoring answer for unknown question '{}'", answer.question_id);
                continue;
            };
            for c in Self::contributions(question, &answer.value) {
                if let Some(entry) = acc.get_mut(c.axis.as_str()) {
                    entry.weighted_sum += c.intensity * c.weight;
                    entry.weight += c.weight;
                    entry.answered += 1;
                }
            }
        }

        let axes: Vec<AxisScore> = schema
            .axes
            .iter()
            .map(|def| {
                let entry = acc.remove(def.id.as_str()).unwrap_or_default();
                let score = if entry.weight > 0.0 {
                    round1(clamp_score(entry.weighted_sum / entry.weight))
                } else {
                    0.0
                };
                AxisScore {
                    axis: def.id.clone(),
                    label: def.label.clone(),
                    score,
                    weight: entry.weight,
                    answered: entry.answered,
                }
            })
            .collect();

        let composite = Self::composite(&axes);
        log::debug!(
            "scored {} answers: composite {}/{}",
            answers.len(),
            composite.total,
            composite.max
        );
        ScoreCard { axes, composite }
    }

    /// Sum of axis scores bounded by 100 per axis
    pub fn composite(axes: &[AxisScore]) -> Composite {
        let max = 100.0 * axes.len() as f64;
        let total = round1(axes.iter().map(|a| a.score).sum::<f64>().clamp(0.0, max));
        let percent = if max > 0.0 {
            round1((total / max * 100.0).clamp(0.0, 100.0))
        } else {
            0.0
        };
        Composite {
            total,
            max,
            percent,
        }
    }

    /// Suggestions based on weak or lopsided axes
    pub fn recommendations(card: &ScoreCard) -> Vec<String> {
        let mut recs: Vec<String> = card
            .axes
            .iter()
            .filter(|a| a.score < LOW_AXIS_SCORE)
            .map(|a| {
                format!(
                    "{} scored {:.1}: look for low-stakes ways to exercise it",
                    a.label, a.score
                )
            })
            .collect();

        let strongest = card
            .axes
            .iter()
            .fold(None::<&AxisScore>, |best, a| match best {
                Some(b) if b.score >= a.score => Some(b),
                _ => Some(a),
            });
        let weakest = card
            .axes
            .iter()
            .fold(None::<&AxisScore>, |worst, a| match worst {
                Some(w) if w.score <= a.score => Some(w),
                _ => Some(a),
            });
        if let (Some(high), Some(low)) = (strongest, weakest) {
            if high.score - low.score >= SKEW_SPREAD {
                recs.push(format!(
                    "Your profile leans heavily on {}; pair it with {} when you can",
                    high.label, low.label
                ));
            }
        }

        if recs.is_empty() {
            recs.push("Your profile is well balanced across all axes.".to_string());
        }
        recs
    }
}

fn signed_contributions(
    axes: &std::collections::BTreeMap<String, f64>,
    position: f64,
    question_weight: f64,
) -> Vec<Contribution> {
    axes.iter()
        .filter(|(_, w)| **w != 0.0 && w.is_finite())
        .map(|(axis, w)| Contribution {
            axis: axis.clone(),
            intensity: if *w >= 0.0 { position } else { 100.0 - position },
            weight: w.abs() * question_weight,
        })
        .collect()
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::default_schema;

    fn answer(id: &str, value: AnswerValue) -> Answer {
        Answer::new(id, value)
    }

    #[test]
    fn no_answers_scores_zero() {
        let schema = default_schema();
        let card = ScoreCalculator::score(&schema, &[]);
        assert_eq!(card.axes.len(), schema.axes.len());
        assert!(card.axes.iter().all(|a| a.score == 0.0 && a.answered == 0));
        assert_eq!(card.composite.total, 0.0);
        assert_eq!(card.composite.max, 500.0);
    }

    #[test]
    fn choice_contributes_option_scores() {
        let schema = default_schema();
        let card = ScoreCalculator::score(&schema, &[answer("puzzle", AnswerValue::Choice(0))]);
        assert_eq!(card.axis("logic"), Some(90.0));
        assert_eq!(card.axis("intuition"), Some(20.0));
        assert_eq!(card.axis("emotion"), Some(0.0));
    }

    #[test]
    fn weighted_mean_across_answers() {
        let schema = default_schema();
        // puzzle option 0: logic 90; pattern option 1: logic 30
        let card = ScoreCalculator::score(
            &schema,
            &[
                answer("puzzle", AnswerValue::Choice(0)),
                answer("pattern", AnswerValue::Choice(1)),
            ],
        );
        assert_eq!(card.axis("logic"), Some(60.0));
    }

    #[test]
    fn negative_slider_weight_inverts_scale() {
        let schema = default_schema();
        // stress 1..7 at 7 => position 100 => resilience (weight -1) gets 0
        let card = ScoreCalculator::score(&schema, &[answer("stress", AnswerValue::Slider(7.0))]);
        assert_eq!(card.axis("resilience"), Some(0.0));
        assert_eq!(card.axis("emotion"), Some(100.0));

        let card = ScoreCalculator::score(&schema, &[answer("stress", AnswerValue::Slider(1.0))]);
        assert_eq!(card.axis("resilience"), Some(100.0));
    }

    #[test]
    fn text_effort_and_keywords() {
        let schema = default_schema();
        let text = "I want to design a tool because my friends keep losing track of time";
        let question = schema.question("idea").unwrap();
        let contributions =
            ScoreCalculator::contributions(question, &AnswerValue::Text(text.to_string()));

        let effort = text.chars().count() as f64 / 160.0 * 100.0;
        let creativity = contributions.iter().find(|c| c.axis == "creativity").unwrap();
        assert!((creativity.intensity - (effort + 20.0)).abs() < 1e-9);
        let emotion = contributions.iter().find(|c| c.axis == "emotion").unwrap();
        assert_eq!(emotion.intensity, 25.0);
        let logic = contributions.iter().find(|c| c.axis == "logic").unwrap();
        assert_eq!(logic.intensity, 20.0);
    }

    #[test]
    fn out_of_range_choice_contributes_nothing() {
        let schema = default_schema();
        let question = schema.question("puzzle").unwrap();
        assert!(ScoreCalculator::contributions(question, &AnswerValue::Choice(42)).is_empty());
        assert!(ScoreCalculator::contributions(question, &AnswerValue::Slider(1.0)).is_empty());
    }

    #[test]
    fn unknown_question_is_ignored() {
        let schema = default_schema();
        let card = ScoreCalculator::score(&schema, &[answer("nope", AnswerValue::Choice(0))]);
        assert_eq!(card.composite.total, 0.0);
    }

    #[test]
    fn composite_percent() {
        let axes: Vec<AxisScore> = [50.0, 100.0]
            .iter()
            .enumerate()
            .map(|(i, s)| AxisScore {
                axis: format!("a{}", i),
                label: format!("A{}", i),
                score: *s,
                weight: 1.0,
                answered: 1,
            })
            .collect();
        let composite = ScoreCalculator::composite(&axes);
        assert_eq!(composite.total, 150.0);
        assert_eq!(composite.max, 200.0);
        assert_eq!(composite.percent, 75.0);
    }

    #[test]
    fn recommendations_flag_low_and_skewed() {
        let schema = default_schema();
        let card = ScoreCalculator::score(&schema, &[answer("puzzle", AnswerValue::Choice(0))]);
        let recs = ScoreCalculator::recommendations(&card);
        assert!(recs.iter().any(|r| r.starts_with("Creativity scored 0.0")));
        assert!(recs.iter().any(|r| r.contains("leans heavily on Logic")));
    }

    #[test]
    fn recommendations_flag_skew_without_low_axes() {
        let axes: Vec<AxisScore> = [("Logic", 95.0), ("Emotion", 45.0)]
            .iter()
            .map(|(label, score)| AxisScore {
                axis: label.to_lowercase(),
                label: label.to_string(),
                score: *score,
                weight: 1.0,
                answered: 1,
            })
            .collect();
        let card = ScoreCard {
            composite: ScoreCalculator::composite(&axes),
            axes,
        };
        assert_eq!(
            ScoreCalculator::recommendations(&card),
            vec!["Your profile leans heavily on Logic; pair it with Emotion when you can".to_string()]
        );
    }

    #[test]
    fn recommendations_balanced() {
        let axes = vec![AxisScore {
            axis: "logic".to_string(),
            label: "Logic".to_string(),
            score: 70.0,
            weight: 1.0,
            answered: 1,
        }];
        let card = ScoreCard {
            composite: ScoreCalculator::composite(&axes),
            axes,
        };
        let recs = ScoreCalculator::recommendations(&card);
        assert_eq!(recs, vec!["Your profile is well balanced across all axes.".to_string()]);
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::schema::default_schema;
    use proptest::prelude::*;

    /// Answers to random questions of the built-in schema, including
    /// out-of-range choices and sliders and arbitrary text.
    fn arbitrary_answers() -> impl Strategy<Value = Vec<Answer>> {
        let questions: Vec<Question> = default_schema()
            .questions()
            .map(|(_, q)| q.clone())
            .collect();
        let count = questions.len();
        prop::collection::vec((0..count, 0usize..6, -50.0f64..150.0, ".{0,300}"), 0..24).prop_map(
            move |picks| {
                picks
                    .into_iter()
                    .map(|(qi, choice, slider, text)| {
                        let question = &questions[qi];
                        let value = match question.kind {
                            QuestionKind::Choice(_) => AnswerValue::Choice(choice),
                            QuestionKind::Slider(_) => AnswerValue::Slider(slider),
                            QuestionKind::Text(_) => AnswerValue::Text(text),
                        };
                        Answer::new(question.id.clone(), value)
                    })
                    .collect()
            },
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn scores_stay_in_bounds(answers in arbitrary_answers()) {
            let card = ScoreCalculator::score(&default_schema(), &answers);
            for axis in &card.axes {
                prop_assert!((0.0..=100.0).contains(&axis.score), "{} = {}", axis.axis, axis.score);
            }
            prop_assert!(card.composite.total >= 0.0);
            prop_assert!(card.composite.total <= card.composite.max);
            prop_assert!((0.0..=100.0).contains(&card.composite.percent));
        }

        #[test]
        fn evaluation_is_deterministic(answers in arbitrary_answers()) {
            let schema = default_schema();
            let (card_a, archetype_a) = crate::evaluate(&schema, &answers);
            let (card_b, archetype_b) = crate::evaluate(&schema, &answers);
            prop_assert_eq!(card_a, card_b);
            prop_assert_eq!(archetype_a, archetype_b);
        }
    }
}
