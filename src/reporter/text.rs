//! Plain-text export

use crate::schema::Schema;
use crate::scoring::ScoreCalculator;
use crate::QuizResult;
use std::fmt::Write;

/// Renders a result as plain text suitable for saving or sharing
pub struct TextReporter {
    /// Width of the axis bars
    bar_width: usize,
}

impl TextReporter {
    pub fn new() -> Self {
        Self { bar_width: 20 }
    }

    /// Render the full report. The schema supplies prompts for the answer list.
    pub fn report(&self, schema: &Schema, result: &QuizResult) -> String {
        let mut out = String::new();
        let rule = "=".repeat(60);

        let _ = writeln!(out, "{}", result.schema_title);
        if let Some(ref version) = result.schema_version {
            let _ = writeln!(out, "Version {}", version);
        }
        let _ = writeln!(out, "Completed {}", result.completed_at.format("%Y-%m-%d %H:%M UTC"));
        let _ = writeln!(out, "{}", rule);

        let _ = writeln!(out, "Archetype: {}", result.archetype.label);
        if let Some(ref description) = result.archetype.description {
            let _ = writeln!(out, "  {}", description);
        }
        if let Some(similarity) = result.archetype.similarity {
            let _ = writeln!(out, "  Match: {:.1}% ({})", similarity, result.archetype.strategy);
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "Scores");
        let label_width = result
            .scores
            .axes
            .iter()
            .map(|a| a.label.chars().count())
            .max()
            .unwrap_or(0);
        for axis in &result.scores.axes {
            let _ = writeln!(
                out,
                "  {:<width$}  {}  {:>5.1}",
                axis.label,
                self.bar(axis.score),
                axis.score,
                width = label_width
            );
        }
        let composite = &result.scores.composite;
        let _ = writeln!(
            out,
            "  Composite: {:.1} / {:.0} ({:.1}%)",
            composite.total, composite.max, composite.percent
        );
        let _ = writeln!(out);

        let _ = writeln!(out, "Recommendations");
        for rec in ScoreCalculator::recommendations(&result.scores) {
            let _ = writeln!(out, "  - {}", rec);
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "Answers");
        for answer in &result.answers {
            match schema.question(&answer.question_id) {
                Some(question) => {
                    let _ = writeln!(out, "  Q: {}", question.prompt);
                    let _ = writeln!(out, "  A: {}", answer.value.describe(question));
                }
                None => {
                    let _ = writeln!(out, "  Q: {}", answer.question_id);
                    let _ = writeln!(out, "  A: {:?}", answer.value);
                }
            }
            let _ = writeln!(out);
        }
        out
    }

    fn bar(&self, score: f64) -> String {
        let filled = ((score.clamp(0.0, 100.0) / 100.0) * self.bar_width as f64).round() as usize;
        format!(
            "[{}{}]",
            "#".repeat(filled),
            "-".repeat(self.bar_width - filled)
        )
    }
}

impl Default for TextReporter {
    fn default() -> Self {
        Self::new()
    }
}
