//! Console results screen with colored output

use crate::scoring::ScoreCalculator;
use crate::QuizResult;
use colored::Colorize;

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to use colors
    use_colors: bool,
    /// Whether to list the answers below the scores
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self {
            use_colors: true,
            verbose: false,
        }
    }

    /// Disable colors
    pub fn without_colors(mut self) -> Self {
        self.use_colors = false;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Print the results screen. `delta` is appended to the composite line.
    pub fn report(&self, schema: &crate::schema::Schema, result: &QuizResult, delta: &str) {
        print!("{}", self.render(schema, result, delta));
    }

    /// Quiet mode: one line
    pub fn report_quiet(&self, result: &QuizResult) {
        println!(
            "{}: {} ({:.1}%)",
            result.schema_id,
            self.paint_bold(&result.archetype.label),
            result.scores.composite.percent
        );
    }

    /// Build the results screen as a string
    pub fn render(&self, schema: &crate::schema::Schema, result: &QuizResult, delta: &str) -> String {
        let mut lines = Vec::new();
        lines.push(String::new());
        lines.push(self.paint_bold(&format!("Results: {}", result.schema_title)));
        if let Some(ref outro) = schema.outro {
            lines.push(format!("   {}", self.paint_dimmed(outro)));
        }
        lines.push(String::new());

        lines.push(format!(
            "   Archetype: {}",
            self.paint_bold(&result.archetype.label)
        ));
        if let Some(ref description) = result.archetype.description {
            lines.push(format!("   {}", self.paint_dimmed(description)));
        }
        if let Some(similarity) = result.archetype.similarity {
            lines.push(format!(
                "   Match {:.1}% by {}",
                similarity, result.archetype.strategy
            ));
        }
        lines.push(String::new());

        lines.push(format!("   {}", self.paint_bold("Axis Scores:")));
        for axis in &result.scores.axes {
            lines.push(format!(
                "   {} {} {}",
                self.create_score_bar(axis.score),
                self.colorize_score(axis.score),
                axis.label
            ));
        }
        let composite = &result.scores.composite;
        lines.push(format!(
            "   Composite: {:.1}/{:.0} ({:.1}%){}",
            composite.total, composite.max, composite.percent, delta
        ));
        lines.push(String::new());

        lines.push(format!("   {}", self.paint_bold("Recommendations:")));
        for rec in ScoreCalculator::recommendations(&result.scores).iter().take(3) {
            lines.push(format!("   -> {}", rec));
        }

        if self.verbose {
            lines.push(String::new());
            lines.push(format!("   {}", self.paint_bold("Answers:")));
            for answer in &result.answers {
                if let Some(question) = schema.question(&answer.question_id) {
                    lines.push(format!(
                        "   {} {}",
                        self.paint_dimmed(&question.id),
                        answer.value.describe(question)
                    ));
                }
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }

    fn colorize_score(&self, score: f64) -> String {
        let s = format!("{:>5.1}", score);
        if !self.use_colors {
            return s;
        }
        if score >= 70.0 {
            s.green().to_string()
        } else if score >= 40.0 {
            s.yellow().to_string()
        } else {
            s.red().to_string()
        }
    }

    fn create_score_bar(&self, score: f64) -> String {
        let filled = ((score.clamp(0.0, 100.0) * 20.0) / 100.0).round() as usize;
        let empty = 20 - filled;
        format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
    }

    fn paint_bold(&self, s: &str) -> String {
        if self.use_colors {
            s.bold().to_string()
        } else {
            s.to_string()
        }
    }

    fn paint_dimmed(&self, s: &str) -> String {
        if self.use_colors {
            s.dimmed().to_string()
        } else {
            s.to_string()
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}
