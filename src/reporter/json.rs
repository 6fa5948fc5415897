//! JSON reporter for machine-readable output and exports

use crate::QuizResult;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Report a single result as JSON
    pub fn report(&self, result: &QuizResult) -> String {
        if self.pretty {
            serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(result).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}
