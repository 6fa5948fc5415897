//! Trend tracking - persist completed results to .mcif-history.json

use crate::QuizResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const HISTORY_FILENAME: &str = ".mcif-history.json";
const MAX_RUNS: usize = 50;

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct HistoryFile {
    pub runs: Vec<HistoryRun>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRun {
    pub timestamp: String,
    pub schema_id: String,
    pub archetype: String,
    /// Composite percent (0-100)
    pub composite: f64,
    pub axes: BTreeMap<String, f64>,
}

/// Load history from a file (or start empty)
pub fn load_history(path: &Path) -> HistoryFile {
    if let Ok(content) = fs::read_to_string(path) {
        if let Ok(history) = serde_json::from_str::<HistoryFile>(&content) {
            return history;
        }
        log::warn!("ignoring unreadable history {}", path.display());
    }
    HistoryFile::default()
}

pub fn save_history(path: &Path, history: &HistoryFile) -> std::io::Result<()> {
    let content = serde_json::to_string_pretty(history).unwrap_or_else(|_| "{}".to_string());
    fs::write(path, content)
}

/// The latest earlier run for the same schema
pub fn previous_result<'a>(history: &'a HistoryFile, schema_id: &str) -> Option<&'a HistoryRun> {
    history.runs.iter().rev().find(|r| r.schema_id == schema_id)
}

/// Append a completed result, keeping the most recent runs
pub fn append_run(history: &mut HistoryFile, result: &QuizResult) {
    history.runs.push(HistoryRun {
        timestamp: result.completed_at.to_rfc3339(),
        schema_id: result.schema_id.clone(),
        archetype: result.archetype.id.clone(),
        composite: result.scores.composite.percent,
        axes: result
            .scores
            .axes
            .iter()
            .map(|a| (a.axis.clone(), a.score))
            .collect(),
    });
    if history.runs.len() > MAX_RUNS {
        history.runs.drain(0..history.runs.len() - MAX_RUNS);
    }
}

/// Format delta for console: "[was 62.0, down 4.5]" or "[was 62.0, up 2.0]" or ""
pub fn format_delta(previous: Option<f64>, current: f64) -> String {
    let Some(prev) = previous else {
        return String::new();
    };
    let diff = ((current - prev) * 10.0).round() / 10.0;
    if diff == 0.0 {
        return format!(" [unchanged at {:.1}]", current);
    }
    if diff > 0.0 {
        format!(" [was {:.1}, up {:.1}]", prev, diff)
    } else {
        format!(" [was {:.1}, down {:.1}]", prev, -diff)
    }
}
