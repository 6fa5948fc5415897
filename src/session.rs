//! Resume-on-reload: persist in-progress answers to .mcif-session.json

use crate::quiz::QuizRunner;
use crate::schema::Schema;
use crate::Answer;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const SESSION_FILENAME: &str = ".mcif-session.json";
const SESSION_VERSION: u32 = 1;

/// Snapshot of an unfinished quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub version: u32,
    pub schema_id: String,
    pub schema_fingerprint: String,
    pub saved_at: DateTime<Utc>,
    pub cursor: usize,
    pub answers: Vec<Answer>,
}

impl SessionSnapshot {
    pub fn capture(runner: &QuizRunner) -> Self {
        Self {
            version: SESSION_VERSION,
            schema_id: runner.schema().id.clone(),
            schema_fingerprint: runner.schema().fingerprint(),
            saved_at: Utc::now(),
            cursor: runner.cursor(),
            answers: runner.answers().to_vec(),
        }
    }
}

/// A runner rebuilt from a snapshot
#[derive(Debug)]
pub struct Restored {
    pub runner: QuizRunner,
    /// Answers that no longer fit the schema
    pub dropped: usize,
    /// The snapshot was taken against a different schema
    pub schema_changed: bool,
}

/// Rebuild a runner from a snapshot.
///
/// Against the same schema the answer set and cursor come back exactly.
/// Answers that do not validate against `schema` are dropped.
pub fn restore(schema: Schema, snapshot: &SessionSnapshot) -> Restored {
    let schema_changed = schema.fingerprint() != snapshot.schema_fingerprint;
    if schema_changed {
        log::warn!(
            "session was saved against schema '{}' with a different fingerprint",
            snapshot.schema_id
        );
    }

    let mut runner = QuizRunner::new(schema);
    let mut dropped = 0;
    for answer in &snapshot.answers {
        if let Err(e) = runner.record(answer.clone()) {
            log::warn!("dropping saved answer for '{}': {}", answer.question_id, e);
            dropped += 1;
        }
    }
    runner.seek(snapshot.cursor);

    Restored {
        runner,
        dropped,
        schema_changed,
    }
}

/// Write the snapshot atomically (temp file + rename)
pub fn save_session(path: &Path, runner: &QuizRunner) -> Result<()> {
    let snapshot = SessionSnapshot::capture(runner);
    let content =
        serde_json::to_string_pretty(&snapshot).context("Failed to serialize session")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)
        .with_context(|| format!("Failed to write session to {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move session into {}", path.display()))?;
    log::debug!(
        "saved {} answers to {}",
        snapshot.answers.len(),
        path.display()
    );
    Ok(())
}

/// Load a snapshot; a missing, corrupt or outdated file yields `None`
pub fn load_session(path: &Path) -> Result<Option<SessionSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read session: {}", path.display()))?;
    match serde_json::from_slice::<SessionSnapshot>(&bytes) {
        Ok(snapshot) if snapshot.version == SESSION_VERSION => Ok(Some(snapshot)),
        Ok(snapshot) => {
            log::warn!(
                "ignoring session {} with version {}",
                path.display(),
                snapshot.version
            );
            Ok(None)
        }
        Err(e) => {
            log::warn!("ignoring corrupt session {}: {}", path.display(), e);
            Ok(None)
        }
    }
}

/// Remove the snapshot if present
pub fn clear_session(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to remove session {}", path.display())),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnswersDocument {
    Wrapped { answers: Vec<Answer> },
    Bare(Vec<Answer>),
}

/// Read answers from a session snapshot, an exported result or a bare answer array
pub fn load_answers(path: &Path) -> Result<Vec<Answer>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read answers: {}", path.display()))?;
    let document: AnswersDocument = serde_json::from_str(&content)
        .with_context(|| format!("No answers found in {}", path.display()))?;
    Ok(match document {
        AnswersDocument::Wrapped { answers } | AnswersDocument::Bare(answers) => answers,
    })
}
