//! Quiz schema loading, fallback and discovery

mod types;

pub use types::{
    ArchetypeRules, AxisDef, Band, ChoiceOption, ChoiceSpec, Fallback, KeywordRule, Pattern,
    Phase, Prototype, Question, QuestionKind, Schema, SliderSpec, TextSpec, COMPOSITE_BASIS,
};

use anyhow::{Context, Result};
use globset::GlobSet;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Upper bound on declared axes
pub const MAX_AXES: usize = 12;

const DEFAULT_SCHEMA: &str = include_str!("default_schema.json");

/// Where the schema in use came from
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    File(PathBuf),
    Embedded,
    /// The requested file could not be used
    Fallback { path: PathBuf, reason: String },
}

impl std::fmt::Display for SchemaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaSource::File(path) => write!(f, "{}", path.display()),
            SchemaSource::Embedded => write!(f, "built-in schema"),
            SchemaSource::Fallback { path, .. } => {
                write!(f, "built-in schema (fallback for {})", path.display())
            }
        }
    }
}

/// A schema together with its origin
#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub schema: Schema,
    pub source: SchemaSource,
}

/// The schema compiled into the binary
pub fn default_schema() -> Schema {
    // Embedded at compile time; validated by tests.
    serde_json::from_str(DEFAULT_SCHEMA).unwrap_or_else(|e| panic!("embedded schema: {}", e))
}

/// Raw text of the embedded schema
pub fn default_schema_json() -> &'static str {
    DEFAULT_SCHEMA
}

/// Parse and validate a schema document
pub fn parse_schema(content: &str) -> Result<Schema> {
    let schema: Schema = serde_json::from_str(content).context("Invalid schema JSON")?;
    schema.validate()?;
    Ok(schema)
}

/// Read, parse and validate a schema file
pub fn load_schema(path: &Path) -> Result<Schema> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema: {}", path.display()))?;
    parse_schema(&content).with_context(|| format!("Invalid schema: {}", path.display()))
}

/// Load a schema, substituting the built-in one on any failure.
///
/// With no path the built-in schema is used directly.
pub fn load_schema_or_default(path: Option<&Path>) -> LoadedSchema {
    let Some(path) = path else {
        return LoadedSchema {
            schema: default_schema(),
            source: SchemaSource::Embedded,
        };
    };
    match load_schema(path) {
        Ok(schema) => {
            log::debug!(
                "loaded schema '{}' ({} questions) from {}",
                schema.id,
                schema.question_count(),
                path.display()
            );
            LoadedSchema {
                schema,
                source: SchemaSource::File(path.to_path_buf()),
            }
        }
        Err(e) => {
            let reason = format!("{:#}", e);
            log::warn!("falling back to built-in schema: {}", reason);
            LoadedSchema {
                schema: default_schema(),
                source: SchemaSource::Fallback {
                    path: path.to_path_buf(),
                    reason,
                },
            }
        }
    }
}

impl Schema {
    /// SHA-256 of the canonical JSON encoding
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&canonical);
        hex::encode(hasher.finalize())
    }
}

/// Find schema documents (`*.json`) under a directory, skipping ignored paths.
///
/// Dotfiles (config, session and history files) are never schemas.
pub fn discover_schemas(dir: &Path, ignore: Option<&GlobSet>) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .filter(|p| !ignore.is_some_and(|set| crate::config::is_ignored(p, set)))
        .collect();
    files.sort();
    files
}

/// Outcome of validating one schema file
#[derive(Debug)]
pub struct ValidationReport {
    pub path: PathBuf,
    pub outcome: Result<SchemaSummary, String>,
}

/// Short description of a valid schema
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSummary {
    pub id: String,
    pub title: String,
    pub phases: usize,
    pub questions: usize,
    pub axes: usize,
}

impl From<&Schema> for SchemaSummary {
    fn from(schema: &Schema) -> Self {
        Self {
            id: schema.id.clone(),
            title: schema.title.clone(),
            phases: schema.phases.len(),
            questions: schema.question_count(),
            axes: schema.axes.len(),
        }
    }
}

/// Validate many schema files in parallel; reports keep input order
pub fn validate_files(paths: &[PathBuf]) -> Vec<ValidationReport> {
    paths
        .par_iter()
        .map(|path| ValidationReport {
            path: path.clone(),
            outcome: load_schema(path)
                .map(|s| SchemaSummary::from(&s))
                .map_err(|e| format!("{:#}", e)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::build_ignore_set;
    use tempfile::TempDir;

    #[test]
    fn embedded_schema_is_valid() {
        let schema = default_schema();
        assert!(schema.validate().is_ok());
        assert!(schema.axes.len() >= 5);
        assert!(schema.question_count() > 0);
    }

    #[test]
    fn fallback_on_missing_file() {
        let loaded = load_schema_or_default(Some(Path::new("/nonexistent/schema.json")));
        assert!(matches!(loaded.source, SchemaSource::Fallback { .. }));
        assert_eq!(loaded.schema, default_schema());
    }

    #[test]
    fn fallback_on_malformed_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{ "id": "x", "title": "X", "axes": [], "phases": [] }"#).unwrap();
        let loaded = load_schema_or_default(Some(&path));
        match loaded.source {
            SchemaSource::Fallback { reason, .. } => assert!(reason.contains("no axes")),
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[test]
    fn loads_valid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quiz.json");
        fs::write(&path, default_schema_json()).unwrap();
        let loaded = load_schema_or_default(Some(&path));
        assert_eq!(loaded.source, SchemaSource::File(path));
    }

    #[test]
    fn fingerprint_is_stable_and_sensitive() {
        let a = default_schema();
        let mut b = default_schema();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
        b.title.push('!');
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn discover_skips_ignored_and_non_json() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("drafts")).unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("drafts/b.json"), "{}").unwrap();
        let ignore = build_ignore_set(&["**/drafts/**".to_string()]).unwrap();
        let found = discover_schemas(dir.path(), Some(&ignore));
        assert_eq!(found, vec![dir.path().join("a.json")]);
    }

    #[test]
    fn validate_files_reports_each() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        fs::write(&good, default_schema_json()).unwrap();
        fs::write(&bad, "not json").unwrap();
        let reports = validate_files(&[good.clone(), bad.clone()]);
        assert_eq!(reports[0].path, good);
        assert!(reports[0].outcome.is_ok());
        assert_eq!(reports[1].path, bad);
        assert!(reports[1].outcome.is_err());
    }
}
