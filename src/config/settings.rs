//! Config file structure and merging

use serde::Deserialize;
use std::path::PathBuf;

use crate::history::HISTORY_FILENAME;
use crate::session::SESSION_FILENAME;

/// Export file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Text,
}

impl ExportFormat {
    /// Infer from a file extension (`.txt` / `.text` -> text, anything else -> json)
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("txt") || ext.eq_ignore_ascii_case("text") => {
                ExportFormat::Text
            }
            _ => ExportFormat::Json,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "text" | "txt" => Some(ExportFormat::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Default export format
    #[serde(default)]
    pub format: Option<ExportFormat>,
    /// Directory for exports named by the CLI
    #[serde(default)]
    pub dir: Option<String>,
}

/// Root config structure for .mcifrc.json
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Extend another config file (path relative to this config)
    #[serde(default)]
    pub extends: Option<String>,

    /// Schema file to load (relative to the working directory)
    #[serde(default)]
    pub schema: Option<String>,

    /// Where in-progress answers are saved. Default: .mcif-session.json
    #[serde(default)]
    pub session_file: Option<String>,

    /// Where completed results are recorded. Default: .mcif-history.json
    #[serde(default)]
    pub history_file: Option<String>,

    /// Save the session after every answer. Default: true
    #[serde(default)]
    pub autosave: Option<bool>,

    /// Colored terminal output. Default: true
    #[serde(default)]
    pub colors: Option<bool>,

    #[serde(default)]
    pub export: ExportConfig,

    /// Glob patterns skipped when validating a schema directory
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Config {
    /// Merge CLI overrides into config. CLI values take precedence.
    pub fn merge_with_cli(
        mut self,
        schema: Option<&std::path::Path>,
        session: Option<&std::path::Path>,
    ) -> Self {
        if let Some(path) = schema {
            self.schema = Some(path.to_string_lossy().to_string());
        }
        if let Some(path) = session {
            self.session_file = Some(path.to_string_lossy().to_string());
        }
        self
    }

    pub fn schema_path(&self) -> Option<PathBuf> {
        self.schema.as_ref().map(PathBuf::from)
    }

    pub fn session_path(&self) -> PathBuf {
        PathBuf::from(self.session_file.as_deref().unwrap_or(SESSION_FILENAME))
    }

    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(self.history_file.as_deref().unwrap_or(HISTORY_FILENAME))
    }

    pub fn autosave(&self) -> bool {
        self.autosave.unwrap_or(true)
    }

    pub fn colors(&self) -> bool {
        self.colors.unwrap_or(true)
    }

    /// Merge another config into this one (for extends)
    pub fn merge_from(&mut self, base: Config) {
        // Base values are overridden by this config's values
        if self.extends.is_none() {
            self.extends = base.extends;
        }
        if self.schema.is_none() {
            self.schema = base.schema;
        }
        if self.session_file.is_none() {
            self.session_file = base.session_file;
        }
        if self.history_file.is_none() {
            self.history_file = base.history_file;
        }
        if self.autosave.is_none() {
            self.autosave = base.autosave;
        }
        if self.colors.is_none() {
            self.colors = base.colors;
        }
        if self.export.format.is_none() {
            self.export.format = base.export.format;
        }
        if self.export.dir.is_none() {
            self.export.dir = base.export.dir;
        }

        let mut all_ignores = base.ignore;
        all_ignores.append(&mut self.ignore);
        self.ignore = all_ignores;
    }
}
