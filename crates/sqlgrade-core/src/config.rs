use crate::errors::ConfigError;
use crate::grading::{CompareMode, QueryLimits};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

pub const DEFAULT_REFERENCE_TABLE: &str = "hw{assignment}_q{index}_{suffix}_reference";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseConfig {
    #[serde(default = "default_version", rename = "configVersion", alias = "version")]
    pub version: u32,
    #[serde(default)]
    pub course: String,
    #[serde(default = "default_assignments")]
    pub assignments: Vec<String>,
    #[serde(default = "default_tracks")]
    pub tracks: Vec<TrackConfig>,
    #[serde(default = "default_suffix")]
    pub default_suffix: String,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminConfig>,
}

/// Maps a student's declared major to the suffix of its reference tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackConfig {
    pub name: String,
    pub suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default = "default_max_submissions")]
    pub max_submissions: u32,
    #[serde(default = "default_timeout_ms")]
    pub statement_timeout_ms: u64,
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    #[serde(default)]
    pub compare: CompareMode,
    #[serde(default = "default_reference_table")]
    pub reference_table: String,
    #[serde(default = "default_sandbox_table")]
    pub sandbox_table: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_submissions: default_max_submissions(),
            statement_timeout_ms: default_timeout_ms(),
            max_rows: default_max_rows(),
            compare: CompareMode::default(),
            reference_table: default_reference_table(),
            sandbox_table: default_sandbox_table(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}
fn default_assignments() -> Vec<String> {
    ["3", "4", "5", "6"].iter().map(|s| s.to_string()).collect()
}
fn default_tracks() -> Vec<TrackConfig> {
    vec![
        TrackConfig {
            name: "علوم کامپیوتر".into(),
            suffix: "cs".into(),
        },
        TrackConfig {
            name: "آمار".into(),
            suffix: "stat".into(),
        },
    ]
}
fn default_suffix() -> String {
    "cs".into()
}
fn default_max_submissions() -> u32 {
    10
}
fn default_timeout_ms() -> u64 {
    QueryLimits::default().statement_timeout_ms
}
fn default_max_rows() -> usize {
    QueryLimits::default().max_rows
}
fn default_reference_table() -> String {
    DEFAULT_REFERENCE_TABLE.into()
}
fn default_sandbox_table() -> String {
    "test".into()
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            course: String::new(),
            assignments: default_assignments(),
            tracks: default_tracks(),
            default_suffix: default_suffix(),
            settings: Settings::default(),
            admin: None,
        }
    }
}

impl CourseConfig {
    pub fn is_known_assignment(&self, assignment: &str) -> bool {
        self.assignments.iter().any(|a| a == assignment)
    }

    /// Tracks not listed in the config fall back to `default_suffix`.
    pub fn suffix_for(&self, track: &str) -> &str {
        self.tracks
            .iter()
            .find(|t| t.name == track)
            .map(|t| t.suffix.as_str())
            .unwrap_or(self.default_suffix.as_str())
    }

    /// Name of the reference object for 1-based sub-question `index`.
    pub fn reference_table(&self, assignment: &str, index: usize, track: &str) -> String {
        self.settings
            .reference_table
            .replace("{assignment}", assignment)
            .replace("{index}", &index.to_string())
            .replace("{suffix}", self.suffix_for(track))
    }

    pub fn limits(&self) -> QueryLimits {
        QueryLimits {
            statement_timeout_ms: self.settings.statement_timeout_ms,
            max_rows: self.settings.max_rows,
        }
    }

    pub fn track_names(&self) -> Vec<&str> {
        self.tracks.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError(format!(
                "unsupported config version {} (supported: {})",
                self.version, SUPPORTED_CONFIG_VERSION
            )));
        }
        if self.assignments.is_empty() {
            return Err(ConfigError("config has no assignments".into()));
        }
        for a in &self.assignments {
            if !is_identifier_fragment(a) {
                return Err(ConfigError(format!(
                    "assignment id '{}' may only contain letters, digits and '_'",
                    a
                )));
            }
        }
        for t in &self.tracks {
            if !is_identifier_fragment(&t.suffix) {
                return Err(ConfigError(format!(
                    "track '{}' has invalid suffix '{}'",
                    t.name, t.suffix
                )));
            }
        }
        if !is_identifier_fragment(&self.default_suffix) {
            return Err(ConfigError(format!(
                "invalid default_suffix '{}'",
                self.default_suffix
            )));
        }
        if !self.settings.reference_table.contains("{index}") {
            return Err(ConfigError(
                "settings.reference_table must contain the {index} placeholder".into(),
            ));
        }
        if self.settings.max_submissions == 0 {
            return Err(ConfigError("settings.max_submissions must be at least 1".into()));
        }
        if self.settings.max_rows == 0 || self.settings.statement_timeout_ms == 0 {
            return Err(ConfigError(
                "settings.max_rows and settings.statement_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

fn is_identifier_fragment(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn parse_config(raw: &str, strict: bool) -> Result<CourseConfig, ConfigError> {
    let mut ignored_keys = std::collections::BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(raw);

    let cfg: CourseConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    let meaningful_unknowns: Vec<_> = ignored_keys
        .iter()
        .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
        .collect();

    if !meaningful_unknowns.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "unknown fields detected in strict mode: {:?}",
                meaningful_unknowns
            )));
        }
        tracing::warn!(fields = ?meaningful_unknowns, "ignored unknown config fields");
    }

    cfg.validate()?;
    Ok(cfg)
}

pub fn load_config(path: &Path, strict: bool) -> Result<CourseConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;
    parse_config(&raw, strict).map_err(|ConfigError(msg)| {
        ConfigError(format!("{} (file: {})", msg, path.display()))
    })
}

pub const SAMPLE_CONFIG: &str = r#"version: 1
course: "Database Systems"
assignments: ["3", "4", "5", "6"]
tracks:
  - name: "علوم کامپیوتر"
    suffix: cs
  - name: "آمار"
    suffix: stat
default_suffix: cs
settings:
  max_submissions: 10
  statement_timeout_ms: 2000
  max_rows: 10000
  compare: set
  reference_table: "hw{assignment}_q{index}_{suffix}_reference"
  sandbox_table: test
"#;

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(path, SAMPLE_CONFIG)
        .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}
