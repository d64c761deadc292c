//! Solver introspection sources.
//!
//! The catalog builder never talks to a live solver directly; it consumes an
//! [`OptionSource`], so any tool that needs parameter metadata can run
//! against a file-backed dump or an in-memory fake.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use vt_types::{CatalogError, TunerResult};

/// Abstraction over a solver's option-introspection API.
pub trait OptionSource: Send + Sync + std::fmt::Debug {
    /// All option names the solver reports.
    fn option_names(&self) -> TunerResult<Vec<String>>;

    /// Raw metadata for one option.
    fn option_info(&self, name: &str) -> TunerResult<OptionInfo>;

    /// Source name, used in logs.
    fn name(&self) -> &str;
}

/// Raw per-option metadata as the solver reports it.
///
/// `type_tag` is the single source of truth for classification; fields that
/// do not apply to a given tag are simply absent in the dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionInfo {
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modes: Vec<String>,
}

impl OptionInfo {
    pub fn boolean(default: bool) -> Self {
        Self {
            type_tag: "bool".to_string(),
            default: Some(serde_json::Value::Bool(default)),
            minimum: None,
            maximum: None,
            modes: Vec::new(),
        }
    }

    pub fn integer(default: i64, minimum: Option<i64>, maximum: Option<i64>) -> Self {
        Self {
            type_tag: "int".to_string(),
            default: Some(default.into()),
            minimum: minimum.map(Into::into),
            maximum: maximum.map(Into::into),
            modes: Vec::new(),
        }
    }

    pub fn float(default: f64, minimum: Option<f64>, maximum: Option<f64>) -> Self {
        Self {
            type_tag: "float".to_string(),
            default: Some(default.into()),
            minimum: minimum.map(Into::into),
            maximum: maximum.map(Into::into),
            modes: Vec::new(),
        }
    }

    pub fn string(default: &str) -> Self {
        Self {
            type_tag: "string".to_string(),
            default: Some(default.into()),
            minimum: None,
            maximum: None,
            modes: Vec::new(),
        }
    }

    pub fn mode(default: Option<&str>, modes: &[&str]) -> Self {
        Self {
            type_tag: "mode".to_string(),
            default: default.map(Into::into),
            minimum: None,
            maximum: None,
            modes: modes.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// One record of an options dump file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OptionRecord {
    name: String,
    #[serde(flatten)]
    info: OptionInfo,
}

/// Option source backed by a JSON metadata dump.
///
/// The dump is a JSON array with one record per option:
///
/// ```json
/// [
///   {"name": "seed", "type": "int", "default": 0, "minimum": 0},
///   {"name": "bitblast", "type": "mode", "default": "lazy", "modes": ["lazy", "eager"]}
/// ]
/// ```
///
/// Solvers that expose introspection through an API rather than a dump can
/// be adapted by emitting this format once and pointing VeriTune at the file.
#[derive(Debug, Clone)]
pub struct JsonOptionSource {
    label: String,
    order: Vec<String>,
    options: HashMap<String, OptionInfo>,
}

impl JsonOptionSource {
    pub fn from_path<P: AsRef<Path>>(path: P) -> TunerResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_str_named(&text, &path.as_ref().to_string_lossy())
    }

    pub fn from_str_named(json: &str, label: &str) -> TunerResult<Self> {
        let records: Vec<OptionRecord> = serde_json::from_str(json)?;
        let mut order = Vec::with_capacity(records.len());
        let mut options = HashMap::with_capacity(records.len());
        for record in records {
            // First record wins; the builder reports duplicates separately.
            if !options.contains_key(&record.name) {
                order.push(record.name.clone());
            }
            options.entry(record.name).or_insert(record.info);
        }
        Ok(Self {
            label: label.to_string(),
            order,
            options,
        })
    }
}

impl OptionSource for JsonOptionSource {
    fn option_names(&self) -> TunerResult<Vec<String>> {
        Ok(self.order.clone())
    }

    fn option_info(&self, name: &str) -> TunerResult<OptionInfo> {
        self.options.get(name).cloned().ok_or_else(|| {
            CatalogError::MetadataUnavailable {
                option: name.to_string(),
                message: format!("not present in {}", self.label),
            }
            .into()
        })
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// In-memory option source for tests, examples, and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticOptionSource {
    order: Vec<String>,
    options: HashMap<String, OptionInfo>,
}

impl StaticOptionSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(mut self, name: impl Into<String>, info: OptionInfo) -> Self {
        let name = name.into();
        self.order.push(name.clone());
        // First metadata wins, matching the file-backed source.
        self.options.entry(name).or_insert(info);
        self
    }
}

impl OptionSource for StaticOptionSource {
    fn option_names(&self) -> TunerResult<Vec<String>> {
        Ok(self.order.clone())
    }

    fn option_info(&self, name: &str) -> TunerResult<OptionInfo> {
        self.options.get(name).cloned().ok_or_else(|| {
            CatalogError::MetadataUnavailable {
                option: name.to_string(),
                message: "not present in static source".to_string(),
            }
            .into()
        })
    }

    fn name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DUMP: &str = r#"[
        {"name": "produce-models", "type": "bool", "default": false},
        {"name": "depth", "type": "int", "default": 4, "minimum": 1, "maximum": 10},
        {"name": "decay", "type": "float", "default": 0.95, "minimum": 0.0, "maximum": 1.0},
        {"name": "bitblast", "type": "mode", "default": "lazy", "modes": ["lazy", "eager"]}
    ]"#;

    #[test]
    fn json_source_reports_names_in_file_order() {
        let source = JsonOptionSource::from_str_named(DUMP, "dump").unwrap();
        let names = source.option_names().unwrap();
        assert_eq!(names, vec!["produce-models", "depth", "decay", "bitblast"]);
    }

    #[test]
    fn json_source_returns_metadata() {
        let source = JsonOptionSource::from_str_named(DUMP, "dump").unwrap();
        let info = source.option_info("depth").unwrap();
        assert_eq!(info.type_tag, "int");
        assert_eq!(info.minimum, Some(1.into()));
        assert_eq!(info.maximum, Some(10.into()));

        let info = source.option_info("bitblast").unwrap();
        assert_eq!(info.modes, vec!["lazy", "eager"]);
    }

    #[test]
    fn json_source_unknown_option_errors() {
        let source = JsonOptionSource::from_str_named(DUMP, "dump").unwrap();
        assert!(source.option_info("no-such-option").is_err());
    }

    #[test]
    fn json_source_reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DUMP.as_bytes()).unwrap();
        let source = JsonOptionSource::from_path(file.path()).unwrap();
        assert_eq!(source.option_names().unwrap().len(), 4);
    }

    #[test]
    fn json_source_rejects_malformed_dump() {
        assert!(JsonOptionSource::from_str_named("{not json", "bad").is_err());
    }

    #[test]
    fn static_source_round_trips() {
        let source = StaticOptionSource::new()
            .with_option("seed", OptionInfo::integer(0, Some(0), None))
            .with_option("strings-exp", OptionInfo::boolean(false));

        assert_eq!(source.option_names().unwrap(), vec!["seed", "strings-exp"]);
        assert_eq!(source.option_info("seed").unwrap().type_tag, "int");
        assert!(source.option_info("missing").is_err());
    }
}
