//! In-memory model of an nbformat v4 notebook
//!
//! Only the fields the parameteriser reads are typed. Everything else a cell
//! carries (`id`, `outputs`, `execution_count`, `attachments`, ...) is kept in
//! [`Cell::extra`] and written back untouched.

mod multiline;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Notebook metadata key holding per-parameter metadata
pub const PARAMETER_METADATA_KEY: &str = "parameterise";

#[derive(Debug, Error)]
pub enum NotebookError {
    #[error("Failed to access notebook {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid notebook JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default = "default_nbformat")]
    pub nbformat: u32,
    #[serde(default = "default_nbformat_minor")]
    pub nbformat_minor: u32,
}

fn default_nbformat() -> u32 {
    4
}

fn default_nbformat_minor() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    #[serde(default, with = "multiline")]
    pub source: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cell {
    pub fn new(cell_type: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            cell_type: cell_type.into(),
            metadata: Map::new(),
            source: source.into(),
            extra: Map::new(),
        }
    }

    /// A code cell with empty outputs, as Jupyter creates it
    pub fn code(source: impl Into<String>) -> Self {
        let mut cell = Self::new("code", source);
        cell.extra.insert("execution_count".to_string(), Value::Null);
        cell.extra.insert("outputs".to_string(), Value::Array(Vec::new()));
        cell
    }

    pub fn markdown(source: impl Into<String>) -> Self {
        Self::new("markdown", source)
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = tags
            .into_iter()
            .map(|t| Value::String(t.into()))
            .collect();
        self.metadata.insert("tags".to_string(), Value::Array(tags));
        self
    }

    pub fn is_code(&self) -> bool {
        self.cell_type == "code"
    }

    /// String entries of `metadata.tags`; anything else is ignored
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.metadata
            .get("tags")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().any(|t| t == tag)
    }
}

impl Notebook {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            metadata: Map::new(),
            nbformat: default_nbformat(),
            nbformat_minor: default_nbformat_minor(),
        }
    }

    /// Declares the kernel language in `metadata.language_info.name`
    pub fn with_language(mut self, name: impl Into<String>) -> Self {
        let info = self
            .metadata
            .entry("language_info")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(info) = info {
            info.insert("name".to_string(), Value::String(name.into()));
        } else {
            let mut fresh = Map::new();
            fresh.insert("name".to_string(), Value::String(name.into()));
            *info = Value::Object(fresh);
        }
        self
    }

    pub fn language(&self) -> Option<&str> {
        self.metadata
            .get("language_info")
            .and_then(|info| info.get("name"))
            .and_then(Value::as_str)
    }

    /// Raw metadata stored for `name` under the `parameterise` namespace
    pub fn parameter_metadata(&self, name: &str) -> Option<&Value> {
        self.metadata
            .get(PARAMETER_METADATA_KEY)
            .and_then(|ns| ns.get(name))
    }

    pub fn from_json_str(json: &str) -> Result<Self, NotebookError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read(path: &Path) -> Result<Self, NotebookError> {
        let content = fs::read_to_string(path).map_err(|source| NotebookError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Serializes the way Jupyter does: sorted keys, one-space indent,
    /// trailing newline.
    pub fn to_json_string(&self) -> Result<String, NotebookError> {
        let value = serde_json::to_value(self)?;
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut serializer)?;

        let mut out = String::from_utf8_lossy(&buf).into_owned();
        out.push('\n');
        Ok(out)
    }

    pub fn write(&self, path: &Path) -> Result<(), NotebookError> {
        let content = self.to_json_string()?;
        fs::write(path, content).map_err(|source| NotebookError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
