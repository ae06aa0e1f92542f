//! Notebook execution collaborator
//!
//! Running a notebook is not something this crate does itself: a
//! [`NotebookExecutor`] takes the rewritten notebook and hands back the
//! executed one. [`JupyterExecutor`] drives `jupyter nbconvert --execute`
//! as a subprocess.

use crate::config::NbparamConfig;
use crate::notebook::{Notebook, NotebookError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("Failed to start notebook executor '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while talking to the notebook executor: {0}")]
    Io(#[from] io::Error),

    #[error("Notebook executor exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("Notebook could not be passed through the executor: {0}")]
    Notebook(#[from] NotebookError),
}

/// Options handed to the executor untouched.
///
/// By nbconvert convention the working directory lives under
/// `metadata.path`; a top-level `path` key is honoured as well.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecuteResources(Map<String, Value>);

impl ExecuteResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources carrying a working directory hint
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        let mut metadata = Map::new();
        metadata.insert(
            "path".to_string(),
            Value::String(path.as_ref().display().to_string()),
        );
        let mut resources = Map::new();
        resources.insert("metadata".to_string(), Value::Object(metadata));
        Self(resources)
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.0
            .get("metadata")
            .and_then(|m| m.get("path"))
            .or_else(|| self.0.get("path"))
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ExecuteResources {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

pub trait NotebookExecutor: Send + Sync {
    /// Runs every cell of `notebook` and returns the executed notebook
    /// together with the (possibly updated) resources.
    fn execute(
        &self,
        notebook: Notebook,
        resources: ExecuteResources,
    ) -> Result<(Notebook, ExecuteResources), ExecuteError>;
}

/// Executes notebooks through `jupyter nbconvert`
#[derive(Debug, Clone, PartialEq)]
pub struct JupyterExecutor {
    /// Program to invoke, `jupyter` unless configured otherwise
    pub program: String,
    /// Per-cell timeout forwarded to the execute preprocessor
    pub timeout_secs: Option<u64>,
    pub kernel_name: Option<String>,
}

impl Default for JupyterExecutor {
    fn default() -> Self {
        Self {
            program: "jupyter".to_string(),
            timeout_secs: None,
            kernel_name: None,
        }
    }
}

impl JupyterExecutor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    pub fn from_config(config: &NbparamConfig) -> Self {
        Self {
            program: config.jupyter_program.clone(),
            timeout_secs: Some(config.execute_timeout_secs),
            kernel_name: None,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_kernel_name(mut self, kernel_name: impl Into<String>) -> Self {
        self.kernel_name = Some(kernel_name.into());
        self
    }

    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = [
            "nbconvert",
            "--to",
            "notebook",
            "--execute",
            "--stdin",
            "--stdout",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if let Some(timeout) = self.timeout_secs {
            args.push(format!("--ExecutePreprocessor.timeout={}", timeout));
        }
        if let Some(kernel) = &self.kernel_name {
            args.push(format!("--ExecutePreprocessor.kernel_name={}", kernel));
        }
        args
    }
}

impl NotebookExecutor for JupyterExecutor {
    fn execute(
        &self,
        notebook: Notebook,
        resources: ExecuteResources,
    ) -> Result<(Notebook, ExecuteResources), ExecuteError> {
        let input = notebook.to_json_string()?;

        let mut command = Command::new(&self.program);
        command
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = resources.path() {
            debug!(cwd = %dir.display(), "Executing notebook in working directory");
            command.current_dir(dir);
        }

        info!(program = %self.program, "Executing notebook");
        let mut child = command.spawn().map_err(|source| ExecuteError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "executor stdin unavailable"))?;
        let writer = thread::spawn(move || stdin.write_all(input.as_bytes()));

        let output = child.wait_with_output()?;
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "stdin writer panicked")));

        if !output.status.success() {
            return Err(ExecuteError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        let executed = Notebook::from_json_str(&String::from_utf8_lossy(&output.stdout))?;
        info!(cells = executed.cells.len(), "Notebook execution finished");
        Ok((executed, resources))
    }
}
