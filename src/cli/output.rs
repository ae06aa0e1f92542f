//! Output formatting for extracted parameters
//!
//! JSON and YAML emit the serialized records; the human format is an
//! aligned table.
//!
//! # Example
//!
//! ```
//! use nbparam::cli::output::{OutputFormat, OutputFormatter};
//! use nbparam::Parameter;
//!
//! let params = vec![Parameter::new("n", 50.into()).with_comment("count")];
//! let output = OutputFormatter::new(OutputFormat::Json).format(&params).unwrap();
//! assert!(output.contains("\"type\": \"int\""));
//! ```

use anyhow::{Context, Result};

use crate::parameter::Parameter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable table
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, params: &[Parameter]) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_json(params),
            OutputFormat::Yaml => self.format_yaml(params),
            OutputFormat::Human => Ok(self.format_human(params)),
        }
    }

    fn format_json(&self, params: &[Parameter]) -> Result<String> {
        serde_json::to_string_pretty(params).context("Failed to serialize parameters to JSON")
    }

    fn format_yaml(&self, params: &[Parameter]) -> Result<String> {
        serde_yaml::to_string(params).context("Failed to serialize parameters to YAML")
    }

    fn format_human(&self, params: &[Parameter]) -> String {
        if params.is_empty() {
            return "No parameters found\n".to_string();
        }

        let header = ["NAME", "TYPE", "VALUE", "COMMENT"];
        let rows: Vec<[String; 4]> = params
            .iter()
            .map(|p| {
                [
                    p.name.clone(),
                    p.ty.to_string(),
                    p.value
                        .as_ref()
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    p.comment.clone().unwrap_or_default(),
                ]
            })
            .collect();

        let mut widths = header.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut output = String::new();
        push_row(&mut output, &header.map(String::from), &widths);
        for row in &rows {
            push_row(&mut output, row, &widths);
        }
        output
    }
}

fn push_row(output: &mut String, row: &[String; 4], widths: &[usize; 4]) {
    let line = row
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    output.push_str(line.trim_end());
    output.push('\n');
}
