use crate::cli::commands::{ExtractArgs, ReplaceArgs};
use crate::cli::output::OutputFormatter;
use crate::config::NbparamConfig;
use crate::execute::ExecuteResources;
use crate::notebook::Notebook;
use crate::parameter::{ParamType, ParamValue, Parameter};
use crate::parameteriser::Parameteriser;
use crate::replace::ReplaceOptions;
use crate::values::parameter_values;

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub fn handle_extract(args: &ExtractArgs, config: &NbparamConfig) -> i32 {
    exit_code(run_extract(args, config))
}

pub fn handle_replace(args: &ReplaceArgs, config: &NbparamConfig) -> i32 {
    exit_code(run_replace(args, config))
}

fn exit_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn run_extract(args: &ExtractArgs, config: &NbparamConfig) -> Result<()> {
    let nb = read_notebook(&args.notebook)?;
    let tag = args.tag.as_deref().unwrap_or(&config.tag);
    let lang = args.lang.as_deref().or(config.language.as_deref());

    let params = Parameteriser::from_config(config)
        .extract(&nb, lang, tag)
        .with_context(|| format!("Failed to extract parameters from {}", args.notebook.display()))?;
    info!(count = params.len(), "Extracted parameters");

    let output = OutputFormatter::new(args.format.into()).format(&params)?;
    emit(&output, args.output.as_deref())
}

fn run_replace(args: &ReplaceArgs, config: &NbparamConfig) -> Result<()> {
    let nb = read_notebook(&args.notebook)?;
    let tag = args.tag.as_deref().unwrap_or(&config.tag);
    let lang = args.lang.as_deref().or(config.language.as_deref());
    let parameteriser = Parameteriser::from_config(config);

    let params = parameteriser
        .extract(&nb, lang, tag)
        .with_context(|| format!("Failed to extract parameters from {}", args.notebook.display()))?;
    let overrides = build_overrides(&params, &args.params);
    let updated = parameter_values(&params, overrides);

    let mut opts = ReplaceOptions::new()
        .tag(tag)
        .comments(config.comments && !args.no_comments)
        .execute(args.execute);
    if let Some(lang) = lang {
        opts = opts.lang(lang);
    }
    if args.execute {
        let workdir = args
            .workdir
            .clone()
            .unwrap_or_else(|| notebook_dir(&args.notebook));
        debug!(workdir = %workdir.display(), "Execution working directory");
        opts = opts.resources(ExecuteResources::with_path(workdir));
    }

    let rewritten = parameteriser
        .replace(&nb, &updated, &opts)
        .with_context(|| format!("Failed to rewrite {}", args.notebook.display()))?;

    let output = rewritten
        .to_json_string()
        .context("Failed to serialize notebook")?;
    emit(&output, args.output.as_deref())
}

fn read_notebook(path: &Path) -> Result<Notebook> {
    Notebook::read(path).with_context(|| format!("Failed to load notebook {}", path.display()))
}

fn notebook_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Pairs each `NAME=VALUE` argument with a parsed value, typed after the
/// parameter it overrides
fn build_overrides(params: &[Parameter], assignments: &[(String, String)]) -> Vec<(String, ParamValue)> {
    assignments
        .iter()
        .filter_map(|(name, raw)| {
            let Some(param) = params.iter().find(|p| &p.name == name) else {
                warn!(parameter = %name, "No such parameter in the notebook, ignoring");
                return None;
            };
            Some((name.clone(), parse_value(raw, Some(param.ty))))
        })
        .collect()
}

/// Reads a command-line value as JSON, falling back to a plain string.
///
/// Integers given for `float` parameters become floats, and anything that is
/// not a JSON string given for a `str` parameter is kept as raw text.
pub fn parse_value(raw: &str, ty: Option<ParamType>) -> ParamValue {
    let parsed = serde_json::from_str::<Value>(raw)
        .map(ParamValue::from)
        .unwrap_or_else(|_| ParamValue::Str(raw.to_string()));

    match (ty, parsed) {
        (Some(ParamType::Float), ParamValue::Int(i)) => ParamValue::Float(i as f64),
        (Some(ParamType::Str), value) if !matches!(value, ParamValue::Str(_)) => {
            ParamValue::Str(raw.to_string())
        }
        (_, value) => value,
    }
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), "Wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n").context("Failed to write to stdout")?;
            }
        }
    }
    Ok(())
}
