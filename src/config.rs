//! Configuration management for nbparam
//!
//! Settings are loaded from environment variables with sensible defaults.
//! Command-line flags take precedence over anything configured here.
//!
//! # Environment Variables
//!
//! - `NBPARAM_TAG`: Cell tag marking the parameters cell - default: "Parameters"
//! - `NBPARAM_LANGUAGE`: Driver override, ignoring the notebook's declared language - default: unset
//! - `NBPARAM_COMMENTS`: Keep inline comments when rewriting (true|false) - default: "true"
//! - `NBPARAM_JUPYTER`: Program used to execute notebooks - default: "jupyter"
//! - `NBPARAM_EXECUTE_TIMEOUT`: Per-cell execution timeout in seconds - default: "600"
//! - `NBPARAM_LOG_LEVEL`: Logging level - default: "info"
//! - `NBPARAM_LOG_JSON`: Emit logs as JSON lines (true|false) - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use nbparam::NbparamConfig;
//! use std::env;
//!
//! env::set_var("NBPARAM_TAG", "params");
//!
//! let config = NbparamConfig::default();
//! config.validate().expect("Invalid configuration");
//! assert_eq!(config.tag, "params");
//! ```

use crate::drivers::is_valid_driver_name;
use crate::extract::DEFAULT_TAG;
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default values for configuration
const DEFAULT_COMMENTS: bool = true;
const DEFAULT_JUPYTER_PROGRAM: &str = "jupyter";
const DEFAULT_EXECUTE_TIMEOUT_SECS: u64 = 600;
const DEFAULT_LOG_LEVEL: &str = "info";
const MAX_EXECUTE_TIMEOUT_SECS: u64 = 86_400;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NbparamConfig {
    /// Tag marking the parameters cell
    pub tag: String,

    /// Driver name used instead of the notebook's declared language
    pub language: Option<String>,

    /// Emit inline comments when rewriting definitions
    pub comments: bool,

    /// Program invoked to execute notebooks
    pub jupyter_program: String,

    /// Per-cell execution timeout in seconds
    pub execute_timeout_secs: u64,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for NbparamConfig {
    /// Loads from `NBPARAM_*` environment variables, falling back to defaults
    fn default() -> Self {
        let tag = env::var("NBPARAM_TAG")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_TAG.to_string());

        let language = env::var("NBPARAM_LANGUAGE").ok().filter(|v| !v.is_empty());

        let comments = env::var("NBPARAM_COMMENTS")
            .ok()
            .and_then(|v| v.to_lowercase().parse::<bool>().ok())
            .unwrap_or(DEFAULT_COMMENTS);

        let jupyter_program = env::var("NBPARAM_JUPYTER")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_JUPYTER_PROGRAM.to_string());

        let execute_timeout_secs = env::var("NBPARAM_EXECUTE_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_EXECUTE_TIMEOUT_SECS);

        let log_level = env::var("NBPARAM_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let log_json = env::var("NBPARAM_LOG_JSON")
            .ok()
            .and_then(|v| v.to_lowercase().parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            tag,
            language,
            comments,
            jupyter_program,
            execute_timeout_secs,
            log_level,
            log_json,
        }
    }
}

impl NbparamConfig {
    /// Strict variant of `default()`: malformed values are reported instead
    /// of silently replaced by defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var("NBPARAM_COMMENTS") {
            config.comments = raw
                .to_lowercase()
                .parse::<bool>()
                .map_err(|e| ConfigError::ParseError {
                    field: "NBPARAM_COMMENTS".to_string(),
                    error: e.to_string(),
                })?;
        }

        if let Ok(raw) = env::var("NBPARAM_EXECUTE_TIMEOUT") {
            config.execute_timeout_secs =
                raw.parse::<u64>().map_err(|e| ConfigError::ParseError {
                    field: "NBPARAM_EXECUTE_TIMEOUT".to_string(),
                    error: e.to_string(),
                })?;
        }

        if let Ok(raw) = env::var("NBPARAM_LOG_JSON") {
            config.log_json = raw
                .to_lowercase()
                .parse::<bool>()
                .map_err(|e| ConfigError::ParseError {
                    field: "NBPARAM_LOG_JSON".to_string(),
                    error: e.to_string(),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that:
    /// - The tag is not empty
    /// - A language override is a valid driver name
    /// - The execution timeout is between 1 second and 24 hours
    /// - Log level is valid
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tag.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Parameters tag cannot be empty".to_string(),
            ));
        }

        if let Some(language) = &self.language {
            if !is_valid_driver_name(language) {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid language override: {:?}. Only letters, digits and '_' are allowed",
                    language
                )));
            }
        }

        if self.jupyter_program.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Jupyter program cannot be empty".to_string(),
            ));
        }

        if self.execute_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Execution timeout must be at least 1 second".to_string(),
            ));
        }
        if self.execute_timeout_secs > MAX_EXECUTE_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(
                "Execution timeout cannot exceed 24 hours".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("tag".to_string(), self.tag.clone());
        if let Some(ref language) = self.language {
            map.insert("language".to_string(), language.clone());
        }
        map.insert("comments".to_string(), self.comments.to_string());
        map.insert("jupyter_program".to_string(), self.jupyter_program.clone());
        map.insert(
            "execute_timeout_secs".to_string(),
            self.execute_timeout_secs.to_string(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());
        map.insert("log_json".to_string(), self.log_json.to_string());

        map
    }
}

impl fmt::Display for NbparamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "nbparam Configuration:")?;
        writeln!(f, "  Tag: {}", self.tag)?;
        writeln!(
            f,
            "  Language: {}",
            self.language.as_deref().unwrap_or("(from notebook)")
        )?;
        writeln!(f, "  Comments: {}", self.comments)?;
        writeln!(f, "  Jupyter Program: {}", self.jupyter_program)?;
        writeln!(f, "  Execute Timeout: {}s", self.execute_timeout_secs)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Log JSON: {}", self.log_json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 7] = [
        "NBPARAM_TAG",
        "NBPARAM_LANGUAGE",
        "NBPARAM_COMMENTS",
        "NBPARAM_JUPYTER",
        "NBPARAM_EXECUTE_TIMEOUT",
        "NBPARAM_LOG_LEVEL",
        "NBPARAM_LOG_JSON",
    ];

    /// Helper to temporarily set environment variables for testing
    struct EnvGuard {
        key: String,
        old_value: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &str, value: &str) -> Self {
            let old_value = env::var(key).ok();
            env::set_var(key, value);
            Self {
                key: key.to_string(),
                old_value,
            }
        }

        fn unset(key: &str) -> Self {
            let old_value = env::var(key).ok();
            env::remove_var(key);
            Self {
                key: key.to_string(),
                old_value,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.old_value {
                Some(v) => env::set_var(&self.key, v),
                None => env::remove_var(&self.key),
            }
        }
    }

    fn clean_env() -> Vec<EnvGuard> {
        VARS.iter().map(|key| EnvGuard::unset(key)).collect()
    }

    #[test]
    #[serial]
    fn test_default_configuration() {
        let _guards = clean_env();

        let config = NbparamConfig::default();

        assert_eq!(config.tag, DEFAULT_TAG);
        assert_eq!(config.language, None);
        assert_eq!(config.comments, DEFAULT_COMMENTS);
        assert_eq!(config.jupyter_program, DEFAULT_JUPYTER_PROGRAM);
        assert_eq!(config.execute_timeout_secs, DEFAULT_EXECUTE_TIMEOUT_SECS);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert!(!config.log_json);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_custom_configuration() {
        let _clean = clean_env();
        let _guards = vec![
            EnvGuard::set("NBPARAM_TAG", "params"),
            EnvGuard::set("NBPARAM_LANGUAGE", "python3"),
            EnvGuard::set("NBPARAM_COMMENTS", "FALSE"),
            EnvGuard::set("NBPARAM_JUPYTER", "/opt/conda/bin/jupyter"),
            EnvGuard::set("NBPARAM_EXECUTE_TIMEOUT", "30"),
            EnvGuard::set("NBPARAM_LOG_LEVEL", "DEBUG"),
            EnvGuard::set("NBPARAM_LOG_JSON", "True"),
        ];

        let config = NbparamConfig::default();

        assert_eq!(config.tag, "params");
        assert_eq!(config.language.as_deref(), Some("python3"));
        assert!(!config.comments);
        assert_eq!(config.jupyter_program, "/opt/conda/bin/jupyter");
        assert_eq!(config.execute_timeout_secs, 30);
        assert_eq!(config.log_level, "debug");
        assert!(config.log_json);
    }

    #[test]
    #[serial]
    fn test_malformed_values_fall_back_to_defaults() {
        let _clean = clean_env();
        let _guards = vec![
            EnvGuard::set("NBPARAM_COMMENTS", "maybe"),
            EnvGuard::set("NBPARAM_EXECUTE_TIMEOUT", "soon"),
            EnvGuard::set("NBPARAM_TAG", ""),
        ];

        let config = NbparamConfig::default();

        assert_eq!(config.comments, DEFAULT_COMMENTS);
        assert_eq!(config.execute_timeout_secs, DEFAULT_EXECUTE_TIMEOUT_SECS);
        assert_eq!(config.tag, DEFAULT_TAG);
    }

    #[test]
    #[serial]
    fn test_from_env_reports_parse_errors() {
        let _clean = clean_env();
        let _guard = EnvGuard::set("NBPARAM_EXECUTE_TIMEOUT", "soon");

        match NbparamConfig::from_env() {
            Err(ConfigError::ParseError { field, .. }) => {
                assert_eq!(field, "NBPARAM_EXECUTE_TIMEOUT")
            }
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_malformed_log_json() {
        let _clean = clean_env();
        let _guard = EnvGuard::set("NBPARAM_LOG_JSON", "yes");

        assert!(!NbparamConfig::default().log_json);
        match NbparamConfig::from_env() {
            Err(ConfigError::ParseError { field, .. }) => assert_eq!(field, "NBPARAM_LOG_JSON"),
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_from_env_validates() {
        let _clean = clean_env();
        let _guard = EnvGuard::set("NBPARAM_LANGUAGE", "os.path");

        assert!(matches!(
            NbparamConfig::from_env(),
            Err(ConfigError::ValidationFailed(_))
        ));
    }

    #[test]
    #[serial]
    fn test_validation_timeout_bounds() {
        let _clean = clean_env();
        let mut config = NbparamConfig::default();

        config.execute_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.execute_timeout_secs = MAX_EXECUTE_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());

        config.execute_timeout_secs = MAX_EXECUTE_TIMEOUT_SECS;
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_validation_invalid_log_level() {
        let _clean = clean_env();
        let mut config = NbparamConfig::default();
        config.log_level = "verbose".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Invalid log level"));
    }

    #[test]
    #[serial]
    fn test_validation_empty_tag() {
        let _clean = clean_env();
        let mut config = NbparamConfig::default();
        config.tag = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_display_and_display_map() {
        let _clean = clean_env();
        let config = NbparamConfig::default();

        let display = format!("{}", config);
        assert!(display.contains("nbparam Configuration:"));
        assert!(display.contains("Tag: Parameters"));
        assert!(display.contains("(from notebook)"));

        let map = config.to_display_map();
        assert_eq!(map.get("tag"), Some(&"Parameters".to_string()));
        assert_eq!(map.get("execute_timeout_secs"), Some(&"600".to_string()));
        assert!(!map.contains_key("language"));
    }
}
