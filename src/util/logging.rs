//! Log output for the `nbparam` binary
//!
//! Everything goes to stderr: stdout carries notebook JSON and parameter
//! listings. `RUST_LOG`, when set, replaces the level-derived filter.
//!
//! ```no_run
//! use nbparam::util::logging::{init_logging, parse_level, LoggingConfig};
//!
//! init_logging(LoggingConfig::new(parse_level("debug")).json(true));
//! tracing::debug!(tag = "Parameters", "Locating parameters cell");
//! ```

use std::env;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: Level,

    /// One JSON object per event instead of human-readable lines
    pub use_json: bool,

    /// Source file and line of each event; on by default at debug and trace
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(Level::INFO)
    }
}

impl LoggingConfig {
    /// ```
    /// use nbparam::util::LoggingConfig;
    /// use tracing::Level;
    ///
    /// let config = LoggingConfig::new(Level::DEBUG);
    /// assert!(config.include_location);
    /// assert!(!config.use_json);
    /// ```
    pub fn new(level: Level) -> Self {
        Self {
            level,
            use_json: false,
            include_location: level >= Level::DEBUG,
        }
    }

    pub fn json(mut self, enabled: bool) -> Self {
        self.use_json = enabled;
        self
    }

    fn filter(&self) -> EnvFilter {
        if env::var("RUST_LOG").is_ok() {
            return EnvFilter::from_default_env();
        }
        EnvFilter::new(format!("warn,nbparam={}", self.level))
    }
}

/// Case-insensitive level name. Unknown names warn on stderr and give
/// `Level::INFO`.
///
/// ```
/// use nbparam::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                name
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let json = config.use_json.then(|| {
            fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
        });
        let plain = (!config.use_json).then(|| {
            fmt::layer()
                .with_writer(io::stderr)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
        });

        tracing_subscriber::registry()
            .with(config.filter())
            .with(json)
            .with(plain)
            .init();
    });
}
