//! nbparam - read and rewrite the parameters cell of Jupyter notebooks
//!
//! A notebook's parameters cell is the first code cell tagged `Parameters`
//! (or, failing that, its first code cell). This crate extracts the simple
//! literal assignments it contains as typed [`Parameter`] records, lets the
//! caller substitute new values, and writes the cell back, optionally
//! executing the resulting notebook.
//!
//! # Example Usage
//!
//! ```
//! use nbparam::{extract_parameters, parameter_values, replace_definitions};
//! use nbparam::{Cell, Notebook, ParamValue, ReplaceOptions, DEFAULT_TAG};
//!
//! let nb = Notebook::new(vec![
//!     Cell::markdown("# Stock report"),
//!     Cell::code("stock = 'AAPL'  # ticker\ndays_back = 30").with_tags([DEFAULT_TAG]),
//!     Cell::code("print(stock, days_back)"),
//! ]);
//!
//! let params = extract_parameters(&nb, None, DEFAULT_TAG)?;
//! let params = parameter_values(&params, [("days_back", ParamValue::Int(300))]);
//! let new_nb = replace_definitions(&nb, &params, &ReplaceOptions::default())?;
//!
//! assert_eq!(new_nb.cells[1].source, "stock = 'AAPL'  # ticker\ndays_back = 300");
//! # Ok::<(), nbparam::ParameteriseError>(())
//! ```
//!
//! # Project Structure
//!
//! - [`notebook`]: nbformat v4 document model and JSON I/O
//! - [`locate`]: finding the parameters cell
//! - [`drivers`]: per-language parsing and generation of definitions
//! - [`execute`]: running a rewritten notebook
//! - [`cli`]: the `nbparam` command-line front end

pub mod cli;
pub mod config;
pub mod drivers;
pub mod error;
pub mod execute;
pub mod extract;
pub mod locate;
pub mod notebook;
pub mod parameter;
pub mod parameteriser;
pub mod replace;
pub mod util;
pub mod values;

// Re-export key types for convenient access
pub use config::{ConfigError, NbparamConfig};
pub use drivers::{DriverRegistry, LanguageDriver, PythonDriver};
pub use error::{ParameteriseError, Result};
pub use execute::{ExecuteError, ExecuteResources, JupyterExecutor, NotebookExecutor};
pub use extract::{extract_parameters, DEFAULT_TAG};
pub use locate::{find_first_tagged_cell, first_code_cell, get_parameter_cell};
pub use notebook::{Cell, Notebook, NotebookError};
pub use parameter::{ParamType, ParamValue, Parameter};
pub use parameteriser::Parameteriser;
pub use replace::{replace_definitions, ReplaceOptions};
pub use util::{init_logging, LoggingConfig};
pub use values::parameter_values;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
