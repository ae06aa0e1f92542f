//! Language drivers and the registry that selects them
//!
//! A driver knows how to read parameter definitions out of a cell written in
//! one kernel language and how to write them back. Supporting a new language
//! means implementing [`LanguageDriver`] and registering it with a
//! [`DriverRegistry`]; nothing else changes.

pub mod python;
mod registry;

pub use python::PythonDriver;
pub use registry::{is_valid_driver_name, DriverRegistry, DEFAULT_LANGUAGE};

use crate::parameter::Parameter;

pub trait LanguageDriver: Send + Sync {
    /// Primary name, matched against the notebook's `language_info.name`
    fn name(&self) -> &str;

    /// Other kernel language names served by this driver
    fn aliases(&self) -> &[&str] {
        &[]
    }

    /// Parses top-level literal assignments, in source order.
    ///
    /// Extraction is best-effort: statements that are not simple literal
    /// assignments are skipped, never reported. Returned records carry empty
    /// metadata.
    fn extract_definitions(&self, source: &str) -> Vec<Parameter>;

    /// Emits one definition per record, in order, joined by newlines.
    /// Comments are appended inline when `comments` is set.
    fn build_definitions(&self, params: &[Parameter], comments: bool) -> String;
}
