use super::LanguageDriver;
use crate::error::{ParameteriseError, Result};
use crate::notebook::Notebook;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Language assumed when the notebook does not declare one
pub const DEFAULT_LANGUAGE: &str = "python";

fn driver_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\w+$").expect("valid regex"))
}

/// Driver names are restricted to word characters
pub fn is_valid_driver_name(name: &str) -> bool {
    driver_name_re().is_match(name)
}

#[derive(Clone)]
pub struct DriverRegistry {
    drivers: Vec<Arc<dyn LanguageDriver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self {
            drivers: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::PythonDriver));
        registry
    }

    pub fn register(&mut self, driver: Arc<dyn LanguageDriver>) {
        self.drivers.push(driver);
    }

    /// Looks a driver up by its name or one of its aliases
    pub fn get(&self, name: &str) -> Option<Arc<dyn LanguageDriver>> {
        self.drivers
            .iter()
            .find(|d| d.name() == name || d.aliases().contains(&name))
            .cloned()
    }

    /// Primary names of all registered drivers
    pub fn driver_names(&self) -> Vec<&str> {
        self.drivers.iter().map(|d| d.name()).collect()
    }

    /// Picks the driver for `nb`.
    ///
    /// The override wins when given; otherwise the notebook's declared
    /// language is used, defaulting to [`DEFAULT_LANGUAGE`]. The name is
    /// validated before any lookup happens.
    pub fn resolve(
        &self,
        nb: &Notebook,
        language_override: Option<&str>,
    ) -> Result<Arc<dyn LanguageDriver>> {
        let name = language_override
            .filter(|name| !name.is_empty())
            .or_else(|| nb.language())
            .unwrap_or(DEFAULT_LANGUAGE);

        if !is_valid_driver_name(name) {
            return Err(ParameteriseError::InvalidDriverName(name.to_string()));
        }

        let driver = self
            .get(name)
            .ok_or_else(|| ParameteriseError::UnsupportedLanguage {
                name: name.to_string(),
                available: self.driver_names().iter().map(|n| n.to_string()).collect(),
            })?;

        debug!(language = name, driver = driver.name(), "Resolved language driver");
        Ok(driver)
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
