use crate::config::NbparamConfig;
use crate::drivers::DriverRegistry;
use crate::execute::{JupyterExecutor, NotebookExecutor};
use std::sync::Arc;

/// Entry point bundling the driver registry with the executor used when a
/// rewritten notebook is asked to run.
///
/// Extraction lives in [`extract`](Parameteriser::extract) and rewriting in
/// [`replace`](Parameteriser::replace). The free functions
/// [`extract_parameters`](crate::extract_parameters) and
/// [`replace_definitions`](crate::replace_definitions) use
/// `Parameteriser::default()`.
#[derive(Clone)]
pub struct Parameteriser {
    pub(crate) registry: DriverRegistry,
    pub(crate) executor: Arc<dyn NotebookExecutor>,
}

impl Parameteriser {
    pub fn new(executor: Arc<dyn NotebookExecutor>) -> Self {
        Self {
            registry: DriverRegistry::with_defaults(),
            executor,
        }
    }

    pub fn from_config(config: &NbparamConfig) -> Self {
        Self::new(Arc::new(JupyterExecutor::from_config(config)))
    }

    pub fn with_registry(mut self, registry: DriverRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &DriverRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DriverRegistry {
        &mut self.registry
    }
}

impl Default for Parameteriser {
    fn default() -> Self {
        Self::new(Arc::new(JupyterExecutor::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::LanguageDriver;
    use crate::parameter::Parameter;

    struct NullDriver;

    impl LanguageDriver for NullDriver {
        fn name(&self) -> &str {
            "null"
        }

        fn extract_definitions(&self, _source: &str) -> Vec<Parameter> {
            Vec::new()
        }

        fn build_definitions(&self, _params: &[Parameter], _comments: bool) -> String {
            String::new()
        }
    }

    #[test]
    fn test_default_has_python_driver() {
        let p = Parameteriser::default();
        assert_eq!(p.registry().driver_names(), vec!["python"]);
    }

    #[test]
    fn test_register_additional_driver() {
        let mut p = Parameteriser::default();
        p.registry_mut().register(Arc::new(NullDriver));
        assert_eq!(p.registry().driver_names(), vec!["python", "null"]);

        let replaced = Parameteriser::default().with_registry(DriverRegistry::new());
        assert!(replaced.registry().driver_names().is_empty());
    }
}
