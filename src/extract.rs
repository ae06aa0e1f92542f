use crate::error::{ParameteriseError, Result};
use crate::locate::get_parameter_cell;
use crate::notebook::Notebook;
use crate::parameter::Parameter;
use crate::parameteriser::Parameteriser;
use serde_json::{Map, Value};
use tracing::debug;

/// Tag marking the parameters cell unless another is requested
pub const DEFAULT_TAG: &str = "Parameters";

impl Parameteriser {
    /// Reads the parameter definitions from the parameters cell of `nb`.
    ///
    /// Each record picks up `metadata.parameterise.<name>` from the notebook.
    /// An entry that is not a JSON object is kept under a `value` key.
    pub fn extract(&self, nb: &Notebook, lang: Option<&str>, tag: &str) -> Result<Vec<Parameter>> {
        let driver = self.registry.resolve(nb, lang)?;
        let cell = get_parameter_cell(nb, tag).ok_or_else(|| ParameteriseError::NoParametersCell {
            tag: tag.to_string(),
        })?;

        let params: Vec<Parameter> = driver
            .extract_definitions(&cell.source)
            .into_iter()
            .map(|param| {
                let metadata = metadata_for(nb, &param.name);
                param.with_metadata(metadata)
            })
            .collect();

        debug!(count = params.len(), driver = driver.name(), "Extracted parameters");
        Ok(params)
    }
}

fn metadata_for(nb: &Notebook, name: &str) -> Map<String, Value> {
    match nb.parameter_metadata(name) {
        Some(Value::Object(map)) => map.clone(),
        Some(other) => {
            debug!(parameter = name, "Wrapping parameter metadata that is not an object");
            let mut map = Map::new();
            map.insert("value".to_string(), other.clone());
            map
        }
        None => Map::new(),
    }
}

/// Extracts parameters with the default drivers.
///
/// `lang` overrides the notebook's declared kernel language; `tag` selects
/// the parameters cell (see [`DEFAULT_TAG`]).
pub fn extract_parameters(nb: &Notebook, lang: Option<&str>, tag: &str) -> Result<Vec<Parameter>> {
    Parameteriser::default().extract(nb, lang, tag)
}
