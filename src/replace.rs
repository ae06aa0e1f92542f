use crate::error::{ParameteriseError, Result};
use crate::execute::ExecuteResources;
use crate::extract::DEFAULT_TAG;
use crate::locate::parameters_cell_index;
use crate::notebook::Notebook;
use crate::parameter::Parameter;
use crate::parameteriser::Parameteriser;
use tracing::debug;

/// Options controlling how the parameters cell is rewritten
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceOptions {
    /// Run the rewritten notebook through the executor
    pub execute: bool,
    /// Passed to the executor; defaults to empty resources
    pub resources: Option<ExecuteResources>,
    /// Overrides the notebook's declared language
    pub lang: Option<String>,
    /// Emit inline comments after each definition
    pub comments: bool,
    pub tag: String,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self {
            execute: false,
            resources: None,
            lang: None,
            comments: true,
            tag: DEFAULT_TAG.to_string(),
        }
    }
}

impl ReplaceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn execute(mut self, execute: bool) -> Self {
        self.execute = execute;
        self
    }

    pub fn resources(mut self, resources: ExecuteResources) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }
}

impl Parameteriser {
    /// Returns a copy of `nb` whose parameters cell holds freshly generated
    /// definitions for `params`. The input notebook is never modified.
    ///
    /// With `opts.execute` set, the copy is handed to the executor once and
    /// the executed notebook is returned instead.
    pub fn replace(&self, nb: &Notebook, params: &[Parameter], opts: &ReplaceOptions) -> Result<Notebook> {
        let mut copy = nb.clone();
        let driver = self.registry.resolve(&copy, opts.lang.as_deref())?;

        let idx = parameters_cell_index(&copy, &opts.tag).ok_or_else(|| {
            ParameteriseError::NoParametersCell {
                tag: opts.tag.clone(),
            }
        })?;
        copy.cells[idx].source = driver.build_definitions(params, opts.comments);
        debug!(cell = idx, count = params.len(), "Rewrote parameters cell");

        if !opts.execute {
            return Ok(copy);
        }

        let resources = opts.resources.clone().unwrap_or_default();
        let (executed, _resources) = self.executor.execute(copy, resources)?;
        Ok(executed)
    }
}

/// Rewrites the parameters cell with the default drivers and executor.
pub fn replace_definitions(nb: &Notebook, params: &[Parameter], opts: &ReplaceOptions) -> Result<Notebook> {
    Parameteriser::default().replace(nb, params, opts)
}
