use crate::parameter::{ParamValue, Parameter};
use std::collections::HashMap;
use tracing::debug;

/// Returns a copy of `params` with values replaced from `overrides`.
///
/// Parameters that are not overridden keep their value. Override names with
/// no matching parameter are ignored. The result always has the same length
/// and order as `params`.
///
/// ```
/// use nbparam::{parameter_values, Parameter};
///
/// let params = vec![Parameter::new("stock", "AAPL".into()), Parameter::new("days_back", 30.into())];
/// let updated = parameter_values(&params, [("stock", "GOOG".into()), ("days_back", 300.into())]);
///
/// assert_eq!(updated[0].value, Some("GOOG".into()));
/// assert_eq!(updated[1].value, Some(300.into()));
/// ```
pub fn parameter_values<I, K>(params: &[Parameter], overrides: I) -> Vec<Parameter>
where
    I: IntoIterator<Item = (K, ParamValue)>,
    K: Into<String>,
{
    let mut overrides: HashMap<String, ParamValue> = overrides
        .into_iter()
        .map(|(name, value)| (name.into(), value))
        .collect();

    let updated = params
        .iter()
        .map(|p| match overrides.get(&p.name) {
            Some(value) => p.with_value(value.clone()),
            None => p.clone(),
        })
        .collect();

    overrides.retain(|name, _| !params.iter().any(|p| &p.name == name));
    if !overrides.is_empty() {
        let mut unknown: Vec<&str> = overrides.keys().map(String::as_str).collect();
        unknown.sort_unstable();
        debug!(?unknown, "Ignoring overrides with no matching parameter");
    }

    updated
}
