//! Parameter records extracted from a notebook's parameters cell
//!
//! A [`Parameter`] is a plain value object: a name, the kind of literal it was
//! assigned, the literal itself, metadata taken from the notebook and an
//! optional trailing comment. Records are never mutated once produced;
//! [`Parameter::with_value`] returns a fresh copy instead.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Semantic kind of a parameter value, named after the Python builtin types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ParamType {
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "str")]
    Str,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "NoneType")]
    None,
    #[serde(rename = "list")]
    List,
    #[serde(rename = "tuple")]
    Tuple,
    #[serde(rename = "dict")]
    Dict,
}

impl ParamType {
    /// Type implied by a literal value
    pub fn of(value: &ParamValue) -> Self {
        match value {
            ParamValue::None => ParamType::None,
            ParamValue::Bool(_) => ParamType::Bool,
            ParamValue::Int(_) => ParamType::Int,
            ParamValue::Float(_) => ParamType::Float,
            ParamValue::Str(_) => ParamType::Str,
            ParamValue::List(_) => ParamType::List,
            ParamValue::Tuple(_) => ParamType::Tuple,
            ParamValue::Dict(_) => ParamType::Dict,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Str => "str",
            ParamType::Bool => "bool",
            ParamType::None => "NoneType",
            ParamType::List => "list",
            ParamType::Tuple => "tuple",
            ParamType::Dict => "dict",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal value as written in the parameters cell
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ParamValue>),
    Tuple(Vec<ParamValue>),
    /// Key/value pairs in source order
    Dict(Vec<(ParamValue, ParamValue)>),
}

impl ParamValue {
    pub fn param_type(&self) -> ParamType {
        ParamType::of(self)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(f) => Some(*f),
            ParamValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Converts to JSON. Tuples become arrays and dict keys are stringified.
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::None => Value::Null,
            ParamValue::Bool(b) => Value::Bool(*b),
            ParamValue::Int(i) => Value::Number((*i).into()),
            ParamValue::Float(f) => Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ParamValue::Str(s) => Value::String(s.clone()),
            ParamValue::List(items) | ParamValue::Tuple(items) => {
                Value::Array(items.iter().map(ParamValue::to_json).collect())
            }
            ParamValue::Dict(pairs) => Value::Object(
                pairs
                    .iter()
                    .map(|(k, v)| (k.json_key(), v.to_json()))
                    .collect(),
            ),
        }
    }

    fn json_key(&self) -> String {
        match self {
            ParamValue::Str(s) => s.clone(),
            other => other.to_json().to_string(),
        }
    }
}

/// Consistent with `PartialEq`: `0.0` and `-0.0` hash alike.
impl Hash for ParamValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ParamValue::None => {}
            ParamValue::Bool(b) => b.hash(state),
            ParamValue::Int(i) => i.hash(state),
            ParamValue::Float(f) => {
                let f = if *f == 0.0 { 0.0 } else { *f };
                f.to_bits().hash(state);
            }
            ParamValue::Str(s) => s.hash(state),
            ParamValue::List(items) | ParamValue::Tuple(items) => items.hash(state),
            ParamValue::Dict(pairs) => pairs.hash(state),
        }
    }
}

impl From<&Value> for ParamValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ParamValue::None,
            Value::Bool(b) => ParamValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Int(i),
                None => ParamValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ParamValue::Str(s.clone()),
            Value::Array(items) => ParamValue::List(items.iter().map(ParamValue::from).collect()),
            Value::Object(map) => ParamValue::Dict(
                map.iter()
                    .map(|(k, v)| (ParamValue::Str(k.clone()), ParamValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        ParamValue::from(&value)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        ParamValue::Int(i.into())
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<f64> for ParamValue {
    fn from(f: f64) -> Self {
        ParamValue::Float(f)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(items: Vec<ParamValue>) -> Self {
        ParamValue::List(items)
    }
}

impl Serialize for ParamValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParamValue::None => serializer.serialize_none(),
            ParamValue::Bool(b) => serializer.serialize_bool(*b),
            ParamValue::Int(i) => serializer.serialize_i64(*i),
            ParamValue::Float(f) => serializer.serialize_f64(*f),
            ParamValue::Str(s) => serializer.serialize_str(s),
            ParamValue::List(items) | ParamValue::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ParamValue::Dict(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    map.serialize_entry(&k.json_key(), v)?;
                }
                map.end()
            }
        }
    }
}

/// Renders the value as compact JSON
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// A single parameter definition found in the parameters cell
#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParamType,
    /// Absent when the record was built without a known value
    pub value: Option<ParamValue>,
    /// Per-parameter metadata from the notebook, never from source text
    pub metadata: Map<String, Value>,
    pub comment: Option<String>,
}

impl Parameter {
    /// Creates a record whose type is inferred from `value`
    pub fn new(name: impl Into<String>, value: ParamValue) -> Self {
        Self {
            name: name.into(),
            ty: ParamType::of(&value),
            value: Some(value),
            metadata: Map::new(),
            comment: None,
        }
    }

    /// Creates a record with an explicit type and possibly no value
    pub fn typed(name: impl Into<String>, ty: ParamType, value: Option<ParamValue>) -> Self {
        Self {
            name: name.into(),
            ty,
            value,
            metadata: Map::new(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns a copy carrying `value`; name, type, metadata and comment are kept.
    pub fn with_value(&self, value: impl Into<ParamValue>) -> Self {
        Self {
            name: self.name.clone(),
            ty: self.ty,
            value: Some(value.into()),
            metadata: self.metadata.clone(),
            comment: self.comment.clone(),
        }
    }
}

/// Identity is name, type and value. Metadata and comment are ignored.
impl PartialEq for Parameter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ty == other.ty && self.value == other.value
    }
}

impl Hash for Parameter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.ty.hash(state);
        self.value.hash(state);
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter({:?}, {}", self.name, self.ty)?;
        if let Some(value) = &self.value {
            write!(f, ", value={}", value)?;
        }
        if !self.metadata.is_empty() {
            write!(f, ", metadata={}", Value::Object(self.metadata.clone()))?;
        }
        if let Some(comment) = self.comment.as_deref().filter(|c| !c.is_empty()) {
            write!(f, ", comment={:?}", comment)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::hash_map::DefaultHasher;

    #[test]
    fn test_type_inferred_from_value() {
        assert_eq!(Parameter::new("n", 50.into()).ty, ParamType::Int);
        assert_eq!(Parameter::new("x", 0.5.into()).ty, ParamType::Float);
        assert_eq!(Parameter::new("s", "abc".into()).ty, ParamType::Str);
        assert_eq!(Parameter::new("b", true.into()).ty, ParamType::Bool);
        assert_eq!(Parameter::new("z", ParamValue::None).ty, ParamType::None);
        assert_eq!(
            Parameter::new("t", ParamValue::Tuple(vec![1.into()])).ty,
            ParamType::Tuple
        );
    }

    #[test]
    fn test_equality_ignores_metadata_and_comment() {
        let mut meta = Map::new();
        meta.insert("display_name".to_string(), json!("Count"));

        let a = Parameter::new("n", 50.into()).with_comment("count");
        let b = Parameter::new("n", 50.into()).with_metadata(meta);
        assert_eq!(a, b);

        let c = Parameter::new("n", 51.into());
        assert_ne!(a, c);

        let d = Parameter::typed("n", ParamType::Float, Some(50.into()));
        assert_ne!(a, d);
    }

    #[test]
    fn test_with_value_leaves_original_untouched() {
        let original = Parameter::new("n", 50.into()).with_comment("count");
        let snapshot = original.clone();

        let updated = original.with_value(75);

        assert_eq!(original, snapshot);
        assert_eq!(original.value, Some(ParamValue::Int(50)));
        assert_eq!(updated.value, Some(ParamValue::Int(75)));
        assert_eq!(updated.name, "n");
        assert_eq!(updated.ty, ParamType::Int);
        assert_eq!(updated.comment.as_deref(), Some("count"));
    }

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_hash_follows_equality() {
        let mut meta = Map::new();
        meta.insert("display_name".to_string(), json!("Ratio"));

        let a = Parameter::new("ratio", 0.0.into()).with_comment("fraction");
        let b = Parameter::new("ratio", (-0.0).into()).with_metadata(meta);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));

        let nested = |x: f64| {
            Parameter::new(
                "opts",
                ParamValue::Dict(vec![("k".into(), ParamValue::Tuple(vec![x.into()]))]),
            )
        };
        assert_eq!(hash_of(&nested(1.5)), hash_of(&nested(1.5)));
        assert_ne!(hash_of(&nested(1.5)), hash_of(&nested(2.5)));
        assert_ne!(
            hash_of(&ParamValue::List(vec![1.into()])),
            hash_of(&ParamValue::Tuple(vec![1.into()]))
        );
    }

    #[test]
    fn test_hash_stable_across_with_value() {
        let original = Parameter::new("n", 50.into());
        let before = hash_of(&original);

        let updated = original.with_value(75);

        assert_eq!(hash_of(&original), before);
        assert_ne!(hash_of(&updated), before);
    }

    #[test]
    fn test_with_value_keeps_declared_type() {
        let p = Parameter::new("ratio", 0.5.into());
        let updated = p.with_value(2);
        assert_eq!(updated.ty, ParamType::Float);
        assert_eq!(updated.value, Some(ParamValue::Int(2)));
    }

    #[test]
    fn test_display() {
        let p = Parameter::new("n", 50.into()).with_comment("count");
        assert_eq!(p.to_string(), r#"Parameter("n", int, value=50, comment="count")"#);

        let bare = Parameter::typed("x", ParamType::Str, None);
        assert_eq!(bare.to_string(), r#"Parameter("x", str)"#);
    }

    #[test]
    fn test_json_conversion() {
        let value = ParamValue::Dict(vec![
            (ParamValue::Str("a".into()), ParamValue::List(vec![1.into(), 2.5.into()])),
            (ParamValue::Int(3), ParamValue::Tuple(vec![true.into(), ParamValue::None])),
        ]);

        assert_eq!(
            value.to_json(),
            json!({"a": [1, 2.5], "3": [true, null]})
        );
    }

    #[test]
    fn test_from_json() {
        assert_eq!(ParamValue::from(json!(null)), ParamValue::None);
        assert_eq!(ParamValue::from(json!(7)), ParamValue::Int(7));
        assert_eq!(ParamValue::from(json!(7.5)), ParamValue::Float(7.5));
        assert_eq!(ParamValue::from(json!("x")), ParamValue::Str("x".into()));
        assert_eq!(
            ParamValue::from(json!([1, "a"])),
            ParamValue::List(vec![1.into(), "a".into()])
        );
        assert_eq!(
            ParamValue::from(json!({"k": false})),
            ParamValue::Dict(vec![("k".into(), false.into())])
        );
    }

    #[test]
    fn test_serialize_parameter() {
        let p = Parameter::new("n", 50.into()).with_comment("count");
        let value = serde_json::to_value(&p).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "n",
                "type": "int",
                "value": 50,
                "metadata": {},
                "comment": "count"
            })
        );
    }
}
