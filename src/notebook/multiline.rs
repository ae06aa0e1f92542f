//! nbformat "multiline string": either one string or a list of lines

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Multiline {
    One(String),
    Lines(Vec<String>),
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Multiline::deserialize(deserializer)? {
        Multiline::One(text) => text,
        Multiline::Lines(lines) => lines.concat(),
    })
}

pub fn serialize<S>(source: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let lines: Vec<&str> = source.split_inclusive('\n').collect();
    lines.serialize(serializer)
}
