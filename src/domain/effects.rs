//! JSON effect changes - set or append structured values inside an actor's system document

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a JSON effect change is applied
///
/// Accepted on the wire either by name or by its numeric mode code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "ModeRepr")]
pub enum JsonEffectMode {
    /// Replace the value at the key
    SetJson,
    /// Push the value onto the array at the key
    AppendJson,
}

impl JsonEffectMode {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            11 => Some(Self::SetJson),
            12 => Some(Self::AppendJson),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ModeRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<ModeRepr> for JsonEffectMode {
    type Error = String;

    fn try_from(repr: ModeRepr) -> Result<Self, Self::Error> {
        match repr {
            ModeRepr::Code(code) => {
                Self::from_code(code).ok_or_else(|| format!("unknown effect mode code {code}"))
            }
            ModeRepr::Name(name) => match name.as_str() {
                "set_json" => Ok(Self::SetJson),
                "append_json" => Ok(Self::AppendJson),
                _ => Err(format!("unknown effect mode {name}")),
            },
        }
    }
}

/// One change carried by an effect: a dotted key, a mode and a raw JSON value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectChange {
    pub key: String,
    pub mode: JsonEffectMode,
    pub value: String,
}

impl EffectChange {
    /// Apply an already parsed value for this change to a document
    pub fn apply_value(&self, document: &mut Value, value: Value) -> Result<(), EffectError> {
        match self.mode {
            JsonEffectMode::SetJson => set_property(document, &self.key, value),
            JsonEffectMode::AppendJson => append_property(document, &self.key, value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    #[error("JSON effect parse failed, {0}")]
    Parse(String),
    #[error("Effect key is empty")]
    EmptyKey,
    #[error("Cannot descend into non-object value at {0}")]
    NotAnObject(String),
    #[error("Value at {0} is not an array")]
    NotAnArray(String),
}

/// Set `value` at a dotted `path`, creating intermediate objects as needed
pub fn set_property(document: &mut Value, path: &str, value: Value) -> Result<(), EffectError> {
    let (parent, last) = walk_to_parent(document, path)?;
    parent.insert(last.to_string(), value);
    Ok(())
}

/// Push `value` onto the array at a dotted `path`; a missing key becomes a new array
pub fn append_property(document: &mut Value, path: &str, value: Value) -> Result<(), EffectError> {
    let (parent, last) = walk_to_parent(document, path)?;
    match parent
        .entry(last.to_string())
        .or_insert_with(|| Value::Array(Vec::new()))
    {
        Value::Array(items) => {
            items.push(value);
            Ok(())
        }
        _ => Err(EffectError::NotAnArray(path.to_string())),
    }
}

fn walk_to_parent<'a, 'p>(
    document: &'a mut Value,
    path: &'p str,
) -> Result<(&'a mut Map<String, Value>, &'p str), EffectError> {
    let mut segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
    let last = segments.pop().ok_or(EffectError::EmptyKey)?;

    let mut current = document;
    for segment in segments {
        let object = current
            .as_object_mut()
            .ok_or_else(|| EffectError::NotAnObject(segment.to_string()))?;
        current = object
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    let parent = current
        .as_object_mut()
        .ok_or_else(|| EffectError::NotAnObject(path.to_string()))?;
    Ok((parent, last))
}
