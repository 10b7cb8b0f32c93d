use std::io::Read;
use std::path::Path;

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::diagram::{Diagram, DiagramEdge, DiagramNode};
use crate::error::InputError;
use crate::model::{GenogramData, Person, Relationship};

#[derive(Debug, Clone, PartialEq)]
pub enum GenogramInput {
    Structured(GenogramData),
    Snapshot(Diagram),
}

impl GenogramInput {
    /// Detects the document shape. Structured keys win when both are present.
    pub fn from_value(value: Value) -> Result<Self, InputError> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(InputError::UnrecognizedShape(format!(
                    "expected an object, found {}",
                    value_kind(&other)
                )));
            }
        };

        if map.contains_key("people") || map.contains_key("relationships") {
            let people = entries::<Person>(map.remove("people"), "people", Person::is_valid);
            let relationships = entries::<Relationship>(
                map.remove("relationships"),
                "relationships",
                Relationship::is_valid,
            );
            return Ok(Self::Structured(GenogramData::new(people, relationships)));
        }

        if map.contains_key("nodes") || map.contains_key("edges") {
            let nodes = entries(map.remove("nodes"), "nodes", node_has_id);
            let edges = entries(map.remove("edges"), "edges", edge_has_endpoints);
            return Ok(Self::Snapshot(Diagram { nodes, edges }));
        }

        Err(InputError::UnrecognizedShape(
            "expected `people`/`relationships` or `nodes`/`edges`".to_string(),
        ))
    }
}

/// Parses JSON, retrying as JSON5 so hand-written files with comments or
/// trailing commas still load. The JSON error is reported if both fail.
pub fn parse_str(text: &str) -> Result<GenogramInput, InputError> {
    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(err) => match json5::from_str::<Value>(text) {
            Ok(value) => value,
            Err(_) => return Err(InputError::Json(err)),
        },
    };
    GenogramInput::from_value(value)
}

pub fn load_input(path: &Path) -> Result<GenogramInput, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&text)
}

/// `None` reads stdin, as does a path of `-`.
pub fn read_input(path: Option<&Path>) -> Result<GenogramInput, InputError> {
    match path {
        Some(path) if path != Path::new("-") => load_input(path),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| InputError::Io {
                    path: "-".into(),
                    source,
                })?;
            parse_str(&text)
        }
    }
}

fn entries<T: DeserializeOwned>(
    value: Option<Value>,
    field: &str,
    accept: impl Fn(&T) -> bool,
) -> Vec<T> {
    let items = match value {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(other) => {
            warn!(field, found = value_kind(&other); "Expected an array, treating as empty");
            return Vec::new();
        }
    };

    let mut parsed = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(entry) if accept(&entry) => parsed.push(entry),
            Ok(_) => warn!(field, index; "Skipping entry without id or endpoints"),
            Err(err) => warn!(field, index, error:% = err; "Skipping malformed entry"),
        }
    }
    parsed
}

fn node_has_id(node: &DiagramNode) -> bool {
    !node.id.is_empty()
}

fn edge_has_endpoints(edge: &DiagramEdge) -> bool {
    !edge.id.is_empty() && !edge.source.is_empty() && !edge.target.is_empty()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
