use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonAttributes {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub is_patient: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub is_deceased: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub is_abortion: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub abortion_type: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub is_adoption: Option<bool>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub is_pregnancy: Option<bool>,
    /// Attributes the pipeline does not interpret, kept for the renderer.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PersonAttributes {
    pub fn patient(&self) -> bool {
        self.is_patient == Some(true)
    }

    pub fn deceased(&self) -> bool {
        self.is_deceased == Some(true)
    }

    pub fn abortion(&self) -> bool {
        self.is_abortion == Some(true)
    }

    pub fn adoption(&self) -> bool {
        self.is_adoption == Some(true)
    }

    pub fn pregnancy(&self) -> bool {
        self.is_pregnancy == Some(true)
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub gender: Option<Gender>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_generation"
    )]
    pub generation: Option<i32>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub age: Option<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub notes: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "PersonAttributes::is_empty",
        deserialize_with = "lenient_or_default"
    )]
    pub attributes: PersonAttributes,
}

impl Person {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn with_generation(mut self, generation: i32) -> Self {
        self.generation = Some(generation);
        self
    }

    pub fn with_attributes(mut self, attributes: PersonAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Display label: the name when present, otherwise the id.
    pub fn label(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationType {
    Conyugal,
    ParentChild,
    Hermanos,
    Mellizos,
    Other(String),
}

impl RelationType {
    pub fn from_token(token: &str) -> Self {
        match token {
            "conyugal" => Self::Conyugal,
            "parentChild" => Self::ParentChild,
            "hermanos" => Self::Hermanos,
            "mellizos" => Self::Mellizos,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Conyugal => "conyugal",
            Self::ParentChild => "parentChild",
            Self::Hermanos => "hermanos",
            Self::Mellizos => "mellizos",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_sibling(&self) -> bool {
        matches!(self, Self::Hermanos | Self::Mellizos)
    }
}

impl Default for RelationType {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RelationType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RelationType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|token| Self::from_token(&token)).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default)]
    pub kind: RelationType,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub emotional_bond: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub legal_status: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub start_date: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub end_date: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient"
    )]
    pub notes: Option<String>,
}

impl Relationship {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        kind: RelationType,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            kind,
            ..Default::default()
        }
    }

    /// `source` is the child, `target` the parent.
    pub fn parent_child(id: impl Into<String>, child: &str, parent: &str) -> Self {
        Self::new(id, child, parent, RelationType::ParentChild)
    }

    pub fn couple(id: impl Into<String>, a: &str, b: &str) -> Self {
        Self::new(id, a, b, RelationType::Conyugal)
    }

    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty()
            && !self.source.trim().is_empty()
            && !self.target.trim().is_empty()
    }

    pub fn emotional_bond(&self) -> Option<&str> {
        non_empty(&self.emotional_bond)
    }

    pub fn legal_status(&self) -> Option<&str> {
        non_empty(&self.legal_status)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenogramData {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl GenogramData {
    pub fn new(people: Vec<Person>, relationships: Vec<Relationship>) -> Self {
        Self {
            people,
            relationships,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Accepts any JSON value and keeps it only when it has the expected shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

fn lenient_generation<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let Some(number) = value.as_f64() else {
        return Ok(None);
    };
    if !number.is_finite() || number.abs() > f64::from(i32::MAX) {
        return Ok(None);
    }
    Ok(Some(number.round() as i32))
}
