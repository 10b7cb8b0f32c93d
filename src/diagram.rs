use crate::model::{Gender, Person, PersonAttributes};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

pub const FAMILY_NODE_TYPE: &str = "family";

/// Older editors saved family nodes under this name.
const LEGACY_FAMILY_NODE_TYPE: &str = "familyNode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbortionKind {
    Spontaneous,
    Induced,
    FetalDeath { female: bool },
}

/// Visual kind of a person node, picked by ordered attribute rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonNodeKind {
    Abortion(AbortionKind),
    Patient,
    Deceased(Gender),
    Adoption,
    Pregnancy,
    Gendered(Gender),
    Default,
}

impl PersonNodeKind {
    /// Rules run top to bottom: abortion, patient, deceased, adoption,
    /// pregnancy, gender, then the default kind.
    pub fn for_person(person: &Person) -> Self {
        let attrs = &person.attributes;
        if attrs.abortion() {
            return Self::Abortion(abortion_kind(attrs, person.gender));
        }
        if attrs.patient() {
            return Self::Patient;
        }
        if attrs.deceased() {
            // Unknown gender draws as the female deceased symbol.
            let gender = match person.gender {
                Some(Gender::Male) => Gender::Male,
                _ => Gender::Female,
            };
            return Self::Deceased(gender);
        }
        if attrs.adoption() {
            return Self::Adoption;
        }
        if attrs.pregnancy() {
            return Self::Pregnancy;
        }
        match person.gender {
            Some(gender) => Self::Gendered(gender),
            None => Self::Default,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Abortion(AbortionKind::Spontaneous) => "abortoEspontaneo",
            Self::Abortion(AbortionKind::Induced) => "abortoProvocado",
            Self::Abortion(AbortionKind::FetalDeath { female: true }) => "fetoMuertoMujer",
            Self::Abortion(AbortionKind::FetalDeath { female: false }) => "fetoMuerto",
            Self::Patient => "paciente",
            Self::Deceased(Gender::Male) => "fallecidoM",
            Self::Deceased(Gender::Female) => "fallecidoF",
            Self::Adoption => "adopcion",
            Self::Pregnancy => "embarazo",
            Self::Gendered(Gender::Male) => "masculino",
            Self::Gendered(Gender::Female) => "femenino",
            Self::Default => "default",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let kind = match token {
            "abortoEspontaneo" => Self::Abortion(AbortionKind::Spontaneous),
            "abortoProvocado" => Self::Abortion(AbortionKind::Induced),
            "fetoMuertoMujer" => Self::Abortion(AbortionKind::FetalDeath { female: true }),
            "fetoMuerto" => Self::Abortion(AbortionKind::FetalDeath { female: false }),
            "paciente" => Self::Patient,
            "fallecidoM" => Self::Deceased(Gender::Male),
            "fallecidoF" => Self::Deceased(Gender::Female),
            "adopcion" => Self::Adoption,
            "embarazo" => Self::Pregnancy,
            "masculino" => Self::Gendered(Gender::Male),
            "femenino" => Self::Gendered(Gender::Female),
            "default" => Self::Default,
            _ => return None,
        };
        Some(kind)
    }
}

fn abortion_kind(attrs: &PersonAttributes, gender: Option<Gender>) -> AbortionKind {
    match attrs.abortion_type.as_deref() {
        Some("induced") => AbortionKind::Induced,
        Some("fetalDeath") => AbortionKind::FetalDeath {
            female: gender == Some(Gender::Female),
        },
        _ => AbortionKind::Spontaneous,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Person(PersonNodeKind),
    Family,
    /// Node type produced by some other editor, restored from a snapshot as-is.
    Custom(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Person(kind) => kind.as_str(),
            Self::Family => FAMILY_NODE_TYPE,
            Self::Custom(raw) => raw,
        }
    }

    pub fn from_token(token: &str) -> Self {
        if token == FAMILY_NODE_TYPE || token == LEGACY_FAMILY_NODE_TYPE {
            return Self::Family;
        }
        match PersonNodeKind::from_token(token) {
            Some(kind) => Self::Person(kind),
            None => Self::Custom(token.to_string()),
        }
    }

    pub fn is_family(&self) -> bool {
        matches!(self, Self::Family)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_token(&raw))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "PersonAttributes::is_empty")]
    pub attributes: PersonAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Top-left corner once laid out.
    #[serde(default)]
    pub position: Point,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub data: NodeData,
}

impl DiagramNode {
    pub fn person(person: &Person, generation: Option<i32>) -> Self {
        Self {
            id: person.id.clone(),
            kind: NodeKind::Person(PersonNodeKind::for_person(person)),
            position: Point::default(),
            width: 0.0,
            height: 0.0,
            data: NodeData {
                label: person.label().to_string(),
                generation,
                age: person.age,
                notes: person.notes.clone().unwrap_or_default(),
                attributes: person.attributes.clone(),
                gender: person.gender,
            },
        }
    }

    pub fn family(id: String, generation: i32) -> Self {
        Self {
            id,
            kind: NodeKind::Family,
            position: Point::default(),
            width: 0.0,
            height: 0.0,
            data: NodeData {
                generation: Some(generation),
                ..Default::default()
            },
        }
    }

    pub fn generation(&self) -> Option<i32> {
        self.data.generation
    }

    pub fn is_family(&self) -> bool {
        self.kind.is_family()
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.position.x + self.width / 2.0,
            self.position.y + self.height / 2.0,
        )
    }
}

/// Family node key for a couple; ids are sorted so the key ignores order.
pub fn family_node_id(a: &str, b: &str) -> String {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    format!("fam-{first}-{second}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Partner,
    Child,
    Relationship,
}

impl EdgeKind {
    /// Partner and child edges constrain the layout; relationship edges do not.
    pub fn is_structural(self) -> bool {
        matches!(self, Self::Partner | Self::Child)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    #[serde(default)]
    pub rel_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub start_date: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_bond: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    #[serde(default)]
    pub data: EdgeData,
}

impl DiagramEdge {
    pub fn is_structural(&self) -> bool {
        self.kind.is_structural()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    #[serde(default)]
    pub nodes: Vec<DiagramNode>,
    #[serde(default)]
    pub edges: Vec<DiagramEdge>,
}

impl Diagram {
    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn family_nodes(&self) -> impl Iterator<Item = &DiagramNode> {
        self.nodes.iter().filter(|node| node.is_family())
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &DiagramEdge> {
        self.edges.iter().filter(move |edge| edge.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PersonAttributes;

    fn with_attrs(gender: Option<Gender>, attrs: PersonAttributes) -> Person {
        Person {
            gender,
            attributes: attrs,
            ..Person::new("p")
        }
    }

    #[test]
    fn abortion_outranks_patient_and_deceased() {
        let person = with_attrs(
            Some(Gender::Female),
            PersonAttributes {
                is_abortion: Some(true),
                abortion_type: Some("fetalDeath".into()),
                is_patient: Some(true),
                is_deceased: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(
            PersonNodeKind::for_person(&person),
            PersonNodeKind::Abortion(AbortionKind::FetalDeath { female: true })
        );
        assert_eq!(
            PersonNodeKind::for_person(&person).as_str(),
            "fetoMuertoMujer"
        );
    }

    #[test]
    fn unknown_abortion_type_defaults_to_spontaneous() {
        let person = with_attrs(
            None,
            PersonAttributes {
                is_abortion: Some(true),
                abortion_type: Some("other".into()),
                ..Default::default()
            },
        );
        assert_eq!(
            PersonNodeKind::for_person(&person).as_str(),
            "abortoEspontaneo"
        );
    }

    #[test]
    fn patient_outranks_deceased() {
        let person = with_attrs(
            Some(Gender::Male),
            PersonAttributes {
                is_patient: Some(true),
                is_deceased: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(PersonNodeKind::for_person(&person), PersonNodeKind::Patient);
    }

    #[test]
    fn deceased_without_gender_is_female_symbol() {
        let person = with_attrs(
            None,
            PersonAttributes {
                is_deceased: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(PersonNodeKind::for_person(&person).as_str(), "fallecidoF");
    }

    #[test]
    fn adoption_outranks_pregnancy_and_gender() {
        let person = with_attrs(
            Some(Gender::Male),
            PersonAttributes {
                is_adoption: Some(true),
                is_pregnancy: Some(true),
                ..Default::default()
            },
        );
        assert_eq!(
            PersonNodeKind::for_person(&person),
            PersonNodeKind::Adoption
        );
    }

    #[test]
    fn gender_then_default() {
        let male = Person::new("a").with_gender(Gender::Male);
        assert_eq!(PersonNodeKind::for_person(&male).as_str(), "masculino");
        let unknown = Person::new("b");
        assert_eq!(
            PersonNodeKind::for_person(&unknown),
            PersonNodeKind::Default
        );
    }

    #[test]
    fn node_kind_tokens_round_trip() {
        for token in ["family", "paciente", "fetoMuerto", "femenino", "annotation"] {
            assert_eq!(NodeKind::from_token(token).as_str(), token);
        }
        assert_eq!(
            NodeKind::from_token("annotation"),
            NodeKind::Custom("annotation".into())
        );
    }

    #[test]
    fn legacy_family_token_reads_as_family() {
        assert_eq!(NodeKind::from_token("familyNode"), NodeKind::Family);
        assert_eq!(NodeKind::Family.as_str(), "family");
    }

    #[test]
    fn family_id_is_order_independent() {
        assert_eq!(family_node_id("padre1", "madre1"), "fam-madre1-padre1");
        assert_eq!(family_node_id("madre1", "padre1"), "fam-madre1-padre1");
    }

    #[test]
    fn edge_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(EdgeKind::Partner).unwrap(),
            serde_json::json!("partner")
        );
        assert!(EdgeKind::Child.is_structural());
        assert!(!EdgeKind::Relationship.is_structural());
    }
}
