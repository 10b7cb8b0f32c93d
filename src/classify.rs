use crate::diagram::{DiagramEdge, EdgeData, EdgeKind};
use crate::model::{RelationType, Relationship};
use log::{debug, warn};
use std::collections::HashSet;

/// Style tags the edge renderer draws with a dedicated stroke.
pub const KNOWN_STYLES: [&str; 10] = [
    "matrimonio",
    "divorcio",
    "cohabitacion",
    "compromiso",
    "separacion",
    "conflicto",
    "violencia",
    "cercana",
    "distante",
    "rota",
];

pub const DEFAULT_STYLE: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeClass {
    /// Couples and lineage, turned into partner/child edges by the family pass.
    Consumed,
    /// Sibling and twin links; legend only, never part of the edge set.
    Informational,
    Relationship { rel_type: String },
}

pub fn classify(rel: &Relationship) -> EdgeClass {
    match &rel.kind {
        RelationType::Conyugal | RelationType::ParentChild => EdgeClass::Consumed,
        kind if kind.is_sibling() => EdgeClass::Informational,
        kind => {
            let rel_type = rel
                .emotional_bond()
                .or_else(|| rel.legal_status())
                .or_else(|| Some(kind.as_str()).filter(|raw| !raw.is_empty()))
                .unwrap_or(DEFAULT_STYLE)
                .to_string();
            EdgeClass::Relationship { rel_type }
        }
    }
}

pub fn is_known_style(tag: &str) -> bool {
    tag == DEFAULT_STYLE || KNOWN_STYLES.contains(&tag)
}

/// Edge for a relationship that survives classification, `None` otherwise.
pub fn relationship_edge(rel: &Relationship) -> Option<DiagramEdge> {
    let EdgeClass::Relationship { rel_type } = classify(rel) else {
        return None;
    };
    if !is_known_style(&rel_type) {
        debug!(
            id = rel.id.as_str(),
            style = rel_type.as_str();
            "Relationship style has no dedicated stroke"
        );
    }
    let token = rel.kind.as_str();
    let original_type = (!token.is_empty()).then(|| token.to_string());
    Some(DiagramEdge {
        id: rel.id.clone(),
        source: rel.source.clone(),
        target: rel.target.clone(),
        kind: EdgeKind::Relationship,
        data: EdgeData {
            rel_type,
            notes: rel.notes.clone().unwrap_or_default(),
            start_date: rel.start_date.clone().unwrap_or_default(),
            end_date: rel.end_date.clone().unwrap_or_default(),
            original_type,
            emotional_bond: rel.emotional_bond.clone(),
            legal_status: rel.legal_status.clone(),
        },
    })
}

/// Relationship edges between known people, in input order.
pub fn relationship_edges(
    relationships: &[Relationship],
    known: &HashSet<&str>,
) -> Vec<DiagramEdge> {
    let mut edges = Vec::new();
    for rel in relationships {
        if !rel.is_valid() {
            continue;
        }
        let Some(edge) = relationship_edge(rel) else {
            continue;
        };
        if !known.contains(edge.source.as_str()) || !known.contains(edge.target.as_str()) {
            warn!(id = rel.id.as_str(); "Skipping relationship to unknown person");
            continue;
        }
        edges.push(edge);
    }
    edges
}
