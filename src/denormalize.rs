use std::collections::HashMap;

use log::warn;

use crate::diagram::{Diagram, DiagramEdge, DiagramNode, EdgeKind};
use crate::model::{GenogramData, Person, RelationType, Relationship};

pub fn denormalize(diagram: &Diagram) -> GenogramData {
    let families: HashMap<&str, Vec<&str>> = diagram
        .family_nodes()
        .map(|family| {
            let partners = diagram
                .edges_of_kind(EdgeKind::Partner)
                .filter(|edge| edge.target == family.id)
                .map(|edge| edge.source.as_str())
                .collect();
            (family.id.as_str(), partners)
        })
        .collect();

    let people: Vec<Person> = diagram
        .nodes
        .iter()
        .filter(|node| !node.is_family())
        .map(person_from_node)
        .collect();

    let mut relationships = Vec::new();
    for family in diagram.family_nodes() {
        let partner_edges: Vec<&DiagramEdge> = diagram
            .edges_of_kind(EdgeKind::Partner)
            .filter(|edge| edge.target == family.id)
            .collect();
        match partner_edges.as_slice() {
            [first, second] => relationships.push(couple_from_edges(&family.id, first, second)),
            other => warn!(
                id = family.id.as_str(), partners = other.len();
                "Family node without exactly two partners, dropping the couple"
            ),
        }
    }

    for edge in diagram.edges_of_kind(EdgeKind::Child) {
        match families.get(edge.source.as_str()) {
            Some(partners) => {
                for partner in partners {
                    let id = format!("{}-{partner}", edge.id);
                    let mut rel = Relationship::parent_child(id, &edge.target, partner);
                    rel.notes = non_empty(&edge.data.notes);
                    relationships.push(rel);
                }
            }
            None => {
                let id = edge.id.clone();
                let mut rel = Relationship::parent_child(id, &edge.target, &edge.source);
                rel.notes = non_empty(&edge.data.notes);
                relationships.push(rel);
            }
        }
    }

    for edge in diagram.edges_of_kind(EdgeKind::Relationship) {
        let token = edge
            .data
            .original_type
            .as_deref()
            .unwrap_or(edge.data.rel_type.as_str());
        relationships.push(Relationship {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            kind: RelationType::from_token(token),
            emotional_bond: edge.data.emotional_bond.clone(),
            legal_status: edge.data.legal_status.clone(),
            start_date: non_empty(&edge.data.start_date),
            end_date: non_empty(&edge.data.end_date),
            notes: non_empty(&edge.data.notes),
        });
    }

    GenogramData::new(people, relationships)
}

fn person_from_node(node: &DiagramNode) -> Person {
    let data = &node.data;
    let named = !data.label.is_empty() && data.label != node.id;
    Person {
        id: node.id.clone(),
        name: named.then(|| data.label.clone()),
        gender: data.gender,
        generation: data.generation,
        age: data.age,
        notes: non_empty(&data.notes),
        attributes: data.attributes.clone(),
    }
}

fn couple_from_edges(family_id: &str, first: &DiagramEdge, second: &DiagramEdge) -> Relationship {
    let data = &first.data;
    let mut rel = Relationship::couple(family_id.to_string(), &first.source, &second.source);
    rel.legal_status = data
        .legal_status
        .clone()
        .or_else(|| non_empty(&data.rel_type));
    rel.emotional_bond = data.emotional_bond.clone();
    rel.start_date = non_empty(&data.start_date);
    rel.end_date = non_empty(&data.end_date);
    rel.notes = non_empty(&data.notes);
    rel
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.to_string()).filter(|v| !v.is_empty())
}
