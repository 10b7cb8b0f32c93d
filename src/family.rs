use crate::config::PartnerStyle;
use crate::diagram::{DiagramEdge, DiagramNode, EdgeData, EdgeKind, family_node_id};
use crate::generation::GenerationMap;
use crate::model::{Person, RelationType, Relationship};
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

pub const DEFAULT_PARTNER_STYLE: &str = "matrimonio";
pub const CHILD_STYLE: &str = "parentChild";

#[derive(Debug, Clone)]
struct Family {
    id: String,
    partners: [String; 2],
}

impl Family {
    fn has(&self, id: &str) -> bool {
        self.partners.iter().any(|p| p == id)
    }

    fn other(&self, id: &str) -> Option<&str> {
        if self.partners[0] == id {
            Some(&self.partners[1])
        } else if self.partners[1] == id {
            Some(&self.partners[0])
        } else {
            None
        }
    }
}

/// Families of one run, in creation order.
#[derive(Debug, Default)]
struct FamilyRegistry {
    families: Vec<Family>,
    ids: HashSet<String>,
}

impl FamilyRegistry {
    fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    fn insert(&mut self, family: Family) {
        self.ids.insert(family.id.clone());
        self.families.push(family);
    }

    /// The family a child of `parent` hangs from. A family whose other partner
    /// is also a recorded parent of the child wins over earlier families.
    fn family_for(&self, parent: &str, co_parents: Option<&HashSet<&str>>) -> Option<&Family> {
        let mut first = None;
        for family in self.families.iter().filter(|f| f.has(parent)) {
            let shared = family
                .other(parent)
                .zip(co_parents)
                .is_some_and(|(other, parents)| parents.contains(other));
            if shared {
                return Some(family);
            }
            first.get_or_insert(family);
        }
        first
    }
}

fn partner_style(rel: &Relationship, style: PartnerStyle) -> String {
    let preferred = match style {
        PartnerStyle::Legal => rel.legal_status().or_else(|| rel.emotional_bond()),
        PartnerStyle::Emotional => rel.emotional_bond().or_else(|| rel.legal_status()),
    };
    preferred.unwrap_or(DEFAULT_PARTNER_STYLE).to_string()
}

fn partner_data(rel: &Relationship, style: PartnerStyle) -> EdgeData {
    EdgeData {
        rel_type: partner_style(rel, style),
        notes: rel.notes.clone().unwrap_or_default(),
        start_date: rel.start_date.clone().unwrap_or_default(),
        end_date: rel.end_date.clone().unwrap_or_default(),
        original_type: Some(RelationType::Conyugal.as_str().to_string()),
        emotional_bond: rel.emotional_bond.clone(),
        legal_status: rel.legal_status.clone(),
    }
}

fn child_data(rel: &Relationship) -> EdgeData {
    EdgeData {
        rel_type: CHILD_STYLE.to_string(),
        notes: rel.notes.clone().unwrap_or_default(),
        original_type: Some(RelationType::ParentChild.as_str().to_string()),
        ..Default::default()
    }
}

/// Builds person nodes, family nodes and the structural (partner + child)
/// edges. Relationships of any other type are ignored here.
pub fn synthesize(
    people: &[Person],
    relationships: &[Relationship],
    generations: &GenerationMap,
    style: PartnerStyle,
) -> (Vec<DiagramNode>, Vec<DiagramEdge>) {
    let mut nodes = Vec::with_capacity(people.len());
    let mut known: HashSet<&str> = HashSet::with_capacity(people.len());
    for person in people {
        if !person.is_valid() || !known.insert(person.id.as_str()) {
            continue;
        }
        let generation = generations.get(&person.id).copied();
        nodes.push(DiagramNode::person(person, generation));
    }

    let mut registry = FamilyRegistry::default();
    let mut edges = Vec::new();

    // Couples first, so lineage listed before its couple still finds the family.
    for rel in relationships {
        if rel.kind != RelationType::Conyugal {
            continue;
        }
        if !rel.is_valid() {
            warn!(id = rel.id.as_str(); "Skipping couple with missing id, source or target");
            continue;
        }
        if rel.source == rel.target {
            warn!(id = rel.id.as_str(); "Skipping couple of a person with themselves");
            continue;
        }
        let family_id = family_node_id(&rel.source, &rel.target);
        if registry.contains(&family_id) {
            continue;
        }
        let rank_a = generations.get(&rel.source).copied();
        let rank_b = generations.get(&rel.target).copied();
        let (Some(rank_a), Some(rank_b)) = (rank_a, rank_b) else {
            warn!(id = rel.id.as_str(); "Skipping couple without a generation for both partners");
            continue;
        };
        if rank_a != rank_b {
            debug!(
                family = family_id.as_str(),
                rank_a,
                rank_b;
                "Partners sit on different generations"
            );
        }

        let mut partners = [rel.source.clone(), rel.target.clone()];
        partners.sort();
        nodes.push(DiagramNode::family(family_id.clone(), rank_a.min(rank_b)));

        let data = partner_data(rel, style);
        for partner in &partners {
            edges.push(DiagramEdge {
                id: format!("partner-{partner}-{family_id}"),
                source: partner.clone(),
                target: family_id.clone(),
                kind: EdgeKind::Partner,
                data: data.clone(),
            });
        }
        registry.insert(Family {
            id: family_id,
            partners,
        });
    }

    let lineage: Vec<&Relationship> = relationships
        .iter()
        .filter(|r| r.kind == RelationType::ParentChild)
        .collect();

    let mut parents_of: HashMap<&str, HashSet<&str>> = HashMap::new();
    for rel in &lineage {
        if rel.is_valid() {
            parents_of
                .entry(rel.source.as_str())
                .or_default()
                .insert(rel.target.as_str());
        }
    }

    let mut linked: HashSet<(String, String)> = HashSet::new();
    for rel in lineage {
        if !rel.is_valid() {
            warn!(id = rel.id.as_str(); "Skipping lineage link with missing id, source or target");
            continue;
        }
        let child = rel.source.as_str();
        let parent = rel.target.as_str();
        if child == parent {
            warn!(id = rel.id.as_str(); "Skipping lineage link of a person to themselves");
            continue;
        }
        if !known.contains(child) || !known.contains(parent) {
            warn!(id = rel.id.as_str(); "Skipping lineage link to unknown person");
            continue;
        }

        let (source, edge_id) = match registry.family_for(parent, parents_of.get(child)) {
            Some(family) => (family.id.clone(), format!("child-{}-{child}", family.id)),
            None => (parent.to_string(), format!("direct-{parent}-{child}")),
        };
        if !linked.insert((source.clone(), child.to_string())) {
            continue;
        }
        edges.push(DiagramEdge {
            id: edge_id,
            source,
            target: child.to_string(),
            kind: EdgeKind::Child,
            data: child_data(rel),
        });
    }

    (nodes, edges)
}
