mod dagre;
mod ranking;

pub use dagre::DagreEngine;
pub use ranking::RowEngine;

use crate::config::{EngineKind, LayoutConfig};
use crate::diagram::{DiagramEdge, DiagramNode, Point};
use log::{debug, warn};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Node as handed to a layered engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub width: f32,
    pub height: f32,
    /// Layer index; smaller ranks are drawn higher.
    pub rank: i32,
    /// Family placeholders float between the nodes that feed them.
    pub is_family: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutEdge {
    pub source: String,
    pub target: String,
}

/// Top-to-bottom layered placement. Implementations return the centre of
/// every node they place and must be deterministic.
pub trait LayeredEngine {
    fn place(&self, nodes: &[LayoutNode], edges: &[LayoutEdge]) -> BTreeMap<String, Point>;
}

pub fn engine_for(config: &LayoutConfig) -> Box<dyn LayeredEngine> {
    match config.engine {
        EngineKind::Dagre => Box::new(DagreEngine::new(config.clone())),
        EngineKind::Rows => Box::new(RowEngine::new(config.clone())),
    }
}

pub fn node_size(node: &DiagramNode, config: &LayoutConfig) -> (f32, f32) {
    if node.is_family() {
        (config.family_width, config.family_height)
    } else {
        (config.person_width, config.person_height)
    }
}

/// Sizes every node, runs the engine over the structural edges and stores
/// top-left positions. Nodes the engine leaves out keep their position.
pub fn layout(
    mut nodes: Vec<DiagramNode>,
    edges: &[DiagramEdge],
    config: &LayoutConfig,
    engine: &dyn LayeredEngine,
) -> Vec<DiagramNode> {
    let fallback_rank = nodes
        .iter()
        .filter_map(DiagramNode::generation)
        .min()
        .unwrap_or(0);

    for node in nodes.iter_mut() {
        let (width, height) = node_size(node, config);
        node.width = width;
        node.height = height;
    }

    let layout_nodes: Vec<LayoutNode> = nodes
        .iter()
        .map(|node| LayoutNode {
            id: node.id.clone(),
            width: node.width,
            height: node.height,
            rank: node.generation().unwrap_or(fallback_rank),
            is_family: node.is_family(),
        })
        .collect();
    let layout_edges: Vec<LayoutEdge> = edges
        .iter()
        .filter(|edge| edge.is_structural())
        .map(|edge| LayoutEdge {
            source: edge.source.clone(),
            target: edge.target.clone(),
        })
        .collect();
    debug!(
        "Laying out {} nodes with {} structural edges",
        layout_nodes.len(),
        layout_edges.len()
    );

    let centers = engine.place(&layout_nodes, &layout_edges);

    for node in nodes.iter_mut() {
        let Some(center) = centers.get(&node.id) else {
            warn!(id = node.id.as_str(); "Layout engine returned no position for node");
            continue;
        };
        node.position = Point::new(
            center.x - node.width / 2.0,
            center.y - node.height / 2.0,
        );
    }
    nodes
}

pub(crate) fn min_rank(nodes: &[LayoutNode]) -> i32 {
    nodes.iter().map(|node| node.rank).min().unwrap_or(0)
}

/// Vertical centre of a layer; the smallest rank is the top row.
pub(crate) fn rank_center_y(rank: i32, top_rank: i32, config: &LayoutConfig) -> f32 {
    let row = (i64::from(rank) - i64::from(top_rank)) as f32;
    config.margin_y + row * config.row_pitch() + config.person_height / 2.0
}

/// Keeps `node_spacing` between person boxes on a rank, then centres family
/// nodes on their sources.
pub(crate) fn separate_rows(
    nodes: &[LayoutNode],
    edges: &[LayoutEdge],
    centers: &mut BTreeMap<String, Point>,
    config: &LayoutConfig,
) {
    let mut rows: BTreeMap<i32, Vec<(usize, f32)>> = BTreeMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        if node.is_family {
            continue;
        }
        if let Some(center) = centers.get(&node.id) {
            rows.entry(node.rank).or_default().push((idx, center.x));
        }
    }

    for row in rows.values_mut() {
        row.sort_by(|a, b| match a.1.partial_cmp(&b.1) {
            Some(Ordering::Equal) | None => a.0.cmp(&b.0),
            Some(ordering) => ordering,
        });
        let mut previous_right: Option<f32> = None;
        for &(idx, x) in row.iter() {
            let node = &nodes[idx];
            let placed = match previous_right {
                Some(right) => x.max(right + config.node_spacing + node.width / 2.0),
                None => x,
            };
            if let Some(center) = centers.get_mut(&node.id) {
                center.x = placed;
            }
            previous_right = Some(placed + node.width / 2.0);
        }
    }

    for node in nodes.iter().filter(|node| node.is_family) {
        let sources: Vec<f32> = edges
            .iter()
            .filter(|edge| edge.target == node.id)
            .filter_map(|edge| centers.get(&edge.source).map(|center| center.x))
            .collect();
        if sources.is_empty() {
            continue;
        }
        let mean = sources.iter().sum::<f32>() / sources.len() as f32;
        if let Some(center) = centers.get_mut(&node.id) {
            center.x = mean;
        }
    }
}

pub(crate) fn index_by_id(nodes: &[LayoutNode]) -> HashMap<&str, usize> {
    nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), idx))
        .collect()
}
