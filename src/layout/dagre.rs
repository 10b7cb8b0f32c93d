use std::collections::{BTreeMap, HashSet};

use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use log::debug;

use super::{
    LayeredEngine, LayoutEdge, LayoutNode, index_by_id, min_rank, rank_center_y, separate_rows,
};
use crate::config::LayoutConfig;
use crate::diagram::Point;

/// Horizontal placement from dagre; vertical placement pinned to the rank
/// rows so every generation forms one straight row.
#[derive(Debug, Clone, Default)]
pub struct DagreEngine {
    config: LayoutConfig,
}

impl DagreEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }
}

impl LayeredEngine for DagreEngine {
    fn place(&self, nodes: &[LayoutNode], edges: &[LayoutEdge]) -> BTreeMap<String, Point> {
        let mut centers = BTreeMap::new();
        if nodes.is_empty() {
            return centers;
        }

        let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
            DagreGraph::new(Some(GraphOption {
                directed: Some(true),
                multigraph: Some(false),
                compound: Some(false),
            }));

        let mut graph_config = DagreConfig::default();
        graph_config.rankdir = Some("tb".to_string());
        graph_config.nodesep = Some(self.config.node_spacing);
        graph_config.ranksep = Some(self.config.rank_spacing);
        graph_config.marginx = Some(self.config.margin_x);
        graph_config.marginy = Some(self.config.margin_y);
        dagre_graph.set_graph(graph_config);

        for node in nodes {
            let mut dagre_node = DagreNode::default();
            dagre_node.width = node.width;
            dagre_node.height = node.height;
            dagre_graph.set_node(node.id.clone(), Some(dagre_node));
        }

        let known = index_by_id(nodes);
        let mut edge_set: HashSet<(&str, &str)> = HashSet::new();
        for edge in edges {
            if edge.source == edge.target {
                continue;
            }
            let endpoints = (edge.source.as_str(), edge.target.as_str());
            if !known.contains_key(endpoints.0) || !known.contains_key(endpoints.1) {
                continue;
            }
            if !edge_set.insert(endpoints) {
                continue;
            }
            let edge_label = DagreEdge::default();
            let _ = dagre_graph.set_edge(&edge.source, &edge.target, Some(edge_label), None);
        }
        debug!(
            "Running dagre over {} nodes and {} edges",
            nodes.len(),
            edge_set.len()
        );

        dagre_layout::run_layout(&mut dagre_graph);

        let top_rank = min_rank(nodes);
        for node in nodes {
            let Some(dagre_node) = dagre_graph.node(&node.id) else {
                continue;
            };
            if !dagre_node.x.is_finite() {
                continue;
            }
            let y = rank_center_y(node.rank, top_rank, &self.config);
            centers.insert(node.id.clone(), Point::new(dagre_node.x, y));
        }

        separate_rows(nodes, edges, &mut centers, &self.config);
        centers
    }
}
