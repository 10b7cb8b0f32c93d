use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use log::debug;

use super::{
    LayeredEngine, LayoutEdge, LayoutNode, index_by_id, min_rank, rank_center_y, separate_rows,
};
use crate::config::LayoutConfig;
use crate::diagram::Point;

/// Row-by-row placement without an external layout crate. Each node goes under
/// the median of the placed nodes that point at it.
#[derive(Debug, Clone, Default)]
pub struct RowEngine {
    config: LayoutConfig,
}

impl RowEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }
}

impl LayeredEngine for RowEngine {
    fn place(&self, nodes: &[LayoutNode], edges: &[LayoutEdge]) -> BTreeMap<String, Point> {
        let mut centers: BTreeMap<String, Point> = BTreeMap::new();
        if nodes.is_empty() {
            return centers;
        }

        let index = index_by_id(nodes);
        let mut incoming: HashMap<usize, Vec<usize>> = HashMap::new();
        for edge in edges {
            let (Some(&from), Some(&to)) = (
                index.get(edge.source.as_str()),
                index.get(edge.target.as_str()),
            ) else {
                continue;
            };
            if from == to {
                continue;
            }
            let sources = incoming.entry(to).or_default();
            if !sources.contains(&from) {
                sources.push(from);
            }
        }

        let mut rows: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (idx, node) in nodes.iter().enumerate() {
            rows.entry(node.rank).or_default().push(idx);
        }
        debug!("Placing {} rows", rows.len());

        let top_rank = min_rank(nodes);
        for (&rank, row) in &rows {
            let y = rank_center_y(rank, top_rank, &self.config);
            let same_row = |idx: &usize| nodes[*idx].rank == rank;

            let floats = |idx: &usize| {
                nodes[*idx].is_family
                    && incoming
                        .get(idx)
                        .is_some_and(|sources| sources.iter().any(same_row))
            };
            let (floating, anchored): (Vec<usize>, Vec<usize>) =
                row.iter().copied().partition(floats);

            let clusters = cluster_partners(&anchored, &floating, &incoming, same_row);
            let mut cluster_scores: HashMap<usize, f32> = HashMap::new();
            for idx in &anchored {
                let Some(score) = median_x(incoming.get(idx), nodes, &centers) else {
                    continue;
                };
                let entry = cluster_scores.entry(clusters[idx]).or_insert(score);
                *entry = entry.min(score);
            }

            let mut ordered = anchored.clone();
            ordered.sort_by(|a, b| {
                let key_a = (cluster_scores.get(&clusters[a]), clusters[a], *a);
                let key_b = (cluster_scores.get(&clusters[b]), clusters[b], *b);
                compare_score(key_a.0, key_b.0)
                    .then(key_a.1.cmp(&key_b.1))
                    .then(key_a.2.cmp(&key_b.2))
            });

            let mut cursor = self.config.margin_x;
            for idx in ordered {
                let node = &nodes[idx];
                let earliest = cursor + node.width / 2.0;
                let x = match cluster_scores.get(&clusters[&idx]) {
                    Some(&score) => earliest.max(score),
                    None => earliest,
                };
                centers.insert(node.id.clone(), Point::new(x, y));
                cursor = x + node.width / 2.0 + self.config.node_spacing;
            }

            for idx in floating {
                let node = &nodes[idx];
                let x = mean_x(incoming.get(&idx), nodes, &centers)
                    .unwrap_or(cursor + node.width / 2.0);
                centers.insert(node.id.clone(), Point::new(x, y));
            }
        }

        separate_rows(nodes, edges, &mut centers, &self.config);
        centers
    }
}

/// Groups nodes of one row that feed the same placeholder. Each node maps to
/// the smallest input index of its group.
fn cluster_partners(
    anchored: &[usize],
    floating: &[usize],
    incoming: &HashMap<usize, Vec<usize>>,
    same_row: impl Fn(&usize) -> bool,
) -> HashMap<usize, usize> {
    let mut group: HashMap<usize, usize> = anchored.iter().map(|idx| (*idx, *idx)).collect();

    fn root(group: &HashMap<usize, usize>, mut idx: usize) -> usize {
        while let Some(&parent) = group.get(&idx) {
            if parent == idx {
                break;
            }
            idx = parent;
        }
        idx
    }

    for placeholder in floating {
        let Some(sources) = incoming.get(placeholder) else {
            continue;
        };
        let members: Vec<usize> = sources
            .iter()
            .filter(|idx| same_row(*idx) && group.contains_key(*idx))
            .copied()
            .collect();
        let Some(lowest) = members.iter().map(|idx| root(&group, *idx)).min() else {
            continue;
        };
        for member in members {
            let member_root = root(&group, member);
            group.insert(member_root, lowest);
        }
    }

    anchored
        .iter()
        .map(|idx| (*idx, root(&group, *idx)))
        .collect()
}

fn median_x(
    sources: Option<&Vec<usize>>,
    nodes: &[LayoutNode],
    centers: &BTreeMap<String, Point>,
) -> Option<f32> {
    let mut values = placed_xs(sources, nodes, centers);
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) * 0.5)
    }
}

fn mean_x(
    sources: Option<&Vec<usize>>,
    nodes: &[LayoutNode],
    centers: &BTreeMap<String, Point>,
) -> Option<f32> {
    let values = placed_xs(sources, nodes, centers);
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f32>() / values.len() as f32)
}

fn placed_xs(
    sources: Option<&Vec<usize>>,
    nodes: &[LayoutNode],
    centers: &BTreeMap<String, Point>,
) -> Vec<f32> {
    sources
        .map(|list| {
            list.iter()
                .filter_map(|idx| centers.get(&nodes[*idx].id))
                .map(|center| center.x)
                .collect()
        })
        .unwrap_or_default()
}

/// Scored nodes first, lowest score leftmost.
fn compare_score(a: Option<&f32>, b: Option<&f32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
