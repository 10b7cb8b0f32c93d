use std::collections::HashSet;

use log::{debug, info};

use crate::classify::relationship_edges;
use crate::config::Config;
use crate::diagram::Diagram;
use crate::family::synthesize;
use crate::generation::{GenerationMap, resolve};
use crate::input::GenogramInput;
use crate::layout::{LayeredEngine, engine_for, layout};
use crate::model::GenogramData;

/// Generation for every valid person in `data`.
pub fn generations(data: &GenogramData, config: &Config) -> GenerationMap {
    resolve(&data.people, &data.relationships, &config.generation)
}

/// Nodes and edges without coordinates. Structural edges come first, then the
/// relationship edges in input order.
pub fn normalize(data: &GenogramData, config: &Config) -> Diagram {
    let generations = generations(data, config);
    let (nodes, mut edges) = synthesize(
        &data.people,
        &data.relationships,
        &generations,
        config.partner_style,
    );
    let structural = edges.len();

    let known: HashSet<&str> = generations.keys().map(String::as_str).collect();
    edges.extend(relationship_edges(&data.relationships, &known));
    debug!(
        nodes = nodes.len(),
        structural,
        relationships = edges.len() - structural;
        "Normalized genogram"
    );
    Diagram { nodes, edges }
}

/// Full pipeline with the engine chosen by `config.layout.engine`.
pub fn build_diagram(data: &GenogramData, config: &Config) -> Diagram {
    let engine = engine_for(&config.layout);
    build_diagram_with(data, config, engine.as_ref())
}

pub fn build_diagram_with(
    data: &GenogramData,
    config: &Config,
    engine: &dyn LayeredEngine,
) -> Diagram {
    if data.people.is_empty() {
        return Diagram::default();
    }
    let Diagram { nodes, edges } = normalize(data, config);
    let nodes = layout(nodes, &edges, &config.layout, engine);
    info!(nodes = nodes.len(), edges = edges.len(); "Laid out genogram");
    Diagram { nodes, edges }
}

/// Snapshots pass through untouched; structured data is normalized and, unless
/// `skip_layout` is set, laid out.
pub fn render_input(input: GenogramInput, config: &Config, skip_layout: bool) -> Diagram {
    match input {
        GenogramInput::Snapshot(diagram) => {
            debug!("Input is an already laid out snapshot, passing it through");
            diagram
        }
        GenogramInput::Structured(data) if skip_layout => normalize(&data, config),
        GenogramInput::Structured(data) => build_diagram(&data, config),
    }
}
