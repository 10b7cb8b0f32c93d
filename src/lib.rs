pub mod classify;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod denormalize;
pub mod diagram;
pub mod error;
pub mod export;
pub mod family;
pub mod generation;
pub mod input;
pub mod layout;
pub mod model;
pub mod pipeline;

pub use config::{Config, load_config};
pub use denormalize::denormalize;
pub use diagram::{Diagram, DiagramEdge, DiagramNode, EdgeKind, NodeKind, PersonNodeKind};
pub use error::InputError;
pub use generation::GenerationMap;
pub use input::{GenogramInput, parse_str};
pub use model::{Gender, GenogramData, Person, PersonAttributes, RelationType, Relationship};
pub use pipeline::{build_diagram, normalize, render_input};
