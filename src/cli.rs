use crate::config::{Config, EngineKind, PartnerStyle, load_config};
use crate::export::{write_diagram, write_generations};
use crate::input::{GenogramInput, read_input};
use crate::pipeline::{generations, render_input};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "genogram",
    version,
    about = "Lays out genogram data as positioned nodes and edges"
)]
pub struct Args {
    /// Input JSON file, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output JSON file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file with layout and generation overrides
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long = "log-level", default_value = "warn")]
    pub log_level: String,

    /// Layout engine, overriding the config file
    #[arg(long = "engine", value_enum)]
    pub engine: Option<EngineArg>,

    /// Which couple attribute styles partner edges, overriding the config file
    #[arg(long = "partner-style", value_enum)]
    pub partner_style: Option<PartnerStyleArg>,

    /// Emit nodes and edges without running the layout engine
    #[arg(long = "skip-layout")]
    pub skip_layout: bool,

    /// Print the generation map instead of the diagram
    #[arg(long = "generations")]
    pub generations: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineArg {
    Dagre,
    Rows,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerStyleArg {
    Legal,
    Emotional,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Dagre => EngineKind::Dagre,
            EngineArg::Rows => EngineKind::Rows,
        }
    }
}

impl From<PartnerStyleArg> for PartnerStyle {
    fn from(arg: PartnerStyleArg) -> Self {
        match arg {
            PartnerStyleArg::Legal => PartnerStyle::Legal,
            PartnerStyleArg::Emotional => PartnerStyle::Emotional,
        }
    }
}

pub fn run(args: &Args) -> Result<()> {
    let config = resolve_config(args)?;
    let input = read_input(args.input.as_deref())?;

    if args.generations {
        let GenogramInput::Structured(data) = &input else {
            return Err(anyhow::anyhow!(
                "--generations needs people/relationships input, got a laid out snapshot"
            ));
        };
        return write_generations(&generations(data, &config), args.output.as_deref());
    }

    let diagram = render_input(input, &config, args.skip_layout);
    info!(
        nodes = diagram.nodes.len(),
        edges = diagram.edges.len();
        "Writing diagram"
    );
    write_diagram(&diagram, args.output.as_deref())
}

/// Config file first, then the command-line overrides.
pub fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(engine) = args.engine {
        config.layout.engine = engine.into();
    }
    if let Some(style) = args.partner_style {
        config.partner_style = style.into();
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        let argv = std::iter::once("genogram").chain(argv.iter().copied());
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert_eq!(args.log_level, "warn");
        assert!(args.input.is_none());
        assert!(!args.skip_layout);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.layout.engine, EngineKind::Dagre);
        assert_eq!(config.partner_style, PartnerStyle::Legal);
    }

    #[test]
    fn flags_override_config_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let text = r#"{ "layout": { "engine": "dagre", "nodeSpacing": 40 } }"#;
        std::fs::write(file.path(), text).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let args = parse(&[
            "-c",
            &path,
            "--engine",
            "rows",
            "--partner-style",
            "emotional",
        ]);
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.layout.engine, EngineKind::Rows);
        assert_eq!(config.partner_style, PartnerStyle::Emotional);
        assert_eq!(config.layout.node_spacing, 40.0);
    }

    #[test]
    fn rejects_unknown_engine() {
        let argv = ["genogram", "--engine", "force"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn writes_generations_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.json");
        let output = dir.path().join("out.json");
        let text = r#"{
            "people": [{ "id": "a", "generation": 1 }, { "id": "b" }],
            "relationships": [
                { "id": "r", "source": "b", "target": "a", "type": "parentChild" }
            ]
        }"#;
        std::fs::write(&input, text).unwrap();

        let args = parse(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--generations",
        ]);
        run(&args).unwrap();
        let text = std::fs::read_to_string(&output).unwrap();
        let written: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(written["a"], 1);
        assert_eq!(written["b"], 2);
    }
}
