use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Generation given to unhinted roots and to people propagation never reaches.
    pub default_generation: i32,
    /// Upper bound on worklist pops; `None` derives one from the input size.
    pub max_steps: Option<usize>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_generation: 3,
            max_steps: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Dagre,
    Rows,
}

impl EngineKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "dagre" => Some(Self::Dagre),
            "rows" | "manual" => Some(Self::Rows),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub engine: EngineKind,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub person_width: f32,
    pub person_height: f32,
    pub family_width: f32,
    pub family_height: f32,
    pub margin_x: f32,
    pub margin_y: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Dagre,
            node_spacing: 80.0,
            rank_spacing: 120.0,
            person_width: 100.0,
            person_height: 100.0,
            family_width: 2.0,
            family_height: 2.0,
            margin_x: 8.0,
            margin_y: 8.0,
        }
    }
}

impl LayoutConfig {
    /// Vertical distance between the centres of two consecutive generations.
    pub fn row_pitch(&self) -> f32 {
        self.person_height + self.rank_spacing
    }
}

/// Which relationship qualifier styles the partner edges of a couple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartnerStyle {
    #[default]
    Legal,
    Emotional,
}

impl PartnerStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "legal" => Some(Self::Legal),
            "emotional" => Some(Self::Emotional),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub generation: GenerationConfig,
    pub layout: LayoutConfig,
    pub partner_style: PartnerStyle,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigFile {
    default_generation: Option<i32>,
    max_steps: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    engine: Option<String>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    person_width: Option<f32>,
    person_height: Option<f32>,
    family_width: Option<f32>,
    family_height: Option<f32>,
    margin_x: Option<f32>,
    margin_y: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    generation: Option<GenerationConfigFile>,
    layout: Option<LayoutConfigFile>,
    partner_style: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(contents)?,
    };
    let mut config = Config::default();

    if let Some(generation) = parsed.generation {
        if let Some(v) = generation.default_generation {
            config.generation.default_generation = v;
        }
        if let Some(v) = generation.max_steps {
            config.generation.max_steps = Some(v);
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.engine {
            config.layout.engine = EngineKind::from_token(&v)
                .ok_or_else(|| anyhow::anyhow!("Unknown layout engine '{v}'"))?;
        }
        if let Some(v) = layout.node_spacing {
            config.layout.node_spacing = v.max(0.0);
        }
        if let Some(v) = layout.rank_spacing {
            config.layout.rank_spacing = v.max(0.0);
        }
        if let Some(v) = layout.person_width {
            config.layout.person_width = v.max(1.0);
        }
        if let Some(v) = layout.person_height {
            config.layout.person_height = v.max(1.0);
        }
        if let Some(v) = layout.family_width {
            config.layout.family_width = v.max(0.0);
        }
        if let Some(v) = layout.family_height {
            config.layout.family_height = v.max(0.0);
        }
        if let Some(v) = layout.margin_x {
            config.layout.margin_x = v;
        }
        if let Some(v) = layout.margin_y {
            config.layout.margin_y = v;
        }
    }

    if let Some(style) = parsed.partner_style {
        config.partner_style = PartnerStyle::from_token(&style)
            .ok_or_else(|| anyhow::anyhow!("Unknown partner style '{style}'"))?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.generation.default_generation, 3);
        assert_eq!(config.layout.engine, EngineKind::Dagre);
        assert_eq!(config.partner_style, PartnerStyle::Legal);
    }

    #[test]
    fn overrides_selected_fields() {
        let config = parse_config(
            r#"{
                "generation": { "defaultGeneration": 1 },
                "layout": { "engine": "rows", "rankSpacing": 60, "personWidth": 40 },
                "partnerStyle": "emotional"
            }"#,
        )
        .unwrap();
        assert_eq!(config.generation.default_generation, 1);
        assert_eq!(config.layout.engine, EngineKind::Rows);
        assert_eq!(config.layout.rank_spacing, 60.0);
        assert_eq!(config.layout.person_width, 40.0);
        assert_eq!(config.layout.person_height, 100.0);
        assert_eq!(config.partner_style, PartnerStyle::Emotional);
    }

    #[test]
    fn accepts_json5_config() {
        let text = "{ layout: { nodeSpacing: 12, }, // trailing comment\n }";
        let config = parse_config(text).unwrap();
        assert_eq!(config.layout.node_spacing, 12.0);
    }

    #[test]
    fn rejects_unknown_engine() {
        let text = r#"{ "layout": { "engine": "force" } }"#;
        assert!(parse_config(text).is_err());
    }
}
