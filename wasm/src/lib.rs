use genogram_layout::config::{Config, EngineKind, PartnerStyle};
use genogram_layout::{denormalize, parse_str, render_input};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenogramLayoutOptions {
    engine: Option<String>,
    partner_style: Option<String>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    default_generation: Option<i32>,
    skip_layout: Option<bool>,
}

fn build_config(options: &GenogramLayoutOptions) -> Result<Config, String> {
    let mut config = Config::default();
    if let Some(engine) = options.engine.as_deref() {
        config.layout.engine = EngineKind::from_token(engine)
            .ok_or_else(|| format!("Unknown engine: {engine}"))?;
    }
    if let Some(style) = options.partner_style.as_deref() {
        config.partner_style = PartnerStyle::from_token(style)
            .ok_or_else(|| format!("Unknown partner style: {style}"))?;
    }
    if let Some(spacing) = options.node_spacing {
        config.layout.node_spacing = spacing;
    }
    if let Some(spacing) = options.rank_spacing {
        config.layout.rank_spacing = spacing;
    }
    if let Some(generation) = options.default_generation {
        config.generation.default_generation = generation;
    }
    Ok(config)
}

fn layout_json(input: &str, options_json: Option<&str>) -> Result<String, String> {
    let options: GenogramLayoutOptions = match options_json {
        Some(raw) => serde_json::from_str(raw).map_err(|e| e.to_string())?,
        None => GenogramLayoutOptions::default(),
    };
    let config = build_config(&options)?;
    let document = parse_str(input).map_err(|e| e.to_string())?;
    let diagram = render_input(document, &config, options.skip_layout.unwrap_or(false));
    serde_json::to_string(&diagram).map_err(|e| e.to_string())
}

/// Lays out `{ people, relationships }` JSON and returns `{ nodes, edges }`.
#[wasm_bindgen]
pub fn layout_genogram_json(input: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = options_json.as_deref();
    layout_json(input, options).map_err(js_error)
}

/// Turns an edited `{ nodes, edges }` diagram back into `{ people, relationships }`.
#[wasm_bindgen]
pub fn denormalize_genogram_json(diagram_json: &str) -> Result<String, JsValue> {
    let diagram = serde_json::from_str(diagram_json).map_err(js_error)?;
    let data = denormalize(&diagram);
    serde_json::to_string(&data).map_err(js_error)
}

fn js_error(error: impl ToString) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lays_out_a_couple_with_a_child() {
        let input = r#"{
            "people": [{ "id": "a", "gender": "M" }, { "id": "b", "gender": "F" }, { "id": "k" }],
            "relationships": [
                { "id": "c", "source": "a", "target": "b", "type": "conyugal" },
                { "id": "p1", "source": "k", "target": "a", "type": "parentChild" },
                { "id": "p2", "source": "k", "target": "b", "type": "parentChild" }
            ]
        }"#;
        let options = r#"{ "engine": "rows" }"#;
        let out = layout_json(input, Some(options)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 4);
        assert!(out.contains("fam-a-b"));
    }

    #[test]
    fn rejects_unknown_engine() {
        let input = r#"{ "people": [] }"#;
        let options = r#"{ "engine": "force" }"#;
        let err = layout_json(input, Some(options)).unwrap_err();
        assert!(err.contains("force"));
    }
}
