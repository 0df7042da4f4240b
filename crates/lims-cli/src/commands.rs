//! Subcommand bodies; each returns the text to print

use anyhow::{anyhow, bail, Context, Result};
use lims_fields::{compute_derived_fields, validate_form};
use lims_model::FieldSpec;
use lims_plate::{PlateGeometry, PlateLayout};
use lims_store::ClientConfig;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Configuration from `path`, or defaults
pub(crate) fn load_config(path: Option<&Path>) -> Result<ClientConfig> {
    match path {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ClientConfig::default()),
    }
}

pub(crate) fn well_encode(geometry: PlateGeometry, row: usize, col: usize) -> Result<String> {
    Ok(geometry.encode(row, col)?)
}

pub(crate) fn well_decode(geometry: PlateGeometry, label: &str) -> Result<String> {
    let position = geometry.parse(label)?;
    Ok(format!("row {} col {}", position.row, position.col))
}

/// Grid with `labels` marked used; `label=note` marks an exception
pub(crate) fn plate(geometry: PlateGeometry, labels: &[String]) -> Result<String> {
    let mut layout = PlateLayout::new(geometry);
    for (n, entry) in labels.iter().enumerate() {
        let (label, note) = match entry.split_once('=') {
            Some((label, note)) => (label, Some(note)),
            None => (entry.as_str(), None),
        };
        layout.allocate(label, format!("demo-{}", n + 1))?;
        if let Some(note) = note {
            layout.mark_exception(label, note)?;
        }
    }

    let mut out = layout.render_grid();
    out.push_str(&format!(
        "\n{} used, {} free",
        layout.used_count(),
        layout.free_count()
    ));
    if let Some(next) = layout.next_free() {
        out.push_str(&format!(", next free {}", geometry.label(next)?));
    }
    Ok(out)
}

/// Parse `name=value` pairs
pub(crate) fn parse_bindings(pairs: &[String]) -> Result<BTreeMap<String, f64>> {
    pairs
        .iter()
        .map(|pair| {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("expected name=value, got '{pair}'"))?;
            let value: f64 = value
                .trim()
                .parse()
                .with_context(|| format!("'{value}' is not a number"))?;
            Ok((name.trim().to_string(), value))
        })
        .collect()
}

pub(crate) fn formula(config: &ClientConfig, expression: &str, pairs: &[String]) -> Result<String> {
    let variables = parse_bindings(pairs)?;
    let value = config.sandbox().evaluate(expression, &variables)?;
    Ok(value.to_string())
}

/// Validate a JSON value object against a JSON field template
pub(crate) fn validate(config: &ClientConfig, template: &str, values: &str) -> Result<(String, bool)> {
    let specs: Vec<FieldSpec> =
        serde_json::from_str(template).context("template must be a JSON array of field specs")?;
    let values: Map<String, Value> = match serde_json::from_str::<Value>(values)
        .context("values must be a JSON object")?
    {
        Value::Object(map) => map,
        other => bail!("values must be a JSON object, got {other}"),
    };

    let report = validate_form(&specs, &values);
    let derived: Map<String, Value> = compute_derived_fields(&specs, &values, &config.sandbox())
        .into_iter()
        .map(|(name, result)| {
            let value = match result {
                Ok(number) => json!(number),
                Err(e) => json!({ "error": e.to_string() }),
            };
            (name, value)
        })
        .collect();

    let output = json!({
        "valid": report.is_valid(),
        "errors": report.errors(),
        "derived": derived,
    });
    Ok((serde_json::to_string_pretty(&output)?, report.is_valid()))
}

pub(crate) fn config_show(config: &ClientConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
