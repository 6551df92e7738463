//! Single-field command implementation

use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use crate::cli::{CommandContext, OutputFormat};
use crate::dashboard::{DashboardField, LogicalField, Source};
use crate::error::Result;
use crate::output::formatters::{source_label, value_summary};
use crate::output::{json, table};

/// JSON shape of the field command
#[derive(Debug, Serialize)]
struct FieldOutput<'a> {
    field: &'static str,
    path: &'static str,
    source: Source,
    payload: &'a Value,
}

/// Flatten the top level of a payload into display rows
fn payload_rows(payload: &Value) -> Vec<(String, String)> {
    match payload {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k.clone(), scalar_or_summary(v)))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), scalar_or_summary(v)))
            .collect(),
        other => vec![("value".to_string(), other.to_string())],
    }
}

fn scalar_or_summary(value: &Value) -> String {
    match value {
        Value::Object(map) if map.values().all(|v| !v.is_object() && !v.is_array()) => map
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(items) if items.iter().all(|v| !v.is_object() && !v.is_array()) => items
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => value_summary(value),
        other => other.to_string(),
    }
}

/// Run the field command
pub async fn run(ctx: &CommandContext, field: DashboardField) -> Result<()> {
    let result = ctx
        .aggregator
        .get_field(field, ctx.force_refresh)
        .await;

    match ctx.format {
        OutputFormat::Json => {
            let output = FieldOutput {
                field: field.name(),
                path: field.path(),
                source: result.source,
                payload: &result.value,
            };
            println!("{}", json::format_json(&output)?);
        }
        OutputFormat::Table => {
            println!("{}", table::format_pairs(payload_rows(&result.value)));
        }
        OutputFormat::Pretty => {
            println!(
                "{} {} [{}]\n",
                field.name().bold(),
                field.path().dimmed(),
                source_label(result.source)
            );
            for (key, value) in payload_rows(&result.value) {
                println!("  {:<12} {}", key.cyan(), value);
            }
        }
    }

    Ok(())
}
