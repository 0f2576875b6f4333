//! Rendering of inspection results.

use std::fmt::Write as _;

use serde_json::{json, Value};

use elastixray_core::FieldDescriptor;

use crate::error::Result;
use crate::inspect::Inspection;

/// Output format of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ReportFormat {
    /// One block per field and analyzer, for reading.
    #[default]
    Text,
    /// The enriched field map as JSON, for tooling.
    Json,
}

/// Render `inspection` in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render(inspection: &Inspection, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(inspection)),
        ReportFormat::Json => render_json(inspection),
    }
}

/// One block per analyzer of every field that has a sample value, sorted by
/// field name:
///
/// ```text
/// title:
///    type            : text
///    analyzer        : english
///    sample          : "Running dogs"
///    tokens          : ["run","dog"]
/// ```
///
/// A token list that was never produced (the call failed) shows as `-`.
#[must_use]
pub fn render_text(inspection: &Inspection) -> String {
    let mut out = String::new();

    for (name, field) in &inspection.fields {
        if !field.has_sample() {
            continue;
        }
        for kind in field.analysis.kinds() {
            let analyzer = field.analysis.name_for(kind).unwrap_or_default();
            let tokens = field
                .tokens
                .get(kind)
                .map_or_else(|| "-".to_string(), |t| compact_json(&json!(t)));

            // Writing to a String cannot fail.
            let _ = writeln!(out, "{name}:");
            let _ = writeln!(out, "   {:<16}: {}", "type", field.analysis.field_type());
            let _ = writeln!(out, "   {:<16}: {analyzer}", kind.mapping_key());
            let _ = writeln!(out, "   {:<16}: {}", "sample", sample_json(field));
            let _ = writeln!(out, "   {:<16}: {tokens}", "tokens");
            out.push('\n');
        }
    }

    out
}

/// The whole inspection as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_json(inspection: &Inspection) -> Result<String> {
    let failures: Vec<Value> = inspection
        .failures
        .iter()
        .map(|f| {
            json!({
                "field": f.field,
                "kind": f.kind,
                "analyzer": f.analyzer,
                "error": f.source.to_string(),
            })
        })
        .collect();

    let report = json!({
        "index": inspection.index,
        "id": inspection.id,
        "fields": inspection.fields,
        "failures": failures,
    });
    Ok(serde_json::to_string_pretty(&report)?)
}

fn sample_json(field: &FieldDescriptor) -> String {
    field
        .sample_value
        .as_ref()
        .map_or_else(|| "null".to_string(), compact_json)
}

fn compact_json(value: &Value) -> String {
    value.to_string()
}
