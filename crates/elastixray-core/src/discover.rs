//! Mapping traversal for analyzable fields.
//!
//! Walks an index mapping (the tree under `mappings.properties`) and collects
//! a [`FieldDescriptor`] for every field whose values go through an analysis
//! chain:
//! - **`text` fields**: index-time and search-time analyzers
//! - **normalized `keyword` fields**: the declared normalizer
//!
//! Object fields (`properties`) are descended into, and multi-fields
//! (`fields`) become sibling descriptors that read their sample value from
//! the parent field, since multi-fields never appear in `_source`.

use serde_json::{Map, Value};

use crate::model::{FieldAnalysis, FieldDescriptor, FieldMap, DEFAULT_ANALYZER};
use crate::resolve::resolve;

/// Walk `mapping` and pair every analyzable field with its value in `sample`.
///
/// `mapping` is the `properties` object of an index mapping. Anything else
/// (a non-object root, non-object field definitions) is skipped rather than
/// rejected: this is a diagnostic, and a partial answer beats none.
#[must_use]
pub fn discover(mapping: &Value, sample: &Value) -> FieldMap {
    let mut fields = FieldMap::new();
    if let Some(properties) = mapping.as_object() {
        collect_fields(&mut fields, &[], properties, false, sample);
    }
    fields
}

/// Recursively collect descriptors from one level of field definitions.
fn collect_fields(
    result: &mut FieldMap,
    parent_path: &[String],
    definitions: &Map<String, Value>,
    is_subfield: bool,
    sample: &Value,
) {
    for (name, definition) in definitions {
        let Some(def) = definition.as_object() else {
            continue;
        };

        let mut name_path = parent_path.to_vec();
        name_path.push(name.clone());

        if let Some(properties) = def.get("properties").and_then(Value::as_object) {
            collect_fields(result, &name_path, properties, false, sample);
        }

        if let Some(analysis) = classify(def) {
            // Multi-fields are indexed from the parent's value.
            let value_path = if is_subfield {
                &name_path[..name_path.len() - 1]
            } else {
                &name_path[..]
            };
            let sample_value = resolve(sample, value_path).cloned();

            let field =
                FieldDescriptor::new(name_path.clone(), is_subfield, analysis, sample_value);
            result.insert(field.dotted_name.clone(), field);
        }

        if let Some(multi_fields) = def.get("fields").and_then(Value::as_object) {
            collect_fields(result, &name_path, multi_fields, true, sample);
        }
    }
}

/// Decide how a single field definition is analyzed, if at all.
fn classify(def: &Map<String, Value>) -> Option<FieldAnalysis> {
    if !is_indexed(def) {
        return None;
    }

    let param = |key: &str| def.get(key).and_then(Value::as_str);

    match param("type")? {
        "text" => {
            let analyzer = param("analyzer").unwrap_or(DEFAULT_ANALYZER);
            let search_analyzer = param("search_analyzer").unwrap_or(analyzer);
            Some(FieldAnalysis::Text {
                analyzer: analyzer.to_string(),
                search_analyzer: search_analyzer.to_string(),
            })
        }
        "keyword" => param("normalizer").map(|normalizer| FieldAnalysis::Normalized {
            normalizer: normalizer.to_string(),
        }),
        _ => None,
    }
}

/// A field is indexed unless its mapping says `index: false`.
///
/// The engine also accepts the string form `"false"`.
fn is_indexed(def: &Map<String, Value>) -> bool {
    match def.get("index") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(flag)) => flag != "false",
        _ => true,
    }
}
