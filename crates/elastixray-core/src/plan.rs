//! Analysis planning: which analyzer runs on which sample value.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::model::{AnalysisKind, FieldMap};

/// Text handed to an analyzer.
///
/// Multi-valued fields produce one entry per value, which the analyze API
/// accepts as a text array. A single value serializes as a plain string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputText(Vec<String>);

impl InputText {
    /// Wrap a single text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(vec![text.into()])
    }

    /// Render a sample value the way the engine would feed it to an analyzer.
    ///
    /// Strings pass through, numbers and booleans use their JSON form, arrays
    /// are flattened (at any depth) into one text per non-null element, and
    /// `null` yields nothing.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut texts = Vec::new();
        collect_texts(&mut texts, value);
        Self(texts)
    }

    /// Whether there is nothing to analyze.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(String::is_empty)
    }

    /// Individual texts, in document order.
    #[must_use]
    pub fn texts(&self) -> &[String] {
        &self.0
    }
}

fn collect_texts(texts: &mut Vec<String>, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                collect_texts(texts, item);
            }
        }
        Value::String(s) => texts.push(s.clone()),
        other => texts.push(other.to_string()),
    }
}

impl Serialize for InputText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => serializer.serialize_str(single),
            many => many.serialize(serializer),
        }
    }
}

impl fmt::Display for InputText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [single] => write!(f, "{single:?}"),
            many => write!(f, "{many:?}"),
        }
    }
}

/// One analyze call to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTask {
    /// Dotted name of the field the tokens belong to.
    pub target_field: String,
    /// Which analyzer of the field this exercises.
    pub kind: AnalysisKind,
    /// Analyzer or normalizer name to request.
    pub analyzer_name: String,
    /// Text to analyze.
    pub input_text: InputText,
}

/// Build the analysis queue for a set of discovered fields.
///
/// Emits one task per `(field, kind)` where the field configures that kind
/// and has a non-blank sample value. All index-analyzer tasks come first,
/// then search-analyzer tasks, then normalizer tasks; within each group,
/// fields appear in dotted-name order.
#[must_use]
pub fn build_pipeline(fields: &FieldMap) -> Vec<AnalysisTask> {
    let mut queue = Vec::new();

    for kind in AnalysisKind::ALL {
        for field in fields.values() {
            let Some(analyzer_name) = field.analysis.name_for(kind) else {
                continue;
            };
            let Some(sample) = field.sample_value.as_ref() else {
                continue;
            };

            let input_text = InputText::from_value(sample);
            if input_text.is_blank() {
                continue;
            }

            queue.push(AnalysisTask {
                target_field: field.dotted_name.clone(),
                kind,
                analyzer_name: analyzer_name.to_string(),
                input_text,
            });
        }
    }

    queue
}
