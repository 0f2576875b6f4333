//! Field descriptors and analysis kinds shared by every pipeline stage.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::plan::InputText;

/// Analyzer applied when a `text` field does not name one.
///
/// This mirrors the engine's built-in default. A cluster configured with a
/// different `index.analysis.analyzer.default` will tokenize differently.
pub const DEFAULT_ANALYZER: &str = "standard";

/// Text fed to an analyzer when the field has no usable sample value.
pub const PLACEHOLDER_TEXT: &str = "Lorem ipsum dolor sit amet";

/// Separator between name path segments in a dotted field name.
pub const PATH_SEPARATOR: &str = ".";

/// Discovered fields keyed by dotted name, iterated in sorted order.
pub type FieldMap = BTreeMap<String, FieldDescriptor>;

/// One way of running text through an analysis chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Index-time analyzer.
    Index,
    /// Search-time analyzer.
    Search,
    /// Keyword normalizer.
    Normalize,
}

impl AnalysisKind {
    /// All kinds, in the order the pipeline schedules them.
    pub const ALL: [Self; 3] = [Self::Index, Self::Search, Self::Normalize];

    /// Mapping parameter that configures this kind (`analyzer`,
    /// `search_analyzer`, `normalizer`).
    #[must_use]
    pub const fn mapping_key(self) -> &'static str {
        match self {
            Self::Index => "analyzer",
            Self::Search => "search_analyzer",
            Self::Normalize => "normalizer",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mapping_key())
    }
}

/// Analysis configuration of a discovered field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldAnalysis {
    /// A `text` field.
    Text {
        /// Index-time analyzer name.
        analyzer: String,
        /// Search-time analyzer name.
        search_analyzer: String,
    },
    /// A `keyword` field with an explicit normalizer.
    #[serde(rename = "keyword")]
    Normalized {
        /// Normalizer name.
        normalizer: String,
    },
}

impl FieldAnalysis {
    /// Mapping type this configuration was declared with.
    #[must_use]
    pub const fn field_type(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Normalized { .. } => "keyword",
        }
    }

    /// Analyzer or normalizer configured for `kind`, if this field has one.
    #[must_use]
    pub fn name_for(&self, kind: AnalysisKind) -> Option<&str> {
        match (self, kind) {
            (Self::Text { analyzer, .. }, AnalysisKind::Index) => Some(analyzer),
            (Self::Text { search_analyzer, .. }, AnalysisKind::Search) => Some(search_analyzer),
            (Self::Normalized { normalizer }, AnalysisKind::Normalize) => Some(normalizer),
            _ => None,
        }
    }

    /// Kinds this field can be analyzed with, in pipeline order.
    pub fn kinds(&self) -> impl Iterator<Item = AnalysisKind> + '_ {
        AnalysisKind::ALL
            .into_iter()
            .filter(|kind| self.name_for(*kind).is_some())
    }
}

/// Token lists produced for a field, one slot per analysis kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tokens {
    /// Output of the index-time analyzer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<Vec<String>>,
    /// Output of the search-time analyzer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<Vec<String>>,
    /// Output of the normalizer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalizer: Option<Vec<String>>,
}

impl Tokens {
    /// Tokens recorded for `kind`.
    #[must_use]
    pub fn get(&self, kind: AnalysisKind) -> Option<&[String]> {
        match kind {
            AnalysisKind::Index => self.index.as_deref(),
            AnalysisKind::Search => self.search.as_deref(),
            AnalysisKind::Normalize => self.normalizer.as_deref(),
        }
    }

    /// Record tokens for `kind`, replacing any earlier result.
    pub fn set(&mut self, kind: AnalysisKind, tokens: Vec<String>) {
        let slot = match kind {
            AnalysisKind::Index => &mut self.index,
            AnalysisKind::Search => &mut self.search,
            AnalysisKind::Normalize => &mut self.normalizer,
        };
        *slot = Some(tokens);
    }
}

/// An analyzable field (or multi-field) of the inspected index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    /// Mapping key segments from the document root.
    pub name_path: Vec<String>,
    /// `name_path` joined with [`PATH_SEPARATOR`].
    pub dotted_name: String,
    /// Whether the field is declared under a parent's `fields`.
    pub is_subfield: bool,
    /// Analyzer configuration.
    pub analysis: FieldAnalysis,
    /// Value found in the sample document.
    pub sample_value: Option<Value>,
    /// Analysis results, filled in by the runner.
    pub tokens: Tokens,
}

impl FieldDescriptor {
    /// Create a descriptor with no tokens yet.
    #[must_use]
    pub fn new(
        name_path: Vec<String>,
        is_subfield: bool,
        analysis: FieldAnalysis,
        sample_value: Option<Value>,
    ) -> Self {
        Self {
            dotted_name: name_path.join(PATH_SEPARATOR),
            name_path,
            is_subfield,
            analysis,
            sample_value,
            tokens: Tokens::default(),
        }
    }

    /// Whether the sample document gave this field something to analyze.
    #[must_use]
    pub fn has_sample(&self) -> bool {
        self.sample_value.as_ref().is_some_and(|v| !is_blank(v))
    }
}

/// Whether a JSON value carries no text worth analyzing.
///
/// Same rule the planner applies: `null`, the empty string, and arrays (at
/// any depth) made only of blank values are blank. Numbers and booleans are
/// not: the engine analyzes their string form.
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    InputText::from_value(value).is_blank()
}
