#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod discover;
mod model;
mod plan;
mod resolve;

pub use discover::discover;
pub use model::{
    is_blank, AnalysisKind, FieldAnalysis, FieldDescriptor, FieldMap, Tokens, DEFAULT_ANALYZER,
    PATH_SEPARATOR, PLACEHOLDER_TEXT,
};
pub use plan::{build_pipeline, AnalysisTask, InputText};
pub use resolve::resolve;
