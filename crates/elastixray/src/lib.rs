#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! ## API Reference

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod http;
mod inspect;
pub mod report;
mod runner;
mod service;

pub use config::{XrayConfig, DEFAULT_TIMEOUT_SECS};
pub use error::{AnalyzeError, Error, Result, ServiceError};
pub use http::{ClientOptions, EsClient};
pub use inspect::{inspect, Inspection, RunOptions, Stage};
pub use report::ReportFormat;
pub use runner::{AnalysisRunner, RunSummary};
pub use service::{AnalyzeRequest, SearchService};

pub use elastixray_core::{
    AnalysisKind, FieldAnalysis, FieldDescriptor, FieldMap, InputText, Tokens,
};
