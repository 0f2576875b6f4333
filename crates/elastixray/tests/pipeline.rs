//! End-to-end inspection runs against an in-memory search service.
//!
//! Each test provides a mapping, a document, and canned analyzer output,
//! then checks the enriched fields after [`elastixray::inspect`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use indoc::indoc;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use elastixray::report::{self, ReportFormat};
use elastixray::{AnalysisKind, AnalyzeRequest, Error, RunOptions, SearchService, ServiceError};

/// Canned cluster: one index, one document, fixed tokens per analyzer name.
#[derive(Default)]
struct FakeCluster {
    mapping: Option<Value>,
    document: Option<Value>,
    tokens: HashMap<String, Vec<String>>,
    calls: Mutex<Vec<AnalyzeRequest>>,
}

impl FakeCluster {
    fn new(mapping: Value, document: Value) -> Self {
        Self {
            mapping: Some(mapping),
            document: Some(document),
            ..Self::default()
        }
    }

    fn with_tokens(mut self, analyzer: &str, tokens: &[&str]) -> Self {
        self.tokens.insert(
            analyzer.to_string(),
            tokens.iter().map(ToString::to_string).collect(),
        );
        self
    }

    fn calls(&self) -> Vec<AnalyzeRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchService for FakeCluster {
    async fn get_mapping(&self, index: &str) -> Result<Value, ServiceError> {
        self.mapping.clone().ok_or_else(|| ServiceError::NotFound {
            what: format!("index '{index}'"),
        })
    }

    async fn get_document(&self, _index: &str, id: &str) -> Result<Value, ServiceError> {
        self.document.clone().ok_or_else(|| ServiceError::NotFound {
            what: format!("document '{id}'"),
        })
    }

    async fn analyze(
        &self,
        _index: &str,
        request: &AnalyzeRequest,
    ) -> Result<Vec<String>, ServiceError> {
        self.calls.lock().unwrap().push(request.clone());
        self.tokens
            .get(&request.analyzer)
            .cloned()
            .ok_or_else(|| ServiceError::Status {
                status: 503,
                reason: format!("no route to analyzer {}", request.analyzer),
            })
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn english_title_end_to_end() {
    let cluster = FakeCluster::new(
        json!({ "title": { "type": "text", "analyzer": "english" } }),
        json!({ "title": "Running dogs" }),
    )
    .with_tokens("english", &["run", "dog"]);

    let inspection = elastixray::inspect(&cluster, "books", "1", &RunOptions::new())
        .await
        .expect("inspection should succeed");

    assert_eq!(inspection.fields.len(), 1);
    let title = &inspection.fields["title"];
    assert_eq!(title.sample_value, Some(json!("Running dogs")));
    assert_eq!(title.tokens.index, Some(strings(&["run", "dog"])));

    let index_calls: Vec<_> = cluster
        .calls()
        .into_iter()
        .filter(|c| c.kind == AnalysisKind::Index)
        .collect();
    assert_eq!(index_calls.len(), 1);
    assert_eq!(
        serde_json::to_value(&index_calls[0]).unwrap(),
        json!({ "text": "Running dogs", "analyzer": "english" })
    );
    assert!(inspection.failures.is_empty());
}

#[tokio::test]
async fn empty_keyword_value_is_not_analyzed() {
    let cluster = FakeCluster::new(
        json!({ "tag": { "type": "keyword", "normalizer": "lowercase" } }),
        json!({ "tag": "" }),
    )
    .with_tokens("lowercase", &["never"]);

    let inspection = elastixray::inspect(&cluster, "books", "1", &RunOptions::new())
        .await
        .unwrap();

    assert!(inspection.fields.contains_key("tag"));
    assert!(cluster.calls().is_empty());
    assert!(inspection.fields["tag"].tokens.normalizer.is_none());
}

#[tokio::test]
async fn multi_field_shares_parent_value() {
    let cluster = FakeCluster::new(
        json!({
            "user": {
                "properties": {
                    "name": {
                        "type": "text",
                        "fields": {
                            "raw": { "type": "keyword", "normalizer": "lowercase" }
                        }
                    }
                }
            }
        }),
        json!({ "user": { "name": "Jane Doe" } }),
    )
    .with_tokens("standard", &["jane", "doe"])
    .with_tokens("lowercase", &["jane doe"]);

    let inspection = elastixray::inspect(&cluster, "people", "7", &RunOptions::new())
        .await
        .unwrap();

    let name = &inspection.fields["user.name"];
    let raw = &inspection.fields["user.name.raw"];
    assert_eq!(name.sample_value, Some(json!("Jane Doe")));
    assert_eq!(raw.sample_value, Some(json!("Jane Doe")));
    assert_eq!(name.tokens.index, Some(strings(&["jane", "doe"])));
    assert_eq!(name.tokens.search, Some(strings(&["jane", "doe"])));
    assert_eq!(raw.tokens.normalizer, Some(strings(&["jane doe"])));

    // index, search, then normalizer
    let kinds: Vec<AnalysisKind> = cluster.calls().iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            AnalysisKind::Index,
            AnalysisKind::Search,
            AnalysisKind::Normalize
        ]
    );
}

#[tokio::test]
async fn failed_call_does_not_abort_run() {
    let cluster = FakeCluster::new(
        json!({
            "a": { "type": "keyword", "normalizer": "missing_normalizer" },
            "b": { "type": "keyword", "normalizer": "lowercase" },
        }),
        json!({ "a": "First", "b": "Second" }),
    )
    .with_tokens("lowercase", &["second"]);

    let inspection = elastixray::inspect(&cluster, "books", "9", &RunOptions::new())
        .await
        .expect("analyze failures are not fatal");

    assert_eq!(cluster.calls().len(), 2);
    assert_eq!(inspection.failures.len(), 1);
    assert_eq!(inspection.failures[0].field, "a");
    assert!(inspection.fields["a"].tokens.normalizer.is_none());
    assert_eq!(
        inspection.fields["b"].tokens.normalizer,
        Some(strings(&["second"]))
    );
}

#[tokio::test]
async fn missing_index_is_fatal() {
    let cluster = FakeCluster::default();

    let err = elastixray::inspect(&cluster, "nope", "1", &RunOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::SchemaFetch { ref index, .. } if index == "nope"));
    assert!(cluster.calls().is_empty());
}

#[tokio::test]
async fn missing_document_is_fatal() {
    let cluster = FakeCluster {
        mapping: Some(json!({ "title": { "type": "text" } })),
        ..FakeCluster::default()
    };

    let err = elastixray::inspect(&cluster, "books", "404", &RunOptions::new())
        .await
        .unwrap_err();

    match err {
        Error::DocumentFetch { index, id, source } => {
            assert_eq!(index, "books");
            assert_eq!(id, "404");
            assert!(matches!(source, ServiceError::NotFound { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(cluster.calls().is_empty());
}

#[tokio::test]
async fn concurrent_run_matches_sequential() {
    let mapping = json!({
        "title": { "type": "text", "analyzer": "english", "search_analyzer": "simple" },
        "body": { "type": "text" },
        "tag": { "type": "keyword", "normalizer": "lowercase" },
    });
    let document = json!({ "title": "Dogs", "body": "Some text", "tag": "X" });
    let make = || {
        FakeCluster::new(mapping.clone(), document.clone())
            .with_tokens("english", &["dog"])
            .with_tokens("simple", &["dogs"])
            .with_tokens("standard", &["some", "text"])
            .with_tokens("lowercase", &["x"])
    };

    let sequential = elastixray::inspect(&make(), "books", "1", &RunOptions::new())
        .await
        .unwrap();
    let parallel = elastixray::inspect(&make(), "books", "1", &RunOptions::new().concurrency(3))
        .await
        .unwrap();

    assert_eq!(sequential.fields, parallel.fields);
    assert_eq!(
        parallel.fields["title"].tokens.search,
        Some(strings(&["dogs"]))
    );
}

#[tokio::test]
async fn text_report_for_inspection() {
    let cluster = FakeCluster::new(
        json!({
            "title": { "type": "text", "analyzer": "english" },
            "views": { "type": "integer" },
        }),
        json!({ "title": "Running dogs", "views": 3 }),
    )
    .with_tokens("english", &["run", "dog"]);

    let inspection = elastixray::inspect(&cluster, "books", "1", &RunOptions::new())
        .await
        .unwrap();

    let expected = indoc! {r#"
        title:
           type            : text
           analyzer        : english
           sample          : "Running dogs"
           tokens          : ["run","dog"]

        title:
           type            : text
           search_analyzer : english
           sample          : "Running dogs"
           tokens          : ["run","dog"]

    "#};
    assert_eq!(
        report::render(&inspection, ReportFormat::Text).unwrap(),
        expected
    );
}
