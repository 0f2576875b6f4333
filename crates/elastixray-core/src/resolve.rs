//! Key-path lookup inside a JSON document.

use serde_json::Value;

/// Follow `path` from `container` and return the value it reaches.
///
/// Objects are indexed by key and arrays by decimal position. Returns `None`
/// when a segment is missing, a scalar is reached before the path ends, or
/// the final value is `null`. A field absent from the sample document is
/// the normal case, so this never fails.
///
/// ```
/// use serde_json::json;
/// use elastixray_core::resolve;
///
/// let doc = json!({ "user": { "name": "Jane Doe" } });
/// assert_eq!(resolve(&doc, &["user", "name"]), Some(&json!("Jane Doe")));
/// assert_eq!(resolve(&doc, &["user", "email"]), None);
/// ```
pub fn resolve<'a, S: AsRef<str>>(container: &'a Value, path: &[S]) -> Option<&'a Value> {
    path.iter()
        .try_fold(container, |current, segment| step(current, segment.as_ref()))
        .filter(|value| !value.is_null())
}

fn step<'a>(current: &'a Value, segment: &str) -> Option<&'a Value> {
    match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
