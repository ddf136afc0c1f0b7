//! JSON strategy: a dotted field path evaluated against the parsed body.
//!
//! Paths are data, never code. `data.token` walks objects, a numeric
//! segment such as `items.0.id` indexes arrays. Segments may only contain
//! ASCII letters, digits, `_`, `$` and `-`; any other path is rejected.

use serde_json::Value;

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Parse a dotted path. `None` for empty or disallowed paths.
pub fn parse_path(path: &str) -> Option<Vec<PathSegment>> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }

    path.split('.')
        .map(|seg| {
            let valid = !seg.is_empty()
                && seg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '-'));
            if !valid {
                return None;
            }
            Some(match seg.parse::<usize>() {
                Ok(i) => PathSegment::Index(i),
                Err(_) => PathSegment::Field(seg.to_string()),
            })
        })
        .collect()
}

/// Resolve `path` in a JSON body.
///
/// Strings are returned as-is, numbers and booleans as their text. Null,
/// objects, arrays, missing fields and unparseable bodies give `None`.
pub fn from_json(body: &str, path: &str) -> Option<String> {
    let segments = parse_path(path)?;
    let root: Value = serde_json::from_str(body.trim()).ok()?;
    resolve(&root, &segments).and_then(scalar_text)
}

fn resolve<'a>(value: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(value);
    };

    let next = match (first, value) {
        (PathSegment::Field(name), Value::Object(map)) => map.get(name),
        (PathSegment::Index(i), Value::Array(items)) => items.get(*i),
        // Numeric keys on objects, e.g. {"0": ...}.
        (PathSegment::Index(i), Value::Object(map)) => map.get(&i.to_string()),
        _ => None,
    }?;

    resolve(next, rest)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
