//! Path expressions for envelope assertions.
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `data.list` | object field |
//! | `list[2]` | array element |
//! | `list[*]` | every element; the rest of the path is applied to each |
//! | `len()` / `size()` | element, field or character count |
//! | `keys()` | sorted field names of an object |
//!
//! `data.list[*].keys()` therefore yields the field set of every listed item.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    Field(String),
    Index(usize),
    Each,
    Len,
    Keys,
}

/// Split `path` into tokens.
///
/// # Panics
///
/// On an unclosed bracket or a bad index; paths are written by test authors.
pub fn tokenize_path(path: &str) -> Vec<PathToken> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .flat_map(|segment| tokenize_segment(segment, path))
        .collect()
}

fn tokenize_segment(segment: &str, path: &str) -> Vec<PathToken> {
    match segment {
        "len()" | "size()" => return vec![PathToken::Len],
        "keys()" => return vec![PathToken::Keys],
        _ => {}
    }
    let (field, mut brackets) = match segment.split_once('[') {
        Some((field, rest)) => (field, Some(rest)),
        None => (segment, None),
    };
    let mut tokens = Vec::new();
    if !field.is_empty() {
        tokens.push(PathToken::Field(field.to_string()));
    }
    while let Some(rest) = brackets {
        let (inner, tail) = rest
            .split_once(']')
            .unwrap_or_else(|| panic!("unclosed bracket in path {path:?}"));
        tokens.push(match inner {
            "*" => PathToken::Each,
            n => PathToken::Index(
                n.parse()
                    .unwrap_or_else(|_| panic!("bad index {n:?} in path {path:?}")),
            ),
        });
        brackets = tail.strip_prefix('[');
    }
    tokens
}

/// Resolve `path` against `root`; missing fields and indices resolve to `null`.
pub fn resolve_path(root: &Value, path: &str) -> Value {
    resolve_tokens(root, &tokenize_path(path), path)
}

fn resolve_tokens(current: &Value, tokens: &[PathToken], path: &str) -> Value {
    let Some((token, rest)) = tokens.split_first() else {
        return current.clone();
    };
    match token {
        PathToken::Field(name) => match current.get(name) {
            Some(next) => resolve_tokens(next, rest, path),
            None => Value::Null,
        },
        PathToken::Index(idx) => match current.get(*idx) {
            Some(next) => resolve_tokens(next, rest, path),
            None => Value::Null,
        },
        PathToken::Each => match current {
            Value::Array(items) => items
                .iter()
                .map(|item| resolve_tokens(item, rest, path))
                .collect(),
            other => panic!("[*] applied to non-array in {path:?}: {other}"),
        },
        PathToken::Len => {
            let len = match current {
                Value::Array(a) => a.len(),
                Value::Object(o) => o.len(),
                Value::String(s) => s.chars().count(),
                other => panic!("len() applied to non-collection in {path:?}: {other}"),
            };
            resolve_tokens(&Value::from(len), rest, path)
        }
        PathToken::Keys => {
            let Value::Object(map) = current else {
                panic!("keys() applied to non-object in {path:?}: {current}");
            };
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            resolve_tokens(&Value::from_iter(keys.into_iter().cloned()), rest, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wildcard_projects_over_items() {
        let v = json!({"list": [{"b": 1, "a": 2}, {"a": 3}]});
        assert_eq!(resolve_path(&v, "list[*].a"), json!([2, 3]));
        assert_eq!(resolve_path(&v, "list[*].keys()"), json!([["a", "b"], ["a"]]));
        assert_eq!(resolve_path(&v, "list[*].len()"), json!([2, 1]));
    }

    #[test]
    fn len_counts_characters() {
        assert_eq!(resolve_path(&json!({"area": "北京"}), "area.len()"), json!(2));
    }

    #[test]
    #[should_panic(expected = "unclosed bracket")]
    fn unclosed_bracket_panics() {
        tokenize_path("list[0");
    }
}
