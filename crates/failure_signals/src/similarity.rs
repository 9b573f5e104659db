//! Parameter similarity used to tell "the same attempt again" from a genuinely different call.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

/// Jaccard index of the token sets of two parameter objects, in `[0, 1]`.
///
/// Missing parameters count as an empty object; two empty token sets are identical.
pub fn param_similarity(a: Option<&Map<String, Value>>, b: Option<&Map<String, Value>>) -> f64 {
    let left = param_tokens(a);
    let right = param_tokens(b);
    if left.is_empty() && right.is_empty() {
        return 1.0;
    }
    let shared = left.intersection(&right).count();
    let total = left.union(&right).count();
    shared as f64 / total as f64
}

/// Every leaf yields `path=value`; string leaves additionally yield one `path~word` per
/// lower-cased word, so near-identical strings still overlap.
pub fn param_tokens(params: Option<&Map<String, Value>>) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    if let Some(params) = params {
        for (key, value) in params {
            collect(key, value, &mut tokens);
        }
    }
    tokens
}

fn collect(path: &str, value: &Value, tokens: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                collect(&format!("{path}.{key}"), nested, tokens);
            }
        }
        Value::Array(items) => {
            for (idx, nested) in items.iter().enumerate() {
                collect(&format!("{path}[{idx}]"), nested, tokens);
            }
        }
        Value::String(text) => {
            tokens.insert(format!("{path}={text}"));
            for word in text
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty())
            {
                tokens.insert(format!("{path}~{}", word.to_lowercase()));
            }
        }
        other => {
            tokens.insert(format!("{path}={other}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn identical_params_are_fully_similar() {
        let a = obj(json!({"q": "x", "limit": 5}));
        assert_eq!(param_similarity(Some(&a), Some(&a)), 1.0);
        assert_eq!(param_similarity(None, Some(&Map::new())), 1.0);
    }

    #[test]
    fn disjoint_params_score_zero() {
        let a = obj(json!({"q": "x"}));
        let b = obj(json!({"path": "/etc"}));
        assert_eq!(param_similarity(Some(&a), Some(&b)), 0.0);
        assert_eq!(param_similarity(Some(&a), None), 0.0);
    }

    #[test]
    fn small_string_edits_keep_word_overlap() {
        let a = obj(json!({
            "cmd": "cargo test --workspace --all-features",
            "cwd": "/repo",
            "env": "ci"
        }));
        let b = obj(json!({
            "cmd": "cargo test --workspace --all-features --quiet",
            "cwd": "/repo",
            "env": "ci"
        }));
        let score = param_similarity(Some(&a), Some(&b));
        assert!(score > 0.7, "score was {score}");
        assert!(score < 1.0);
    }

    #[test]
    fn nested_values_are_flattened_by_path() {
        let tokens = param_tokens(Some(&obj(json!({"opts": {"flags": ["-v", 2]}}))));
        assert!(tokens.contains("opts.flags[0]=-v"));
        assert!(tokens.contains("opts.flags[0]~v"));
        assert!(tokens.contains("opts.flags[1]=2"));
    }
}
