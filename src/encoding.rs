//! Flattening of nested call parameters into URL query items.

use crate::query::{PropertyOperator, SELECT_KEY};
use serde_json::{Map, Value};

/// Render a JSON value the way it appears in a query string.
///
/// Strings are used as-is; everything else uses its JSON text.
pub fn value_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Turn a parameter mapping into an ordered list of query items.
///
/// - a nested mapping emits `key[sub]=value` per entry, and `key[sub][i]=value`
///   per element for list operators (`$in`, `$nin`) holding strings
/// - `$select` holding strings emits `$select[i]=value` per element
/// - everything else emits `key=value`
///
/// Top-level keys keep the mapping's iteration order and list elements keep
/// their position.
pub fn encode_parameters(parameters: &Map<String, Value>) -> Vec<(String, String)> {
    let mut items = Vec::new();

    for (key, value) in parameters {
        match value {
            Value::Object(nested) => encode_nested(key, nested, &mut items),
            Value::Array(list) if key == SELECT_KEY => match string_list(list) {
                Some(strings) => items.extend(
                    strings
                        .into_iter()
                        .enumerate()
                        .map(|(index, s)| (format!("{}[{}]", key, index), s.to_string())),
                ),
                None => items.push((key.clone(), value_string(value))),
            },
            _ => items.push((key.clone(), value_string(value))),
        }
    }

    items
}

fn encode_nested(key: &str, nested: &Map<String, Value>, items: &mut Vec<(String, String)>) {
    for (sub_key, value) in nested {
        let is_array_field =
            PropertyOperator::from_key(sub_key).is_some_and(PropertyOperator::is_array);

        if !is_array_field {
            items.push((format!("{}[{}]", key, sub_key), value_string(value)));
            continue;
        }

        // array fields that do not hold strings are dropped
        let Some(strings) = value.as_array().and_then(|list| string_list(list)) else {
            tracing::trace!(key, sub_key = sub_key.as_str(), "skipping non-string list parameter");
            continue;
        };

        items.extend(
            strings
                .into_iter()
                .enumerate()
                .map(|(index, s)| (format!("{}[{}][{}]", key, sub_key, index), s.to_string())),
        );
    }
}

fn string_list(list: &[Value]) -> Option<Vec<&str>> {
    list.iter().map(Value::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Query, SortOrder};
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_select_is_indexed() {
        let items = encode_parameters(&params(json!({"$select": ["name", "age"]})));
        assert_eq!(items, pairs(&[("$select[0]", "name"), ("$select[1]", "age")]));
    }

    #[test]
    fn test_array_field_is_indexed() {
        let items = encode_parameters(&params(json!({"role": {"$in": ["a", "b", "c"]}})));
        assert_eq!(
            items,
            pairs(&[("role[$in][0]", "a"), ("role[$in][1]", "b"), ("role[$in][2]", "c")])
        );
    }

    #[test]
    fn test_single_value_field() {
        let items = encode_parameters(&params(json!({"$sort": {"name": 1}, "age": {"$gt": 18}})));
        assert_eq!(items, pairs(&[("$sort[name]", "1"), ("age[$gt]", "18")]));
    }

    #[test]
    fn test_array_field_without_strings_is_skipped() {
        let items = encode_parameters(&params(json!({
            "age": {"$in": [1, 2], "$lt": 65},
            "name": {"$nin": "bob"}
        })));
        assert_eq!(items, pairs(&[("age[$lt]", "65")]));
    }

    #[test]
    fn test_plain_values() {
        let items = encode_parameters(&params(json!({
            "$limit": 10,
            "name": "bob",
            "active": false,
            "tags": ["x", "y"]
        })));
        assert_eq!(
            items,
            pairs(&[
                ("$limit", "10"),
                ("name", "bob"),
                ("active", "false"),
                ("tags", r#"["x","y"]"#)
            ])
        );
    }

    #[test]
    fn test_encode_serialized_query() {
        let query = Query::new()
            .limit(2)
            .sort("createdAt", SortOrder::Descending)
            .select(["id"])
            .not_in("status", ["archived"]);

        let items = encode_parameters(&query.serialize());
        assert_eq!(
            items,
            pairs(&[
                ("$limit", "2"),
                ("$sort[createdAt]", "-1"),
                ("$select[0]", "id"),
                ("status[$nin][0]", "archived")
            ])
        );
    }

    #[test]
    fn test_value_string() {
        assert_eq!(value_string(&json!("a b")), "a b");
        assert_eq!(value_string(&json!(1.5)), "1.5");
        assert_eq!(value_string(&Value::Null), "null");
    }
}
