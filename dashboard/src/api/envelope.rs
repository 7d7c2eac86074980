use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::model::Page;

/// Keys the backend uses to wrap list payloads, depending on the endpoint.
pub const LIST_KEYS: [&str; 6] = ["items", "results", "articles", "brands", "prompts", "categories"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListShape {
    /// A bare JSON array.
    Bare,
    /// An object holding the array under the given key.
    Wrapped(&'static str),
}

/// Decide which shape a list response has. Objects with none of the known
/// keys, or more than one of them, are rejected instead of guessed at.
pub fn classify(endpoint: &str, value: &Value) -> Result<ListShape> {
    match value {
        Value::Array(_) => Ok(ListShape::Bare),
        Value::Object(map) => {
            let mut found = LIST_KEYS
                .iter()
                .copied()
                .filter(|k| map.get(*k).map(Value::is_array).unwrap_or(false));
            match (found.next(), found.next()) {
                (Some(key), None) => Ok(ListShape::Wrapped(key)),
                _ => Err(unknown_shape(endpoint, value)),
            }
        }
        _ => Err(unknown_shape(endpoint, value)),
    }
}

pub fn decode_list<T: DeserializeOwned>(endpoint: &str, value: Value) -> Result<Page<T>> {
    let shape = classify(endpoint, &value)?;
    let (items, meta) = match (shape, value) {
        (ListShape::Bare, Value::Array(items)) => (items, None),
        (ListShape::Wrapped(key), Value::Object(mut map)) => {
            let items = match map.remove(key) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            (items, Some(map))
        }
        (_, other) => return Err(unknown_shape(endpoint, &other)),
    };

    let items: Vec<T> = items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<std::result::Result<_, _>>()
        .map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })?;

    let number = |key: &str| {
        meta.as_ref()
            .and_then(|m| m.get(key))
            .and_then(Value::as_u64)
    };
    let total = number("total").unwrap_or(items.len() as u64);
    let page = number("page").unwrap_or(1) as u32;
    let page_size = number("page_size").unwrap_or(items.len() as u64) as u32;

    Ok(Page {
        items,
        total,
        page,
        page_size,
    })
}

fn unknown_shape(endpoint: &str, value: &Value) -> ApiError {
    let keys = match value {
        Value::Object(map) => map.keys().cloned().collect::<Vec<_>>().join(", "),
        Value::Null => "null".to_string(),
        other => format!("<{}>", type_name(other)),
    };
    ApiError::UnknownShape {
        endpoint: endpoint.to_string(),
        keys,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct Item {
        id: u32,
    }

    #[test]
    fn bare_array_and_wrapped_object_decode_the_same() {
        let bare: Page<Item> = decode_list("/x", json!([{"id": 1}, {"id": 2}])).unwrap();
        let wrapped: Page<Item> =
            decode_list("/x", json!({"results": [{"id": 1}, {"id": 2}]})).unwrap();
        assert_eq!(bare.items, wrapped.items);
        assert_eq!(bare.total, 2);
    }

    #[test]
    fn pagination_fields_are_kept() {
        let page: Page<Item> = decode_list(
            "/brands",
            json!({"brands": [{"id": 7}], "total": 41, "page": 3, "page_size": 20}),
        )
        .unwrap();
        assert_eq!(page.items, vec![Item { id: 7 }]);
        assert_eq!((page.total, page.page, page.page_size), (41, 3, 20));
    }

    #[test]
    fn object_without_known_key_is_unknown_shape() {
        let err = decode_list::<Item>("/x", json!({"data": []})).unwrap_err();
        match err {
            ApiError::UnknownShape { keys, .. } => assert_eq!(keys, "data"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ambiguous_object_is_rejected() {
        let value = json!({"items": [], "results": []});
        assert!(matches!(
            classify("/x", &value),
            Err(ApiError::UnknownShape { .. })
        ));
    }

    #[test]
    fn scalar_is_unknown_shape() {
        assert!(matches!(
            classify("/x", &json!("oops")),
            Err(ApiError::UnknownShape { .. })
        ));
    }

    #[test]
    fn bad_element_is_a_decode_error() {
        let err = decode_list::<Item>("/x", json!([{"id": "one"}])).unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }
}
