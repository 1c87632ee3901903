//! Custom serde deserializers for flexible type handling
//!
//! The portal is not consistent about JSON scalar types: the same field can
//! arrive as a string in one response and as a number in the next.

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

/// Render a JSON scalar as a string; `None` for null and structured values
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Deserialize a scalar that can be:
/// - JSON string: kept as is
/// - Integer or float: rendered with `to_string`
/// - Boolean: `"true"` / `"false"`
/// - `null` or any structured value: `None`
pub fn deserialize_flexible_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}

/// Deserialize a nested object, treating a value of the wrong shape as absent
pub fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Deserialize a list of strings, dropping non-string entries and treating
/// anything that is not an array as absent
pub fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Inner {
        code: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(default, deserialize_with = "deserialize_lenient")]
        inner: Option<Inner>,
        #[serde(default, deserialize_with = "deserialize_flexible_string")]
        value: Option<String>,
        #[serde(default, deserialize_with = "deserialize_string_list")]
        items: Vec<String>,
    }

    #[test]
    fn test_deserialize_string() {
        let result: TestStruct = serde_json::from_value(json!({"value": "1143"})).unwrap();
        assert_eq!(result.value.as_deref(), Some("1143"));
    }

    #[test]
    fn test_deserialize_number() {
        let result: TestStruct = serde_json::from_value(json!({"value": 1143})).unwrap();
        assert_eq!(result.value.as_deref(), Some("1143"));
    }

    #[test]
    fn test_deserialize_bool() {
        let result: TestStruct = serde_json::from_value(json!({"value": true})).unwrap();
        assert_eq!(result.value.as_deref(), Some("true"));
    }

    #[test]
    fn test_deserialize_null_and_missing() {
        let result: TestStruct = serde_json::from_value(json!({"value": null})).unwrap();
        assert_eq!(result.value, None);

        let result: TestStruct = serde_json::from_value(json!({})).unwrap();
        assert_eq!(result.value, None);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_deserialize_object_is_absent() {
        let result: TestStruct = serde_json::from_value(json!({"value": {"a": 1}})).unwrap();
        assert_eq!(result.value, None);
    }

    #[test]
    fn test_deserialize_lenient() {
        let result: TestStruct =
            serde_json::from_value(json!({"inner": {"code": "100"}})).unwrap();
        assert_eq!(result.inner.unwrap().code, "100");

        let result: TestStruct = serde_json::from_value(json!({"inner": "oops"})).unwrap();
        assert!(result.inner.is_none());
    }

    #[test]
    fn test_deserialize_string_list() {
        let result: TestStruct =
            serde_json::from_value(json!({"items": ["A|01", 3, "B|02"]})).unwrap();
        assert_eq!(result.items, vec!["A|01", "B|02"]);

        let result: TestStruct = serde_json::from_value(json!({"items": "A|01"})).unwrap();
        assert!(result.items.is_empty());
    }
}
