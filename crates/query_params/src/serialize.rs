//! Value serialization from typed JSON values back into raw query strings.

use std::rc::Rc;

use serde_json::{Map, Value};

use crate::codec::{encode, QueryMap, QueryValue};

/// Converts one typed value into the string stored in the URL.
///
/// This is not URI encoding; percent-encoding happens later in [`encode`].
pub type Serializer = Rc<dyn Fn(&Value) -> String>;

/// Strings pass through verbatim; every other value is JSON-encoded.
pub fn default_serializer() -> Serializer {
    Rc::new(|value: &Value| match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

/// Serializes a typed value into its raw form.
///
/// `Null` means "not present" and yields `None`. Arrays become multi-valued entries with each
/// element serialized on its own; an array with no non-null elements is also absent.
pub fn serialize_entry(serializer: &Serializer, value: &Value) -> Option<QueryValue> {
    match value {
        Value::Null => None,
        Value::Array(items) => QueryValue::from_values(
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| serializer(item))
                .collect(),
        ),
        other => Some(QueryValue::One(serializer(other))),
    }
}

/// Serializes every entry of a JSON object, dropping absent values.
pub fn serialize_object(serializer: &Serializer, object: &Map<String, Value>) -> QueryMap {
    let mut map = QueryMap::new();
    for (key, value) in object {
        if let Some(raw) = serialize_entry(serializer, value) {
            map.insert(key.clone(), raw);
        }
    }
    map
}

/// Builds the canonical search string for a typed view.
pub fn encode_typed(serializer: &Serializer, typed: &Map<String, Value>) -> String {
    encode(&serialize_object(serializer, typed))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn default_serializer_keeps_strings_and_json_encodes_the_rest() {
        let serializer = default_serializer();
        assert_eq!(serializer(&json!("plain")), "plain");
        assert_eq!(serializer(&json!(5)), "5");
        assert_eq!(serializer(&json!(true)), "true");
        assert_eq!(serializer(&json!({ "a": 1 })), "{\"a\":1}");
    }

    #[test]
    fn null_and_empty_arrays_are_absent() {
        let serializer = default_serializer();
        assert_eq!(serialize_entry(&serializer, &Value::Null), None);
        assert_eq!(serialize_entry(&serializer, &json!([])), None);
        assert_eq!(
            serialize_entry(&serializer, &json!(["a", 2])),
            Some(QueryValue::Many(vec!["a".to_string(), "2".to_string()]))
        );
    }

    #[test]
    fn encode_typed_expands_arrays_into_repeated_pairs() {
        let serializer = default_serializer();
        let typed = json!({ "count": 5, "categories": ["a", "b"], "missing": null });
        let Value::Object(typed) = typed else {
            unreachable!("literal is an object");
        };

        assert_eq!(
            encode_typed(&serializer, &typed),
            "?count=5&categories=a&categories=b"
        );
    }

    #[test]
    fn custom_serializer_is_applied_per_element() {
        let serializer: Serializer = Rc::new(|value: &Value| match value {
            Value::Bool(flag) => if *flag { "1" } else { "0" }.to_string(),
            other => other.to_string(),
        });
        assert_eq!(
            serialize_entry(&serializer, &json!([true, false])),
            Some(QueryValue::Many(vec!["1".to_string(), "0".to_string()]))
        );
    }
}
