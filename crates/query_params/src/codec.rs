//! Conversion between URL search strings and the ordered raw parameter map.
//!
//! Encoding follows `application/x-www-form-urlencoded`, the same rules browsers use for
//! `URLSearchParams`. Repeated keys are kept as ordered multi-values. The hash fragment is never
//! interpreted here; [`UrlParts`] only carries it alongside the search string.

use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::Value;

/// One raw query parameter value: a single string or a non-empty ordered list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    /// Key appeared once.
    One(String),
    /// Key appeared repeatedly, in URL order.
    Many(Vec<String>),
}

impl QueryValue {
    /// Builds a value from a list, returning `None` for an empty list.
    pub fn from_values(values: Vec<String>) -> Option<Self> {
        if values.is_empty() {
            None
        } else {
            Some(Self::Many(values))
        }
    }

    /// Returns every string carried by this value, in order.
    pub fn values(&self) -> &[String] {
        match self {
            Self::One(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    /// Returns the first value.
    pub fn first(&self) -> Option<&str> {
        self.values().first().map(String::as_str)
    }

    /// Appends another occurrence, promoting a single value to a list.
    pub fn push(&mut self, value: String) {
        match self {
            Self::One(existing) => {
                let first = std::mem::take(existing);
                *self = Self::Many(vec![first, value]);
            }
            Self::Many(values) => values.push(value),
        }
    }

    /// Order-insensitive comparison of the carried values.
    pub fn same_values(&self, other: &QueryValue) -> bool {
        let mut left = self.values().to_vec();
        let mut right = other.values().to_vec();
        if left.len() != right.len() {
            return false;
        }
        left.sort();
        right.sort();
        left == right
    }

    /// Returns the JSON shape handed to validators: a string or an array of strings.
    pub fn to_json(&self) -> Value {
        match self {
            Self::One(value) => Value::String(value.clone()),
            Self::Many(values) => Value::Array(values.iter().cloned().map(Value::String).collect()),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::One(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

/// Insertion-ordered mapping from query key to raw value.
///
/// An absent key means the parameter is not present in the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryMap {
    entries: Vec<(String, QueryValue)>,
}

impl QueryMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no parameters are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Returns whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Distinct keys in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Sets `key`, replacing any previous value in place so key order is stable.
    pub fn insert(&mut self, key: impl Into<String>, value: QueryValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Adds one more occurrence of `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => slot.push(value),
            None => self.entries.push((key, QueryValue::One(value))),
        }
    }

    /// Removes `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<QueryValue> {
        let index = self.entries.iter().position(|(existing, _)| existing == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Overlays `other` onto this map; keys not mentioned in `other` are kept.
    pub fn merge(&mut self, other: QueryMap) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    /// Returns whether `value` differs from what is stored under `key`, ignoring value order.
    pub fn changed(&self, key: &str, value: &QueryValue) -> bool {
        match self.get(key) {
            Some(existing) => !existing.same_values(value),
            None => true,
        }
    }

    /// Value equality that ignores key order and multi-value order.
    pub fn equivalent(&self, other: &QueryMap) -> bool {
        self.len() == other.len()
            && other
                .iter()
                .all(|(key, value)| !self.changed(key, value))
    }

    /// Converts the map into the JSON object handed to whole-object validators.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(key, value)| (key.to_string(), value.to_json()))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for QueryMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value.into());
        }
        map
    }
}

impl Serialize for QueryMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Parses a search string (with or without the leading `?`) into a [`QueryMap`].
pub fn decode(search: &str) -> QueryMap {
    let query = search.strip_prefix('?').unwrap_or(search);
    let mut map = QueryMap::new();
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        map.append(key.into_owned(), value.into_owned());
    }
    map
}

/// Serializes a [`QueryMap`] into a search string, `?`-prefixed, or `""` when empty.
pub fn encode(map: &QueryMap) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in map.iter() {
        for item in value.values() {
            serializer.append_pair(key, item);
        }
    }
    let query = serializer.finish();
    if query.is_empty() {
        String::new()
    } else {
        format!("?{query}")
    }
}

/// Search string and hash fragment of a URL-like location.
///
/// `search` includes the leading `?` when non-empty and `hash` the leading `#`; both are `""`
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlParts {
    /// Query string including `?`, or empty.
    pub search: String,
    /// Fragment including `#`, or empty.
    pub hash: String,
}

impl UrlParts {
    /// Builds normalized parts from raw search/hash strings.
    pub fn new(search: &str, hash: &str) -> Self {
        Self {
            search: normalize_prefixed(search, '?'),
            hash: normalize_prefixed(hash, '#'),
        }
    }

    /// Extracts search and hash from an absolute or relative href.
    pub fn parse(href: &str) -> Self {
        let (rest, hash) = match href.find('#') {
            Some(index) => href.split_at(index),
            None => (href, ""),
        };
        let search = rest.find('?').map(|index| &rest[index..]).unwrap_or("");
        Self::new(search, hash)
    }

    /// Relative href used for history writes.
    ///
    /// An empty search renders as `?` so that navigating actually drops the current query.
    pub fn href(&self) -> String {
        let search = if self.search.is_empty() {
            "?"
        } else {
            self.search.as_str()
        };
        format!("{search}{}", self.hash)
    }
}

fn normalize_prefixed(raw: &str, prefix: char) -> String {
    let body = raw.strip_prefix(prefix).unwrap_or(raw);
    if body.is_empty() {
        String::new()
    } else {
        format!("{prefix}{body}")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decode_promotes_repeated_keys_to_ordered_lists() {
        let map = decode("?id=1&sort=asc&sort=desc&sort=name");

        assert_eq!(map.get("id"), Some(&QueryValue::One("1".to_string())));
        assert_eq!(
            map.get("sort"),
            Some(&QueryValue::Many(vec![
                "asc".to_string(),
                "desc".to_string(),
                "name".to_string()
            ]))
        );
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["id", "sort"]);
    }

    #[test]
    fn decode_handles_percent_and_plus_escapes() {
        let map = decode("q=hello+world&path=%2Fdocs%2Fa%26b&flag");

        assert_eq!(map.get("q").and_then(QueryValue::first), Some("hello world"));
        assert_eq!(map.get("path").and_then(QueryValue::first), Some("/docs/a&b"));
        assert_eq!(map.get("flag").and_then(QueryValue::first), Some(""));
    }

    #[test]
    fn encode_repeats_multi_values_and_prefixes_question_mark() {
        let mut map = QueryMap::new();
        map.insert("id", "1".into());
        map.insert(
            "sort",
            QueryValue::Many(vec!["asc".to_string(), "desc".to_string()]),
        );

        assert_eq!(encode(&map), "?id=1&sort=asc&sort=desc");
        assert_eq!(encode(&QueryMap::new()), "");
    }

    #[test]
    fn encode_escapes_reserved_characters() {
        let map: QueryMap = [("q", "a b&c=d#e")].into_iter().collect();
        assert_eq!(encode(&map), "?q=a+b%26c%3Dd%23e");
        assert_eq!(decode(&encode(&map)), map);
    }

    #[test]
    fn decode_inverts_encode_preserving_key_and_value_order() {
        let mut map = QueryMap::new();
        map.insert("z", "last".into());
        map.insert(
            "a",
            QueryValue::Many(vec!["2".to_string(), "1".to_string(), "3".to_string()]),
        );
        map.insert("m", "middle".into());

        assert_eq!(decode(&encode(&map)), map);
    }

    #[test]
    fn insert_replaces_in_place_and_merge_keeps_unmentioned_keys() {
        let mut map: QueryMap = [("id", "1"), ("name", "john")].into_iter().collect();
        map.insert("id", "2".into());
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["id", "name"]);

        map.merge([("sort", "asc"), ("name", "jane")].into_iter().collect());
        assert_eq!(encode(&map), "?id=2&name=jane&sort=asc");
    }

    #[test]
    fn changed_ignores_multi_value_order() {
        let mut map = QueryMap::new();
        map.insert(
            "names",
            QueryValue::Many(vec!["john".to_string(), "jane".to_string()]),
        );

        assert!(!map.changed(
            "names",
            &QueryValue::Many(vec!["jane".to_string(), "john".to_string()])
        ));
        assert!(map.changed(
            "names",
            &QueryValue::Many(vec!["john".to_string(), "jane".to_string(), "james".to_string()])
        ));
        assert!(map.changed("missing", &"x".into()));
    }

    #[test]
    fn equivalent_ignores_key_order_and_treats_single_lists_as_scalars() {
        let left: QueryMap = [("a", "1"), ("b", "2")].into_iter().collect();
        let mut right = QueryMap::new();
        right.insert("b", QueryValue::Many(vec!["2".to_string()]));
        right.insert("a", "1".into());

        assert!(left.equivalent(&right));
        right.remove("b");
        assert!(!left.equivalent(&right));
    }

    #[test]
    fn url_parts_parse_and_href() {
        let parts = UrlParts::parse("https://example.test/list?page=2&q=x#results");
        assert_eq!(parts.search, "?page=2&q=x");
        assert_eq!(parts.hash, "#results");
        assert_eq!(parts.href(), "?page=2&q=x#results");

        let bare = UrlParts::parse("/list?#");
        assert_eq!(bare, UrlParts::default());
        assert_eq!(bare.href(), "?");
        assert_eq!(UrlParts::new("a=1", "top").href(), "?a=1#top");
    }

    #[test]
    fn raw_map_serializes_as_json_object() {
        let mut map: QueryMap = [("name", "johndoe")].into_iter().collect();
        map.append("tag", "a");
        map.append("tag", "b");

        assert_eq!(
            serde_json::to_value(&map).expect("serialize"),
            serde_json::json!({ "name": "johndoe", "tag": ["a", "b"] })
        );
        assert_eq!(map.to_json(), serde_json::json!({ "name": "johndoe", "tag": ["a", "b"] }));
    }
}
