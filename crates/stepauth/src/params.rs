//! Ordered store of dynamic parameter values for one authentication run.
//!
//! Keys keep their first-seen order. An empty value means "unset" and is
//! skipped by both substitution and merging. Keys are never removed.

use indexmap::IndexMap;
use serde::Serialize;

/// Dynamic parameter name -> current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterStore {
    values: IndexMap<String, String>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with every name declared and unset.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut store = Self::new();
        for name in names {
            store.declare(name);
        }
        store
    }

    /// Declare a name with an empty value. Existing values are untouched.
    pub fn declare(&mut self, name: impl Into<String>) {
        self.values.entry(name.into()).or_default();
    }

    /// Merge an extracted value.
    ///
    /// Empty values are ignored so that a previously set parameter is never
    /// cleared. Returns `true` when the store changed.
    pub fn merge(&mut self, name: &str, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        match self.values.get_mut(name) {
            Some(current) if current == value => false,
            Some(current) => {
                *current = value.to_string();
                true
            }
            None => {
                self.values.insert(name.to_string(), value.to_string());
                true
            }
        }
    }

    /// Current value of a parameter, `None` when undeclared or unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// All declared names in insertion order, set or not.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Parameters with a non-empty value, in insertion order.
    pub fn iter_set(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_names_start_unset() {
        let store = ParameterStore::with_names(["token", "sid"]);
        assert_eq!(store.len(), 2);
        assert!(store.contains("token"));
        assert!(store.get("token").is_none());
        assert_eq!(store.iter_set().count(), 0);
    }

    #[test]
    fn test_merge_ignores_empty_values() {
        let mut store = ParameterStore::new();
        assert!(store.merge("token", "abc"));
        assert!(!store.merge("token", ""));
        assert_eq!(store.get("token"), Some("abc"));
    }

    #[test]
    fn test_merge_overwrites_and_keeps_order() {
        let mut store = ParameterStore::with_names(["b", "a"]);
        store.merge("a", "1");
        store.merge("c", "3");
        store.merge("a", "2");

        let names: Vec<_> = store.names().collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert_eq!(store.get("a"), Some("2"));
        assert!(!store.merge("a", "2"));
    }

    #[test]
    fn test_declare_keeps_existing_value() {
        let mut store = ParameterStore::new();
        store.merge("sid", "xyz");
        store.declare("sid");
        assert_eq!(store.get("sid"), Some("xyz"));
    }

    #[test]
    fn test_serializes_as_object() {
        let mut store = ParameterStore::with_names(["token"]);
        store.merge("token", "abc");
        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"{"token":"abc"}"#);
    }
}
