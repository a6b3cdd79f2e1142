//! Shared key-value context threaded through a run.

use std::collections::BTreeMap;

use anyhow::Context as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A required key was absent from the shared context.
///
/// Returned by [`SharedContext::require`]. When it escapes a phase action
/// (directly or inside an `anyhow::Error`), the runner reports it as
/// `RunnerError::MissingParameter` for that phase.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing key '{key}'")]
pub struct MissingKey {
    pub key: String,
}

/// Mapping from key to JSON value, mutated as each phase runs.
///
/// Keys are kept sorted so serialized output is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedContext {
    values: BTreeMap<String, Value>,
}

impl SharedContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Merge `updates` into this context. Later writes win on conflict.
    pub fn merge(&mut self, updates: SharedContext) {
        self.values.extend(updates.values);
    }

    /// Look up a key that the caller cannot proceed without.
    pub fn require(&self, key: &str) -> Result<&Value, MissingKey> {
        self.values.get(key).ok_or_else(|| MissingKey {
            key: key.to_string(),
        })
    }

    /// Look up a required key and deserialize it into `T`.
    ///
    /// An absent key surfaces as [`MissingKey`] inside the returned error so
    /// the runner can still classify it as a missing parameter.
    pub fn require_as<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<T> {
        let value = self.require(key)?;
        serde_json::from_value(value.clone()).with_context(|| format!("decode key '{}'", key))
    }

    /// Deserialize an optional key. Absent keys yield `Ok(None)`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        match self.values.get(key) {
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .with_context(|| format!("decode key '{}'", key)),
            None => Ok(None),
        }
    }

    /// Keys from `keys` that are not present, in the order given.
    pub fn missing_keys<'a, I>(&self, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        keys.into_iter()
            .filter(|key| !self.values.contains_key(key.as_str()))
            .cloned()
            .collect()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Render as a pretty-printed JSON object.
    pub fn to_json_pretty(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(&self.values).context("serialize context json")
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for SharedContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl From<BTreeMap<String, Value>> for SharedContext {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overwrites_existing_keys() {
        let mut ctx: SharedContext = [("n", json!(1)), ("keep", json!("a"))]
            .into_iter()
            .collect();
        ctx.merge([("n", json!(2)), ("new", json!(true))].into_iter().collect());

        assert_eq!(ctx.get("n"), Some(&json!(2)));
        assert_eq!(ctx.get("keep"), Some(&json!("a")));
        assert_eq!(ctx.get("new"), Some(&json!(true)));
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn require_reports_missing_key() {
        let ctx = SharedContext::new();
        let err = ctx.require("foo").expect_err("missing");
        assert_eq!(err.key, "foo");
        assert_eq!(err.to_string(), "missing key 'foo'");
    }

    #[test]
    fn require_as_keeps_missing_key_downcastable() {
        let ctx = SharedContext::new();
        let err = ctx.require_as::<i64>("n").expect_err("missing");
        let missing = err.downcast_ref::<MissingKey>().expect("missing key");
        assert_eq!(missing.key, "n");
    }

    #[test]
    fn require_as_rejects_wrong_type() {
        let mut ctx = SharedContext::new();
        ctx.insert("n", "five");
        let err = ctx.require_as::<i64>("n").expect_err("type mismatch");
        assert!(err.downcast_ref::<MissingKey>().is_none());
        assert!(format!("{:#}", err).contains("decode key 'n'"));
    }

    #[test]
    fn get_as_returns_none_for_absent_key() {
        let ctx = SharedContext::new();
        assert_eq!(ctx.get_as::<u32>("limit").expect("decode"), None);
    }

    #[test]
    fn missing_keys_preserves_declared_order() {
        let mut ctx = SharedContext::new();
        ctx.insert("b", 1);
        let declared = vec!["c".to_string(), "b".to_string(), "a".to_string()];
        assert_eq!(ctx.missing_keys(&declared), vec!["c", "a"]);
    }

    #[test]
    fn serializes_as_plain_object() {
        let ctx: SharedContext = [("n2", json!(10)), ("n", json!(5))].into_iter().collect();
        let raw = serde_json::to_string(&ctx).expect("serialize");
        assert_eq!(raw, r#"{"n":5,"n2":10}"#);
    }
}
