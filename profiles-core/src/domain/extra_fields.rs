//! Additional field values supplied at account creation

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

/// Mapping from record field name to value, merged onto a new account
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtraFields(BTreeMap<String, Value>);

impl ExtraFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Insert only when `name` is not already present
    pub fn set_default(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.entry(name.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for ExtraFields {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<HashMap<String, Value>> for ExtraFields {
    fn from(map: HashMap<String, Value>) -> Self {
        map.into_iter().collect()
    }
}
