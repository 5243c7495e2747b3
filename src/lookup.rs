//! Lookup module: the named string tables Lookup steps map values through.
//!
//! This module provides the LookupRegistry type and its builder.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A single lookup table. Shared between the registry and every step that uses it.
pub type LookupTable = Arc<HashMap<String, String>>;

/// Immutable set of named lookup tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupRegistry {
    tables: HashMap<String, LookupTable>,
}

impl LookupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&LookupTable> {
        self.tables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct LookupRegistryBuilder {
    tables: HashMap<String, LookupTable>,
}

impl LookupRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table<I, K, V>(mut self, name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let table = entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.tables.insert(name.into(), Arc::new(table));
        self
    }

    pub fn build(self) -> LookupRegistry {
        LookupRegistry { tables: self.tables }
    }
}

/// Maps `key` through `table`: exact key first, then its ASCII-lowercased form.
pub fn lookup_value<'t>(table: &'t HashMap<String, String>, key: &str) -> Option<&'t str> {
    if let Some(hit) = table.get(key) {
        return Some(hit.as_str());
    }
    if key.bytes().any(|b| b.is_ascii_uppercase()) {
        return table.get(&key.to_ascii_lowercase()).map(String::as_str);
    }
    None
}
