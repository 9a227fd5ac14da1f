/// Navigable view state: query parameters such as `view=coverage`.
use std::collections::BTreeMap;

use anyhow::Result;

/// Query key holding the active view.
pub const VIEW_KEY: &str = "view";
/// Value of [`VIEW_KEY`] while coverage view is active.
pub const COVERAGE_VIEW: &str = "coverage";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState(BTreeMap<String, String>);

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Copy of `self` with `key` set to `value`, or removed when `value` is `None`.
    pub fn merged(&self, key: &str, value: Option<&str>) -> Self {
        let mut next = self.0.clone();
        match value {
            Some(value) => {
                next.insert(key.to_string(), value.to_string());
            }
            None => {
                next.remove(key);
            }
        }
        Self(next)
    }

    pub fn is_coverage_view(&self) -> bool {
        self.get(VIEW_KEY) == Some(COVERAGE_VIEW)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl From<BTreeMap<String, String>> for QueryState {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl From<QueryState> for BTreeMap<String, String> {
    fn from(query: QueryState) -> Self {
        query.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Store of the application's navigable state.
///
/// Updates are fire-and-forget for the coverage view: an `Err` is logged and dropped.
pub trait Navigator {
    fn query(&self) -> QueryState;

    fn replace_query(&mut self, query: QueryState) -> Result<()>;
}

/// In-memory navigator that records every accepted update.
#[derive(Debug, Clone, Default)]
pub struct MemoryNavigator {
    query: QueryState,
    replacements: usize,
}

impl MemoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(query: QueryState) -> Self {
        Self {
            query,
            replacements: 0,
        }
    }

    /// Number of successful `replace_query` calls.
    pub fn replacements(&self) -> usize {
        self.replacements
    }
}

impl Navigator for MemoryNavigator {
    fn query(&self) -> QueryState {
        self.query.clone()
    }

    fn replace_query(&mut self, query: QueryState) -> Result<()> {
        self.query = query;
        self.replacements += 1;
        Ok(())
    }
}
