//! Navigator that persists the view query per source file.

use anyhow::{Context, Result};
use covgutter_config::ViewStateStore;
use covgutter_core::{Navigator, QueryState};

/// Keeps the current [`QueryState`] in memory and mirrors every update into a
/// [`ViewStateStore`] under `scope` (the source file path), when one is open.
pub struct StoreNavigator {
    store: Option<ViewStateStore>,
    scope: String,
    query: QueryState,
}

impl StoreNavigator {
    /// Opens the navigator for `scope`, starting from the query stored for it.
    pub fn open(store: Option<ViewStateStore>, scope: impl Into<String>) -> Self {
        let scope = scope.into();
        let query = match &store {
            Some(store) => match store.load_query(&scope) {
                Ok(map) => QueryState::from(map),
                Err(e) => {
                    tracing::warn!("Failed to load view state for '{scope}': {e:#}");
                    QueryState::new()
                }
            },
            None => QueryState::new(),
        };
        Self {
            store,
            scope,
            query,
        }
    }

    /// A navigator that persists nothing.
    pub fn in_memory(scope: impl Into<String>) -> Self {
        Self::open(None, scope)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }
}

impl Navigator for StoreNavigator {
    fn query(&self) -> QueryState {
        self.query.clone()
    }

    fn replace_query(&mut self, query: QueryState) -> Result<()> {
        if let Some(store) = &self.store {
            store
                .save_query(&self.scope, query.as_map())
                .with_context(|| format!("Failed to persist view state for '{}'", self.scope))?;
        }
        self.query = query;
        Ok(())
    }
}
