/// Navigable view state persistence: the query parameters (`view=coverage`, ...)
/// of each opened source file survive app restarts.
///
/// Each scope (normally the source file path) maps to a bincode-encoded
/// `BTreeMap<String, String>` in a single redb table.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

/// Query parameters table: scope → bincode(`BTreeMap<String, String>`).
const VIEW_QUERY: TableDefinition<&str, &[u8]> = TableDefinition::new("view_query");

/// Persistence layer for navigable view state, backed by redb.
pub struct ViewStateStore {
    db: Database,
}

impl std::fmt::Debug for ViewStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewStateStore").finish()
    }
}

impl ViewStateStore {
    /// Returns the default state database path (next to the executable).
    pub fn state_path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|d| d.join("covgutter-state.redb")))
            .unwrap_or_else(|| PathBuf::from("covgutter-state.redb"))
    }

    /// Opens or creates the state database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)
            .with_context(|| format!("Failed to open view state database: {}", path.display()))?;

        let write_txn = db
            .begin_write()
            .context("Failed to begin initial view state write transaction")?;
        {
            let _ = write_txn
                .open_table(VIEW_QUERY)
                .context("Failed to create view_query table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initial view state transaction")?;

        Ok(Self { db })
    }

    /// Replaces the stored query for `scope`. An empty query removes the entry.
    pub fn save_query(&self, scope: &str, query: &BTreeMap<String, String>) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(VIEW_QUERY)
                .context("Failed to open view_query table")?;
            if query.is_empty() {
                table
                    .remove(scope)
                    .context("Failed to remove view query")?;
            } else {
                let bytes = bincode::serialize(query).context("Failed to serialize view query")?;
                table
                    .insert(scope, bytes.as_slice())
                    .context("Failed to insert view query")?;
            }
        }
        write_txn.commit().context("Failed to commit view query")?;
        tracing::debug!("Saved view query for {scope}: {query:?}");
        Ok(())
    }

    /// Loads the stored query for `scope` (empty when nothing was saved).
    pub fn load_query(&self, scope: &str) -> Result<BTreeMap<String, String>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(VIEW_QUERY)
            .context("Failed to open view_query table")?;

        match table.get(scope).context("Failed to read view query")? {
            Some(guard) => bincode::deserialize(guard.value())
                .context("Failed to deserialize view query"),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Wipes every stored scope.
    pub fn clear(&self) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(VIEW_QUERY)
                .context("Failed to open view_query table")?;

            let mut keys = Vec::new();
            for entry in table.iter().context("Failed to iterate view_query")? {
                let (key, _) = entry.context("Failed to read view_query entry")?;
                keys.push(key.value().to_string());
            }

            for key in &keys {
                table
                    .remove(key.as_str())
                    .with_context(|| format!("Failed to remove view query for '{key}'"))?;
            }
        }
        write_txn.commit().context("Failed to commit view state clear")?;
        Ok(())
    }
}
