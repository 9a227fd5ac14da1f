//! Coverage map: file identifier → covered (1-based) line numbers.
//!
//! Keys keep their insertion order, which for JSON input is document order.
//! The resolver's filename fallback scans keys in this order, so the first
//! matching entry of the source file wins.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::formats::{gcov, lcov};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageMap {
    entries: Vec<(String, Vec<u32>)>,
    index: HashMap<String, usize>,
}

impl CoverageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the lines of `key`. A replaced key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, lines: Vec<u32>) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = lines,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, lines));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[u32]> {
        self.index
            .get(key)
            .map(|&pos| self.entries[pos].1.as_slice())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u32])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct covered lines over all files.
    pub fn total_covered_lines(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, lines)| lines.iter().collect::<BTreeSet<_>>().len())
            .sum()
    }

    /// Merges `other` into `self`. Lines of a shared key become the sorted union.
    pub fn merge(&mut self, other: CoverageMap) {
        for (key, lines) in other.entries {
            let merged: BTreeSet<u32> = match self.get(&key) {
                Some(existing) => existing.iter().copied().chain(lines).collect(),
                None => lines.into_iter().collect(),
            };
            self.insert(key, merged.into_iter().collect());
        }
    }

    /// Parses a JSON object of the form `{"path/to/file.c": [1, 2, 3]}`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid coverage JSON")
    }

    /// Serializes with sorted keys and sorted, deduplicated lines.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize coverage map")
    }

    /// Loads a coverage map, picking the reader from the file extension:
    /// `.info` → lcov tracefile, `.gcov` → gcov text output, anything else → JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read coverage file: {}", path.display()))?;
        let map = match path.extension().and_then(|e| e.to_str()) {
            Some("info") => lcov::parse(&text),
            Some("gcov") => gcov::parse(&text),
            _ => Self::from_json_str(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
        };
        tracing::info!(
            "Loaded coverage for {} file(s), {} covered line(s) from {}",
            map.len(),
            map.total_covered_lines(),
            path.display()
        );
        Ok(map)
    }
}

impl FromIterator<(String, Vec<u32>)> for CoverageMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<u32>)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, lines) in iter {
            map.insert(key, lines);
        }
        map
    }
}

impl Serialize for CoverageMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let sorted: BTreeMap<&str, BTreeSet<u32>> = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.iter().copied().collect()))
            .collect();
        sorted.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CoverageMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CoverageMapVisitor;

        impl<'de> Visitor<'de> for CoverageMapVisitor {
            type Value = CoverageMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping file paths to arrays of line numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CoverageMap, A::Error> {
                let mut map = CoverageMap::new();
                while let Some((key, lines)) = access.next_entry::<String, Vec<u32>>()? {
                    map.insert(key, lines);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(CoverageMapVisitor)
    }
}
