/// Matches a source file against a coverage map.
use std::collections::{BTreeMap, BTreeSet};

use crate::{CoverageMap, LineStatus};

/// Resolved coverage of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageRecord {
    /// Coverage map key the file matched, if any.
    pub matched_key: Option<String>,
    /// The matched key, or the requested file path when nothing matched.
    pub file_name: String,
    /// Covered 1-based line numbers.
    pub covered_lines: BTreeSet<u32>,
    /// Reserved for per-line details; not filled by the resolver.
    pub coverage: BTreeMap<u32, LineStatus>,
}

impl CoverageRecord {
    /// A record with no covered lines.
    pub fn empty(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    pub fn is_matched(&self) -> bool {
        self.matched_key.is_some()
    }

    pub fn is_covered(&self, line_number: usize) -> bool {
        u32::try_from(line_number).is_ok_and(|n| self.covered_lines.contains(&n))
    }

    /// Status of a 1-based line. Anything not covered counts as uncovered,
    /// including every line of a file that matched no coverage entry.
    pub fn status_of(&self, line_number: usize) -> LineStatus {
        if self.is_covered(line_number) {
            LineStatus::Covered
        } else {
            LineStatus::Uncovered
        }
    }

    pub fn covered_count(&self) -> usize {
        self.covered_lines.len()
    }
}

/// Resolves the coverage of `file_path` in `map`.
///
/// An exact key wins. Otherwise the keys are scanned in map order for the
/// first one that equals the file's last path segment or ends with it.
/// Never fails: missing inputs or no match give an empty record.
pub fn resolve(file_path: Option<&str>, map: Option<&CoverageMap>) -> CoverageRecord {
    let (Some(file_path), Some(map)) = (file_path, map) else {
        return CoverageRecord::empty(file_path.unwrap_or_default());
    };

    let matched = match map.get(file_path) {
        Some(lines) => Some((file_path, lines)),
        None => {
            // A path ending in a separator has an empty last segment, which every key ends with.
            let file_name = base_name(file_path);
            map.iter()
                .find(|(key, _)| *key == file_name || key.ends_with(file_name))
        }
    };

    match matched {
        Some((key, lines)) => {
            tracing::debug!("Coverage for {file_path} matched key {key}");
            CoverageRecord {
                matched_key: Some(key.to_string()),
                file_name: key.to_string(),
                covered_lines: lines.iter().copied().collect(),
                coverage: BTreeMap::new(),
            }
        }
        None => {
            tracing::debug!("No coverage entry matches {file_path}");
            CoverageRecord::empty(file_path)
        }
    }
}

/// Text after the last `/` or `\`.
fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &[u32])]) -> CoverageMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect()
    }

    #[test]
    fn test_exact_match() {
        let m = map(&[("src/a.c", &[1, 3, 3]), ("a.c", &[9])]);
        let rec = resolve(Some("src/a.c"), Some(&m));
        assert_eq!(rec.matched_key.as_deref(), Some("src/a.c"));
        assert_eq!(rec.file_name, "src/a.c");
        assert_eq!(rec.covered_lines, BTreeSet::from([1, 3]));
        assert!(rec.coverage.is_empty());
    }

    #[test]
    fn test_exact_match_with_empty_lines_still_wins() {
        let m = map(&[("x/a.c", &[5]), ("/p/a.c", &[])]);
        let rec = resolve(Some("/p/a.c"), Some(&m));
        assert_eq!(rec.matched_key.as_deref(), Some("/p/a.c"));
        assert!(rec.covered_lines.is_empty());
    }

    #[test]
    fn test_bare_filename_match() {
        let m = map(&[("b.c", &[1]), ("a.c", &[2, 4])]);
        let rec = resolve(Some("/home/u/dir/a.c"), Some(&m));
        assert_eq!(rec.matched_key.as_deref(), Some("a.c"));
        assert_eq!(rec.covered_lines, BTreeSet::from([2, 4]));
    }

    #[test]
    fn test_suffix_match_uses_first_key_in_order() {
        let m = map(&[("/build/one/a.c", &[1]), ("/build/two/a.c", &[2])]);
        let rec = resolve(Some("/checkout/a.c"), Some(&m));
        assert_eq!(rec.matched_key.as_deref(), Some("/build/one/a.c"));
        assert_eq!(rec.covered_lines, BTreeSet::from([1]));
    }

    #[test]
    fn test_suffix_match_is_plain_string_suffix() {
        let m = map(&[("src/data.c", &[7])]);
        let rec = resolve(Some("lib/a.c"), Some(&m));
        // "data.c" ends with "a.c"
        assert_eq!(rec.matched_key.as_deref(), Some("src/data.c"));
    }

    #[test]
    fn test_windows_separator() {
        let m = map(&[("a.c", &[1])]);
        let rec = resolve(Some(r"C:\work\a.c"), Some(&m));
        assert_eq!(rec.matched_key.as_deref(), Some("a.c"));
    }

    #[test]
    fn test_no_match() {
        let m = map(&[("b.c", &[1])]);
        let rec = resolve(Some("a.c"), Some(&m));
        assert_eq!(rec.matched_key, None);
        assert_eq!(rec.file_name, "a.c");
        assert!(rec.covered_lines.is_empty());
        assert_eq!(rec.status_of(1), LineStatus::Uncovered);
    }

    #[test]
    fn test_trailing_separator_matches_first_key() {
        let m = map(&[("a.c", &[1]), ("b.c", &[2])]);
        let rec = resolve(Some("src/"), Some(&m));
        assert_eq!(rec.matched_key.as_deref(), Some("a.c"));
        assert_eq!(rec.status_of(1), LineStatus::Covered);
        assert_eq!(rec.status_of(2), LineStatus::Uncovered);
    }

    #[test]
    fn test_trailing_separator_with_empty_map() {
        let rec = resolve(Some("src/"), Some(&CoverageMap::new()));
        assert!(!rec.is_matched());
        assert_eq!(rec.file_name, "src/");
    }

    #[test]
    fn test_missing_inputs() {
        let m = map(&[("a.c", &[1])]);
        let rec = resolve(None, Some(&m));
        assert_eq!(rec, CoverageRecord::empty(""));

        let rec = resolve(Some("a.c"), None);
        assert_eq!(rec.file_name, "a.c");
        assert!(!rec.is_matched());
        assert!(rec.covered_lines.is_empty());
    }

    #[test]
    fn test_empty_map() {
        let rec = resolve(Some("a.c"), Some(&CoverageMap::new()));
        assert!(!rec.is_matched());
    }

    #[test]
    fn test_status_of() {
        let m = map(&[("a.c", &[2])]);
        let rec = resolve(Some("a.c"), Some(&m));
        assert_eq!(rec.status_of(1), LineStatus::Uncovered);
        assert_eq!(rec.status_of(2), LineStatus::Covered);
        assert_eq!(rec.status_of(usize::MAX), LineStatus::Uncovered);
        assert_eq!(rec.covered_count(), 1);
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("a/b/c.rs"), "c.rs");
        assert_eq!(base_name("c.rs"), "c.rs");
        assert_eq!(base_name("a/"), "");
        assert_eq!(base_name(r"a\b.rs"), "b.rs");
    }
}
