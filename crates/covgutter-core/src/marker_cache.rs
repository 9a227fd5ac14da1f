/// Tracks which gutter lines already carry a coverage marker.
use std::collections::BTreeSet;

/// Set of zero-based line indices with a live marker in the gutter.
///
/// Entries are only ever added one by one; removal is wholesale via [`clear`](Self::clear).
#[derive(Debug, Clone, Default)]
pub struct MarkerCache {
    rendered: BTreeSet<usize>,
}

impl MarkerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_rendered(&self, line: usize) -> bool {
        self.rendered.contains(&line)
    }

    /// Records a marker on `line`. Returns false if one was already recorded.
    pub fn mark(&mut self, line: usize) -> bool {
        self.rendered.insert(line)
    }

    /// Lines in `from..to` that still need a marker.
    pub fn missing(&self, from: usize, to: usize) -> impl Iterator<Item = usize> + '_ {
        (from..to).filter(move |line| !self.rendered.contains(line))
    }

    pub fn clear(&mut self) {
        self.rendered.clear();
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }

    /// All rendered lines, sorted.
    pub fn lines(&self) -> Vec<usize> {
        self.rendered.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_once() {
        let mut cache = MarkerCache::new();
        assert!(cache.mark(3));
        assert!(!cache.mark(3));
        assert!(cache.is_rendered(3));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_skips_rendered() {
        let mut cache = MarkerCache::new();
        for line in 0..10 {
            cache.mark(line);
        }
        assert_eq!(cache.missing(5, 15).collect::<Vec<_>>(), vec![10, 11, 12, 13, 14]);
        assert_eq!(cache.missing(2, 8).count(), 0);
    }

    #[test]
    fn test_missing_empty_range() {
        let cache = MarkerCache::new();
        assert_eq!(cache.missing(4, 4).count(), 0);
        assert_eq!(cache.missing(5, 2).count(), 0);
    }

    #[test]
    fn test_lines_sorted() {
        let mut cache = MarkerCache::new();
        cache.mark(9);
        cache.mark(1);
        cache.mark(4);
        assert_eq!(cache.lines(), vec![1, 4, 9]);
    }

    #[test]
    fn test_clear_resets_all_state() {
        let mut cache = MarkerCache::new();
        cache.mark(1);
        cache.mark(2);
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.is_rendered(1));
        assert!(cache.lines().is_empty());
    }
}
