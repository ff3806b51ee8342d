//! Per-session log of search results

use std::collections::VecDeque;

use crate::types::SearchResult;

/// Search results for one session, newest first
#[derive(Debug, Clone, Default)]
pub struct QueryHistory {
    results: VecDeque<SearchResult>,
}

impl QueryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: SearchResult) {
        self.results.push_front(result);
    }

    pub fn results(&self) -> impl Iterator<Item = &SearchResult> {
        self.results.iter()
    }

    /// Most recent result
    pub fn latest(&self) -> Option<&SearchResult> {
        self.results.front()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first() {
        let mut history = QueryHistory::new();
        history.add(SearchResult::new("first", "a", vec![]));
        history.add(SearchResult::new("second", "b", vec![]));

        let queries: Vec<_> = history.results().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["second", "first"]);
        assert_eq!(history.latest().map(|r| r.query.as_str()), Some("second"));
    }

    #[test]
    fn test_clear() {
        let mut history = QueryHistory::new();
        history.add(SearchResult::new("q", "a", vec![]));
        assert_eq!(history.len(), 1);
        history.clear();
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }
}
