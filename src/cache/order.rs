//! Refresh Order Module
//!
//! Tracks insertion/refresh order for the memory tier's capacity eviction.

use std::collections::VecDeque;

// == Refresh Order ==
/// FIFO-by-refresh ordering of keys.
///
/// Keys are stored in a VecDeque where:
/// - Front = most recently written
/// - Back = oldest write, first to be evicted
///
/// Only writes reorder a key; reads leave the order untouched.
#[derive(Debug, Default)]
pub struct RefreshOrder {
    order: VecDeque<String>,
}

impl RefreshOrder {
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Refresh ==
    /// Records a write of `key`, moving it to the front.
    pub fn refresh(&mut self, key: &str) {
        self.remove(key);
        self.order.push_front(key.to_string());
    }

    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }

    // == Pop Oldest ==
    /// Returns and removes the key with the oldest write.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_back()
    }

    /// Returns the key with the oldest write without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.back().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let order = RefreshOrder::new();
        assert!(order.is_empty());
        assert_eq!(order.len(), 0);
        assert_eq!(order.peek_oldest(), None);
    }

    #[test]
    fn test_first_written_is_oldest() {
        let mut order = RefreshOrder::new();

        order.refresh("product:1");
        order.refresh("product:2");
        order.refresh("product:3");

        assert_eq!(order.len(), 3);
        assert_eq!(order.peek_oldest(), Some("product:1"));
    }

    #[test]
    fn test_refresh_moves_key_to_front() {
        let mut order = RefreshOrder::new();

        order.refresh("a");
        order.refresh("b");
        order.refresh("c");
        order.refresh("a");

        assert_eq!(order.pop_oldest(), Some("b".to_string()));
        assert_eq!(order.pop_oldest(), Some("c".to_string()));
        assert_eq!(order.pop_oldest(), Some("a".to_string()));
        assert_eq!(order.pop_oldest(), None);
    }

    #[test]
    fn test_remove() {
        let mut order = RefreshOrder::new();

        order.refresh("a");
        order.refresh("b");
        order.remove("a");
        order.remove("missing");

        assert_eq!(order.len(), 1);
        assert!(!order.contains("a"));
        assert!(order.contains("b"));
    }

    #[test]
    fn test_repeated_refresh_keeps_single_slot() {
        let mut order = RefreshOrder::new();

        order.refresh("k");
        order.refresh("k");
        order.refresh("k");

        assert_eq!(order.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut order = RefreshOrder::new();
        order.refresh("a");
        order.refresh("b");
        order.clear();
        assert!(order.is_empty());
    }
}
