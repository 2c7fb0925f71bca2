//! Recency Map Module
//!
//! Key-value container that keeps its entries in access order.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use generational_arena::{Arena, Index};

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<Index>,
    next: Option<Index>,
}

// == Recency Map ==
/// Associative container ordered by access time.
///
/// Nodes live in an arena and form a doubly linked list:
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// Lookups go through a hash index, so every operation except iteration
/// is O(1).
pub struct RecencyMap<K, V> {
    nodes: Arena<Node<K, V>>,
    lookup: HashMap<K, Index>,
    head: Option<Index>,
    tail: Option<Index>,
}

impl<K: Eq + Hash + Clone, V> RecencyMap<K, V> {
    // == Constructor ==
    /// Creates a new empty map.
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            lookup: HashMap::new(),
            head: None,
            tail: None,
        }
    }

    fn unlink(&mut self, index: Index) {
        let (prev, next) = {
            let node = &self.nodes[index];
            (node.prev, node.next)
        };

        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_front_node(&mut self, index: Index) {
        let old_head = self.head;
        {
            let node = &mut self.nodes[index];
            node.prev = None;
            node.next = old_head;
        }
        if let Some(old_head) = old_head {
            self.nodes[old_head].prev = Some(index);
        }
        self.head = Some(index);
        if self.tail.is_none() {
            self.tail = Some(index);
        }
    }

    fn move_to_front(&mut self, index: Index) {
        if self.head != Some(index) {
            self.unlink(index);
            self.push_front_node(index);
        }
    }

    // == Touch ==
    /// Marks a key as recently used (moves to head).
    ///
    /// Returns false if the key is not present.
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.lookup.get(key).copied() {
            Some(index) => {
                self.move_to_front(index);
                true
            }
            None => false,
        }
    }

    // == Get ==
    /// Returns the value for a key and marks it as recently used.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.touch(key) {
            return None;
        }
        self.peek(key)
    }

    // == Peek ==
    /// Returns the value for a key without changing its position.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.lookup.get(key)?;
        self.nodes.get(*index).map(|node| &node.value)
    }

    /// Like [`peek`](Self::peek), but also returns the stored key.
    pub fn peek_entry<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.lookup.get(key)?;
        self.nodes.get(*index).map(|node| (&node.key, &node.value))
    }

    // == Contains ==
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup.contains_key(key)
    }

    // == Insert Or Replace ==
    /// Inserts a value as the most recently used entry.
    ///
    /// If the key was already present its value is swapped in place and the
    /// displaced value is returned.
    pub fn insert_or_replace(&mut self, key: K, value: V) -> Option<V> {
        if let Some(index) = self.lookup.get(&key).copied() {
            let previous = std::mem::replace(&mut self.nodes[index].value, value);
            self.move_to_front(index);
            return Some(previous);
        }

        let index = self.nodes.insert(Node {
            key: key.clone(),
            value,
            prev: None,
            next: None,
        });
        self.lookup.insert(key, index);
        self.push_front_node(index);
        None
    }

    // == Remove Exact ==
    /// Removes a specific key, returning the stored key and value.
    pub fn remove_exact<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.lookup.remove(key)?;
        self.unlink(index);
        self.nodes.remove(index).map(|node| (node.key, node.value))
    }

    // == Remove Least Recently Used ==
    /// Returns and removes the entry at the tail.
    ///
    /// Returns None if the map is empty.
    pub fn remove_least_recently_used(&mut self) -> Option<(K, V)> {
        let index = self.tail?;
        self.unlink(index);
        let node = self.nodes.remove(index)?;
        self.lookup.remove(&node.key);
        Some((node.key, node.value))
    }

    // == Peek Least Recently Used ==
    /// Returns the next eviction candidate without removing it.
    pub fn peek_least_recently_used(&self) -> Option<(&K, &V)> {
        let node = self.nodes.get(self.tail?)?;
        Some((&node.key, &node.value))
    }

    // == Length ==
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    // == Iter ==
    /// Iterates entries from least to most recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            cursor: self.tail,
            remaining: self.len(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RecencyMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut cursor = self.tail;
        while let Some(node) = cursor.and_then(|index| self.nodes.get(index)) {
            list.entry(&(&node.key, &node.value));
            cursor = node.prev;
        }
        list.finish()
    }
}

// == Iterator ==
/// Iterator over a [`RecencyMap`], least recently used first.
pub struct Iter<'a, K, V> {
    nodes: &'a Arena<Node<K, V>>,
    cursor: Option<Index>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cursor?)?;
        self.cursor = node.prev;
        self.remaining = self.remaining.saturating_sub(1);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(map: &RecencyMap<String, u32>) -> Vec<String> {
        map.iter().map(|(k, _)| k.clone()).collect()
    }

    fn map_with(keys: &[&str]) -> RecencyMap<String, u32> {
        let mut map = RecencyMap::new();
        for (i, key) in keys.iter().enumerate() {
            map.insert_or_replace(key.to_string(), i as u32);
        }
        map
    }

    #[test]
    fn test_map_new() {
        let map: RecencyMap<String, u32> = RecencyMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert!(map.peek_least_recently_used().is_none());
    }

    #[test]
    fn test_insert_orders_oldest_first() {
        let map = map_with(&["key1", "key2", "key3"]);

        assert_eq!(map.len(), 3);
        assert_eq!(keys(&map), vec!["key1", "key2", "key3"]);
        let (oldest, _) = map.peek_least_recently_used().unwrap();
        assert_eq!(oldest, "key1");
    }

    #[test]
    fn test_touch_existing_key() {
        let mut map = map_with(&["key1", "key2", "key3"]);

        // Touch key1 again - should move to head
        assert!(map.touch("key1"));

        assert_eq!(map.len(), 3);
        assert_eq!(keys(&map), vec!["key2", "key3", "key1"]);
    }

    #[test]
    fn test_touch_missing_key() {
        let mut map = map_with(&["key1"]);
        assert!(!map.touch("nope"));
        assert_eq!(keys(&map), vec!["key1"]);
    }

    #[test]
    fn test_get_moves_to_head_and_peek_does_not() {
        let mut map = map_with(&["a", "b", "c"]);

        assert_eq!(map.peek("a"), Some(&0));
        assert_eq!(keys(&map), vec!["a", "b", "c"]);

        assert_eq!(map.get("a"), Some(&0));
        assert_eq!(keys(&map), vec!["b", "c", "a"]);

        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_insert_or_replace_returns_previous() {
        let mut map = map_with(&["a", "b"]);

        let previous = map.insert_or_replace("a".to_string(), 42);

        assert_eq!(previous, Some(0));
        assert_eq!(map.len(), 2);
        assert_eq!(map.peek("a"), Some(&42));
        assert_eq!(keys(&map), vec!["b", "a"]);
    }

    #[test]
    fn test_remove_least_recently_used() {
        let mut map = map_with(&["key1", "key2", "key3"]);

        assert_eq!(
            map.remove_least_recently_used(),
            Some(("key1".to_string(), 0))
        );
        assert_eq!(map.len(), 2);

        assert_eq!(
            map.remove_least_recently_used(),
            Some(("key2".to_string(), 1))
        );
        assert_eq!(map.len(), 1);
        assert!(!map.contains("key2"));
    }

    #[test]
    fn test_remove_least_recently_used_empty() {
        let mut map: RecencyMap<String, u32> = RecencyMap::new();
        assert_eq!(map.remove_least_recently_used(), None);
    }

    #[test]
    fn test_remove_exact() {
        let mut map = map_with(&["key1", "key2", "key3"]);

        assert_eq!(map.remove_exact("key2"), Some(("key2".to_string(), 1)));
        assert_eq!(map.remove_exact("key2"), None);

        assert_eq!(map.len(), 2);
        assert_eq!(keys(&map), vec!["key1", "key3"]);
    }

    #[test]
    fn test_remove_head_and_tail_keeps_links() {
        let mut map = map_with(&["a", "b", "c"]);

        map.remove_exact("c");
        map.remove_exact("a");
        assert_eq!(keys(&map), vec!["b"]);

        map.insert_or_replace("d".to_string(), 3);
        assert_eq!(keys(&map), vec!["b", "d"]);
        assert_eq!(map.remove_least_recently_used().map(|(k, _)| k), Some("b".to_string()));
        assert_eq!(map.remove_least_recently_used().map(|(k, _)| k), Some("d".to_string()));
        assert!(map.is_empty());
    }

    #[test]
    fn test_order_after_multiple_touches() {
        let mut map = map_with(&["a", "b", "c"]);

        map.touch("a");
        map.touch("c");
        map.touch("b");

        assert_eq!(keys(&map), vec!["a", "c", "b"]);
        let drained: Vec<String> = std::iter::from_fn(|| map.remove_least_recently_used())
            .map(|(k, _)| k)
            .collect();
        assert_eq!(drained, vec!["a", "c", "b"]);
    }
}
