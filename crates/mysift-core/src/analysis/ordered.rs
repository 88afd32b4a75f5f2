//! Insertion-ordered maps for grouping tables built during a scan.
//!
//! Keys are remembered in first-seen order; rendering either walks that
//! order or sorts explicitly, never depends on hash order.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use serde::ser::{Serialize, SerializeMap, Serializer};

#[derive(Debug, Clone)]
pub struct OrderedMap<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, V: Default> OrderedMap<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `key` if unseen and returns its value.
    pub fn entry(&mut self, key: K) -> &mut V {
        let pos = match self.index.get(&key) {
            Some(&pos) => pos,
            None => {
                let pos = self.entries.len();
                self.index.insert(key.clone(), pos);
                self.entries.push((key, V::default()));
                pos
            }
        };
        &mut self.entries[pos].1
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Entries in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Keys in discovery order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Serialize, V: Serialize> Serialize for OrderedMap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Counts keyed by (row, column), both remembered in discovery order.
///
/// Absent combinations read as zero.
#[derive(Debug, Clone, Default)]
pub struct CountGrid {
    rows: OrderedMap<String, OrderedMap<String, u64>>,
    columns: OrderedMap<String, ()>,
}

impl CountGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid with columns pre-registered in the given order.
    pub fn with_columns(columns: &[&str]) -> Self {
        let mut grid = Self::default();
        for column in columns {
            grid.columns.entry((*column).to_string());
        }
        grid
    }

    /// Registers `row` without counting anything.
    pub fn add_row(&mut self, row: &str) {
        if !self.rows.contains_key(row) {
            self.rows.entry(row.to_string());
        }
    }

    pub fn increment(&mut self, row: &str, column: &str) {
        self.columns.entry(column.to_string());
        *self
            .rows
            .entry(row.to_string())
            .entry(column.to_string()) += 1;
    }

    pub fn get(&self, row: &str, column: &str) -> u64 {
        self.rows
            .get(row)
            .and_then(|cols| cols.get(column))
            .copied()
            .unwrap_or(0)
    }

    /// Rows in discovery order.
    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    /// Rows sorted lexicographically.
    pub fn sorted_rows(&self) -> Vec<&str> {
        let mut rows: Vec<&str> = self.rows().collect();
        rows.sort_unstable();
        rows
    }

    /// Columns in discovery order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Serialize for CountGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}
