//! Captured text samples and two-column key/value tables.
//!
//! A [`Sample`] is one capture of a diagnostic source (a `SHOW STATUS`
//! dump, a process list, a schema dump...). [`KeyValueTable`] parses the
//! two-column forms (`SHOW VARIABLES`, `SHOW STATUS`) and never fails a
//! lookup: an absent key resolves to the table's default.

use serde::Serialize;

use crate::analysis::ordered::OrderedMap;

/// Ordered, immutable lines from one capture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    lines: Vec<String>,
}

impl Sample {
    /// Split raw capture text into lines (`\n` or `\r\n`).
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl From<&str> for Sample {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

/// Name → value mapping parsed from whitespace-delimited two-column lines.
///
/// The first token is the key, the rest of the line (trimmed) is the value,
/// so values with spaces such as `version_comment` survive. Later duplicate
/// keys overwrite earlier values but keep the first key's position, which
/// is the order [`KeyValueTable::iter`] yields.
#[derive(Debug, Clone, Default)]
pub struct KeyValueTable {
    entries: OrderedMap<String, String>,
    default: String,
}

impl KeyValueTable {
    /// Parse a sample; absent keys resolve to `""`.
    pub fn parse(sample: &Sample) -> Self {
        let mut table = Self::default();
        for line in sample.lines() {
            let line = line.trim();
            let Some(key) = line.split_whitespace().next() else {
                continue;
            };
            let value = line[key.len()..].trim();
            table.insert(key, value);
        }
        table
    }

    /// Set the value returned by [`KeyValueTable::lookup`] for absent keys.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    fn insert(&mut self, key: &str, value: &str) {
        *self.entries.entry(key.to_string()) = value.to_string();
    }

    /// Exact-match lookup; returns the configured default when absent.
    pub fn lookup(&self, key: &str) -> &str {
        self.get(key).unwrap_or(self.default.as_str())
    }

    /// Exact-match lookup without the default.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Lookup parsed as an unsigned integer, `0` when absent or not numeric.
    pub fn lookup_u64(&self, key: &str) -> u64 {
        self.lookup(key).parse().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One status counter observed in two samples, raw as captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterPair {
    pub name: String,
    pub first: String,
    pub second: String,
}

impl CounterPair {
    pub fn new(name: impl Into<String>, first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            first: first.into(),
            second: second.into(),
        }
    }
}

/// Join two tables of the same shape on key.
///
/// Keys follow the first table's order; keys missing from `second` are
/// dropped (inner join).
pub fn join(first: &KeyValueTable, second: &KeyValueTable) -> Vec<CounterPair> {
    first
        .iter()
        .filter_map(|(name, v1)| {
            second
                .get(name)
                .map(|v2| CounterPair::new(name, v1, v2))
        })
        .collect()
}
