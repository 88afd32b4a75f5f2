//! Option file (`my.cnf`) pass-through.
//!
//! No interpretation: comments and blank lines are dropped, section headers
//! kept, and `key = value` lines re-aligned so two files diff cleanly.

use serde::Serialize;

use crate::sample::Sample;

const KEY_WIDTH: usize = 35;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CnfListing {
    pub lines: Vec<String>,
}

pub fn pretty_print(sample: &Sample) -> CnfListing {
    let mut lines = Vec::new();
    for line in sample.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') || line.starts_with('!') {
            lines.push(line.to_string());
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) => lines.push(format!(
                "{:<width$} = {}",
                key.trim(),
                value.trim(),
                width = KEY_WIDTH
            )),
            None => lines.push(line.to_string()),
        }
    }
    CnfListing { lines }
}
