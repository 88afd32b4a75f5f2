//! Instance overview: a handful of facts from the variables and status
//! tables, rendered as name/value lines.

use serde::Serialize;

use crate::fmt::{format_duration, fuzzy_percent, fuzzy_round};
use crate::sample::KeyValueTable;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fact {
    pub name: String,
    pub value: String,
}

impl Fact {
    fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
        }
    }
}

/// Build the overview facts.
///
/// `variables` and `status` are looked up with their defaults, so a
/// missing variable yields an empty or zero fact instead of an error.
pub fn summarize(variables: &KeyValueTable, status: &KeyValueTable, processes: usize) -> Vec<Fact> {
    let version = format!(
        "{} {}",
        variables.lookup("version"),
        variables.lookup("version_comment")
    );
    let max_connections = variables.lookup_u64("max_connections");
    let max_used = status.lookup_u64("Max_used_connections");
    let threads = format!(
        "{} connected, {} running",
        fuzzy_round(status.lookup_u64("Threads_connected") as f64) as u64,
        fuzzy_round(status.lookup_u64("Threads_running") as f64) as u64,
    );

    vec![
        Fact::new("Version", version.trim()),
        Fact::new("Uptime", format_duration(status.lookup_u64("Uptime"))),
        Fact::new("Datadir", variables.lookup("datadir")),
        Fact::new(
            "Processes",
            (fuzzy_round(processes as f64) as u64).to_string(),
        ),
        Fact::new(
            "Connections",
            format!(
                "{} of {} ({})",
                fuzzy_round(max_used as f64) as u64,
                max_connections,
                fuzzy_percent(max_used as f64, max_connections as f64)
            ),
        ),
        Fact::new("Threads", threads),
        Fact::new("Binlog format", variables.lookup("binlog_format")),
        Fact::new("Read only", variables.lookup("read_only")),
    ]
}
