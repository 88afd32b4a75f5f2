//! Process list parsing and grouping.
//!
//! Input is the vertical form of `SHOW FULL PROCESSLIST\G`:
//!
//! ```text
//! *************************** 1. row ***************************
//!      Id: 7
//!    User: app
//!    Host: 10.0.0.5:51234
//!      db: shop
//! Command: Query
//!    Time: 3
//!   State: executing
//!    Info: SELECT ...
//! ```
//!
//! Each record ends at its `Info:` line.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::fmt::truncate_chars;
use crate::sample::Sample;

/// Group keys are cut to this many characters.
const MAX_GROUP_KEY_CHARS: usize = 30;

/// One session from the process list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pub command: String,
    pub user: String,
    pub host: String,
    pub db: String,
    pub state: String,
    /// Seconds in the current state.
    pub time: u64,
    pub info: String,
}

impl ProcessRecord {
    fn set(&mut self, field: &str, value: &str) {
        match field {
            "Command" => self.command = value.to_string(),
            "User" => self.user = value.to_string(),
            "Host" => self.host = value.to_string(),
            "db" => self.db = value.to_string(),
            "State" => self.state = value.to_string(),
            "Time" => {
                self.time = value.parse().unwrap_or_else(|_| {
                    debug!(value, "non-numeric process Time, using 0");
                    0
                })
            }
            "Info" => self.info = value.to_string(),
            _ => {}
        }
    }

    /// Value of the grouping attribute.
    pub fn attribute(&self, group_by: GroupBy) -> &str {
        match group_by {
            GroupBy::Command => &self.command,
            GroupBy::User => &self.user,
            GroupBy::Host => &self.host,
            GroupBy::Db => &self.db,
            GroupBy::State => &self.state,
        }
    }

    pub fn is_sleeping(&self) -> bool {
        self.command == "Sleep"
    }
}

/// Parse a vertical process list dump into records.
///
/// Lines without a `Field: value` shape (row banners, blanks) are skipped.
/// A trailing block with no `Info:` line is not a record.
pub fn parse(sample: &Sample) -> Vec<ProcessRecord> {
    let mut records = Vec::new();
    let mut current = ProcessRecord::default();

    for line in sample.lines() {
        let Some((field, value)) = line.trim_start().split_once(':') else {
            continue;
        };
        if field.is_empty() || field.contains(char::is_whitespace) {
            continue;
        }
        let value = value.strip_prefix(' ').unwrap_or(value).trim_end();
        current.set(field, value);
        if field == "Info" {
            records.push(std::mem::take(&mut current));
        }
    }

    records
}

/// Attribute a process list is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GroupBy {
    Command,
    User,
    Host,
    #[serde(rename = "db")]
    Db,
    State,
}

impl GroupBy {
    /// The fixed order the report renders the tables in.
    pub const ALL: [GroupBy; 5] = [
        GroupBy::Command,
        GroupBy::User,
        GroupBy::Host,
        GroupBy::Db,
        GroupBy::State,
    ];

    /// Field name as it appears in the process list.
    pub fn label(self) -> &'static str {
        match self {
            GroupBy::Command => "Command",
            GroupBy::User => "User",
            GroupBy::Host => "Host",
            GroupBy::Db => "db",
            GroupBy::State => "State",
        }
    }
}

/// Totals for one group key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupAggregate {
    pub key: String,
    pub count: u64,
    /// Sessions not in `Sleep`.
    pub working: u64,
    pub sum_time: u64,
    pub max_time: u64,
}

/// Grouped process list for one attribute, sorted by key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessListTable {
    pub group_by: GroupBy,
    pub groups: Vec<GroupAggregate>,
}

/// Normalized group key: hosts lose their client port (`host:port`), then
/// every value is cut to 30 characters.
fn group_key(value: &str, group_by: GroupBy) -> &str {
    let value = match group_by {
        GroupBy::Host => value.split(':').next().unwrap_or(value),
        _ => value,
    };
    truncate_chars(value, MAX_GROUP_KEY_CHARS)
}

#[derive(Default)]
struct Accumulator {
    count: u64,
    sleeping: u64,
    sum_time: u64,
    max_time: u64,
}

/// Group `records` by one attribute.
///
/// Sleeping sessions count toward `count` but not `working`; their time is
/// summed only when grouping by `Command`.
pub fn aggregate(records: &[ProcessRecord], group_by: GroupBy) -> ProcessListTable {
    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();

    for record in records {
        let acc = groups
            .entry(group_key(record.attribute(group_by), group_by))
            .or_default();
        acc.count += 1;
        if record.is_sleeping() {
            acc.sleeping += 1;
        }
        if group_by == GroupBy::Command || !record.is_sleeping() {
            acc.sum_time += record.time;
            acc.max_time = acc.max_time.max(record.time);
        }
    }

    ProcessListTable {
        group_by,
        groups: groups
            .into_iter()
            .map(|(key, acc)| GroupAggregate {
                key: key.to_string(),
                count: acc.count,
                working: acc.count - acc.sleeping,
                sum_time: acc.sum_time,
                max_time: acc.max_time,
            })
            .collect(),
    }
}

/// One table per attribute, in [`GroupBy::ALL`] order.
pub fn aggregate_all(records: &[ProcessRecord]) -> Vec<ProcessListTable> {
    GroupBy::ALL
        .iter()
        .map(|&group_by| aggregate(records, group_by))
        .collect()
}
