//! Analyzers: pure transforms from captured samples to report tables.
//!
//! Each analyzer receives its own immutable input and returns a value; none
//! performs I/O or shares state with another. Malformed lines are skipped
//! where they are found (see `tracing` debug/trace events), so analyzers
//! return plain values rather than `Result`.

pub mod binlog;
pub mod cnf;
pub mod ordered;
pub mod overview;
pub mod processlist;
pub mod scan;
pub mod schema;
pub mod slowlog;
pub mod status;

pub use binlog::BinlogSummary;
pub use cnf::CnfListing;
pub use ordered::{CountGrid, OrderedMap};
pub use overview::Fact;
pub use processlist::{GroupAggregate, GroupBy, ProcessListTable, ProcessRecord};
pub use schema::SchemaStats;
pub use slowlog::{SlowLogFilter, Thresholds};
pub use status::{StatusDeltaRow, StatusDeltaTable};
