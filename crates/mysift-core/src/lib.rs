//! mysift-core - MySQL diagnostic summaries from captured text.
//!
//! Provides:
//! - `fmt` - fuzzy rounding and fixed-width formatting helpers
//! - `sample` - captured text samples and key/value tables
//! - `analysis` - pure analyzers (status rates, process list, schema, slow log, ...)
//! - `collector` - capture sources (live `mysql` client, directory, in-memory)
//! - `report` - the fixed report pipeline and its text/JSON forms

pub mod analysis;
pub mod collector;
pub mod fmt;
pub mod report;
pub mod sample;
