//! The fixed report pipeline.
//!
//! [`Captures::collect`] takes every raw input once from a
//! [`CaptureSource`]; [`Report::build`] then runs the analyzers over that
//! immutable snapshot in section order. Building and rendering do no I/O,
//! so the same captures always produce the same bytes.

mod render;

use serde::Serialize;
use tracing::{debug, warn};

use crate::analysis::{
    self, BinlogSummary, CnfListing, Fact, ProcessListTable, SchemaStats, StatusDeltaTable,
};
use crate::collector::{CaptureKind, CaptureSource, CollectError};
use crate::sample::{self, KeyValueTable, Sample};

pub use render::render_text;

/// Raw inputs of one report, as captured.
#[derive(Debug, Clone, Default)]
pub struct Captures {
    pub variables: Sample,
    pub status1: Sample,
    pub status2: Option<Sample>,
    pub processlist: Option<Sample>,
    pub binlogs: Option<Sample>,
    pub schema: Option<Sample>,
    pub cnf: Option<Sample>,
}

impl Captures {
    /// Take every capture once, in [`CaptureKind::ALL`] order.
    pub fn collect<S: CaptureSource + ?Sized>(source: &mut S) -> Result<Self, CollectError> {
        let mut captures = Captures::default();
        for kind in CaptureKind::ALL {
            let sample = source.capture(kind)?;
            if sample.is_none() {
                if kind.is_required() {
                    return Err(CollectError::Missing(kind));
                }
                warn!(%kind, "capture not available, section left empty");
            }
            match kind {
                CaptureKind::Variables => captures.variables = sample.unwrap_or_default(),
                CaptureKind::Status1 => captures.status1 = sample.unwrap_or_default(),
                CaptureKind::Status2 => captures.status2 = sample,
                CaptureKind::ProcessList => captures.processlist = sample,
                CaptureKind::BinaryLogs => captures.binlogs = sample,
                CaptureKind::SchemaDump => captures.schema = sample,
                CaptureKind::ConfigFile => captures.cnf = sample,
            }
        }
        Ok(captures)
    }
}

/// Every section of a report, ready to render or serialize.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub overview: Vec<Fact>,
    pub processlist: Vec<ProcessListTable>,
    pub status: StatusDeltaTable,
    pub schema: Option<SchemaStats>,
    pub binlogs: Option<BinlogSummary>,
    pub cnf: Option<CnfListing>,
}

impl Report {
    /// Run the analyzers over `captures`.
    ///
    /// Without a second status sample the interval column is blank, the
    /// same as a degenerate interval.
    pub fn build(captures: &Captures) -> Self {
        let variables = KeyValueTable::parse(&captures.variables).with_default("");
        let status1 = KeyValueTable::parse(&captures.status1).with_default("0");
        let status2 = match &captures.status2 {
            Some(sample) => KeyValueTable::parse(sample).with_default("0"),
            None => status1.clone(),
        };

        let processes = captures
            .processlist
            .as_ref()
            .map(analysis::processlist::parse)
            .unwrap_or_default();
        debug!(processes = processes.len(), "process list parsed");

        let t1 = status1.lookup_u64("Uptime");
        let t2 = status2.lookup_u64("Uptime");
        let pairs = sample::join(&status1, &status2);

        Report {
            overview: analysis::overview::summarize(&variables, &status1, processes.len()),
            processlist: analysis::processlist::aggregate_all(&processes),
            status: analysis::status::analyze(t1, t2, &pairs),
            schema: captures
                .schema
                .as_ref()
                .map(|dump| analysis::schema::aggregate(dump.lines())),
            binlogs: captures.binlogs.as_ref().map(analysis::binlog::summarize),
            cnf: captures.cnf.as_ref().map(analysis::cnf::pretty_print),
        }
    }

    /// Text form, one banner per section.
    pub fn render(&self) -> String {
        render_text(self)
    }

    /// Pretty-printed JSON form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::GroupBy;
    use crate::collector::MockSource;

    fn typical_report() -> Report {
        let mut source = MockSource::typical_server();
        let captures = Captures::collect(&mut source).unwrap();
        Report::build(&captures)
    }

    #[test]
    fn test_collect_takes_each_capture_once_in_order() {
        let mut source = MockSource::typical_server();
        Captures::collect(&mut source).unwrap();
        assert_eq!(source.requested(), &CaptureKind::ALL);
    }

    #[test]
    fn test_collect_requires_variables_and_status() {
        let mut source = MockSource::new().with(CaptureKind::Variables, "version 8.0");
        let err = Captures::collect(&mut source).unwrap_err();
        assert!(matches!(err, CollectError::Missing(CaptureKind::Status1)));
    }

    #[test]
    fn test_build_status_section() {
        let report = typical_report();
        assert_eq!(report.status.interval_secs, 10);
        let questions = report
            .status
            .rows
            .iter()
            .find(|r| r.name == "Questions")
            .unwrap();
        assert_eq!(questions.per_day, Some(900_000));
        assert_eq!(questions.per_second, Some(10));
        assert_eq!(questions.now_per_second, Some(10));
        assert!(report.status.rows.iter().all(|r| r.name != "Aborted_clients"));
        assert!(report.status.rows.iter().all(|r| r.name != "Rpl_status"));
    }

    #[test]
    fn test_build_processlist_section() {
        let report = typical_report();
        let kinds: Vec<GroupBy> = report.processlist.iter().map(|t| t.group_by).collect();
        assert_eq!(kinds, GroupBy::ALL.to_vec());

        let by_host = &report.processlist[2];
        let keys: Vec<&str> = by_host.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["10.0.0.5", "localhost"]);
        assert_eq!(by_host.groups[0].count, 2);
        assert_eq!(by_host.groups[0].working, 1);
        assert_eq!(by_host.groups[0].sum_time, 3);
    }

    #[test]
    fn test_build_optional_sections() {
        let report = typical_report();
        let schema = report.schema.as_ref().unwrap();
        assert_eq!(schema.objects.sorted_rows(), vec!["audit", "shop"]);
        assert_eq!(schema.engines.get("audit", "MyISAM"), 1);
        assert_eq!(report.binlogs.as_ref().unwrap().count, 2);
        assert_eq!(report.cnf.as_ref().unwrap().lines.len(), 3);
    }

    #[test]
    fn test_build_without_optional_captures() {
        let captures = Captures {
            variables: Sample::from("version 8.0.36"),
            status1: Sample::from("Uptime 100\nQuestions 500"),
            ..Default::default()
        };
        let report = Report::build(&captures);
        assert!(report.schema.is_none());
        assert!(report.binlogs.is_none());
        assert!(report.cnf.is_none());
        assert_eq!(report.status.interval_secs, 0);
        assert_eq!(report.status.rows[1].now_per_second, None);
        assert!(report.processlist.iter().all(|t| t.groups.is_empty()));
    }

    #[test]
    fn test_render_is_deterministic() {
        let first = typical_report().render();
        let second = typical_report().render();
        assert_eq!(first, second);
    }

    #[test]
    fn test_to_json() {
        let json = typical_report().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"]["interval_secs"], 10);
        assert_eq!(value["processlist"][0]["group_by"], "Command");
        assert_eq!(value["schema"]["engines"]["shop"]["InnoDB"], 1);
        assert_eq!(value["binlogs"]["zero_sized"], 0);
    }
}
