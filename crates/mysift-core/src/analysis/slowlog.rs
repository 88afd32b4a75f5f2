//! Slow query log threshold filter.
//!
//! Keeps whole log records (the `Query_time:` header plus the statement
//! lines that follow it) whose query time or examined-row count reaches a
//! threshold. One pass, one bit of state.
//!
//! Lines that arrive before any header, or after a header that failed,
//! inherit the last decision. A log tail that starts mid-record therefore
//! drops those leading lines, and the `# Time:` line of a record belongs
//! to the record before it. Both are kept as is: downstream fixtures rely
//! on the exact output.

use tracing::trace;

/// Thresholds a record must reach (either one suffices).
///
/// With neither set, nothing is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thresholds {
    /// Minimum `Query_time` in seconds.
    pub min_time: Option<f64>,
    /// Minimum `Rows_examined`.
    pub min_rows: Option<u64>,
}

impl Thresholds {
    pub fn new(min_time: Option<f64>, min_rows: Option<u64>) -> Self {
        Self { min_time, min_rows }
    }

    /// Whether a record with this time and row count is selected.
    pub fn admits(&self, query_time: f64, rows_examined: u64) -> bool {
        self.min_time.is_some_and(|min| query_time >= min)
            || self.min_rows.is_some_and(|min| rows_examined >= min)
    }
}

/// Numbers taken from a `Query_time:` header line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryHeader {
    pub query_time: f64,
    pub rows_examined: u64,
}

/// Parse `# Query_time: 5.0  Lock_time: 0.0 Rows_sent: 1  Rows_examined: 10`.
///
/// Both `Query_time` and `Rows_examined` must be present and numeric;
/// `Lock_time` and the other fields are ignored.
pub fn parse_query_header(line: &str) -> Option<QueryHeader> {
    let query_time = field_after(line, "Query_time:")?.parse::<f64>().ok()?;
    let rows_examined = field_after(line, "Rows_examined:")?.parse::<u64>().ok()?;
    Some(QueryHeader {
        query_time,
        rows_examined,
    })
}

fn field_after<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let pos = line.find(label)?;
    line[pos + label.len()..].split_whitespace().next()
}

/// Server banners written into the log on startup; never data.
fn is_banner(line: &str) -> bool {
    (line.contains(", Version: ") && line.contains("started with:"))
        || line.starts_with("Tcp port:")
        || (line.starts_with("Time ") && line.contains("Id Command") && line.contains("Argument"))
        || line.starts_with("# User@Host:")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No header seen yet.
    Idle,
    /// Inside a record; `passed` is the header's verdict.
    InRecord { passed: bool },
}

/// Streaming form of the filter. Feed lines in order with
/// [`SlowLogFilter::keep`].
#[derive(Debug, Clone)]
pub struct SlowLogFilter {
    thresholds: Thresholds,
    state: State,
    records_seen: u64,
    records_kept: u64,
}

impl SlowLogFilter {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            state: State::Idle,
            records_seen: 0,
            records_kept: 0,
        }
    }

    /// Returns `true` when `line` belongs in the output.
    pub fn keep(&mut self, line: &str) -> bool {
        if is_banner(line) {
            return false;
        }

        if let Some(header) = parse_query_header(line) {
            let passed = self
                .thresholds
                .admits(header.query_time, header.rows_examined);
            trace!(
                query_time = header.query_time,
                rows_examined = header.rows_examined,
                passed,
                "slow log record"
            );
            self.records_seen += 1;
            if passed {
                self.records_kept += 1;
            }
            self.state = State::InRecord { passed };
            return passed;
        }

        matches!(self.state, State::InRecord { passed: true })
    }

    /// Number of header lines seen so far.
    pub fn records_seen(&self) -> u64 {
        self.records_seen
    }

    /// Number of records that passed so far.
    pub fn records_kept(&self) -> u64 {
        self.records_kept
    }
}

/// Filter a whole sequence of lines at once.
pub fn filter<'a, I>(lines: I, thresholds: Thresholds) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut slowlog = SlowLogFilter::new(thresholds);
    lines.into_iter().filter(|line| slowlog.keep(line)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_time_selects_first_record() {
        let lines = [
            "# Time: 2024-01-15T14:30:00",
            "Query_time: 5 Lock_time: 0 Rows_examined: 10",
            "SELECT 1;",
            "Query_time: 1 Lock_time: 0 Rows_examined: 1",
            "SELECT 2;",
        ];
        let out = filter(lines, Thresholds::new(Some(2.0), None));
        assert_eq!(
            out,
            vec!["Query_time: 5 Lock_time: 0 Rows_examined: 10", "SELECT 1;"]
        );
    }

    #[test]
    fn test_min_rows_selects_record() {
        let lines = [
            "# Query_time: 0.000120  Lock_time: 0.000010 Rows_sent: 1  Rows_examined: 5000",
            "SET timestamp=1705329000;",
            "SELECT * FROM orders;",
            "# Query_time: 0.000100  Lock_time: 0.000010 Rows_sent: 1  Rows_examined: 1",
            "SELECT 1;",
        ];
        let out = filter(lines, Thresholds::new(None, Some(1000)));
        assert_eq!(out.len(), 3);
        assert_eq!(out[2], "SELECT * FROM orders;");
    }

    #[test]
    fn test_either_threshold_suffices() {
        let t = Thresholds::new(Some(10.0), Some(100));
        assert!(t.admits(0.1, 100));
        assert!(t.admits(10.0, 0));
        assert!(!t.admits(9.9, 99));
    }

    #[test]
    fn test_no_thresholds_selects_nothing() {
        let lines = ["Query_time: 500 Lock_time: 0 Rows_examined: 1000000", "SELECT 1;"];
        assert!(filter(lines, Thresholds::default()).is_empty());
    }

    #[test]
    fn test_banners_never_emitted() {
        let lines = [
            "Query_time: 5 Lock_time: 0 Rows_examined: 10",
            "/usr/sbin/mysqld, Version: 8.0.36 (MySQL Community Server - GPL). started with:",
            "Tcp port: 3306  Unix socket: /var/run/mysqld/mysqld.sock",
            "Time                 Id Command    Argument",
            "# User@Host: app[app] @ localhost []  Id:    42",
            "SELECT 1;",
        ];
        let out = filter(lines, Thresholds::new(Some(1.0), None));
        assert_eq!(
            out,
            vec!["Query_time: 5 Lock_time: 0 Rows_examined: 10", "SELECT 1;"]
        );
    }

    #[test]
    fn test_orphan_lines_before_header_dropped() {
        let lines = ["SELECT orphan;", "Query_time: 5 Lock_time: 0 Rows_examined: 1", "SELECT 1;"];
        let out = filter(lines, Thresholds::new(Some(1.0), None));
        assert_eq!(out, vec!["Query_time: 5 Lock_time: 0 Rows_examined: 1", "SELECT 1;"]);
    }

    #[test]
    fn test_trailing_lines_inherit_last_decision() {
        // The `# Time:` line of the next record rides on the passing record.
        let lines = [
            "Query_time: 5 Lock_time: 0 Rows_examined: 1",
            "SELECT 1;",
            "# Time: 2024-01-15T14:31:00",
        ];
        let out = filter(lines, Thresholds::new(Some(1.0), None));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_malformed_header_is_body_line() {
        let mut filter = SlowLogFilter::new(Thresholds::new(Some(1.0), None));
        assert!(filter.keep("Query_time: 5 Lock_time: 0 Rows_examined: 1"));
        assert!(filter.keep("Query_time: abc Lock_time: 0 Rows_examined: 1"));
        assert_eq!(filter.records_seen(), 1);
        assert_eq!(filter.records_kept(), 1);
    }

    #[test]
    fn test_parse_query_header() {
        let header =
            parse_query_header("# Query_time: 2.500000  Lock_time: 0.000100 Rows_sent: 3  Rows_examined: 42")
                .unwrap();
        assert_eq!(header.query_time, 2.5);
        assert_eq!(header.rows_examined, 42);
        assert!(parse_query_header("# Query_time: 2.5  Lock_time: 0.1").is_none());
        assert!(parse_query_header("SELECT 1;").is_none());
    }
}
