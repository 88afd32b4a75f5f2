//! Status counter rates from two `SHOW GLOBAL STATUS` samples.
//!
//! For each counter: average per day and per second since server start
//! (from the first sample), and the rate across the sampling interval.
//! All three are fuzzy-rounded and truncated to integers.

use serde::Serialize;
use tracing::{debug, trace};

use crate::fmt::fuzzy_round;
use crate::sample::CounterPair;

const SECS_PER_DAY: f64 = 86_400.0;

/// `2^64 - 1`, reported by the server for counters that are not counters.
pub const COUNTER_SENTINEL: u64 = u64::MAX;

/// One rendered status row. `None` means the rate is unavailable for this
/// interval; both `None` and zero render blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDeltaRow {
    pub name: String,
    pub per_day: Option<i64>,
    pub per_second: Option<i64>,
    pub now_per_second: Option<i64>,
}

/// Status rates for one report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct StatusDeltaTable {
    /// Seconds between the two samples (`t2 - t1`), `0` when degenerate.
    pub interval_secs: u64,
    pub rows: Vec<StatusDeltaRow>,
}

/// Parse a counter value: plain ASCII digits below the sentinel.
fn parse_counter(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u64>().ok().filter(|&v| v < COUNTER_SENTINEL)
}

fn rate(value: f64) -> i64 {
    fuzzy_round(value) as i64
}

/// Compute the rate rows for `pairs`, given the `Uptime` of each sample.
///
/// Rows keep the order of `pairs`. A counter participates only when its
/// first value is a positive integer below the sentinel. A row is emitted
/// when at least one rate is non-zero. `t2 <= t1` leaves the interval
/// rate blank instead of failing.
pub fn analyze(t1: u64, t2: u64, pairs: &[CounterPair]) -> StatusDeltaTable {
    let interval = t2.checked_sub(t1).filter(|&d| d > 0);
    if interval.is_none() {
        debug!(t1, t2, "degenerate status interval, interval rates left blank");
    }

    let mut rows = Vec::new();
    for pair in pairs {
        let Some(v1) = parse_counter(&pair.first) else {
            trace!(name = %pair.name, value = %pair.first, "not a counter, skipped");
            continue;
        };
        if v1 == 0 {
            continue;
        }

        let per_day = (t1 as f64 >= SECS_PER_DAY).then(|| rate(v1 as f64 / (t1 as f64 / SECS_PER_DAY)));
        let per_second = (t1 > 0).then(|| rate(v1 as f64 / t1 as f64));
        let now_per_second = match (interval, parse_counter(&pair.second)) {
            (Some(dt), Some(v2)) => {
                let delta = v2 as i128 - v1 as i128;
                Some(rate(delta as f64 / dt as f64))
            }
            _ => None,
        };

        let nonzero = [per_day, per_second, now_per_second]
            .iter()
            .any(|v| v.is_some_and(|n| n != 0));
        if nonzero {
            rows.push(StatusDeltaRow {
                name: pair.name.clone(),
                per_day,
                per_second,
                now_per_second,
            });
        }
    }

    StatusDeltaTable {
        interval_secs: interval.unwrap_or(0),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_questions_over_one_day() {
        let pairs = [CounterPair::new("Questions", "864000", "864100")];
        let table = analyze(86_400, 86_410, &pairs);
        assert_eq!(table.interval_secs, 10);
        assert_eq!(
            table.rows,
            vec![StatusDeltaRow {
                name: "Questions".into(),
                per_day: Some(fuzzy_round(864_000.0) as i64),
                per_second: Some(10),
                now_per_second: Some(10),
            }]
        );
    }

    #[test]
    fn test_short_uptime_has_no_per_day() {
        let pairs = [CounterPair::new("Com_select", "3600", "3700")];
        let table = analyze(3600, 3610, &pairs);
        assert_eq!(table.rows[0].per_day, None);
        assert_eq!(table.rows[0].per_second, Some(1));
        assert_eq!(table.rows[0].now_per_second, Some(10));
    }

    #[test]
    fn test_sentinel_and_non_numeric_skipped() {
        let pairs = [
            CounterPair::new("Innodb_buffer_pool_pages_misc", "18446744073709551615", "1"),
            CounterPair::new("Rpl_status", "AUTH_MASTER", "AUTH_MASTER"),
            CounterPair::new("Ssl_cipher", "-1", "0"),
            CounterPair::new("Connections", "100", "200"),
        ];
        let table = analyze(100, 110, &pairs);
        let names: Vec<_> = table.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Connections"]);
    }

    #[test]
    fn test_zero_counter_skipped() {
        let pairs = [CounterPair::new("Aborted_clients", "0", "5")];
        assert!(analyze(100, 110, &pairs).rows.is_empty());
    }

    #[test]
    fn test_all_zero_rates_suppressed() {
        // 1 over 100s truncates to zero everywhere.
        let pairs = [CounterPair::new("Slow_queries", "1", "1")];
        assert!(analyze(100, 110, &pairs).rows.is_empty());
    }

    #[test]
    fn test_degenerate_interval_blank() {
        let pairs = [CounterPair::new("Bytes_sent", "5000", "4000")];
        let table = analyze(100, 90, &pairs);
        assert_eq!(table.interval_secs, 0);
        assert_eq!(table.rows[0].per_second, Some(50));
        assert_eq!(table.rows[0].now_per_second, None);
    }

    #[test]
    fn test_zero_uptime_blank() {
        let pairs = [CounterPair::new("Bytes_sent", "5000", "5500")];
        let table = analyze(0, 10, &pairs);
        assert_eq!(table.rows[0].per_second, None);
        assert_eq!(table.rows[0].now_per_second, Some(50));
    }

    #[test]
    fn test_bad_second_value_blanks_interval_only() {
        let pairs = [
            CounterPair::new("Handler_read_key", "864000", "abc"),
            CounterPair::new("Handler_write", "864000", "18446744073709551615"),
        ];
        let table = analyze(86_400, 86_410, &pairs);
        assert_eq!(table.rows.len(), 2);
        for row in &table.rows {
            assert_eq!(row.per_day, Some(900_000));
            assert_eq!(row.per_second, Some(10));
            assert_eq!(row.now_per_second, None);
        }
    }

    #[test]
    fn test_negative_delta_kept() {
        let pairs = [CounterPair::new("Threads_created", "5000", "3000")];
        let table = analyze(100, 110, &pairs);
        assert_eq!(table.rows[0].now_per_second, Some(-200));
    }

    #[test]
    fn test_input_order_preserved() {
        let pairs = [
            CounterPair::new("Zeta", "1000", "2000"),
            CounterPair::new("Alpha", "1000", "2000"),
        ];
        let table = analyze(100, 110, &pairs);
        let names: Vec<_> = table.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }
}
