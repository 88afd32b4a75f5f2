//! Binary log listing summary (`SHOW BINARY LOGS`).

use serde::Serialize;
use tracing::trace;

use crate::sample::Sample;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BinlogSummary {
    pub count: u64,
    pub zero_sized: u64,
    pub total_size: u64,
}

/// Summarize `Log_name File_size [Encrypted]` lines.
///
/// The column header and any line whose size is not numeric are skipped.
pub fn summarize(sample: &Sample) -> BinlogSummary {
    let mut summary = BinlogSummary::default();
    for line in sample.lines() {
        let mut fields = line.split_whitespace();
        let (Some(_name), Some(size)) = (fields.next(), fields.next()) else {
            continue;
        };
        let Ok(size) = size.parse::<u64>() else {
            trace!(line, "skipping binlog line");
            continue;
        };
        summary.count += 1;
        if size == 0 {
            summary.zero_sized += 1;
        }
        summary.total_size = summary.total_size.saturating_add(size);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize() {
        let sample = Sample::from(
            "Log_name\tFile_size\tEncrypted\n\
             binlog.000001\t1073741824\tNo\n\
             binlog.000002\t0\tNo\n\
             binlog.000003\t52428800\tNo\n",
        );
        let summary = summarize(&sample);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.zero_sized, 1);
        assert_eq!(summary.total_size, 1073741824 + 52428800);
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&Sample::default()), BinlogSummary::default());
    }
}
