//! In-memory capture source for testing the report pipeline without a
//! server or files.

use std::collections::HashMap;

use crate::collector::traits::CaptureSource;
use crate::collector::{CaptureKind, CollectError};
use crate::sample::Sample;

/// Captures held in memory. Absent kinds behave like [`super::DirSource`]:
/// `None` when optional, [`CollectError::Missing`] when required.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    captures: HashMap<CaptureKind, String>,
    /// Kinds requested so far, in order.
    requested: Vec<CaptureKind>,
}

impl MockSource {
    /// Creates a new empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a capture with the given raw text.
    pub fn with(mut self, kind: CaptureKind, text: impl Into<String>) -> Self {
        self.captures.insert(kind, text.into());
        self
    }

    /// Kinds requested so far, in order.
    pub fn requested(&self) -> &[CaptureKind] {
        &self.requested
    }

    /// A small but complete server: two status samples ten seconds apart,
    /// three sessions, two databases, binlogs and a config file.
    pub fn typical_server() -> Self {
        Self::new()
            .with(
                CaptureKind::Variables,
                "version\t8.0.36\n\
                 version_comment\tMySQL Community Server - GPL\n\
                 datadir\t/var/lib/mysql/\n\
                 max_connections\t151\n\
                 binlog_format\tROW\n\
                 read_only\tOFF\n",
            )
            .with(
                CaptureKind::Status1,
                "Aborted_clients\t0\n\
                 Bytes_received\t172800000\n\
                 Com_select\t864000\n\
                 Max_used_connections\t12\n\
                 Questions\t864000\n\
                 Rpl_status\tAUTH_MASTER\n\
                 Threads_connected\t3\n\
                 Threads_running\t1\n\
                 Uptime\t86400\n",
            )
            .with(
                CaptureKind::Status2,
                "Aborted_clients\t0\n\
                 Bytes_received\t172810000\n\
                 Com_select\t864050\n\
                 Max_used_connections\t12\n\
                 Questions\t864100\n\
                 Rpl_status\tAUTH_MASTER\n\
                 Threads_connected\t3\n\
                 Threads_running\t1\n\
                 Uptime\t86410\n",
            )
            .with(
                CaptureKind::ProcessList,
                "*************************** 1. row ***************************\n\
                 Id: 5\n\
                 User: event_scheduler\n\
                 Host: localhost\n\
                 db: NULL\n\
                 Command: Daemon\n\
                 Time: 86000\n\
                 State: Waiting on empty queue\n\
                 Info: NULL\n\
                 *************************** 2. row ***************************\n\
                 Id: 8\n\
                 User: app\n\
                 Host: 10.0.0.5:51234\n\
                 db: shop\n\
                 Command: Query\n\
                 Time: 3\n\
                 State: executing\n\
                 Info: SELECT * FROM orders\n\
                 *************************** 3. row ***************************\n\
                 Id: 9\n\
                 User: app\n\
                 Host: 10.0.0.5:51240\n\
                 db: shop\n\
                 Command: Sleep\n\
                 Time: 40\n\
                 State: \n\
                 Info: NULL\n",
            )
            .with(
                CaptureKind::BinaryLogs,
                "binlog.000001\t1073741824\tNo\nbinlog.000002\t157\tNo\n",
            )
            .with(
                CaptureKind::SchemaDump,
                "USE `shop`;\n\
                 CREATE TABLE `orders` (\n\
                 \x20 `id` int NOT NULL AUTO_INCREMENT,\n\
                 \x20 `total` decimal(10,2) DEFAULT NULL,\n\
                 \x20 PRIMARY KEY (`id`)\n\
                 ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4;\n\
                 USE `audit`;\n\
                 CREATE TABLE `log` (\n\
                 \x20 `msg` varchar(255) NOT NULL\n\
                 ) ENGINE=MyISAM;\n",
            )
            .with(
                CaptureKind::ConfigFile,
                "[mysqld]\ndatadir=/var/lib/mysql\n# comment\nskip-name-resolve\n",
            )
    }
}

impl CaptureSource for MockSource {
    fn capture(&mut self, kind: CaptureKind) -> Result<Option<Sample>, CollectError> {
        self.requested.push(kind);
        match self.captures.get(&kind) {
            Some(text) => Ok(Some(Sample::from_text(text))),
            None if kind.is_required() => Err(CollectError::Missing(kind)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_source() {
        let mut source = MockSource::new().with(CaptureKind::Variables, "a 1");
        assert_eq!(source.capture(CaptureKind::Variables).unwrap().unwrap().len(), 1);
        assert!(source.capture(CaptureKind::ConfigFile).unwrap().is_none());
        assert!(source.capture(CaptureKind::Status1).is_err());
        assert_eq!(
            source.requested(),
            &[
                CaptureKind::Variables,
                CaptureKind::ConfigFile,
                CaptureKind::Status1
            ]
        );
    }

    #[test]
    fn test_typical_server_has_required_captures() {
        let mut source = MockSource::typical_server();
        for kind in CaptureKind::ALL {
            assert!(source.capture(kind).unwrap().is_some(), "{}", kind);
        }
    }
}
