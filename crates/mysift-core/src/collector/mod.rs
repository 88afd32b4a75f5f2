//! Capture sources: where the raw text blobs of a report come from.
//!
//! The analyzers never touch a server. A [`CaptureSource`] hands them one
//! [`Sample`](crate::sample::Sample) per [`CaptureKind`], read from a live
//! server through the `mysql` client, from a directory of saved captures,
//! or from memory in tests.
//!
//! ```text
//!   ClientSource ─┐
//!   DirSource ────┼──► CaptureSource ──► report::Captures ──► analyzers
//!   MockSource ───┘
//! ```

mod client;
mod dir;
pub mod mock;
pub mod traits;

use std::fmt;

use serde::Serialize;

pub use client::ClientSource;
pub use dir::DirSource;
pub use mock::MockSource;
pub use traits::CaptureSource;

/// One raw text input of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CaptureKind {
    Variables,
    Status1,
    Status2,
    ProcessList,
    BinaryLogs,
    SchemaDump,
    ConfigFile,
}

impl CaptureKind {
    /// Capture order of a report run. `Status1` is always taken before
    /// `Status2`.
    pub const ALL: [CaptureKind; 7] = [
        CaptureKind::Variables,
        CaptureKind::Status1,
        CaptureKind::ProcessList,
        CaptureKind::BinaryLogs,
        CaptureKind::SchemaDump,
        CaptureKind::ConfigFile,
        CaptureKind::Status2,
    ];

    /// File name used by [`DirSource`].
    pub fn file_name(self) -> &'static str {
        match self {
            CaptureKind::Variables => "variables.txt",
            CaptureKind::Status1 => "status1.txt",
            CaptureKind::Status2 => "status2.txt",
            CaptureKind::ProcessList => "processlist.txt",
            CaptureKind::BinaryLogs => "binlogs.txt",
            CaptureKind::SchemaDump => "schema.sql",
            CaptureKind::ConfigFile => "my.cnf",
        }
    }

    /// A report cannot be built without these.
    pub fn is_required(self) -> bool {
        matches!(self, CaptureKind::Variables | CaptureKind::Status1)
    }
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaptureKind::Variables => "variables",
            CaptureKind::Status1 => "status (first sample)",
            CaptureKind::Status2 => "status (second sample)",
            CaptureKind::ProcessList => "process list",
            CaptureKind::BinaryLogs => "binary logs",
            CaptureKind::SchemaDump => "schema dump",
            CaptureKind::ConfigFile => "config file",
        };
        f.write_str(name)
    }
}

/// Error type for capture failures.
#[derive(Debug)]
pub enum CollectError {
    /// I/O error reading a capture or starting a client.
    Io(std::io::Error),
    /// A required capture is not available.
    Missing(CaptureKind),
    /// The client program exited non-zero (e.g. cannot connect).
    Client {
        kind: CaptureKind,
        status: Option<i32>,
        stderr: String,
    },
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Missing(kind) => write!(f, "required capture missing: {}", kind),
            CollectError::Client {
                kind,
                status,
                stderr,
            } => {
                match status {
                    Some(code) => write!(f, "client failed reading {} (exit {})", kind, code)?,
                    None => write!(f, "client killed reading {}", kind)?,
                }
                let stderr = stderr.trim();
                if !stderr.is_empty() {
                    write!(f, ": {}", stderr)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}
