//! Live captures through the `mysql` and `mysqldump` command-line clients.
//!
//! Connection options are never interpreted here; whatever the user passed
//! after `--` is forwarded to both programs unchanged.

use std::io;
use std::path::PathBuf;
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::collector::traits::CaptureSource;
use crate::collector::{CaptureKind, CollectError};
use crate::sample::Sample;

const VARIABLES_QUERY: &str = "SHOW /*!40100 GLOBAL*/ VARIABLES";
const STATUS_QUERY: &str = "SHOW /*!50000 GLOBAL*/ STATUS";
const PROCESSLIST_QUERY: &str = "SHOW FULL PROCESSLIST\\G";
const BINARY_LOGS_QUERY: &str = "SHOW BINARY LOGS";

const DUMP_FLAGS: [&str; 5] = [
    "--no-data",
    "--skip-comments",
    "--skip-add-drop-table",
    "--routines",
    "--triggers",
];

/// Captures from a running server.
#[derive(Debug, Clone)]
pub struct ClientSource {
    client_args: Vec<String>,
    mysql: String,
    mysqldump: String,
    /// `None` dumps every database.
    databases: Option<Vec<String>>,
    skip_schema: bool,
    cnf_path: Option<PathBuf>,
    /// Delay between the two status samples.
    sleep: Duration,
    status_taken_at: Option<Instant>,
}

impl ClientSource {
    pub fn new(client_args: Vec<String>) -> Self {
        Self {
            client_args,
            mysql: "mysql".to_string(),
            mysqldump: "mysqldump".to_string(),
            databases: None,
            skip_schema: false,
            cnf_path: None,
            sleep: Duration::from_secs(10),
            status_taken_at: None,
        }
    }

    /// Replaces the client program names (looked up in `PATH`).
    pub fn with_programs(mut self, mysql: impl Into<String>, mysqldump: impl Into<String>) -> Self {
        self.mysql = mysql.into();
        self.mysqldump = mysqldump.into();
        self
    }

    pub fn with_databases(mut self, databases: Vec<String>) -> Self {
        self.databases = (!databases.is_empty()).then_some(databases);
        self
    }

    pub fn skip_schema(mut self, skip: bool) -> Self {
        self.skip_schema = skip;
        self
    }

    pub fn with_cnf(mut self, path: impl Into<PathBuf>) -> Self {
        self.cnf_path = Some(path.into());
        self
    }

    pub fn with_sleep(mut self, sleep: Duration) -> Self {
        self.sleep = sleep;
        self
    }

    fn query(&self, kind: CaptureKind, sql: &str) -> Result<Sample, CollectError> {
        let mut cmd = Command::new(&self.mysql);
        cmd.args(&self.client_args).args(["-ss", "-e", sql]);
        run(kind, cmd)
    }

    fn dump_schema(&self) -> Result<Sample, CollectError> {
        let mut cmd = Command::new(&self.mysqldump);
        cmd.args(&self.client_args).args(DUMP_FLAGS);
        match &self.databases {
            Some(databases) => {
                cmd.arg("--databases").args(databases);
            }
            None => {
                cmd.arg("--all-databases");
            }
        }
        run(CaptureKind::SchemaDump, cmd)
    }

    fn read_cnf(&self) -> Result<Option<Sample>, CollectError> {
        let Some(path) = &self.cnf_path else {
            return Ok(None);
        };
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Some(Sample::from_text(&text))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not present");
                Ok(None)
            }
            Err(e) => Err(CollectError::Io(e)),
        }
    }

    /// Waits out whatever is left of the sampling interval.
    fn wait_for_second_sample(&self) {
        let Some(taken_at) = self.status_taken_at else {
            return;
        };
        let remaining = self.sleep.saturating_sub(taken_at.elapsed());
        if !remaining.is_zero() {
            info!(secs = remaining.as_secs_f64(), "waiting for second status sample");
            thread::sleep(remaining);
        }
    }
}

fn run(kind: CaptureKind, mut cmd: Command) -> Result<Sample, CollectError> {
    debug!(?cmd, %kind, "running client");
    let output = cmd.output()?;
    if !output.status.success() {
        return Err(CollectError::Client {
            kind,
            status: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(Sample::from_text(&String::from_utf8_lossy(&output.stdout)))
}

impl CaptureSource for ClientSource {
    fn capture(&mut self, kind: CaptureKind) -> Result<Option<Sample>, CollectError> {
        let result = match kind {
            CaptureKind::Variables => self.query(kind, VARIABLES_QUERY),
            CaptureKind::Status1 => {
                let sample = self.query(kind, STATUS_QUERY);
                self.status_taken_at = Some(Instant::now());
                sample
            }
            CaptureKind::Status2 => {
                self.wait_for_second_sample();
                self.query(kind, STATUS_QUERY)
            }
            CaptureKind::ProcessList => self.query(kind, PROCESSLIST_QUERY),
            CaptureKind::BinaryLogs => self.query(kind, BINARY_LOGS_QUERY),
            CaptureKind::SchemaDump if self.skip_schema => return Ok(None),
            CaptureKind::SchemaDump => self.dump_schema(),
            CaptureKind::ConfigFile => return self.read_cnf(),
        };

        match result {
            Ok(sample) => {
                info!(%kind, lines = sample.len(), "captured");
                Ok(Some(sample))
            }
            // Binary logging off or no privilege for mysqldump: the section
            // is left empty.
            Err(e) if !kind.is_required() && matches!(e, CollectError::Client { .. }) => {
                warn!(%kind, error = %e, "optional capture failed");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
