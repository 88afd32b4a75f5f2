//! mysift - MySQL diagnostic summaries.
//!
//! `mysift report` captures variables, status, process list, schema and
//! config from a server (or a directory of saved captures) and prints a
//! fuzzy-rounded summary that diffs cleanly between runs.
//! `mysift slowlog` filters a slow query log by time or examined rows.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use chrono::Utc;
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use tracing::{Level, debug, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use mysift_core::analysis::{SlowLogFilter, Thresholds};
use mysift_core::collector::{CaptureSource, ClientSource, CollectError, DirSource};
use mysift_core::fmt::format_banner;
use mysift_core::report::{Captures, Report};

/// MySQL diagnostic summaries.
#[derive(Parser)]
#[command(name = "mysift", about = "MySQL diagnostic summaries", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize a server (live, or from saved captures).
    Report(ReportArgs),
    /// Keep slow log records above a query time or examined-row threshold.
    Slowlog(SlowlogArgs),
}

#[derive(Args)]
struct ReportArgs {
    /// Read saved captures from this directory instead of a live server.
    #[arg(long, value_name = "DIR", env = "MYSIFT_CAPTURES")]
    captures: Option<PathBuf>,

    /// Seconds between the two status samples.
    #[arg(long, default_value = "10")]
    sleep: u64,

    /// Comma-separated databases for the schema dump (default: all).
    #[arg(long, value_delimiter = ',')]
    databases: Vec<String>,

    /// Skip the schema section.
    #[arg(long)]
    no_schema: bool,

    /// Option file to print (live mode). Skipped when absent.
    #[arg(long, value_name = "PATH", default_value = "/etc/mysql/my.cnf")]
    cnf: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,

    /// Arguments forwarded to mysql/mysqldump (after `--`).
    #[arg(last = true, value_name = "CLIENT_ARGS")]
    client_args: Vec<String>,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("threshold")
        .required(true)
        .multiple(true)
        .args(["min_time", "min_rows"])
))]
struct SlowlogArgs {
    /// Slow query log file (stdin when absent or `-`).
    file: Option<PathBuf>,

    /// Minimum Query_time in seconds.
    #[arg(long, value_name = "SECS")]
    min_time: Option<f64>,

    /// Minimum Rows_examined.
    #[arg(long, value_name = "N")]
    min_rows: Option<u64>,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = ["mysift", "mysift_core"]
        .iter()
        .filter_map(|target| format!("{}={}", target, level).parse::<Directive>().ok())
        .fold(EnvFilter::from_default_env(), EnvFilter::add_directive);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn collect(args: &ReportArgs) -> Result<Captures, CollectError> {
    let mut source: Box<dyn CaptureSource> = match &args.captures {
        Some(dir) => {
            info!("reading captures from {}", dir.display());
            Box::new(DirSource::new(dir))
        }
        None => {
            info!(
                "capturing from live server, {}s between status samples",
                args.sleep
            );
            Box::new(
                ClientSource::new(args.client_args.clone())
                    .with_databases(args.databases.clone())
                    .skip_schema(args.no_schema)
                    .with_cnf(&args.cnf)
                    .with_sleep(Duration::from_secs(args.sleep)),
            )
        }
    };

    let mut captures = Captures::collect(source.as_mut())?;
    if args.no_schema {
        captures.schema = None;
    }
    Ok(captures)
}

/// Failure of `mysift report`, by stage.
#[derive(Debug)]
enum ReportError {
    /// A capture could not be taken.
    Collect(CollectError),
    /// The report could not be serialized.
    Json(serde_json::Error),
    /// Writing the report to stdout failed.
    Output(io::Error),
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Collect(e) => write!(f, "capture failed: {}", e),
            ReportError::Json(e) => write!(f, "cannot serialize report: {}", e),
            ReportError::Output(e) => write!(f, "cannot write report: {}", e),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Collect(e) => Some(e),
            ReportError::Json(e) => Some(e),
            ReportError::Output(e) => Some(e),
        }
    }
}

impl From<CollectError> for ReportError {
    fn from(e: CollectError) -> Self {
        ReportError::Collect(e)
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        ReportError::Json(e)
    }
}

impl From<io::Error> for ReportError {
    fn from(e: io::Error) -> Self {
        ReportError::Output(e)
    }
}

fn run_report(args: &ReportArgs) -> Result<(), ReportError> {
    let captures = collect(args)?;
    let report = Report::build(&captures);

    let text = if args.json {
        report.to_json()?
    } else {
        let header = format_banner(&format!(
            "mysift {} {}",
            env!("CARGO_PKG_VERSION"),
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        format!("{}\n{}", header, report.render())
    };

    let mut out = io::stdout().lock();
    out.write_all(text.as_bytes())?;
    if args.json {
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn run_slowlog(args: &SlowlogArgs) -> io::Result<()> {
    let mut reader: Box<dyn BufRead> = match &args.file {
        Some(path) if path.as_os_str() != "-" => {
            debug!("reading slow log {}", path.display());
            Box::new(BufReader::new(File::open(path)?))
        }
        _ => Box::new(io::stdin().lock()),
    };

    let mut slowlog = SlowLogFilter::new(Thresholds::new(args.min_time, args.min_rows));
    let mut out = BufWriter::new(io::stdout().lock());
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if slowlog.keep(line) {
            writeln!(out, "{}", line)?;
        }
    }
    out.flush()?;

    info!(
        "{} of {} slow log records kept",
        slowlog.records_kept(),
        slowlog.records_seen()
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match &cli.command {
        Command::Report(args) => {
            if let Err(e) = run_report(args) {
                error!("{}", e);
                process::exit(1);
            }
        }
        Command::Slowlog(args) => {
            if let Err(e) = run_slowlog(args) {
                error!("{}", e);
                process::exit(1);
            }
        }
    }
}
