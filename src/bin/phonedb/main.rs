//! Binary entry point for the phonedb shell and one-shot commands.
#![forbid(unsafe_code)]

mod config;
mod ui;

use std::error::Error;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use phonedb::{
    admin::{self, StatsReport, VerifyLevel, VerifyReport},
    cli::Command as ShellCommand,
    Database, DatabaseOptions, ListedRecord, Listing, PhoneDbError, Record, Session, Synchronous,
};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::CliConfig;
use ui::{Theme, Ui};

const PROMPT: &str = "~> ";
const LOG_ENV: &str = "PHONEDB_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "phonedb",
    version,
    about = "Phonebook kept in phone order inside a single file",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "PHONEDB_CONFIG",
        value_name = "PATH",
        help = "CLI config file (defaults to <config dir>/phonedb/cli.toml)"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "PHONEDB_DB",
        value_name = "PATH",
        help = "Database file; falls back to [database].default in the config"
    )]
    db: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for one-shot commands"
    )]
    format: OutputFormat,

    #[arg(
        long,
        global = true,
        value_name = "FILTER",
        help = "Tracing filter, e.g. `phonedb=debug`"
    )]
    log_level: Option<String>,

    #[arg(long, global = true, value_enum, help = "Durability level override")]
    synchronous: Option<SynchronousArg>,

    #[arg(long, global = true, value_enum, default_value_t = ThemeArg::Auto)]
    theme: ThemeArg,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Interactive shell (default)")]
    Shell,

    #[command(about = "Create or wipe the database, leaving it empty")]
    Init,

    #[command(about = "Insert one record")]
    Insert {
        #[arg(value_name = "NAME")]
        name: String,
        #[arg(value_name = "PHONE")]
        phone: String,
    },

    #[command(about = "List every record in phone order")]
    List,

    #[command(about = "Show records with exactly this phone number")]
    Find {
        #[arg(value_name = "PHONE")]
        phone: String,
    },

    #[command(about = "Check on-disk invariants")]
    Verify {
        #[arg(long, value_enum, default_value_t = VerifyLevelArg::Full)]
        level: VerifyLevelArg,
    },

    #[command(about = "Print size and occupancy")]
    Stats,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum SynchronousArg {
    Full,
    Normal,
    Off,
}

impl From<SynchronousArg> for Synchronous {
    fn from(mode: SynchronousArg) -> Self {
        match mode {
            SynchronousArg::Full => Synchronous::Full,
            SynchronousArg::Normal => Synchronous::Normal,
            SynchronousArg::Off => Synchronous::Off,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum VerifyLevelArg {
    Fast,
    Full,
}

impl From<VerifyLevelArg> for VerifyLevel {
    fn from(level: VerifyLevelArg) -> Self {
        match level {
            VerifyLevelArg::Fast => VerifyLevel::Fast,
            VerifyLevelArg::Full => VerifyLevel::Full,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ThemeArg {
    Auto,
    Plain,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Auto => Theme::Auto,
            ThemeArg::Plain => Theme::Plain,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    install_tracing(cli.log_level.as_deref());
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn install_tracing(explicit: Option<&str>) {
    let filter = explicit
        .map(EnvFilter::try_new)
        .or_else(|| std::env::var(LOG_ENV).ok().map(EnvFilter::try_new))
        .and_then(Result::ok)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init();
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn Error>> {
    let config = CliConfig::load(cli.config.clone())?;
    debug!(config = ?config.path(), "cli.config.loaded");
    let opts = DatabaseOptions::default().synchronous(
        cli.synchronous
            .map(Synchronous::from)
            .or_else(|| config.synchronous())
            .unwrap_or_default(),
    );
    let db_path = cli.db.clone().or_else(|| config.default_db_path().cloned());
    let ui = Ui::new(cli.theme.into());

    let command = cli.command.unwrap_or(Command::Shell);
    if let Command::Shell = command {
        return run_shell(&ui, opts, db_path);
    }
    let db_path = db_path.ok_or("no database given; pass --db or set [database].default")?;
    run_command(command, &db_path, &opts, cli.format, &ui)
}

/// Runs one non-interactive command against `db_path`.
fn run_command(
    command: Command,
    db_path: &Path,
    opts: &DatabaseOptions,
    format: OutputFormat,
    ui: &Ui,
) -> Result<ExitCode, Box<dyn Error>> {
    match command {
        Command::Shell => return run_shell(ui, opts.clone(), Some(db_path.to_path_buf())),
        Command::Init => {
            let db = Database::open(db_path, opts)?;
            db.reinitialize()?;
            db.close()?;
            emit(format, &json!({ "path": db_path, "size": 0 }), || {
                ui.info(&format!("Initialized {}", db_path.display()))
            })?;
        }
        Command::Insert { name, phone } => {
            let record = Record::new(name, phone)?;
            let db = Database::open(db_path, opts)?;
            let outcome = db.insert(&record)?;
            db.close()?;
            emit(format, &outcome, || {
                ui.info(&format!(
                    "Inserted at position {} (slot {}, {} entries)",
                    outcome.position + 1,
                    outcome.slot,
                    outcome.size
                ))
            })?;
        }
        Command::List => {
            let db = admin::open_existing(db_path, opts)?;
            let listing = db.list()?;
            emit(format, &listing_json(&listing), || {
                ui.records(&listing.entries);
                println!("\nShowing {} entries", listing.declared);
            })?;
            if let Some(err) = &listing.failure {
                ui.warn(&format!(
                    "listing stopped after {} of {} entries: {err}",
                    listing.entries.len(),
                    listing.declared
                ));
            }
        }
        Command::Find { phone } => {
            let db = admin::open_existing(db_path, opts)?;
            let hits = db.find(&phone)?;
            emit(format, &hits, || print_hits(ui, &hits))?;
        }
        Command::Verify { level } => {
            let report = admin::verify(db_path, opts, level.into())?;
            emit(format, &report, || print_verify(ui, &report))?;
            if !report.success {
                return Ok(ExitCode::from(2));
            }
        }
        Command::Stats => {
            let report = admin::stats(db_path, opts)?;
            emit(format, &report, || print_stats(ui, &report))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn run_shell(
    ui: &Ui,
    opts: DatabaseOptions,
    initial: Option<PathBuf>,
) -> Result<ExitCode, Box<dyn Error>> {
    let mut session = Session::new(opts);
    if let Some(path) = initial {
        use_database(&mut session, &path.display().to_string());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            println!();
            break;
        }

        match ShellCommand::parse(&line) {
            ShellCommand::Use(path) => use_database(&mut session, &path),
            ShellCommand::Select => match session.list() {
                Ok(listing) => {
                    ui.records(&listing.entries);
                    if listing.failure.is_some() {
                        println!("Database structure is corrupted");
                    }
                    println!("\nShowing {} entries", listing.declared);
                }
                Err(err) => println!("{}", shell_message(&err)),
            },
            ShellCommand::Insert(args) => {
                if let Err(err) = session.insert(&args) {
                    println!("{}", shell_message(&err));
                }
            }
            ShellCommand::Find(phone) => match session.find(&phone) {
                Ok(hits) => print_hits(ui, &hits),
                Err(err) => println!("{}", shell_message(&err)),
            },
            ShellCommand::Restore => {
                if let Err(err) = session.reinitialize() {
                    println!("{}", shell_message(&err));
                }
            }
            ShellCommand::Verify => match session.database() {
                Ok(db) => match admin::verify_database(db, VerifyLevel::Full) {
                    Ok(report) => print_verify(ui, &report),
                    Err(err) => println!("{err}"),
                },
                Err(err) => println!("{}", shell_message(&err)),
            },
            ShellCommand::Stats => match session.database() {
                Ok(db) => match admin::stats_for(db) {
                    Ok(report) => print_stats(ui, &report),
                    Err(admin::AdminError::Core(err)) => println!("{}", shell_message(&err)),
                    Err(err) => println!("{err}"),
                },
                Err(err) => println!("{}", shell_message(&err)),
            },
            ShellCommand::Exit => break,
            ShellCommand::Empty => {}
            ShellCommand::Unknown(_) => println!("Command is not recognized"),
        }
    }

    session.close()?;
    Ok(ExitCode::SUCCESS)
}

fn use_database(session: &mut Session, path: &str) {
    match session.open(path) {
        Ok(_) => println!("Database {path} is loaded successfully"),
        Err(_) => println!("Failed to open database file"),
    }
}

fn shell_message(err: &PhoneDbError) -> String {
    match err {
        PhoneDbError::NoDatabase => "No database is used. Execute 'use db.bin' to use a database \
             (replace 'db.bin' with database file name)"
            .to_string(),
        PhoneDbError::Uninitialized => "Database is not initialized. Execute 'restore' \
             (WARNING: all previous data will be lost) to initialize the database"
            .to_string(),
        PhoneDbError::Corrupted(_) => "Database structure is corrupted".to_string(),
        PhoneDbError::BadFormat(_) => "Incorrect command format".to_string(),
        PhoneDbError::IndexFull { capacity } => {
            format!("Database is full ({capacity} entries)")
        }
        other => other.to_string(),
    }
}

fn listing_json(listing: &Listing) -> serde_json::Value {
    json!({
        "declared": listing.declared,
        "records": listing.entries,
        "error": listing.failure.as_ref().map(|err| err.to_string()),
    })
}

fn print_hits(ui: &Ui, hits: &[ListedRecord]) {
    ui.records(hits);
    println!("\nFound {} entries", hits.len());
}

fn print_verify(ui: &Ui, report: &VerifyReport) {
    let c = &report.counts;
    ui.section(
        "Verify",
        [
            ("success", report.success.to_string()),
            ("declared_records", c.declared_records.to_string()),
            ("records_read", c.records_read.to_string()),
            ("order_violations", c.order_violations.to_string()),
            ("file_bytes", c.file_bytes.to_string()),
            ("expected_file_bytes", c.expected_file_bytes.to_string()),
        ],
    );
    for finding in &report.findings {
        println!("- {:?}: {}", finding.severity, finding.message);
    }
}

fn print_stats(ui: &Ui, report: &StatsReport) {
    ui.section(
        "Stats",
        [
            ("size", report.size.to_string()),
            ("capacity", report.capacity.to_string()),
            ("free_slots", report.free_slots.to_string()),
            ("header_bytes", report.header_bytes.to_string()),
            ("record_bytes", report.record_bytes.to_string()),
            ("file_bytes", report.file_bytes.to_string()),
            ("expected_file_bytes", report.expected_file_bytes.to_string()),
        ],
    );
}

fn emit<T, F>(format: OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: serde::Serialize + ?Sized,
    F: FnOnce(),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(),
    }
    Ok(())
}
