//! auparse: browse and search Linux audit logs from the command line.
//!
//! Entry point: parses arguments, initialises structured logging, then
//! walks the selected audit source event by event, printing or exporting
//! the events that pass the search rules and time window.

use auparse::core::parser::AuParser;
use auparse::core::rule::{parse_rule_expr, RuleMode, StopPoint};
use auparse::core::search_preset::SearchPreset;
use auparse::core::snapshot::EventSnapshot;
use auparse::core::source::Source;
use auparse::export::{csv_export, json_export, validate_export_path};
use auparse::util::constants;
use auparse::util::error::{invalid_arg, Result};
use auparse::util::time::{format_event_time, parse_datetime_input};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::Layer as _;

#[derive(Parser, Debug)]
#[command(name = "auparse", version)]
#[command(about = "Assemble, interpret and search Linux audit log events", long_about = None)]
struct Cli {
    /// Audit log file to read; repeat to read several files in order
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Read the system audit logs, oldest rotation first
    #[arg(long, conflicts_with = "files")]
    logs: bool,

    /// auditd configuration used to locate the system logs
    #[arg(long, value_name = "PATH", requires = "logs")]
    auditd_conf: Option<PathBuf>,

    /// Search rule: `name=value`, `name!=value` or `name` (exists)
    #[arg(long = "rule", value_name = "EXPR")]
    rules: Vec<String>,

    /// Match events satisfying any rule instead of all of them
    #[arg(long)]
    any: bool,

    /// Where a match leaves the cursors: event, record or field
    #[arg(long, value_name = "POINT")]
    stop: Option<String>,

    /// Load search rules from a preset file before applying --rule
    #[arg(long, value_name = "FILE")]
    preset: Option<PathBuf>,

    /// Save the resulting search rules to a preset file
    #[arg(long, value_name = "FILE")]
    save_preset: Option<PathBuf>,

    /// Skip events before this local time (YYYY-MM-DD[ HH:MM[:SS]])
    #[arg(long, value_name = "TIME")]
    start: Option<String>,

    /// Skip events after this local time (YYYY-MM-DD[ HH:MM[:SS]])
    #[arg(long, value_name = "TIME")]
    end: Option<String>,

    /// Print interpreted field values instead of raw records
    #[arg(long)]
    interpret: bool,

    /// Write matching events to a file instead of printing them
    #[arg(long, value_enum, requires = "output")]
    export: Option<ExportFormat>,

    /// Export destination
    #[arg(long, value_name = "PATH", requires = "export")]
    output: Option<PathBuf>,

    /// Also write debug-level diagnostics to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

/// Inclusive time window; either end may be open.
#[derive(Debug)]
struct TimeWindow {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl TimeWindow {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let parse = |input: &Option<String>, which: &str| -> Result<Option<DateTime<Utc>>> {
            match input {
                None => Ok(None),
                Some(text) => parse_datetime_input(text)
                    .map(Some)
                    .ok_or_else(|| invalid_arg(format!("cannot parse --{which} time '{text}'"))),
            }
        };
        Ok(Self {
            start: parse(&cli.start, "start")?,
            end: parse(&cli.end, "end")?,
        })
    }

    fn is_open(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Events without a usable timestamp only pass an open window.
    fn contains(&self, time: Option<DateTime<Utc>>) -> bool {
        if self.is_open() {
            return true;
        }
        let Some(time) = time else {
            return false;
        };
        self.start.map_or(true, |s| time >= s) && self.end.map_or(true, |e| time <= e)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref());

    tracing::info!("{} v{} starting", constants::APP_NAME, constants::APP_VERSION);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("{}: {e}", constants::APP_NAME);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    if let Some(path) = &cli.output {
        validate_export_path(path)?;
    }
    let window = TimeWindow::from_cli(cli)?;

    let mut parser = AuParser::new(select_source(cli))?;
    configure_search(cli, &mut parser)?;

    let searching = !parser.search_rules().is_empty();
    let mut collected: Vec<EventSnapshot> = Vec::new();
    let mut matched = 0usize;

    loop {
        let found = if searching {
            parser.search_next_event()?
        } else {
            parser.next_event()?
        };
        if !found {
            break;
        }

        if window.contains(parser.event_time()) {
            matched += 1;
            if cli.export.is_some() {
                collected.extend(parser.snapshot());
            } else {
                print_event(&mut parser, cli.interpret);
            }
        }

        if searching && !parser.next_event()? {
            break;
        }
    }
    tracing::debug!("{matched} event(s) selected");

    if let (Some(format), Some(path)) = (cli.export, &cli.output) {
        match format {
            ExportFormat::Csv => csv_export::export_csv(&collected, path)?,
            ExportFormat::Json => json_export::export_json(&collected, path)?,
        }
    }
    Ok(())
}

fn select_source(cli: &Cli) -> Source {
    if cli.logs {
        return match &cli.auditd_conf {
            Some(conf) => Source::LogsFrom(conf.clone()),
            None => Source::Logs,
        };
    }
    match cli.files.as_slice() {
        [] => Source::Reader(Box::new(std::io::stdin().lock())),
        [single] => Source::File(single.clone()),
        many => Source::FileArray(many.to_vec()),
    }
}

/// Load the preset, add `--rule` expressions on top, set the stop point and
/// optionally save the combined search back out.
fn configure_search(cli: &Cli, parser: &mut AuParser) -> Result<()> {
    if let Some(path) = &cli.preset {
        SearchPreset::load(path)?.apply(parser)?;
    }

    let how = if cli.any { RuleMode::Or } else { RuleMode::And };
    for expr in &cli.rules {
        let (field, op, value) = parse_rule_expr(expr)?;
        parser.search_add_item(&field, op.as_str(), value.as_deref(), how)?;
    }

    if let Some(stop) = &cli.stop {
        parser.search_set_stop(stop.parse::<StopPoint>()?);
    }

    if let Some(path) = &cli.save_preset {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| constants::APP_NAME.to_string());
        SearchPreset::from_parser(&name, parser).save(path)?;
    }
    Ok(())
}

fn print_event(parser: &mut AuParser, interpret: bool) {
    let node = parser
        .node()
        .map(|n| format!(" node={n}"))
        .unwrap_or_default();
    println!(
        "---- {} serial={}{node}",
        format_event_time(parser.time(), parser.milli()),
        parser.serial()
    );

    let mut more = parser.first_record().unwrap_or(false);
    while more {
        if interpret {
            println!("{}", interpreted_line(parser));
        } else if let Some(text) = parser.record_text() {
            println!("{text}");
        }
        more = parser.next_record().unwrap_or(false);
    }
}

/// The current record as `name=interpreted` pairs.
fn interpreted_line(parser: &mut AuParser) -> String {
    let mut pairs = Vec::with_capacity(parser.num_fields());
    if parser.first_field() {
        loop {
            let name = parser.field_name().unwrap_or_default().to_string();
            let value = parser.interpret_field().unwrap_or_default();
            pairs.push(format!("{name}={value}"));
            if !parser.next_field() {
                break;
            }
        }
    }
    pairs.join(" ")
}

/// Initialise the dual-layer tracing subscriber.
///
/// - **stderr layer**: filtered by `RUST_LOG` env var (default: `warn`).
/// - **file layer** (if `log_file` is `Some`): always writes at `debug`
///   level for post-mortem diagnostics.
fn init_logging(log_file: Option<&Path>) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(constants::DEFAULT_LOG_FILTER));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    if let Some(log_path) = log_file {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
        {
            Ok(file) => {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(std::sync::Mutex::new(file))
                    .with_filter(tracing_subscriber::EnvFilter::new(
                        constants::FILE_LOG_FILTER,
                    ));

                tracing_subscriber::registry()
                    .with(stderr_layer.with_filter(env_filter))
                    .with(file_layer)
                    .init();
                return;
            }
            Err(e) => eprintln!(
                "{}: cannot open log file {}: {e}",
                constants::APP_NAME,
                log_path.display()
            ),
        }
    }

    // Fallback: stderr only
    tracing_subscriber::registry()
        .with(stderr_layer.with_filter(env_filter))
        .init();
}
