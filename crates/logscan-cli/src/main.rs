//! Command-line entry point for the logscan threat scanner.

use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use clap::{Parser, Subcommand};
use colored::Colorize;

use logscan_eval::{DetectionEngine, ResultSet, RuleConfig};
use logscan_parser::{read_csv_path, read_ndjson, Record};
use logscan_report::{write_report, ScanInfo};

mod config;

#[derive(Parser)]
#[command(name = "logscan")]
#[command(about = "Scan tabular security logs for threats")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a CSV log file and write an HTML report
    Scan {
        /// Path to the CSV file to analyze
        #[arg(short, long)]
        input: PathBuf,

        /// Report output path
        #[arg(short, long, default_value = "threat_report.html")]
        output: PathBuf,

        /// Configuration file (created with defaults when missing)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Print the result set as JSON to stdout instead of writing a report
        #[arg(long)]
        json: bool,
    },

    /// Evaluate ad-hoc records against the rule catalog
    ///
    /// Records can be provided as a single JSON object (--event) or as
    /// NDJSON (newline-delimited JSON) from stdin.
    Eval {
        /// Configuration file (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// A single record as a JSON string (if omitted, reads NDJSON from stdin)
        #[arg(short, long)]
        event: Option<String>,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            input,
            output,
            config,
            json,
        } => cmd_scan(input, output, config, json),
        Commands::Eval {
            config,
            event,
            pretty,
        } => cmd_eval(config, event, pretty),
    }
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_scan(input: PathBuf, output: PathBuf, config_path: PathBuf, json: bool) {
    let config = config::load_or_create(&config_path);

    let records = match read_csv_path(&input) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("Error opening {}: {e}", input.display());
            process::exit(1);
        }
    };

    let start = Instant::now();
    let mut engine = DetectionEngine::new(config);

    let mut seen: u64 = 0;
    let mut tick = || {
        seen += 1;
        if seen % 1000 == 0 {
            eprint!("\rAnalyzing... {seen} records");
        }
    };
    let results = match engine.analyze(records, Some(&mut tick)) {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error during analysis: {e}");
            process::exit(1);
        }
    };
    if seen >= 1000 {
        eprintln!();
    }

    let info = ScanInfo {
        filename: input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string()),
        scan_date: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        records_analyzed: seen,
        duration_secs: start.elapsed().as_secs_f64(),
    };

    if json {
        print_json(&results, true);
        return;
    }

    if let Err(e) = write_report(&output, &results, &info) {
        eprintln!("Error writing report: {e}");
        process::exit(1);
    }

    print_summary(&results, seen, &output);
}

fn cmd_eval(config_path: Option<PathBuf>, event_json: Option<String>, pretty: bool) {
    let config = match config_path {
        Some(path) => config::load_or_create(&path),
        None => RuleConfig::default(),
    };
    let mut engine = DetectionEngine::new(config);

    let results = match event_json {
        Some(raw) => {
            let value: serde_json::Value = match serde_json::from_str(&raw) {
                Ok(v) => v,
                Err(e) => {
                    eprintln!("Invalid event JSON: {e}");
                    process::exit(1);
                }
            };
            let record = match Record::from_value(value) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Invalid event: {e}");
                    process::exit(1);
                }
            };
            engine.analyze_records([record], None)
        }
        None => {
            let stdin = io::stdin();
            match engine.analyze(read_ndjson(stdin.lock()), None) {
                Ok(results) => results,
                Err(e) => {
                    eprintln!("Error reading events: {e}");
                    process::exit(1);
                }
            }
        }
    };

    print_json(&results, pretty);
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn print_summary(results: &ResultSet, records: u64, output: &Path) {
    println!("{}", "Summary:".bold());
    println!("  Records analyzed: {records}");
    println!("  Threats detected: {}", results.total());
    println!("  {} {}", "Critical:".red().bold(), results.critical.len());
    println!("  {} {}", "High:".bright_red().bold(), results.high.len());
    println!("  {} {}", "Medium:".yellow().bold(), results.medium.len());
    println!("  {} {}", "Low:".green().bold(), results.low.len());
    println!("Report written to {}", output.display());
}

fn print_json(results: &ResultSet, pretty: bool) {
    let out = if pretty {
        serde_json::to_string_pretty(results)
    } else {
        serde_json::to_string(results)
    };
    match out {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("Error serializing results: {e}");
            process::exit(1);
        }
    }
}
