// Parking Ledger CLI - CSV parking log in, dashboard JSON out

use anyhow::{Context, Result};
use clap::Parser;
use parking_ledger::{process, PipelineError, WindowSpec};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::exit;

/// Resolve a transcribed parking violation log into per-vehicle
/// dashboard data
#[derive(Parser, Debug)]
#[command(name = "parking-ledger", version)]
struct Cli {
    /// CSV export of the parking log; the filename's YYYYMMDD token (if
    /// any) caps how recent a valid record date can be
    input: PathBuf,

    /// Earliest date to include, YYYY-MM-DD
    #[arg(short, long)]
    start_date: Option<String>,

    /// Day after the last date to include, YYYY-MM-DD
    #[arg(short, long)]
    end_date: Option<String>,

    /// Number of days of records to retain
    #[arg(short, long)]
    days: Option<i64>,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        eprintln!("❌ {:#}", err);
        match err.downcast_ref::<PipelineError>() {
            Some(pipeline_err) => exit(pipeline_err.exit_code()),
            None => exit(1),
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let rows = read_rows(&cli.input)?;

    let spec = WindowSpec {
        start_date: cli.start_date.clone(),
        end_date: cli.end_date.clone(),
        days: cli.days,
    };
    let source_id = cli
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let data = process(&rows, &spec, &source_id)?;

    let json = serde_json::to_string_pretty(&data)?;
    match &cli.output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
            eprintln!(
                "✓ {} plates, {} records accepted → {}",
                data.records_by_plate.len(),
                data.stats.entries_accepted,
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

/// Read the whole CSV as string cells. Rows are ragged in practice, so
/// the reader is flexible and header handling is left to the pipeline.
fn read_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.with_context(|| format!("cannot read {}", path.display()))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", level);
    }
    pretty_env_logger::init();
}
