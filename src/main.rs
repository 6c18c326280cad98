use anyhow::Context;
use clap::Parser;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tap_parquet::config::{TAP_NAME, TapConfig};
use tap_parquet::runner::{SyncOptions, run_discover, run_sync};
use tap_parquet::singer::JsonLinesSink;
use tracing::warn;

/// Singer tap that extracts rows from a Parquet file
#[derive(Parser, Clone)]
#[command(name = "tap-parquet", version, about)]
struct Args {
    /// Path to the JSON config file (requires "filepath"; accepts "start_date" and "batch_size")
    #[arg(short, long)]
    config: PathBuf,

    /// Print the catalog of discovered streams instead of syncing
    #[arg(short, long)]
    discover: bool,

    /// Catalog file (accepted for orchestrator compatibility; all streams are synced)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// State file (accepted for orchestrator compatibility; syncs are always full-table)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Quiet mode - only warnings and errors on stderr, no progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the protocol messages
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    let filter = if args.quiet {
        EnvFilter::new("tap_parquet=warn")
    } else {
        EnvFilter::new("tap_parquet=info")
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let config = TapConfig::from_file(&args.config)?;

    if args.catalog.is_some() {
        warn!("{}: --catalog is ignored; every discovered stream is synced", TAP_NAME);
    }
    if args.state.is_some() {
        warn!("{}: --state is ignored; streams are synced full-table", TAP_NAME);
    }

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.discover {
        let catalog = run_discover(&config)?;
        serde_json::to_writer_pretty(&mut out, &catalog).context("Failed to write catalog")?;
        writeln!(out).context("Failed to write catalog")?;
        out.flush().context("Failed to write catalog")?;
        return Ok(());
    }

    let options = SyncOptions {
        show_progress: !args.quiet,
    };
    let mut sink = JsonLinesSink::new(out);
    run_sync(&config, &mut sink, &options)?;

    Ok(())
}
