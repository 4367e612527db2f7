//! Spectrum Observatory capture inspector
//!
//! # Usage Examples
//!
//! ## PSD scan summary, every block to CSV, block 3 to MAT
//! ```bash
//! specobs psd scan.bin -d 0 -m 3
//! ```
//!
//! ## Raw IQ file to a GNU Radio cfile
//! ```bash
//! specobs iq iq.bin -g 0
//! ```
//!
//! ## Aggregate window with all three series
//! ```bash
//! specobs range scan.bin --start 100 --end 100.5 --min --csv window.csv
//! ```

use std::fs::File;
use std::io::{BufWriter, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{info, warn};

use specobs::export::csv::CsvWriter;
use specobs::export::mat::write_slice_mat;
use specobs::report::{self, IqReport, PsdReport};
use specobs::{
    IqExporter, PsdExporter, RangeRequest, Selector, SeriesSelection, aggregate_psd, capture,
    summarize_iq,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Decode, aggregate and export Spectrum Observatory captures",
    long_about = None
)]
struct Cli {
    /// Verbosity level (-v=info, -vv=debug, -vvv=trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a PSD scan file and export selected blocks
    Psd {
        /// Scan file (compressed or not)
        path: PathBuf,

        #[command(flatten)]
        exports: BlockExports,

        /// Print the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Summarize a raw IQ file and export selected snapshots
    Iq {
        /// Raw IQ file (compressed or not)
        path: PathBuf,

        #[command(flatten)]
        exports: BlockExports,

        /// cfile export: 0 = every block, N = block N, negative or no value = off
        #[arg(
        short = 'g',
        long = "cfile",
        num_args = 0..=1,
        default_missing_value = "-1",
        allow_negative_numbers = true
    )]
        cfile: Option<i64>,

        /// Print the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Aggregate a PSD scan file and cut a frequency window out of it
    Range(RangeArgs),
}

#[derive(Args, Debug)]
struct BlockExports {
    /// CSV export: 0 = every block, N = block N, negative or no value = off
    #[arg(
        short = 'd',
        long = "csv",
        num_args = 0..=1,
        default_missing_value = "-1",
        allow_negative_numbers = true
    )]
    csv: Option<i64>,

    /// MAT export: 0 = every block, N = block N, negative or no value = off
    #[arg(
        short = 'm',
        long = "mat",
        num_args = 0..=1,
        default_missing_value = "-1",
        allow_negative_numbers = true
    )]
    mat: Option<i64>,
}

#[derive(Args, Debug)]
struct RangeArgs {
    /// Scan file (compressed or not)
    path: PathBuf,

    /// Window start in MHz
    #[arg(long)]
    start: f64,

    /// Window end in MHz
    #[arg(long)]
    end: f64,

    /// Lower bound of the magnitude window in dB
    #[arg(long, default_value_t = -140.0, allow_hyphen_values = true)]
    y_min: f64,

    /// Upper bound of the magnitude window in dB
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    y_max: f64,

    /// Include the min-hold series
    #[arg(long, default_value_t = false)]
    min: bool,

    /// Leave out the average series
    #[arg(long, default_value_t = false)]
    no_avg: bool,

    /// Leave out the max-hold series
    #[arg(long, default_value_t = false)]
    no_max: bool,

    /// Write the window as CSV to this file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the window as a MAT file (Freq, Avg, Max_Hold, Min_Hold)
    #[arg(long)]
    mat: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 0 = WARN (quiet), 1 = INFO, 2 = DEBUG, 3+ = TRACE
    let log_level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let _ = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .try_init();

    let cancel = cancel_on_ctrl_c();

    match cli.command {
        Command::Psd { path, exports, json } => run_psd(path, exports, json, cancel).await,
        Command::Iq {
            path,
            exports,
            cfile,
            json,
        } => run_iq(path, exports, cfile, json, cancel).await,
        Command::Range(args) => run_range(args, cancel).await,
    }
}

/// Flag raised on Ctrl-C, polled by the traversal between blocks
fn cancel_on_ctrl_c() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    let raised = Arc::clone(&flag);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping before the next block");
            raised.store(true, Ordering::Relaxed);
        }
    });
    flag
}

async fn run_psd(
    path: PathBuf,
    exports: BlockExports,
    json: bool,
    cancel: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let path = capture::expanduser(path);
    let file = specobs::read_scan_file_async(&path)
        .await
        .with_context(|| format!("failed to load PSD scan file {}", path.display()))?;

    let input = path.clone();
    let (state, outputs, file) = tokio::task::spawn_blocking(move || -> specobs::Result<_> {
        let mut exporter = PsdExporter::open(
            &input,
            Selector::from_arg(exports.csv),
            Selector::from_arg(exports.mat),
        )?;
        let state = aggregate_psd(&file, Some(cancel.as_ref()), |index, block, decoded| {
            if !json {
                println!("{}", report::psd_block_line(index, block));
            }
            exporter.on_block(index, block, decoded)
        })?;
        Ok((state, exporter.finish()?, file))
    })
    .await?
    .with_context(|| format!("failed to aggregate {}", path.display()))?;

    let report = PsdReport::new(&path, file.config.as_ref(), &state, outputs);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

async fn run_iq(
    path: PathBuf,
    exports: BlockExports,
    cfile: Option<i64>,
    json: bool,
    cancel: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    let path = capture::expanduser(path);
    let file = specobs::read_raw_iq_file_async(&path)
        .await
        .with_context(|| format!("failed to load raw IQ file {}", path.display()))?;

    let input = path.clone();
    let (summary, outputs, file) = tokio::task::spawn_blocking(move || -> specobs::Result<_> {
        let mut exporter = IqExporter::open(
            &input,
            Selector::from_arg(exports.csv),
            Selector::from_arg(exports.mat),
            Selector::from_arg(cfile),
        )?;
        let summary = summarize_iq(&file, Some(cancel.as_ref()), |index, block| {
            if !json {
                println!("{}", report::iq_block_line(index, block));
            }
            exporter.on_block(index, block)
        })?;
        Ok((summary, exporter.finish()?, file))
    })
    .await?
    .with_context(|| format!("failed to read snapshots of {}", path.display()))?;

    let report = IqReport::new(&path, file.config.as_ref(), &summary, outputs);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

async fn run_range(args: RangeArgs, cancel: Arc<AtomicBool>) -> anyhow::Result<()> {
    let path = capture::expanduser(args.path.clone());
    let file = specobs::read_scan_file_async(&path)
        .await
        .with_context(|| format!("failed to load PSD scan file {}", path.display()))?;

    let state = tokio::task::spawn_blocking(move || {
        aggregate_psd(&file, Some(cancel.as_ref()), |_, _, _| Ok(()))
    })
    .await?
    .with_context(|| format!("failed to aggregate {}", path.display()))?;

    let request = RangeRequest {
        start_mhz: args.start,
        end_mhz: args.end,
        y_min: args.y_min,
        y_max: args.y_max,
        series: SeriesSelection {
            min: args.min,
            avg: !args.no_avg,
            max: !args.no_max,
        },
    };
    let axis = state.axis();
    let slice = request.apply(&state).with_context(|| {
        format!(
            "window {}-{} MHz rejected (axis {}-{} MHz)",
            args.start, args.end, axis.start_mhz, axis.end_mhz
        )
    })?;
    info!(bins = slice.len(), "sliced aggregate");

    let outside = slice.count_outside(request.y_min, request.y_max, request.series);
    if outside > 0 {
        warn!(
            outside,
            y_min = request.y_min,
            y_max = request.y_max,
            "values fall outside the magnitude window"
        );
    }

    if let Some(out) = &args.csv {
        let mut csv = CsvWriter::new(create(out)?);
        csv.write_slice(&slice, request.series)?;
        csv.flush()?;
        println!("Wrote {}", out.display());
    }
    if let Some(out) = &args.mat {
        write_slice_mat(create(out)?, &slice)?;
        println!("Wrote {}", out.display());
    }
    if args.csv.is_none() && args.mat.is_none() {
        let mut csv = CsvWriter::new(stdout().lock());
        csv.write_slice(&slice, request.series)?;
        csv.flush()?;
    }
    Ok(())
}

fn create(path: &Path) -> anyhow::Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
