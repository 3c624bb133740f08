//! terrace-bench: CLI tool for tracing synthetic rasters and collecting
//! engine diagnostics.
//!
//! Generates a synthetic elevation surface, streams it through the
//! contour engine row by row, and prints timing plus the engine's
//! internal counters. Useful for:
//!
//! - Measuring throughput on rasters of various sizes
//! - Watching the open-fragment peak for different surface shapes
//! - Comparing interval-based and fixed level selection
//! - Checking nodata handling cost
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin terrace-bench -- [OPTIONS] <SURFACE>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use terrace_engine::{
    Contour, ContourConfig, ContourEngine, ContourSink, EngineDiagnostics, SinkError,
};

/// Synthetic-raster contour tracing benchmark.
///
/// Generates a synthetic elevation surface, runs the streaming contour
/// engine over it, and prints timing and counter diagnostics.
#[derive(Parser)]
#[command(name = "terrace-bench", version)]
struct Cli {
    /// Synthetic surface to trace.
    #[arg(value_enum)]
    surface: Surface,

    /// Raster width in samples.
    #[arg(long, default_value_t = 1024, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    width: usize,

    /// Raster height in rows.
    #[arg(long, default_value_t = 1024, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    height: usize,

    /// Contour interval.
    #[arg(long, default_value_t = 10.0)]
    interval: f64,

    /// Level offset for interval selection.
    #[arg(long, default_value_t = 0.0)]
    offset: f64,

    /// Explicit contour level (may be repeated; overrides --interval).
    #[arg(long = "level")]
    levels: Vec<f64>,

    /// Punch a nodata hole covering the central quarter of the raster.
    #[arg(long)]
    nodata_hole: bool,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,
}

/// Synthetic surface selection.
#[derive(Clone, Copy, ValueEnum)]
enum Surface {
    /// Single conical peak at the raster center (nested closed rings).
    Cone,
    /// Diagonal gradient (long open contours spanning the raster).
    Ramp,
    /// Crossed sine waves (many small closed rings).
    Waves,
}

/// Sentinel written into the nodata hole.
const NODATA: f64 = -9999.0;

/// Per-run result: contour counts from the sink plus engine counters.
struct RunStats {
    contours: u64,
    closed: u64,
    points: u64,
    diagnostics: EngineDiagnostics,
    millis: f64,
}

/// Sink that counts contours and vertices without storing geometry.
#[derive(Default)]
struct CountSink {
    contours: u64,
    closed: u64,
    points: u64,
}

impl ContourSink for CountSink {
    fn write(&mut self, contour: Contour) -> Result<(), SinkError> {
        self.contours += 1;
        if contour.is_closed() {
            self.closed += 1;
        }
        self.points += contour.polyline.len() as u64;
        Ok(())
    }
}

/// Sample value of the selected surface at grid position (x, y).
#[allow(clippy::cast_precision_loss)]
fn sample(surface: Surface, cli: &Cli, x: usize, y: usize) -> f64 {
    let (w, h) = (cli.width as f64, cli.height as f64);
    let (fx, fy) = (x as f64, y as f64);
    match surface {
        Surface::Cone => {
            let dx = fx - w / 2.0;
            let dy = fy - h / 2.0;
            let peak = cli.interval * 10.0;
            let slope = peak / (w.min(h) / 2.0);
            slope.mul_add(-dx.hypot(dy), peak)
        }
        Surface::Ramp => {
            let span = cli.interval * 20.0;
            (fx + fy) / (w + h) * span
        }
        Surface::Waves => {
            let period = 32.0;
            let amplitude = cli.interval * 3.0;
            amplitude
                * (fx * std::f64::consts::TAU / period).sin()
                * (fy * std::f64::consts::TAU / period).sin()
        }
    }
}

/// True when (x, y) lies inside the central nodata hole.
const fn in_hole(cli: &Cli, x: usize, y: usize) -> bool {
    let (x0, x1) = (cli.width * 3 / 8, cli.width * 5 / 8);
    let (y0, y1) = (cli.height * 3 / 8, cli.height * 5 / 8);
    x >= x0 && x < x1 && y >= y0 && y < y1
}

fn config_from_cli(cli: &Cli) -> ContourConfig {
    let config = if cli.levels.is_empty() {
        ContourConfig::interval_with_offset(cli.interval, cli.offset)
    } else {
        ContourConfig::fixed(cli.levels.clone())
    };
    if cli.nodata_hole {
        config.with_nodata(NODATA)
    } else {
        config
    }
}

/// Stream the surface through the engine once, feeding one row at a time.
fn run_once(cli: &Cli, config: &ContourConfig) -> Result<RunStats, terrace_engine::ContourError> {
    let start = Instant::now();
    let mut engine = ContourEngine::new(cli.width, config.clone(), CountSink::default())?;

    let mut row = vec![0.0_f64; cli.width];
    for y in 0..cli.height {
        for (x, slot) in row.iter_mut().enumerate() {
            *slot = if cli.nodata_hole && in_hole(cli, x, y) {
                NODATA
            } else {
                sample(cli.surface, cli, x, y)
            };
        }
        engine.feed(&row)?;
    }

    let diagnostics = engine.diagnostics();
    let sink = engine.finish()?;
    Ok(RunStats {
        contours: sink.contours,
        closed: sink.closed,
        points: sink.points,
        diagnostics,
        millis: start.elapsed().as_secs_f64() * 1000.0,
    })
}

fn print_report(stats: &RunStats) {
    let d = &stats.diagnostics;
    println!("{:<24} {:>14.3}", "Duration (ms)", stats.millis);
    println!("{:<24} {:>14}", "Contours", stats.contours);
    println!("{:<24} {:>14}", "  closed", stats.closed);
    println!("{:<24} {:>14}", "Points", stats.points);
    println!("{:<24} {:>14}", "Rows fed", d.rows_fed);
    println!("{:<24} {:>14}", "Cells evaluated", d.cells_evaluated);
    println!("{:<24} {:>14}", "Segments emitted", d.segments_emitted);
    println!("{:<24} {:>14}", "Odd-crossing cells", d.odd_crossing_cells);
    println!("{:<24} {:>14}", "Fragments opened", d.fragments_opened);
    println!("{:<24} {:>14}", "Fragments merged", d.fragments_merged);
    println!("{:<24} {:>14}", "Peak open fragments", d.peak_open_fragments);
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = config_from_cli(&cli);

    eprintln!("Raster: {}x{}", cli.width, cli.height);
    eprintln!("Config: {config:?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_stats = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match run_once(&cli, &config) {
            Ok(stats) => {
                if cli.json {
                    match serde_json::to_string_pretty(&stats.diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    print_report(&stats);
                }
                all_stats.push(stats);
            }
            Err(e) => {
                eprintln!("Engine error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_stats);
    }

    ExitCode::SUCCESS
}

/// Print aggregated timing across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_stats: &[RunStats]) {
    println!();
    println!("Summary ({} runs)\n{}", all_stats.len(), "=".repeat(60));

    let durations: Vec<f64> = all_stats.iter().map(|s| s.millis).collect();
    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");
}
