//! staypoint CLI - Debug tool for stop/transition segmentation
//!
//! Usage:
//!   staypoint-cli segment <samples.json> [--distance <mm>] [--duration <span>]
//!                         [--output <file.csv>] [--metrics]
//!   staypoint-cli generate <samples.json> [--stops <n>] [--seed <n>]
//!
//! The input is a JSON array of samples:
//!   [{"tracker": "t1", "session": "s1", "timestamp": "2020-08-11T09:00:00",
//!     "x": 1200.0, "y": 3400.0, "phase": 1, "quantile": 1}, ...]

use clap::{Parser, Subcommand};
use staypoint::synthetic::SyntheticSession;
use staypoint::time_utils::{format_duration, parse_duration};
use staypoint::{
    PhaseMetrics, PositionSample, SegmentRow, SegmentationConfig, SegmentationResult,
    compute_phase_metrics, segment_samples,
};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "staypoint-cli")]
#[command(about = "Debug tool for stop and transition segmentation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment samples into stops and transitions
    Segment {
        /// JSON file containing an array of samples
        input: PathBuf,

        /// Distance threshold in millimeters (overrides --config)
        #[arg(short, long)]
        distance: Option<f64>,

        /// Duration threshold, e.g. "0:00:10" or "10s" (overrides --config)
        #[arg(long)]
        duration: Option<String>,

        /// JSON configuration file with distance_threshold and duration_threshold
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the stop/transition table as CSV
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print per-phase stop and transition metrics
        #[arg(long)]
        metrics: bool,
    },

    /// Generate a synthetic session
    Generate {
        /// Output JSON file
        output: PathBuf,

        /// Number of stops (defaults to the classroom preset)
        #[arg(long)]
        stops: Option<usize>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> ExitCode {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{:5}] {}", record.level(), record.args()))
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Segment {
            input,
            distance,
            duration,
            config,
            output,
            metrics,
        } => run_segment(
            &input,
            distance,
            duration.as_deref(),
            config.as_deref(),
            output.as_deref(),
            metrics,
            cli.verbose,
        ),
        Commands::Generate {
            output,
            stops,
            seed,
        } => run_generate(&output, stops, seed),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Resolve thresholds: defaults, then the config file, then explicit flags.
fn load_config(
    distance: Option<f64>,
    duration: Option<&str>,
    config_path: Option<&Path>,
) -> staypoint::Result<SegmentationConfig> {
    let mut config = match config_path {
        Some(path) => SegmentationConfig::from_json(&fs::read_to_string(path)?)?,
        None => SegmentationConfig::default(),
    };
    if let Some(d) = distance {
        config.distance_threshold = d;
    }
    if let Some(span) = duration {
        config.duration_threshold = parse_duration(span)?;
    }
    config.validate()?;
    Ok(config)
}

/// Load samples from a JSON array
fn load_samples(path: &Path) -> staypoint::Result<Vec<PositionSample>> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Run segmentation
fn run_segment(
    input: &Path,
    distance: Option<f64>,
    duration: Option<&str>,
    config_path: Option<&Path>,
    output: Option<&Path>,
    metrics: bool,
    verbose: bool,
) -> staypoint::Result<()> {
    let config = load_config(distance, duration, config_path)?;

    println!("\n{}", "=".repeat(60));
    println!("Loading samples from: {}", input.display());
    println!("{}", "=".repeat(60));

    let samples = load_samples(input)?;
    println!("  Loaded {} samples", samples.len());

    if verbose {
        println!("\n[Config]");
        println!("  distance_threshold: {}mm", config.distance_threshold);
        println!(
            "  duration_threshold: {}",
            format_duration(config.duration_threshold)
        );
    }

    println!("\n{}", "=".repeat(60));
    println!("SEGMENTATION");
    println!("{}", "=".repeat(60));

    let result = segment_samples(samples, &config)?;
    print_summary(&result, verbose);

    if metrics {
        print_metrics(&compute_phase_metrics(&result));
    }

    if let Some(path) = output {
        let rows = result.rows();
        write_rows_csv(&rows, path)?;
        println!("\n[Export] Written {} rows to: {}", rows.len(), path.display());
    }

    Ok(())
}

fn print_summary(result: &SegmentationResult, verbose: bool) {
    println!("\n{}", "-".repeat(60));
    println!(
        "RESULTS: {} partitions, {} clusters, {} stops, {} transitions",
        result.stats.partitions,
        result.stats.clusters,
        result.stats.stop_blocks,
        result.stats.transition_blocks
    );
    println!("{}", "-".repeat(60));

    for partition in &result.partitions {
        println!(
            "\n  {} ({} samples, {} blocks):",
            partition.key,
            partition.samples.len(),
            partition.blocks.len()
        );
        for stop in partition.stops() {
            println!(
                "    Stop #{:<4} {}  {:>8}  at ({:.0}, {:.0}) ± ({:.0}, {:.0})",
                stop.block_id,
                stop.start.format("%H:%M:%S"),
                format_duration(stop.duration),
                stop.x,
                stop.y,
                stop.x_stdev,
                stop.y_stdev
            );
        }
        if verbose {
            for block in partition.blocks.iter().filter(|b| !b.is_stop()) {
                println!(
                    "    Transition #{:<4} {} samples over {} (clusters {:?})",
                    block.id,
                    block.len(),
                    format_duration(block.duration()),
                    block.cluster_ids
                );
            }
        }
    }
}

fn print_metrics(metrics: &[PhaseMetrics]) {
    println!("\n{}", "-".repeat(60));
    println!("METRICS");
    println!("{}", "-".repeat(60));

    for m in metrics {
        println!(
            "\n  session {} / tracker {} / phase {}:",
            m.session, m.tracker, m.phase
        );
        println!(
            "    Stops: {} (total {:.2} min, max {:.2}, mean {:.2}, median {:.2}, std {:.2})",
            m.stops.count,
            m.stops.total_minutes,
            m.stops.max_minutes,
            m.stops.mean_minutes,
            m.stops.median_minutes,
            m.stops.std_minutes
        );
        println!(
            "    Transitions: {} ({:.1} m walked, {:.2} m/s)",
            m.transitions.count, m.transitions.distance_walked_m, m.transitions.mean_speed_m_per_s
        );
    }
}

/// Write the output table as CSV
fn write_rows_csv(rows: &[SegmentRow], path: &Path) -> staypoint::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", SegmentRow::CSV_HEADER)?;
    for row in rows {
        writeln!(writer, "{}", row.to_csv_record())?;
    }
    writer.flush()?;
    Ok(())
}

/// Generate a synthetic session and write it as JSON
fn run_generate(output: &Path, stops: Option<usize>, seed: Option<u64>) -> staypoint::Result<()> {
    let mut session = match stops {
        Some(n) => SyntheticSession::with_stop_count(n),
        None => SyntheticSession::classroom(),
    };
    if let Some(seed) = seed {
        session = session.with_seed(seed);
    }

    let dataset = session.generate();
    let file = File::create(output)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &dataset.samples)?;

    println!(
        "Generated {} samples ({} stops) -> {}",
        dataset.samples.len(),
        dataset.expected_stops,
        output.display()
    );
    Ok(())
}
