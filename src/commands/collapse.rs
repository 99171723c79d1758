//! Collapse command implementation.
//!
//! The collapse command:
//! 1. Opens the trace (file or stdin)
//! 2. Reads and aggregates the trace body
//! 3. Builds collapsed stacks
//! 4. Writes the folded listing
//! 5. Optionally prints a summary to stderr

use crate::aggregator::{build_collapsed_stacks, calculate_duration_distribution, generate_text_summary, StackOrder};
use crate::output::{write_folded, write_folded_file};
use crate::reader::{collapse_trace, DiagnosticSink, TraceStats};
use crate::utils::config::CollapseConfig;
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Arguments for the collapse command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct CollapseArgs {
    /// Trace file, stdin when `None`
    pub input: Option<PathBuf>,

    /// Folded output file, stdout when `None`
    pub output: Option<PathBuf>,

    pub config: CollapseConfig,
    pub order: StackOrder,

    /// Print a hot path summary to stderr
    pub print_summary: bool,

    /// Number of paths in the summary
    pub top_paths: usize,

    /// Log phase timings of the run itself
    pub timings: bool,
}

impl Default for CollapseArgs {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            config: CollapseConfig::default(),
            order: StackOrder::Unordered,
            print_summary: false,
            top_paths: 10,
            timings: false,
        }
    }
}

/// What a finished command produced
#[derive(Debug, Clone)]
pub struct CollapseOutcome {
    pub stats: TraceStats,
    pub stack_count: usize,
}

/// Execute the collapse command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Input file cannot be opened
/// * Trace has no `TRACE START` line or no content at all
/// * Output cannot be written
pub fn execute_collapse<S: DiagnosticSink>(args: &CollapseArgs, sink: &mut S) -> Result<CollapseOutcome> {
    let start_time = Instant::now();

    let input = open_input(args)?;
    let result = collapse_trace(input, args.config.clone(), sink)
        .context("Failed to collapse trace")?;
    let read_elapsed = start_time.elapsed();

    let stats = result.stats;
    let stacks = build_collapsed_stacks(result.table, args.order);

    debug!("Distribution: {}", calculate_duration_distribution(&stacks).summary());

    let write_start = Instant::now();
    match &args.output {
        Some(path) => write_folded_file(&stacks, path)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => write_folded(&stacks, io::stdout().lock())
            .context("Failed to write folded stacks to stdout")?,
    }
    let write_elapsed = write_start.elapsed();

    if args.print_summary {
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{}", render_stats(&stats))?;
        writeln!(stderr, "{}", generate_text_summary(&stacks, args.top_paths))?;
    }

    if args.timings {
        log_timings(&stats, read_elapsed, write_elapsed);
    }

    Ok(CollapseOutcome {
        stack_count: stacks.len(),
        stats,
    })
}

/// Open the trace input
///
/// **Private** - internal helper for execute_collapse
fn open_input(args: &CollapseArgs) -> Result<Box<dyn BufRead>> {
    match &args.input {
        Some(path) => {
            info!("Reading trace from: {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Failed to open trace file {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            info!("Reading trace from stdin");
            Ok(Box::new(io::stdin().lock()))
        }
    }
}

fn render_stats(stats: &TraceStats) -> String {
    format!(
        "Lines: {} | Entries: {} | Exits: {} | Skipped: {} | Unmatched exits: {} | Open at end: {} | Max depth: {}",
        stats.lines_read,
        stats.entries,
        stats.exits,
        stats.malformed_lines,
        stats.unmatched_exits,
        stats.unfinished_calls,
        stats.max_depth
    )
}

fn log_timings(stats: &TraceStats, read: Duration, write: Duration) {
    let secs = read.as_secs_f64();
    let rate = if secs > 0.0 {
        stats.lines_read as f64 / secs
    } else {
        0.0
    };

    info!("Read and collapse: {:.3}s ({:.0} lines/s)", secs, rate);
    info!("Write output: {:.3}s", write.as_secs_f64());
}

/// Validate collapse arguments
///
/// **Public** - can be called before execute_collapse for early validation
pub fn validate_args(args: &CollapseArgs) -> Result<()> {
    if args.config.max_line_length == 0 {
        anyhow::bail!("max line length must be greater than 0");
    }

    if let Some(input) = &args.input {
        if !input.is_file() {
            anyhow::bail!("Trace file not found: {}", input.display());
        }
    }

    if args.print_summary && args.top_paths == 0 {
        anyhow::bail!("top paths must be greater than 0");
    }

    Ok(())
}
