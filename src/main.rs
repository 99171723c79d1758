//! xtrace-collapse CLI
//!
//! Reads a function trace and prints folded stacks for flamegraph tools.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use std::io;
use std::path::PathBuf;

use xtrace_collapse::aggregator::StackOrder;
use xtrace_collapse::commands::{execute_collapse, validate_args, CollapseArgs};
use xtrace_collapse::reader::WriterSink;
use xtrace_collapse::utils::config::{CollapseConfig, DEFAULT_MAX_LINE_LENGTH};

/// Collapse a function trace into folded stacks
#[derive(Parser, Debug)]
#[command(name = "stackcollapse-xtrace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Trace file to read (defaults to stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Write folded stacks to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip trace lines longer than this many bytes
    #[arg(long, env = "XTRACE_MAX_LINE_LENGTH", default_value_t = DEFAULT_MAX_LINE_LENGTH)]
    max_line_length: usize,

    /// Do not strip the stray 0xFF byte some producers put before function names
    #[arg(long)]
    keep_stray_prefix: bool,

    /// Output ordering
    #[arg(long, value_enum, default_value = "none")]
    sort: SortOrder,

    /// Print a hot path summary to stderr
    #[arg(long)]
    summary: bool,

    /// Number of paths in the summary
    #[arg(long, default_value = "10")]
    top: usize,

    /// Log how long each phase of the run took
    #[arg(long)]
    timings: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortOrder {
    /// Table order
    None,
    /// Heaviest stacks first
    Weight,
    /// Alphabetical by path
    Path,
}

impl From<SortOrder> for StackOrder {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::None => StackOrder::Unordered,
            SortOrder::Weight => StackOrder::Weight,
            SortOrder::Path => StackOrder::Path,
        }
    }
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let args = CollapseArgs {
        input: cli.input,
        output: cli.output,
        config: CollapseConfig::new()
            .with_max_line_length(cli.max_line_length)
            .with_stray_prefix_stripping(!cli.keep_stray_prefix),
        order: cli.sort.into(),
        print_summary: cli.summary,
        top_paths: cli.top,
        timings: cli.timings,
    };

    validate_args(&args)?;

    let mut sink = WriterSink::new(io::stderr());
    execute_collapse(&args, &mut sink)?;

    Ok(())
}
