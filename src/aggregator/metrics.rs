//! Calculate summary metrics and hot paths from collapsed stacks.
//!
//! Weights are inclusive: a caller's path already contains the time of
//! everything it called. Shares are therefore taken against the summed
//! weight of the root paths, not against the sum of all stacks.

use super::stack_builder::CollapsedStack;
use log::debug;
use std::cmp::Ordering;

/// A call path ranked by time spent
///
/// **Public** - returned from calculate_hot_paths
#[derive(Debug, Clone, PartialEq)]
pub struct HotPath {
    pub stack: String,
    pub duration_us: f64,

    /// Share of the total root time, in percent
    pub percentage: f64,
}

/// Summed weight of the outermost frames
pub fn root_total(stacks: &[CollapsedStack]) -> f64 {
    stacks
        .iter()
        .filter(|s| !s.stack.contains(';'))
        .map(|s| s.weight)
        .sum()
}

/// Calculate the `top_n` heaviest paths
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `stacks` - Collapsed stacks in any order
/// * `top_n` - Number of paths to return
///
/// # Returns
/// Vector of hot paths, heaviest first
pub fn calculate_hot_paths(stacks: &[CollapsedStack], top_n: usize) -> Vec<HotPath> {
    debug!("Calculating top {} hot paths from {} stacks", top_n, stacks.len());

    let total = root_total(stacks);
    let mut ranked: Vec<&CollapsedStack> = stacks.iter().collect();
    ranked.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));

    ranked
        .into_iter()
        .take(top_n)
        .map(|stack| create_hot_path(stack, total))
        .collect()
}

/// Create a HotPath from a CollapsedStack
///
/// **Private** - internal conversion
fn create_hot_path(stack: &CollapsedStack, total: f64) -> HotPath {
    let percentage = if total > 0.0 {
        (stack.weight / total) * 100.0
    } else {
        0.0
    };

    HotPath {
        stack: stack.stack.clone(),
        duration_us: stack.weight,
        percentage,
    }
}

/// Duration distribution statistics
///
/// **Public** - returned from calculate_duration_distribution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DurationDistribution {
    /// Summed weight of the root paths
    pub root_total_us: f64,

    /// Number of unique stacks
    pub stack_count: usize,

    pub mean_us: f64,
    pub median_us: f64,
    pub max_us: f64,

    /// Deepest stack seen in the output
    pub max_depth: usize,
}

impl DurationDistribution {
    /// Get human-readable summary
    ///
    /// **Public** - for logging and the text summary
    pub fn summary(&self) -> String {
        format!(
            "Total: {:.1}us | Stacks: {} | Mean: {:.1}us | Median: {:.1}us | Max: {:.1}us | Depth: {}",
            self.root_total_us,
            self.stack_count,
            self.mean_us,
            self.median_us,
            self.max_us,
            self.max_depth
        )
    }
}

/// Calculate duration distribution statistics
pub fn calculate_duration_distribution(stacks: &[CollapsedStack]) -> DurationDistribution {
    if stacks.is_empty() {
        return DurationDistribution::default();
    }

    let mut weights: Vec<f64> = stacks.iter().map(|s| s.weight).collect();
    weights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let count = weights.len();
    let sum: f64 = weights.iter().sum();

    DurationDistribution {
        root_total_us: root_total(stacks),
        stack_count: count,
        mean_us: sum / count as f64,
        median_us: weights[count / 2],
        max_us: weights[count - 1],
        max_depth: stacks.iter().map(CollapsedStack::depth).max().unwrap_or(0),
    }
}

/// Render a plain-text summary of the heaviest paths
pub fn generate_text_summary(stacks: &[CollapsedStack], max_lines: usize) -> String {
    let dist = calculate_duration_distribution(stacks);
    let mut lines = vec![dist.summary(), String::new()];

    lines.push(format!("{:>14}  {:>6}  {}", "TIME (us)", "%", "STACK"));
    for path in calculate_hot_paths(stacks, max_lines) {
        lines.push(format!(
            "{:>14.1}  {:>5.1}%  {}",
            path.duration_us, path.percentage, path.stack
        ));
    }

    lines.join("\n")
}
