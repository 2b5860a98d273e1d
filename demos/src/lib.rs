//! Kvant Demo Suite
//!
//! Small programs showing the simulator on textbook circuits:
//!
//! - **Bell / GHZ**: entanglement and correlated outcomes
//! - **Grover's Search**: amplitude amplification with multi-controlled gates
//! - **Teleportation**: mid-circuit measurement and classically
//!   conditioned corrections
//! - **Seeded runs**: reproducible histograms from a fixed seed
//!
//! Every binary accepts `--config` for a YAML [`SimulationConfig`] and honors
//! `KVANT_*` environment overrides.

pub mod circuits;

use std::path::PathBuf;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use kvant_sim::{SimulationConfig, SimulationResult};

/// Load configuration from an optional file plus environment, then install
/// the tracing subscriber it describes.
pub fn setup(config_file: Option<&PathBuf>) -> anyhow::Result<SimulationConfig> {
    let config = SimulationConfig::load(config_file.map(PathBuf::as_path))?;
    kvant_sim::init_tracing(&config.logging)?;
    Ok(config)
}

/// Create a progress bar for demo operations.
pub fn create_progress_bar(len: u64, message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    Ok(pb)
}

/// Print a demo header.
pub fn print_header(title: &str) {
    println!();
    println!("{}", style("═".repeat(60)).cyan());
    println!("{}", style(format!("  {title}")).cyan().bold());
    println!("{}", style("═".repeat(60)).cyan());
    println!();
}

/// Print a demo section.
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("▶ {title}")).green().bold());
    println!("{}", style("─".repeat(40)).dim());
}

/// Print a result line.
pub fn print_result(label: &str, value: impl std::fmt::Display) {
    println!("  {} {}", style(format!("{label}:")).dim(), value);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("ℹ").blue(), message);
}

/// Print the histogram as bars, most frequent first.
pub fn print_histogram(result: &SimulationResult) {
    let total = result.total_count().max(1) as f64;
    let mut rows: Vec<_> = result.results.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (outcome, &count) in rows {
        let share = count as f64 / total;
        let bar = "█".repeat((share * 40.0).round() as usize);
        println!(
            "  {} {:>6} {:>6.2}% {}",
            style(outcome).bold(),
            count,
            share * 100.0,
            style(bar).cyan()
        );
    }
}

/// Print the final-state components.
pub fn print_state(result: &SimulationResult) {
    for (basis, amp) in &result.state {
        println!(
            "  |{}⟩ {:+.6}{:+.6}i  p={:.6}",
            basis, amp.real, amp.imag, amp.norm
        );
    }
}
