//! Grover's Search Algorithm Demo
//!
//! Runs Grover's algorithm on the simulator and compares the observed
//! success rate with the analytic one.

use std::path::PathBuf;

use clap::Parser;

use kvant_demos::circuits::{grover, grover_success_probability, optimal_iterations};
use kvant_demos::{
    print_header, print_histogram, print_info, print_result, print_section, print_success, setup,
};
use kvant_sim::SimulationRun;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "demo-grover")]
#[command(about = "Demonstrate Grover's search algorithm")]
struct Args {
    /// Number of qubits (search space size = 2^n)
    #[arg(short = 'n', long, default_value = "4")]
    qubits: u32,

    /// Marked state to search for (0 to 2^n - 1)
    #[arg(short, long, default_value = "7")]
    marked: u64,

    /// Number of Grover iterations (0 = optimal)
    #[arg(short, long, default_value = "0")]
    iterations: u32,

    /// Number of shots
    #[arg(short, long, default_value = "1000")]
    shots: u64,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// YAML configuration file
    #[arg(short, long, env = "KVANT_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = setup(args.config.as_ref())?;

    if args.qubits == 0 || args.qubits > 20 {
        anyhow::bail!("qubits must be between 1 and 20, got {}", args.qubits);
    }
    let max_state = (1u64 << args.qubits) - 1;
    if args.marked > max_state {
        anyhow::bail!(
            "marked state {} exceeds maximum {} for {} qubits",
            args.marked,
            max_state,
            args.qubits
        );
    }

    let iterations = if args.iterations == 0 {
        optimal_iterations(args.qubits)
    } else {
        args.iterations
    };

    print_header("Grover's Search Algorithm Demo");

    print_section("Problem Setup");
    print_result("Qubits", args.qubits);
    print_result("Search space size", 1u64 << args.qubits);
    print_result(
        "Marked state",
        format!(
            "|{}⟩ = |{:0width$b}⟩",
            args.marked,
            args.marked,
            width = args.qubits as usize
        ),
    );
    print_result("Grover iterations", iterations);

    let program = grover(args.qubits, args.marked, iterations)?;
    print_result("Instructions per shot", program.len());

    let bit_order = config.bit_order;
    let run = SimulationRun::new(config)?;
    let result = run.execute(&program, args.shots, args.seed)?;
    info!(seed = result.info.seed, shots = result.info.shots_done, "grover run finished");

    print_section("Outcomes");
    print_histogram(&result);

    let marked_bits: Vec<bool> = (0..args.qubits).map(|i| (args.marked >> i) & 1 == 1).collect();
    let marked_key = bit_order.format_bits(&marked_bits);
    let observed = result.count(&marked_key) as f64 / result.total_count().max(1) as f64;
    let expected = grover_success_probability(args.qubits, iterations);

    print_section("Success Rate");
    print_result("Marked bitstring", &marked_key);
    print_result("Observed", format!("{:.1}%", observed * 100.0));
    print_result("Expected", format!("{:.1}%", expected * 100.0));
    print_result("Seed", result.info.seed);

    println!();
    if result.most_frequent().map(|(k, _)| k) == Some(marked_key.as_str()) {
        print_success("Marked state is the most frequent outcome");
    } else {
        print_info("Marked state was not the most frequent outcome; try the optimal iteration count");
    }

    Ok(())
}
