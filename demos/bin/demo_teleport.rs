//! Quantum Teleportation Demo
//!
//! Teleports `Ry(theta)|0⟩` from qubit 0 to qubit 2 using mid-circuit
//! measurement and classically conditioned corrections, then checks the
//! final state of qubit 2.

use std::path::PathBuf;

use clap::Parser;

use kvant_demos::circuits::teleportation;
use kvant_demos::{
    print_header, print_histogram, print_result, print_section, print_state, print_success, setup,
};
use kvant_sim::{BitOrder, SimulationRun};

#[derive(Parser, Debug)]
#[command(name = "demo-teleport")]
#[command(about = "Teleport a single-qubit state")]
struct Args {
    /// Rotation angle of the state to teleport
    #[arg(short, long, default_value = "1.0")]
    theta: f64,

    /// Number of shots
    #[arg(short, long, default_value = "200")]
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
    let bit_order = config.bit_order;

    let program = teleportation(args.theta)?;
    let run = SimulationRun::new(config)?;
    let result = run.execute(&program, args.shots, args.seed)?;

    print_header("Quantum Teleportation Demo");

    print_section("Bell Measurement Outcomes (c0 c1, c2 unused)");
    print_histogram(&result);

    print_section("Final State (last shot)");
    print_state(&result);

    // qubit 2 is the last character unless bit 0 is printed last
    let target_is_one = |basis: &str| match bit_order {
        BitOrder::IndexZeroFirst => basis.ends_with('1'),
        BitOrder::IndexZeroLast => basis.starts_with('1'),
    };
    let p_one: f64 = result
        .state
        .iter()
        .filter(|(basis, _)| target_is_one(basis))
        .map(|(_, amp)| amp.norm)
        .sum();
    let expected = (args.theta / 2.0).sin().powi(2);

    print_section("Qubit 2");
    print_result("P(1) after teleport", format!("{p_one:.6}"));
    print_result("P(1) of the input", format!("{expected:.6}"));

    println!();
    if (p_one - expected).abs() < 1e-9 {
        print_success("State arrived intact");
    } else {
        anyhow::bail!("teleported state differs: {p_one} vs {expected}");
    }

    Ok(())
}
