//! Exact state-vector simulation engine for Kvant circuit programs.
//!
//! Executes a [`kvant_ir::CircuitProgram`] shot by shot on a dense vector of
//! 2^n complex amplitudes and reports an outcome histogram together with the
//! final state of the last shot.
//!
//! - **State**: [`AmplitudeVector`] behind the [`QuantumState`] capability
//!   trait
//! - **Kernels**: [`ScalarKernel`] and [`VectorizedKernel`], two
//!   interchangeable [`GateKernel`] strategies that agree exactly
//! - **Measurement**: [`measure`] samples one qubit and collapses the state
//! - **Randomness**: [`Mt64`], a seeded MT19937-64 stream; a fixed seed
//!   reproduces every outcome on every platform and kernel path
//! - **Execution**: [`ShotExecutor`] runs one shot, [`SimulationRun`] runs
//!   many and aggregates a [`SimulationResult`]
//!
//! # Quick start
//!
//! ```rust
//! use kvant_ir::{Circuit, QubitId};
//! use kvant_sim::SimulationRun;
//!
//! let mut circuit = Circuit::with_size("coin", 1, 1);
//! circuit.h(QubitId(0)).unwrap();
//! circuit.measure_all().unwrap();
//! let program = circuit.build().unwrap();
//!
//! let result = SimulationRun::default().execute(&program, 20, Some(123)).unwrap();
//! assert_eq!(result.count("0"), 12);
//! assert_eq!(result.count("1"), 8);
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod kernel;
pub mod logging;
pub mod measurement;
pub mod random;
pub mod result;
pub mod run;
pub mod state;

pub use config::{ABSOLUTE_MAX_QUBITS, LogFormat, LoggingConfig, SimulationConfig};
pub use error::{SimError, SimResult};
pub use executor::{ClassicalRegister, ShotExecutor};
pub use kernel::{GateKernel, KernelPath, ScalarKernel, VectorizedKernel};
pub use logging::init_tracing;
pub use measurement::{measure, measure_many, reset_qubit};
pub use random::{FixedSequence, Mt64, RandomSource};
pub use result::{Amplitude, BitOrder, RunInfo, SimulationResult};
pub use run::{SimulationRun, execute};
pub use state::{AmplitudeVector, PROBABILITY_EPSILON, QuantumState};
