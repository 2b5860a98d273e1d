//! Multi-shot orchestration.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use kvant_ir::CircuitProgram;
use rustc_hash::FxHashMap;
use tracing::{debug, instrument};

use crate::config::SimulationConfig;
use crate::error::{SimError, SimResult};
use crate::executor::{ClassicalRegister, ShotExecutor};
use crate::kernel::{GateKernel, KernelPath};
use crate::random::{Mt64, RandomSource};
use crate::result::{Amplitude, BitOrder, RunInfo, SimulationResult};
use crate::state::{AmplitudeVector, QuantumState};

/// Executes circuit programs for many shots.
///
/// Shots run one after another and draw from a single random stream, so a
/// fixed seed reproduces the histogram exactly on either kernel path. A run
/// that fails part-way reports how many shots completed in
/// [`SimError::RunAborted`] and returns no histogram.
///
/// A `SimulationRun` owns its kernel and configuration and shares nothing
/// mutable besides the cancellation flag, so independent runs may execute
/// on separate threads.
#[derive(Debug)]
pub struct SimulationRun {
    config: SimulationConfig,
    kernel: Box<dyn GateKernel>,
    cancelled: Arc<AtomicBool>,
}

impl SimulationRun {
    /// Create a run after validating `config`.
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        config.validate()?;
        let kernel = config.kernel.kernel(config.parallel_threshold);
        Ok(Self {
            config,
            kernel,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Kernel path applying gates.
    pub fn kernel_path(&self) -> KernelPath {
        self.kernel.path()
    }

    /// Flag checked between shots; storing `true` stops the run with
    /// [`SimError::Cancelled`]. The flag stays raised until
    /// [`clear_cancel`](Self::clear_cancel).
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Lower the cancellation flag so the run can be reused.
    pub fn clear_cancel(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    /// Execute with the configured shot count and seed.
    pub fn run(&self, program: &CircuitProgram) -> SimResult<SimulationResult> {
        self.execute(program, self.config.shots, None)
    }

    /// Decode a program from its JSON instruction stream and execute it.
    pub fn execute_json(
        &self,
        json: &str,
        shots: u64,
        seed: Option<u64>,
    ) -> SimResult<SimulationResult> {
        let program = CircuitProgram::from_json(json)?;
        self.execute(&program, shots, seed)
    }

    /// Execute `program` for `shots` shots.
    ///
    /// `seed` falls back to the configured seed and then to an entropy draw;
    /// the seed used is recorded in the result either way.
    #[instrument(skip(self, program), fields(program = program.name()))]
    pub fn execute(
        &self,
        program: &CircuitProgram,
        shots: u64,
        seed: Option<u64>,
    ) -> SimResult<SimulationResult> {
        self.check_request(program, shots)?;
        let seed = seed.or(self.config.seed).unwrap_or_else(rand::random);
        let mut state = AmplitudeVector::with_limit(program.num_qubits(), self.config.max_qubits)?;
        let mut rng = Mt64::new(seed);
        self.execute_on(program, shots, seed, &mut state, &mut rng)
    }

    /// Execute against a caller-supplied state and random source.
    ///
    /// `seed` is only recorded in the result. The state must have at least
    /// as many qubits as the program.
    pub fn execute_on<S, R>(
        &self,
        program: &CircuitProgram,
        shots: u64,
        seed: u64,
        state: &mut S,
        rng: &mut R,
    ) -> SimResult<SimulationResult>
    where
        S: QuantumState + ?Sized,
        R: RandomSource + ?Sized,
    {
        let start = Instant::now();
        self.check_request(program, shots)?;
        if state.num_qubits() < program.num_qubits() {
            return Err(SimError::Configuration(format!(
                "program needs {} qubits but the state has {}",
                program.num_qubits(),
                state.num_qubits()
            )));
        }

        debug!(
            "Starting simulation: {} qubits, {} instructions, {} shots, seed {}, {} kernel",
            program.num_qubits(),
            program.len(),
            shots,
            seed,
            self.kernel.path()
        );

        let executor = ShotExecutor::new(program, self.kernel.as_ref());
        let mut histogram: FxHashMap<ClassicalRegister, u64> = FxHashMap::default();
        state.reset();

        for shot in 0..shots {
            if self.cancelled.load(Ordering::Relaxed) {
                debug!("Cancelled after {} shots", shot);
                return Err(SimError::Cancelled { shots_done: shot });
            }

            let outcome = executor
                .run_once(state, rng)
                .map_err(|e| SimError::RunAborted {
                    shots_done: shot,
                    source: Box::new(e),
                })?;
            *histogram.entry(outcome).or_insert(0) += 1;

            if shot > 0 && shot % 1000 == 0 {
                debug!("Completed {} shots", shot);
            }
        }

        let order = self.config.bit_order;
        let results = histogram
            .into_iter()
            .map(|(creg, count)| (creg.to_bitstring(order), count))
            .collect();
        let state = snapshot(&*state, self.config.amplitude_threshold, order);

        debug!("Simulation completed in {:?}", start.elapsed());

        Ok(SimulationResult {
            info: RunInfo {
                shots_requested: shots,
                shots_done: shots,
                seed,
                kernel: self.kernel.path(),
                bit_order: order,
            },
            results,
            state,
        })
    }

    fn check_request(&self, program: &CircuitProgram, shots: u64) -> SimResult<()> {
        if program.num_qubits() > self.config.max_qubits {
            return Err(SimError::Configuration(format!(
                "Circuit has {} qubits but the simulator is limited to {}",
                program.num_qubits(),
                self.config.max_qubits
            )));
        }
        if program.num_clbits() > self.config.max_clbits {
            return Err(SimError::Configuration(format!(
                "Circuit has {} classical bits but the simulator is limited to {}",
                program.num_clbits(),
                self.config.max_clbits
            )));
        }
        if shots > self.config.max_shots {
            return Err(SimError::Configuration(format!(
                "{shots} shots requested but at most {} are allowed",
                self.config.max_shots
            )));
        }
        Ok(())
    }
}

impl Default for SimulationRun {
    fn default() -> Self {
        let config = SimulationConfig::default();
        let kernel = config.kernel.kernel(config.parallel_threshold);
        Self {
            config,
            kernel,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Components of `state` with magnitude above `threshold`, keyed by basis
/// bitstring.
fn snapshot<S: QuantumState + ?Sized>(
    state: &S,
    threshold: f64,
    order: BitOrder,
) -> BTreeMap<String, Amplitude> {
    let width = state.num_qubits();
    (0..)
        .map_while(|i| state.amplitude_at(i).map(|a| (i, a)))
        .filter(|(_, a)| a.norm() > threshold)
        .map(|(i, a)| (order.format_index(i, width), Amplitude::from(a)))
        .collect()
}

/// Run `program` with default configuration.
pub fn execute(
    program: &CircuitProgram,
    shots: u64,
    seed: Option<u64>,
) -> SimResult<SimulationResult> {
    SimulationRun::default().execute(program, shots, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedSequence;
    use kvant_ir::{Circuit, QubitId};

    fn coin() -> CircuitProgram {
        let mut circuit = Circuit::with_size("coin", 1, 1);
        circuit.h(QubitId(0)).unwrap();
        circuit.measure_all().unwrap();
        circuit.build().unwrap()
    }

    #[test]
    fn test_counts_sum_to_shots() {
        let result = execute(&coin(), 100, Some(9)).unwrap();
        assert_eq!(result.total_count(), 100);
        assert_eq!(result.info.shots_done, 100);
        assert_eq!(result.info.seed, 9);
    }

    #[test]
    fn test_scripted_draws() {
        let run = SimulationRun::default();
        let mut state = AmplitudeVector::new(1).unwrap();
        let mut rng = FixedSequence::new([0.1, 0.9, 0.9]);
        let result = run
            .execute_on(&coin(), 3, 0, &mut state, &mut rng)
            .unwrap();
        assert_eq!(result.count("1"), 1);
        assert_eq!(result.count("0"), 2);
        assert_eq!(result.state.keys().collect::<Vec<_>>(), vec!["0"]);
    }

    #[test]
    fn test_seed_from_config() {
        let run = SimulationRun::new(SimulationConfig::default().with_seed(77)).unwrap();
        let a = run.execute(&coin(), 50, None).unwrap();
        let b = run.execute(&coin(), 50, None).unwrap();
        assert_eq!(a.info.seed, 77);
        assert_eq!(a.results, b.results);
    }

    #[test]
    fn test_max_qubits_rejected() {
        let run = SimulationRun::new(SimulationConfig::default().with_max_qubits(1)).unwrap();
        let program = Circuit::bell().unwrap().build().unwrap();
        assert!(matches!(
            run.execute(&program, 1, Some(0)),
            Err(SimError::Configuration(_))
        ));
    }

    #[test]
    fn test_cancel_before_start() {
        let run = SimulationRun::default();
        run.cancel();
        let err = run.execute(&coin(), 10, Some(1)).unwrap_err();
        assert!(matches!(err, SimError::Cancelled { shots_done: 0 }));

        run.clear_cancel();
        assert!(run.execute(&coin(), 10, Some(1)).is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimulationConfig::default();
        config.max_shots = 0;
        assert!(SimulationRun::new(config).is_err());
    }
}
