//! Shot-by-shot sampling.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use qflow_ir::{Circuit, ClassicalState, Value};
use qflow_sim::{SimulatorFactory, StatevectorFactory};

use crate::config::SamplerConfig;
use crate::context::ExecContext;
use crate::error::ExecResult;
use crate::interpreter::execute;

/// Everything one shot produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShotResult {
    /// Full measurement record.
    pub measurements: Vec<bool>,
    /// Emitted output bits.
    pub outputs: Vec<bool>,
    /// Names of the named emissions.
    pub output_names: Vec<String>,
    /// Final variable bindings.
    pub variables: BTreeMap<String, Value>,
}

impl From<ClassicalState> for ShotResult {
    fn from(state: ClassicalState) -> Self {
        let (measurements, outputs, output_names, variables) = state.into_parts();
        Self {
            measurements,
            outputs,
            output_names,
            variables: variables.into_iter().collect(),
        }
    }
}

/// Runs a circuit once per shot, each against a fresh simulator.
///
/// With a base seed, shot `s` is seeded with `seed + s` (wrapping), so two
/// samplers with the same seed produce the same traces.
pub struct DynamicSampler<F = StatevectorFactory> {
    circuit: Circuit,
    seed: Option<u64>,
    factory: F,
}

impl DynamicSampler<StatevectorFactory> {
    /// Sampler over the default statevector simulator.
    pub fn new(circuit: Circuit, seed: Option<u64>) -> Self {
        Self::with_factory(circuit, seed, StatevectorFactory::new())
    }

    /// Sampler configured from a [`SamplerConfig`].
    pub fn from_config(circuit: Circuit, config: &SamplerConfig) -> Self {
        Self::with_factory(
            circuit,
            config.seed,
            StatevectorFactory::with_max_qubits(config.max_qubits),
        )
    }
}

impl<F: SimulatorFactory> DynamicSampler<F> {
    /// Sampler over a custom simulator factory.
    pub fn with_factory(circuit: Circuit, seed: Option<u64>, factory: F) -> Self {
        Self {
            circuit,
            seed,
            factory,
        }
    }

    /// The sampled circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// The base seed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Seed used for shot `shot`.
    pub fn shot_seed(&self, shot: u64) -> Option<u64> {
        self.seed.map(|s| s.wrapping_add(shot))
    }

    /// Run one shot and return its classical state.
    pub fn run_shot(&self, shot: u64) -> ExecResult<ClassicalState> {
        let simulator = self.factory.create(self.shot_seed(shot))?;
        let mut ctx = ExecContext::new(simulator);
        execute(&self.circuit, &mut ctx)?;
        Ok(ctx.into_state())
    }

    /// Measurement record of every shot.
    #[instrument(skip(self))]
    pub fn sample(&self, shots: u64) -> ExecResult<Vec<Vec<bool>>> {
        self.run_shots(shots, |state| state.into_parts().0)
    }

    /// Measurements, outputs, output names and variables of every shot.
    #[instrument(skip(self))]
    pub fn sample_with_classical(&self, shots: u64) -> ExecResult<Vec<ShotResult>> {
        self.run_shots(shots, ShotResult::from)
    }

    fn run_shots<T>(&self, shots: u64, mut map: impl FnMut(ClassicalState) -> T) -> ExecResult<Vec<T>> {
        debug!(
            "Sampling {} shots over {} nodes",
            shots,
            self.circuit.len()
        );
        let mut results = Vec::with_capacity(usize::try_from(shots).unwrap_or(0));
        for shot in 0..shots {
            match self.run_shot(shot) {
                Ok(state) => results.push(map(state)),
                Err(e) => {
                    warn!(shot, error = %e, "Shot failed");
                    return Err(e);
                }
            }
            if shot > 0 && shot % 1000 == 0 {
                debug!("Completed {} shots", shot);
            }
        }
        info!(shots, "Sampling completed");
        Ok(results)
    }
}

/// Sampler construction directly from a circuit.
pub trait CircuitExt {
    /// Build a sampler over the default statevector simulator.
    fn compile_sampler(&self, seed: Option<u64>) -> DynamicSampler;
}

impl CircuitExt for Circuit {
    fn compile_sampler(&self, seed: Option<u64>) -> DynamicSampler {
        DynamicSampler::new(self.clone(), seed)
    }
}
