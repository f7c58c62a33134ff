//! Simulator interface and the statevector implementation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use qflow_ir::{Instruction, OpCode, Operation, collect_qubits};

use crate::error::{SimError, SimResult};
use crate::statevector::Statevector;

/// Default qubit limit of the statevector simulator.
pub const DEFAULT_MAX_QUBITS: u32 = 20;

/// A stateful simulator for one shot.
pub trait Simulator {
    /// Apply instructions as one atomic unit.
    fn execute(&mut self, instructions: &[Instruction]) -> SimResult<()>;

    /// Every measurement result so far, oldest first.
    fn measurement_record(&self) -> &[bool];

    /// Apply instructions and return only the bits they produced.
    fn apply(&mut self, instructions: &[Instruction]) -> SimResult<Vec<bool>> {
        let before = self.measurement_record().len();
        self.execute(instructions)?;
        Ok(self.measurement_record()[before..].to_vec())
    }
}

/// Creates one fresh simulator per shot.
pub trait SimulatorFactory {
    /// The simulator type produced.
    type Sim: Simulator;

    /// Create a simulator, deterministic when `seed` is given.
    fn create(&self, seed: Option<u64>) -> SimResult<Self::Sim>;
}

/// Seeded statevector simulator.
///
/// Qubits are allocated on first use, up to `max_qubits`.
pub struct StatevectorSimulator {
    state: Statevector,
    record: Vec<bool>,
    rng: StdRng,
    max_qubits: u32,
}

impl StatevectorSimulator {
    /// Create a simulator with the default qubit limit.
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_max_qubits(seed, DEFAULT_MAX_QUBITS)
    }

    /// Create a simulator with a custom qubit limit.
    pub fn with_max_qubits(seed: Option<u64>, max_qubits: u32) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: Statevector::new(0),
            record: Vec::new(),
            rng,
            max_qubits,
        }
    }

    /// The underlying statevector.
    pub fn statevector(&self) -> &Statevector {
        &self.state
    }

    fn ensure_capacity(&mut self, instructions: &[Instruction]) -> SimResult<()> {
        let Some(&highest) = collect_qubits(instructions).iter().next_back() else {
            return Ok(());
        };
        let requested = highest.saturating_add(1);
        if requested > self.max_qubits {
            return Err(SimError::TooManyQubits {
                requested,
                max: self.max_qubits,
            });
        }
        if requested as usize > self.state.num_qubits() {
            debug!("Growing statevector to {} qubits", requested);
            self.state.grow_to(requested as usize);
        }
        Ok(())
    }

    fn run(&mut self, instruction: &Instruction) {
        match instruction {
            Instruction::Op(op) => self.run_op(op),
            Instruction::Repeat { count, body } => {
                for _ in 0..*count {
                    for inst in body {
                        self.run(inst);
                    }
                }
            }
        }
    }

    fn sample(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    fn measure_z(&mut self, q: usize) -> bool {
        let r = self.sample();
        self.state.measure(q, r)
    }

    fn reset_z(&mut self, q: usize) {
        let r = self.sample();
        self.state.reset(q, r);
    }

    fn run_op(&mut self, op: &Operation) {
        let qubits: Vec<usize> = op.qubits().map(|q| q as usize).collect();
        let sv = &mut self.state;
        match op.opcode {
            OpCode::I => {}
            OpCode::X => qubits.iter().for_each(|&q| sv.apply_x(q)),
            OpCode::Y => qubits.iter().for_each(|&q| sv.apply_y(q)),
            OpCode::Z => qubits.iter().for_each(|&q| sv.apply_z(q)),
            OpCode::H => qubits.iter().for_each(|&q| sv.apply_h(q)),
            OpCode::S => qubits.iter().for_each(|&q| sv.apply_s(q)),
            OpCode::SDag => qubits.iter().for_each(|&q| sv.apply_sdg(q)),
            OpCode::T => qubits
                .iter()
                .for_each(|&q| sv.apply_phase(q, std::f64::consts::FRAC_PI_4)),
            OpCode::TDag => qubits
                .iter()
                .for_each(|&q| sv.apply_phase(q, -std::f64::consts::FRAC_PI_4)),
            OpCode::SqrtX => qubits
                .iter()
                .for_each(|&q| sv.apply_rx(q, std::f64::consts::FRAC_PI_2)),
            OpCode::SqrtXDag => qubits
                .iter()
                .for_each(|&q| sv.apply_rx(q, -std::f64::consts::FRAC_PI_2)),
            OpCode::SqrtY => qubits
                .iter()
                .for_each(|&q| sv.apply_ry(q, std::f64::consts::FRAC_PI_2)),
            OpCode::SqrtYDag => qubits
                .iter()
                .for_each(|&q| sv.apply_ry(q, -std::f64::consts::FRAC_PI_2)),

            OpCode::CX => pairs(&qubits).for_each(|(c, t)| sv.apply_cx(c, t)),
            OpCode::CY => pairs(&qubits).for_each(|(c, t)| sv.apply_cy(c, t)),
            OpCode::CZ => pairs(&qubits).for_each(|(c, t)| sv.apply_cz(c, t)),
            OpCode::Swap => pairs(&qubits).for_each(|(a, b)| sv.apply_swap(a, b)),
            OpCode::ISwap => pairs(&qubits).for_each(|(a, b)| sv.apply_iswap(a, b)),

            OpCode::M => {
                for q in qubits {
                    let bit = self.measure_z(q);
                    self.record.push(bit);
                }
            }
            OpCode::MX => {
                for q in qubits {
                    self.state.apply_h(q);
                    let bit = self.measure_z(q);
                    self.state.apply_h(q);
                    self.record.push(bit);
                }
            }
            OpCode::MY => {
                for q in qubits {
                    self.state.apply_sdg(q);
                    self.state.apply_h(q);
                    let bit = self.measure_z(q);
                    self.state.apply_h(q);
                    self.state.apply_s(q);
                    self.record.push(bit);
                }
            }
            OpCode::MR => {
                for q in qubits {
                    let bit = self.measure_z(q);
                    if bit {
                        self.state.apply_x(q);
                    }
                    self.record.push(bit);
                }
            }
            OpCode::R => {
                for q in qubits {
                    self.reset_z(q);
                }
            }
            OpCode::RX => {
                for q in qubits {
                    self.reset_z(q);
                    self.state.apply_h(q);
                }
            }
            OpCode::RY => {
                for q in qubits {
                    self.reset_z(q);
                    self.state.apply_h(q);
                    self.state.apply_s(q);
                }
            }

            OpCode::XError | OpCode::YError | OpCode::ZError | OpCode::Depolarize1 => {
                let p = op.args.first().copied().unwrap_or(0.0);
                for q in qubits {
                    if self.sample() >= p {
                        continue;
                    }
                    let pauli = match op.opcode {
                        OpCode::XError => 0,
                        OpCode::YError => 1,
                        OpCode::ZError => 2,
                        _ => self.rng.gen_range(0..3),
                    };
                    trace!("Injecting {} error on qubit {}", ["X", "Y", "Z"][pauli], q);
                    match pauli {
                        0 => self.state.apply_x(q),
                        1 => self.state.apply_y(q),
                        _ => self.state.apply_z(q),
                    }
                }
            }

            OpCode::Tick
            | OpCode::Detector
            | OpCode::ObservableInclude
            | OpCode::QubitCoords
            | OpCode::ShiftCoords => {}
        }
    }
}

fn pairs(qubits: &[usize]) -> impl Iterator<Item = (usize, usize)> + '_ {
    qubits.chunks_exact(2).map(|p| (p[0], p[1]))
}

impl Simulator for StatevectorSimulator {
    fn execute(&mut self, instructions: &[Instruction]) -> SimResult<()> {
        self.ensure_capacity(instructions)?;
        for inst in instructions {
            self.run(inst);
        }
        Ok(())
    }

    fn measurement_record(&self) -> &[bool] {
        &self.record
    }
}

/// Factory for [`StatevectorSimulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatevectorFactory {
    max_qubits: u32,
}

impl StatevectorFactory {
    /// Factory with the default qubit limit.
    pub fn new() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
        }
    }

    /// Factory with a custom qubit limit.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self { max_qubits }
    }

    /// The configured qubit limit.
    pub fn max_qubits(&self) -> u32 {
        self.max_qubits
    }
}

impl Default for StatevectorFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatorFactory for StatevectorFactory {
    type Sim = StatevectorSimulator;

    fn create(&self, seed: Option<u64>) -> SimResult<StatevectorSimulator> {
        Ok(StatevectorSimulator::with_max_qubits(seed, self.max_qubits))
    }
}
