//! Statevector simulation engine.

use num_complex::Complex64;
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

/// Probability below which a measurement outcome is treated as impossible.
const EPSILON: f64 = 1e-12;

type Matrix2 = [[Complex64; 2]; 2];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

const PAULI_X: Matrix2 = [[ZERO, ONE], [ONE, ZERO]];
const PAULI_Y: Matrix2 = [[ZERO, Complex64::new(0.0, -1.0)], [I, ZERO]];
const PAULI_Z: Matrix2 = [[ONE, ZERO], [ZERO, Complex64::new(-1.0, 0.0)]];

/// A statevector over `num_qubits` qubits, qubit `q` stored in bit `q`.
#[derive(Debug, Clone)]
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![ZERO; size];
        amplitudes[0] = ONE;
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Amplitudes in basis-index order.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Widen to `num_qubits`, new qubits starting in |0⟩.
    pub fn grow_to(&mut self, num_qubits: usize) {
        if num_qubits > self.num_qubits {
            self.amplitudes.resize(1 << num_qubits, ZERO);
            self.num_qubits = num_qubits;
        }
    }

    /// Probability of measuring `qubit` as 1.
    pub fn probability_one(&self, qubit: usize) -> f64 {
        let mask = 1 << qubit;
        self.amplitudes
            .iter()
            .enumerate()
            .filter(|(i, _)| i & mask != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum()
    }

    /// Measure `qubit` in the Z basis.
    ///
    /// `r` is a uniform sample in `[0, 1)`; outcomes with probability below
    /// the epsilon are never chosen, so known states measure deterministically.
    pub fn measure(&mut self, qubit: usize, r: f64) -> bool {
        let p1 = self.probability_one(qubit);
        let outcome = if p1 < EPSILON {
            false
        } else if p1 > 1.0 - EPSILON {
            true
        } else {
            r < p1
        };
        self.collapse(qubit, outcome, if outcome { p1 } else { 1.0 - p1 });
        outcome
    }

    fn collapse(&mut self, qubit: usize, outcome: bool, probability: f64) {
        let mask = 1 << qubit;
        let norm = probability.sqrt();
        for (i, amp) in self.amplitudes.iter_mut().enumerate() {
            if (i & mask != 0) == outcome {
                if norm > 0.0 {
                    *amp /= norm;
                }
            } else {
                *amp = ZERO;
            }
        }
    }

    /// Reset `qubit` to |0⟩ by measuring and flipping a 1 outcome.
    pub fn reset(&mut self, qubit: usize, r: f64) {
        if self.measure(qubit, r) {
            self.apply_x(qubit);
        }
    }

    // =========================================================================
    // Gate kernels
    // =========================================================================

    /// Apply `m` to `qubit` on the basis states where every bit of
    /// `controls` is set.
    fn apply_matrix(&mut self, qubit: usize, controls: usize, m: &Matrix2) {
        let mask = 1 << qubit;
        for i in 0..self.amplitudes.len() {
            if i & mask != 0 || i & controls != controls {
                continue;
            }
            let j = i | mask;
            let (a, b) = (self.amplitudes[i], self.amplitudes[j]);
            self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
            self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
        }
    }

    pub fn apply_x(&mut self, qubit: usize) {
        self.apply_matrix(qubit, 0, &PAULI_X);
    }

    pub fn apply_y(&mut self, qubit: usize) {
        self.apply_matrix(qubit, 0, &PAULI_Y);
    }

    pub fn apply_z(&mut self, qubit: usize) {
        self.apply_matrix(qubit, 0, &PAULI_Z);
    }

    pub fn apply_h(&mut self, qubit: usize) {
        let r = Complex64::new(FRAC_1_SQRT_2, 0.0);
        self.apply_matrix(qubit, 0, &[[r, r], [r, -r]]);
    }

    /// `diag(1, e^{i theta})`.
    pub fn apply_phase(&mut self, qubit: usize, theta: f64) {
        let phase = Complex64::from_polar(1.0, theta);
        self.apply_matrix(qubit, 0, &[[ONE, ZERO], [ZERO, phase]]);
    }

    pub fn apply_s(&mut self, qubit: usize) {
        self.apply_phase(qubit, FRAC_PI_2);
    }

    pub fn apply_sdg(&mut self, qubit: usize) {
        self.apply_phase(qubit, -FRAC_PI_2);
    }

    pub fn apply_rx(&mut self, qubit: usize, theta: f64) {
        let (s, c) = (theta / 2.0).sin_cos();
        let c = Complex64::new(c, 0.0);
        let mis = Complex64::new(0.0, -s);
        self.apply_matrix(qubit, 0, &[[c, mis], [mis, c]]);
    }

    pub fn apply_ry(&mut self, qubit: usize, theta: f64) {
        let (s, c) = (theta / 2.0).sin_cos();
        let (c, s) = (Complex64::new(c, 0.0), Complex64::new(s, 0.0));
        self.apply_matrix(qubit, 0, &[[c, -s], [s, c]]);
    }

    pub fn apply_cx(&mut self, control: usize, target: usize) {
        self.apply_matrix(target, 1 << control, &PAULI_X);
    }

    pub fn apply_cy(&mut self, control: usize, target: usize) {
        self.apply_matrix(target, 1 << control, &PAULI_Y);
    }

    pub fn apply_cz(&mut self, control: usize, target: usize) {
        self.apply_matrix(target, 1 << control, &PAULI_Z);
    }

    /// Exchange |01⟩ and |10⟩, multiplying both by `phase`.
    fn exchange(&mut self, a: usize, b: usize, phase: Complex64) {
        let (ma, mb) = (1 << a, 1 << b);
        for i in 0..self.amplitudes.len() {
            if i & ma != 0 && i & mb == 0 {
                let j = i ^ ma ^ mb;
                let (x, y) = (self.amplitudes[i], self.amplitudes[j]);
                self.amplitudes[i] = phase * y;
                self.amplitudes[j] = phase * x;
            }
        }
    }

    pub fn apply_swap(&mut self, a: usize, b: usize) {
        self.exchange(a, b, ONE);
    }

    pub fn apply_iswap(&mut self, a: usize, b: usize) {
        self.exchange(a, b, I);
    }
}
