//! Random Source
//!
//! Every stochastic step in the engine draws from a `RandomSource`, so runs
//! are reproducible from a seed and tests can script each draw.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Injectable uniform generator
pub trait RandomSource: Send + Sync {
    /// Uniform draw in `[0, 1)`
    fn uniform(&mut self) -> f64;

    /// Uniform index in `[0, len)`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;

    /// A permutation of `0..len`
    fn permutation(&mut self, len: usize) -> Vec<usize>;

    /// Draw from a normal distribution
    fn normal(&mut self, mean: f64, sd: f64) -> f64;
}

/// Seeded generator backing normal runs
pub struct SeededSource {
    rng: SmallRng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededSource {
    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn permutation(&mut self, len: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut self.rng);
        order
    }

    fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        // Box-Muller
        let u1: f64 = self.rng.gen::<f64>().max(f64::EPSILON);
        let u2: f64 = self.rng.gen::<f64>();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + z * sd
    }
}

/// Replays queued draws in order.
///
/// Once a queue runs dry, uniforms fall back to `fallback_uniform` and
/// indices to 0. Permutations are always the identity and normal draws return
/// the mean.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    uniforms: VecDeque<f64>,
    indices: VecDeque<usize>,
    fallback_uniform: f64,
    uniform_draws: usize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uniforms(mut self, draws: impl IntoIterator<Item = f64>) -> Self {
        self.uniforms.extend(draws);
        self
    }

    pub fn with_indices(mut self, draws: impl IntoIterator<Item = usize>) -> Self {
        self.indices.extend(draws);
        self
    }

    pub fn with_fallback(mut self, uniform: f64) -> Self {
        self.fallback_uniform = uniform;
        self
    }

    /// Number of uniform draws consumed so far
    pub fn uniform_draws(&self) -> usize {
        self.uniform_draws
    }

    /// Queued uniforms not yet consumed
    pub fn remaining_uniforms(&self) -> usize {
        self.uniforms.len()
    }
}

impl RandomSource for ScriptedSource {
    fn uniform(&mut self) -> f64 {
        self.uniform_draws += 1;
        self.uniforms.pop_front().unwrap_or(self.fallback_uniform)
    }

    fn index(&mut self, len: usize) -> usize {
        self.indices.pop_front().unwrap_or(0).min(len.saturating_sub(1))
    }

    fn permutation(&mut self, len: usize) -> Vec<usize> {
        (0..len).collect()
    }

    fn normal(&mut self, mean: f64, _sd: f64) -> f64 {
        mean
    }
}

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub Box<dyn RandomSource>);

impl SimRng {
    pub fn new(source: impl RandomSource + 'static) -> Self {
        Self(Box::new(source))
    }

    pub fn source(&mut self) -> &mut dyn RandomSource {
        self.0.as_mut()
    }
}
