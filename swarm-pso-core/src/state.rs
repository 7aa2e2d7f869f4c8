//! Swarm state store
//!
//! Positions, personal bests and velocities for every particle live in one
//! flat buffer owned by the engine. Each particle occupies a stride of
//! `3 * dims` values laid out as `[position | personal best | velocity]`;
//! the accessors below hand out index-range views into it.

use core::ops::Range;

use rand::Rng;

use crate::config::ResolvedConfig;

/// Flat buffer holding the whole swarm
#[derive(Debug, Clone)]
pub struct SwarmState {
    buf: Vec<f64>,
    particles: usize,
    dims: usize,
}

impl SwarmState {
    /// Allocate a zeroed swarm
    pub fn new(particles: usize, dims: usize) -> Self {
        Self {
            buf: vec![0.0; 3 * particles * dims],
            particles,
            dims,
        }
    }

    /// Allocate and seed a swarm from `config`.
    pub fn seeded<R: Rng + ?Sized>(config: &ResolvedConfig, rng: &mut R) -> Self {
        let mut state = Self::new(config.particles, config.dims);
        state.randomize(config, rng);
        state
    }

    /// Reseed every particle.
    ///
    /// Every position and velocity coordinate is drawn as `u * b` with
    /// `u ~ U[0, 1)` and `b` picked with equal odds from the upper or lower
    /// bound, then clamped into the bounds. Personal bests start at the
    /// seeded positions.
    pub fn randomize<R: Rng + ?Sized>(&mut self, config: &ResolvedConfig, rng: &mut R) {
        for p in 0..self.particles {
            let pos = self.position_range(p);
            for i in pos.clone() {
                self.buf[i] = seed_coordinate(rng, config.min_pos, config.max_pos);
            }
            for i in self.velocity_range(p) {
                self.buf[i] = seed_coordinate(rng, config.min_vel, config.max_vel);
            }
            let dest = self.best_range(p).start;
            self.buf.copy_within(pos, dest);
        }
    }

    pub fn particles(&self) -> usize {
        self.particles
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    fn stride(&self) -> usize {
        3 * self.dims
    }

    /// Buffer range of a particle's current position
    pub fn position_range(&self, particle: usize) -> Range<usize> {
        let start = particle * self.stride();
        start..start + self.dims
    }

    /// Buffer range of a particle's personal best
    pub fn best_range(&self, particle: usize) -> Range<usize> {
        let start = particle * self.stride() + self.dims;
        start..start + self.dims
    }

    /// Buffer range of a particle's velocity
    pub fn velocity_range(&self, particle: usize) -> Range<usize> {
        let start = particle * self.stride() + 2 * self.dims;
        start..start + self.dims
    }

    pub fn position(&self, particle: usize) -> &[f64] {
        &self.buf[self.position_range(particle)]
    }

    pub fn best(&self, particle: usize) -> &[f64] {
        &self.buf[self.best_range(particle)]
    }

    pub fn velocity(&self, particle: usize) -> &[f64] {
        &self.buf[self.velocity_range(particle)]
    }

    /// Raw buffer, for update code that interleaves reads and writes.
    pub(crate) fn buffer_mut(&mut self) -> &mut [f64] {
        &mut self.buf
    }

    /// Overwrite a particle's personal best with its current position
    pub fn promote_position(&mut self, particle: usize) {
        let src = self.position_range(particle);
        let dest = self.best_range(particle).start;
        self.buf.copy_within(src, dest);
    }

    /// Owned copies of every personal best, in particle order.
    pub fn snapshot_bests(&self) -> Vec<Vec<f64>> {
        (0..self.particles).map(|p| self.best(p).to_vec()).collect()
    }
}

fn seed_coordinate<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    let bound = if rng.gen_bool(0.5) { max } else { min };
    (rng.gen::<f64>() * bound).clamp(min, max)
}
