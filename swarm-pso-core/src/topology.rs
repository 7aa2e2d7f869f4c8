//! Distance-based neighbor topology
//!
//! A particle's neighborhood is recomputed every time it is updated: the
//! `k` particles nearest to it in L1 distance, excluding itself. Ties are
//! broken by ascending particle index (stable sort over `0..n`), which
//! keeps runs reproducible for a fixed seed.

use crate::fitness::{FitnessCache, Objective, ScoreKind};
use crate::observe::SwarmObserver;
use crate::state::SwarmState;

/// Reusable scratch space for neighbor queries
#[derive(Debug, Clone)]
pub struct Neighborhood {
    distances: Vec<f64>,
    order: Vec<usize>,
    neighbors: Vec<usize>,
}

impl Neighborhood {
    pub fn new(particles: usize) -> Self {
        Self {
            distances: vec![0.0; particles],
            order: Vec::with_capacity(particles),
            neighbors: Vec::with_capacity(particles),
        }
    }

    /// The `k` nearest particles to `particle`, nearest first.
    ///
    /// Never contains `particle` itself; holds `min(k, n - 1)` entries.
    pub fn nearest(&mut self, state: &SwarmState, particle: usize, k: usize) -> &[usize] {
        let n = state.particles();
        let origin = state.position(particle);
        self.distances.resize(n, 0.0);
        for (other, distance) in self.distances.iter_mut().enumerate() {
            *distance = l1_distance(origin, state.position(other));
        }

        self.order.clear();
        self.order.extend(0..n);
        let distances = &self.distances;
        self.order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));

        self.neighbors.clear();
        self.neighbors.extend(
            self.order
                .iter()
                .copied()
                .filter(|&other| other != particle)
                .take(k.min(n.saturating_sub(1))),
        );
        &self.neighbors
    }

    /// Neighbors found by the last [`Neighborhood::nearest`] call
    pub fn neighbors(&self) -> &[usize] {
        &self.neighbors
    }

    /// Fittest member of the last computed neighborhood by current score.
    ///
    /// Ties go to the nearer neighbor. `None` when the neighborhood is empty.
    pub fn fittest<F, O>(
        &self,
        cache: &mut FitnessCache,
        state: &SwarmState,
        objective: &mut F,
        observer: &O,
    ) -> Result<Option<(usize, f64)>, F::Error>
    where
        F: Objective + ?Sized,
        O: SwarmObserver + ?Sized,
    {
        let mut fittest: Option<(usize, f64)> = None;
        for &neighbor in &self.neighbors {
            let score = cache.score_of(neighbor, ScoreKind::Current, state, objective, observer)?;
            match fittest {
                Some((_, best)) if score <= best => {}
                _ => fittest = Some((neighbor, score)),
            }
        }
        Ok(fittest)
    }
}

/// Manhattan distance between two equally long vectors
pub fn l1_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}
