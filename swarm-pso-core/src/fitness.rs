//! Objective functions and the per-round fitness cache

use core::convert::Infallible;

use serde::{Deserialize, Serialize};

use crate::observe::{SwarmEvent, SwarmObserver};
use crate::state::SwarmState;

/// A function to maximize
///
/// Implemented for every `FnMut(&[f64]) -> f64`. Objectives that can fail
/// are wrapped in [`Fallible`]; an error aborts the run.
pub trait Objective {
    type Error;

    fn evaluate(&mut self, position: &[f64]) -> Result<f64, Self::Error>;
}

impl<F> Objective for F
where
    F: FnMut(&[f64]) -> f64,
{
    type Error = Infallible;

    fn evaluate(&mut self, position: &[f64]) -> Result<f64, Self::Error> {
        Ok(self(position))
    }
}

/// Adapter for objectives returning `Result`
#[derive(Debug, Clone)]
pub struct Fallible<F>(pub F);

impl<F, E> Objective for Fallible<F>
where
    F: FnMut(&[f64]) -> Result<f64, E>,
{
    type Error = E;

    fn evaluate(&mut self, position: &[f64]) -> Result<f64, Self::Error> {
        (self.0)(position)
    }
}

/// Which of a particle's vectors a score belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Current,
    PersonalBest,
}

/// Cached scores per particle
///
/// Current-position scores are dropped as soon as the particle moves.
/// Personal-best scores only ever increase.
#[derive(Debug, Clone)]
pub struct FitnessCache {
    current: Vec<Option<f64>>,
    best: Vec<Option<f64>>,
}

impl FitnessCache {
    pub fn new(particles: usize) -> Self {
        Self {
            current: vec![None; particles],
            best: vec![None; particles],
        }
    }

    /// Cached score, if present
    pub fn get(&self, particle: usize, kind: ScoreKind) -> Option<f64> {
        match kind {
            ScoreKind::Current => self.current[particle],
            ScoreKind::PersonalBest => self.best[particle],
        }
    }

    /// Score of a particle's current position or personal best, evaluating
    /// the objective on a cache miss.
    ///
    /// A NaN result is stored as negative infinity and reported through
    /// `observer` as [`SwarmEvent::NanScore`].
    pub fn score_of<F, O>(
        &mut self,
        particle: usize,
        kind: ScoreKind,
        state: &SwarmState,
        objective: &mut F,
        observer: &O,
    ) -> Result<f64, F::Error>
    where
        F: Objective + ?Sized,
        O: SwarmObserver + ?Sized,
    {
        if let Some(score) = self.get(particle, kind) {
            return Ok(score);
        }
        let position = match kind {
            ScoreKind::Current => state.position(particle),
            ScoreKind::PersonalBest => state.best(particle),
        };
        let mut score = objective.evaluate(position)?;
        if score.is_nan() {
            observer.notify(&SwarmEvent::NanScore { particle, kind });
            score = f64::NEG_INFINITY;
        }
        let slot = match kind {
            ScoreKind::Current => &mut self.current[particle],
            ScoreKind::PersonalBest => &mut self.best[particle],
        };
        *slot = Some(score);
        Ok(score)
    }

    /// Record a new personal best if `score` beats the cached one.
    ///
    /// Returns `true` when the caller must copy the position into the
    /// particle's personal best.
    pub fn offer_best(&mut self, particle: usize, score: f64) -> bool {
        match self.best[particle] {
            Some(best) if score > best => {
                self.best[particle] = Some(score);
                true
            }
            None => {
                self.best[particle] = Some(score);
                true
            }
            Some(_) => false,
        }
    }

    /// Forget the current-position score after the particle moved.
    pub fn invalidate(&mut self, particle: usize) {
        self.current[particle] = None;
    }
}
