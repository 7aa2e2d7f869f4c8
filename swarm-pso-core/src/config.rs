//! Swarm configuration
//!
//! [`SwarmConfig`] is what callers write (every field independently
//! overridable, unset fields fall back to [`Default`]). It is validated and
//! frozen into a [`ResolvedConfig`] once, when a [`Swarm`](crate::engine::Swarm)
//! is constructed.

use core::fmt;

use serde::{Deserialize, Serialize};

const DEFAULT_BOUND: f64 = 1e9;
const DEFAULT_MIN_IMPROVEMENT: f64 = 1e-6;
const DEFAULT_NEIGHBOR_FRACTION: f64 = 0.5;
const DEFAULT_PARTICLES: usize = 30;
const DEFAULT_MAX_ROUNDS: u64 = 1_000_000;
const DEFAULT_HISTORY_LEN: usize = 200;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
// a window needs two round bests to hold a delta
const MIN_HISTORY_LEN: usize = 2;

/// Inertia weight schedule
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Inertia {
    /// Recomputed every round as `1 - elapsed / timeout`
    #[default]
    TimeDecayed,
    /// Constant weight
    Fixed(f64),
}

impl Inertia {
    /// Weight for a round that starts `elapsed_ms` into a run of `timeout_ms`.
    pub fn weight(&self, elapsed_ms: u64, timeout_ms: u64) -> f64 {
        match *self {
            Inertia::Fixed(w) => w,
            Inertia::TimeDecayed if timeout_ms == 0 => 0.0,
            Inertia::TimeDecayed => 1.0 - (elapsed_ms as f64 / timeout_ms as f64),
        }
    }
}

impl From<Option<f64>> for Inertia {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Inertia::TimeDecayed, Inertia::Fixed)
    }
}

impl From<Inertia> for Option<f64> {
    fn from(value: Inertia) -> Self {
        match value {
            Inertia::TimeDecayed => None,
            Inertia::Fixed(w) => Some(w),
        }
    }
}

/// Size of each particle's social neighborhood
///
/// Serialized as a single number: values below 1 are a fraction of the
/// swarm, anything else is an absolute count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum Neighbors {
    /// Exact number of neighbors
    Count(usize),
    /// Fraction of the swarm size, floored at resolution
    Fraction(f64),
}

impl Default for Neighbors {
    fn default() -> Self {
        Self::Fraction(DEFAULT_NEIGHBOR_FRACTION)
    }
}

impl Neighbors {
    /// Resolve against a swarm of `particles`.
    pub fn resolve(&self, particles: usize) -> Result<usize, ConfigError> {
        let resolved = match *self {
            Neighbors::Count(n) => n,
            Neighbors::Fraction(f) if f.is_nan() || f < 0.0 => {
                return Err(ConfigError::InvalidNeighbors(f));
            }
            Neighbors::Fraction(f) => (particles as f64 * f) as usize,
        };
        if resolved >= particles {
            return Err(ConfigError::TooManyNeighbors {
                neighbors: resolved,
                particles,
            });
        }
        Ok(resolved)
    }
}

impl From<f64> for Neighbors {
    fn from(value: f64) -> Self {
        if value < 1.0 || value.is_nan() {
            Neighbors::Fraction(value)
        } else {
            Neighbors::Count(value as usize)
        }
    }
}

impl From<usize> for Neighbors {
    fn from(value: usize) -> Self {
        Neighbors::Count(value)
    }
}

impl From<Neighbors> for f64 {
    fn from(value: Neighbors) -> Self {
        match value {
            Neighbors::Count(n) => n as f64,
            Neighbors::Fraction(f) => f,
        }
    }
}

/// Caller-facing configuration for a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Inertia weight schedule
    pub inertia: Inertia,
    /// Lower position clamp
    pub min_pos: f64,
    /// Upper position clamp
    pub max_pos: f64,
    /// Lower velocity clamp
    pub min_vel: f64,
    /// Upper velocity clamp
    pub max_vel: f64,
    /// Aggregate improvement across the history window below which the run is stuck
    pub min_improvement: f64,
    /// Neighborhood size
    pub neighbors: Neighbors,
    /// Number of particles in the swarm
    pub particles: usize,
    /// Round cap
    pub max_rounds: u64,
    /// Stagnation window (rounds)
    pub history_len: usize,
    /// Wall-clock budget in milliseconds
    pub timeout_ms: u64,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            inertia: Inertia::TimeDecayed,
            min_pos: -DEFAULT_BOUND,
            max_pos: DEFAULT_BOUND,
            min_vel: -DEFAULT_BOUND,
            max_vel: DEFAULT_BOUND,
            min_improvement: DEFAULT_MIN_IMPROVEMENT,
            neighbors: Neighbors::default(),
            particles: DEFAULT_PARTICLES,
            max_rounds: DEFAULT_MAX_ROUNDS,
            history_len: DEFAULT_HISTORY_LEN,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl SwarmConfig {
    /// Validate against `dims` and freeze.
    pub fn resolve(&self, dims: usize) -> Result<ResolvedConfig, ConfigError> {
        if dims == 0 {
            return Err(ConfigError::ZeroDimensions);
        }
        if self.particles == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        if !bounds_ok(self.min_pos, self.max_pos) {
            return Err(ConfigError::InvalidPositionBounds {
                min: self.min_pos,
                max: self.max_pos,
            });
        }
        if !bounds_ok(self.min_vel, self.max_vel) {
            return Err(ConfigError::InvalidVelocityBounds {
                min: self.min_vel,
                max: self.max_vel,
            });
        }
        if let Inertia::Fixed(w) = self.inertia {
            if !w.is_finite() {
                return Err(ConfigError::InvalidInertia(w));
            }
        }
        if self.min_improvement.is_nan() {
            return Err(ConfigError::InvalidMinImprovement(self.min_improvement));
        }
        if self.history_len < MIN_HISTORY_LEN {
            return Err(ConfigError::HistoryTooShort(self.history_len));
        }
        let neighbors = self.neighbors.resolve(self.particles)?;

        Ok(ResolvedConfig {
            dims,
            particles: self.particles,
            neighbors,
            inertia: self.inertia,
            min_pos: self.min_pos,
            max_pos: self.max_pos,
            min_vel: self.min_vel,
            max_vel: self.max_vel,
            min_improvement: self.min_improvement,
            max_rounds: self.max_rounds,
            history_len: self.history_len,
            timeout_ms: self.timeout_ms,
        })
    }
}

fn bounds_ok(min: f64, max: f64) -> bool {
    min.is_finite() && max.is_finite() && min <= max
}

/// Validated, immutable configuration for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub dims: usize,
    pub particles: usize,
    /// Neighbor count after resolving fractions
    pub neighbors: usize,
    pub inertia: Inertia,
    pub min_pos: f64,
    pub max_pos: f64,
    pub min_vel: f64,
    pub max_vel: f64,
    pub min_improvement: f64,
    pub max_rounds: u64,
    pub history_len: usize,
    pub timeout_ms: u64,
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Search space must have at least one dimension
    ZeroDimensions,
    /// Swarm must have at least one particle
    ZeroParticles,
    /// Neighbor fraction is negative or NaN
    InvalidNeighbors(f64),
    /// Neighbor count must leave room for the particle itself
    TooManyNeighbors { neighbors: usize, particles: usize },
    /// Position bounds are inverted or not finite
    InvalidPositionBounds { min: f64, max: f64 },
    /// Velocity bounds are inverted or not finite
    InvalidVelocityBounds { min: f64, max: f64 },
    /// Fixed inertia weight is not finite
    InvalidInertia(f64),
    /// Stagnation threshold is NaN
    InvalidMinImprovement(f64),
    /// Stagnation window must hold at least two rounds
    HistoryTooShort(usize),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroDimensions => write!(f, "dimension count must be positive"),
            ConfigError::ZeroParticles => write!(f, "particle count must be positive"),
            ConfigError::InvalidNeighbors(v) => write!(f, "invalid neighbor fraction {v}"),
            ConfigError::TooManyNeighbors {
                neighbors,
                particles,
            } => write!(
                f,
                "{neighbors} neighbors requested for a swarm of {particles} particles"
            ),
            ConfigError::InvalidPositionBounds { min, max } => {
                write!(f, "invalid position bounds [{min}, {max}]")
            }
            ConfigError::InvalidVelocityBounds { min, max } => {
                write!(f, "invalid velocity bounds [{min}, {max}]")
            }
            ConfigError::InvalidInertia(w) => write!(f, "inertia weight {w} is not finite"),
            ConfigError::InvalidMinImprovement(v) => {
                write!(f, "minimum improvement {v} is not a number")
            }
            ConfigError::HistoryTooShort(n) => {
                write!(f, "history window of {n} rounds is shorter than {MIN_HISTORY_LEN}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
