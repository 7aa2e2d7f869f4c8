//! # swarm-pso
//!
//! **Gradient-free maximization with a local-topology particle swarm.**
//!
//! Give it an objective `f(&[f64]) -> f64`, a dimension count and a
//! [`SwarmConfig`]; it returns every particle's personal best once the run
//! ends by round cap, time budget or stagnation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use swarm_pso::prelude::*;
//!
//! let config = ParticleSwarm::builder()
//!     .particles(40)
//!     .position_bounds(-10.0, 10.0)
//!     .inertia(0.7)
//!     .build();
//!
//! let sphere = |x: &[f64]| -x.iter().map(|v| v * v).sum::<f64>();
//! let mut pso = ParticleSwarm::new(sphere, 2, &config)?.with_seed(42);
//! for best in pso.search().unwrap() {
//!     println!("{best:?}");
//! }
//! # Ok::<(), swarm_pso::ConfigError>(())
//! ```
//!
//! ## Crate Structure
//!
//! - [`swarm_pso_core`]: the engine, observer channel and clock seam
//! - [`recorder`]: NDJSON event recording

#![forbid(unsafe_code)]

use rand::rngs::StdRng;
use rand::SeedableRng;

// Re-export the core crate
pub use swarm_pso_core as core;

// Re-export commonly used items at the top level
pub use swarm_pso_core::{
    clock::{Clock, ManualClock, SystemClock},
    config::{ConfigError, Inertia, Neighbors, ResolvedConfig, SwarmConfig},
    engine::{Solutions, Swarm},
    fitness::{Fallible, Objective, ScoreKind},
    observe::{EventLog, FnObserver, NoopObserver, SwarmEvent, SwarmObserver, Tee},
    telemetry::TracingObserver,
    termination::Termination,
};

/// NDJSON event recording (std-only).
pub mod recorder;

pub use recorder::{EventRecorder, RecorderError};

/// Prelude module for convenient imports
///
/// ```rust,ignore
/// use swarm_pso::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::{EventRecorder, ParticleSwarm, SwarmConfigBuilder, TracingObserver};
}

/// Builder for [`SwarmConfig`]
#[derive(Debug, Default)]
pub struct SwarmConfigBuilder {
    config: SwarmConfig,
}

impl SwarmConfigBuilder {
    /// Create a new builder seeded with the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed inertia weight
    pub fn inertia(mut self, weight: f64) -> Self {
        self.config.inertia = Inertia::Fixed(weight);
        self
    }

    /// Decay inertia linearly over the time budget
    pub fn time_decayed_inertia(mut self) -> Self {
        self.config.inertia = Inertia::TimeDecayed;
        self
    }

    /// Set the position clamp
    pub fn position_bounds(mut self, min: f64, max: f64) -> Self {
        self.config.min_pos = min;
        self.config.max_pos = max;
        self
    }

    /// Set the velocity clamp
    pub fn velocity_bounds(mut self, min: f64, max: f64) -> Self {
        self.config.min_vel = min;
        self.config.max_vel = max;
        self
    }

    /// Set the stagnation threshold
    pub fn min_improvement(mut self, threshold: f64) -> Self {
        self.config.min_improvement = threshold;
        self
    }

    /// Set the neighborhood size (count, or fraction of the swarm below 1)
    pub fn neighbors(mut self, neighbors: impl Into<Neighbors>) -> Self {
        self.config.neighbors = neighbors.into();
        self
    }

    /// Set the swarm size
    pub fn particles(mut self, particles: usize) -> Self {
        self.config.particles = particles;
        self
    }

    /// Set the round cap
    pub fn max_rounds(mut self, rounds: u64) -> Self {
        self.config.max_rounds = rounds;
        self
    }

    /// Set the stagnation window length in rounds (at least 2)
    pub fn history_len(mut self, rounds: usize) -> Self {
        self.config.history_len = rounds;
        self
    }

    /// Set the wall-clock budget in milliseconds
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    /// Build the configuration
    pub fn build(self) -> SwarmConfig {
        self.config
    }
}

/// A swarm bundled with its random source and the system clock
#[derive(Debug)]
pub struct ParticleSwarm<F> {
    swarm: Swarm<F>,
    rng: StdRng,
    clock: SystemClock,
}

impl ParticleSwarm<()> {
    /// Create a new configuration builder
    pub fn builder() -> SwarmConfigBuilder {
        SwarmConfigBuilder::new()
    }
}

impl<F: Objective> ParticleSwarm<F> {
    /// Validate `config` and seed the random source from the OS.
    pub fn new(objective: F, dims: usize, config: &SwarmConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            swarm: Swarm::new(objective, dims, config)?,
            rng: StdRng::from_entropy(),
            clock: SystemClock::new(),
        })
    }

    /// Reseed the random source for a reproducible run
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Get the resolved configuration
    pub fn config(&self) -> &ResolvedConfig {
        self.swarm.config()
    }

    /// Run a search, logging progress through `tracing`
    pub fn search(&mut self) -> Result<Solutions, F::Error> {
        self.search_with(&TracingObserver)
    }

    /// Run a search, reporting to `observer` as well as `tracing`
    pub fn search_with<O: SwarmObserver + ?Sized>(
        &mut self,
        observer: &O,
    ) -> Result<Solutions, F::Error> {
        let observer = Tee(TracingObserver, observer);
        self.swarm.search(&mut self.rng, &self.clock, &observer)
    }
}
