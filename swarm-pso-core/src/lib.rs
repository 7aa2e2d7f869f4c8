//! # swarm-pso core
//!
//! Particle swarm optimization engine. Maximizes a gradient-free objective
//! over an axis-aligned box using a distance-based local topology: every
//! particle follows its own best position and the fittest of its nearest
//! neighbors.
//!
//! This crate provides:
//! - Swarm configuration with documented defaults ([`config`])
//! - The flat state store, fitness cache, topology and update rule
//! - Round-cap / time-cap / stagnation termination ([`termination`])
//! - A one-way observer channel ([`observe`])
//!
//! ## Feature Flags
//!
//! - `telemetry`: Enable the `tracing`-backed [`telemetry::TracingObserver`]

pub mod clock;
pub mod config;
pub mod engine;
pub mod fitness;
pub mod observe;
pub mod state;
pub mod termination;
pub mod topology;
pub mod update;

#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use config::ConfigError;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::config::{Inertia, Neighbors, SwarmConfig};
    pub use crate::engine::{Solutions, Swarm};
    pub use crate::fitness::{Fallible, Objective};
    pub use crate::observe::{EventLog, FnObserver, NoopObserver, SwarmEvent, SwarmObserver, Tee};
    pub use crate::termination::Termination;
}

/// Result type for configuration-checked operations
pub type Result<T> = core::result::Result<T, ConfigError>;
