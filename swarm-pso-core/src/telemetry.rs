//! Telemetry integration (optional).
//!
//! [`TracingObserver`] forwards [`SwarmEvent`]s to `tracing`: setup steps
//! (`init`, `generate`, `randomize`) at `trace`, run start, termination and
//! end at `info`, per-round progress at `debug`, NaN scores at `warn`.

use crate::observe::{SwarmEvent, SwarmObserver};

/// Observer that logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl SwarmObserver for TracingObserver {
    fn notify(&self, event: &SwarmEvent) {
        match event {
            SwarmEvent::Init | SwarmEvent::Randomize => {
                tracing::trace!(event = event.name(), "swarm lifecycle");
            }
            SwarmEvent::Generate { particles, dims } => {
                tracing::trace!(particles, dims, "swarm allocated");
            }
            SwarmEvent::Start {
                start_unix_ms,
                config,
            } => {
                tracing::info!(
                    start_unix_ms,
                    particles = config.particles,
                    dims = config.dims,
                    neighbors = config.neighbors,
                    max_rounds = config.max_rounds,
                    timeout_ms = config.timeout_ms,
                    "search started"
                );
            }
            SwarmEvent::Round { round } => tracing::debug!(round, "round"),
            SwarmEvent::Inertia { weight } => tracing::debug!(weight, "inertia"),
            SwarmEvent::Best {
                particle,
                score,
                improvement,
            } => tracing::debug!(particle, score, improvement, "round best"),
            SwarmEvent::NanScore { particle, kind } => {
                tracing::warn!(particle, ?kind, "objective returned NaN, scored as -inf");
            }
            SwarmEvent::Rounds => tracing::info!("round cap reached"),
            SwarmEvent::Timeout { elapsed_ms } => tracing::info!(elapsed_ms, "time budget spent"),
            SwarmEvent::Stuck => tracing::info!("swarm stagnated"),
            SwarmEvent::End {
                rounds,
                end_unix_ms,
                elapsed_ms,
            } => tracing::info!(rounds, end_unix_ms, elapsed_ms, "search finished"),
        }
    }
}
