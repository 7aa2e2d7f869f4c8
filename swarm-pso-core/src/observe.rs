//! Observer channel
//!
//! The engine reports its progress as [`SwarmEvent`]s. Delivery is one-way:
//! observers cannot fail the run, slow it down beyond their own cost, or
//! change its outcome. A run with [`NoopObserver`] behaves exactly like one
//! with any other observer attached.
//!
//! Event order for a run:
//! `init`, `generate`, `randomize`, `start`, then per round `round`,
//! `inertia`, zero or more `nan_score`, `best`; finally exactly one of
//! `rounds` / `timeout` / `stuck`, and `end`.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::config::ResolvedConfig;
use crate::fitness::ScoreKind;

/// A notification emitted by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SwarmEvent {
    /// Search entered
    Init,
    /// State buffer allocated
    Generate { particles: usize, dims: usize },
    /// Positions and velocities seeded
    Randomize,
    /// Round loop about to start
    Start {
        start_unix_ms: u64,
        config: ResolvedConfig,
    },
    /// Round `round` (zero-based) begins
    Round { round: u64 },
    /// Inertia weight used for the current round
    Inertia { weight: f64 },
    /// End of round summary.
    ///
    /// `particle` is the index of the round's fittest particle by current
    /// score, not a per-particle neighbor-best index. `improvement` is
    /// `score` minus the previous round's best, 0 on the first round.
    Best {
        particle: usize,
        score: f64,
        improvement: f64,
    },
    /// Objective returned NaN; the score was replaced by negative infinity
    NanScore { particle: usize, kind: ScoreKind },
    /// Round cap reached
    Rounds,
    /// Time budget spent
    Timeout { elapsed_ms: u64 },
    /// Improvement across the history window fell below the threshold
    Stuck,
    /// Loop finished
    End {
        rounds: u64,
        end_unix_ms: u64,
        elapsed_ms: u64,
    },
}

impl SwarmEvent {
    /// Snake-case event name, matching the serialized `event` tag
    pub fn name(&self) -> &'static str {
        match self {
            SwarmEvent::Init => "init",
            SwarmEvent::Generate { .. } => "generate",
            SwarmEvent::Randomize => "randomize",
            SwarmEvent::Start { .. } => "start",
            SwarmEvent::Round { .. } => "round",
            SwarmEvent::Inertia { .. } => "inertia",
            SwarmEvent::Best { .. } => "best",
            SwarmEvent::NanScore { .. } => "nan_score",
            SwarmEvent::Rounds => "rounds",
            SwarmEvent::Timeout { .. } => "timeout",
            SwarmEvent::Stuck => "stuck",
            SwarmEvent::End { .. } => "end",
        }
    }
}

/// A sink for [`SwarmEvent`]s
pub trait SwarmObserver {
    fn notify(&self, event: &SwarmEvent);
}

impl<O: SwarmObserver + ?Sized> SwarmObserver for &O {
    fn notify(&self, event: &SwarmEvent) {
        (**self).notify(event)
    }
}

/// Adapter turning a closure into an observer
#[derive(Debug, Clone, Copy)]
pub struct FnObserver<F>(pub F);

impl<F> SwarmObserver for FnObserver<F>
where
    F: Fn(&SwarmEvent),
{
    fn notify(&self, event: &SwarmEvent) {
        (self.0)(event)
    }
}

/// Observer that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SwarmObserver for NoopObserver {
    fn notify(&self, _event: &SwarmEvent) {}
}

/// Fans events out to two observers, `.0` first
#[derive(Debug, Clone, Default)]
pub struct Tee<A, B>(pub A, pub B);

impl<A: SwarmObserver, B: SwarmObserver> SwarmObserver for Tee<A, B> {
    fn notify(&self, event: &SwarmEvent) {
        self.0.notify(event);
        self.1.notify(event);
    }
}

/// In-memory event recorder
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<SwarmEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn events(&self) -> Vec<SwarmEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Consume the log
    pub fn into_events(self) -> Vec<SwarmEvent> {
        match self.events.into_inner() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of recorded events named `name`
    pub fn count(&self, name: &str) -> usize {
        self.events().iter().filter(|e| e.name() == name).count()
    }
}

impl SwarmObserver for EventLog {
    fn notify(&self, event: &SwarmEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
    }
}
