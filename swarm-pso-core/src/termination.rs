//! Termination policy
//!
//! Checked once before every round, in priority order: round cap, time cap,
//! stagnation. Stagnation looks at the last `history_len` round bests and
//! stops the run when the sum of successive deltas across that window is
//! below `min_improvement`. A NaN sum (a window of negative infinities)
//! never counts as stuck. The window holds at least two round bests
//! (enforced by [`SwarmConfig::resolve`](crate::config::SwarmConfig::resolve)),
//! since a single entry has no delta and would read as zero improvement.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::ResolvedConfig;

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Completed `max_rounds` rounds
    Rounds,
    /// Spent `timeout_ms`
    Timeout { elapsed_ms: u64 },
    /// Improvement across the history window fell below the threshold
    Stuck,
}

/// Sliding window of best-per-round scores
#[derive(Debug, Clone)]
pub struct ScoreHistory {
    scores: VecDeque<f64>,
    capacity: usize,
}

impl ScoreHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            scores: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a round's best, evicting the oldest entry once full.
    pub fn push(&mut self, score: f64) {
        if self.scores.len() == self.capacity {
            self.scores.pop_front();
        }
        self.scores.push_back(score);
    }

    /// Most recent round best
    pub fn last(&self) -> Option<f64> {
        self.scores.back().copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.scores.len() == self.capacity
    }

    /// Sum of successive deltas across the window
    pub fn improvement(&self) -> f64 {
        self.scores
            .iter()
            .zip(self.scores.iter().skip(1))
            .map(|(prev, next)| next - prev)
            .sum()
    }
}

/// Round cap, time cap and stagnation thresholds for one run
#[derive(Debug, Clone, Copy)]
pub struct TerminationPolicy {
    max_rounds: u64,
    timeout_ms: u64,
    history_len: usize,
    min_improvement: f64,
}

impl TerminationPolicy {
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            max_rounds: config.max_rounds,
            timeout_ms: config.timeout_ms,
            history_len: config.history_len,
            min_improvement: config.min_improvement,
        }
    }

    /// `Some` once the run must stop.
    pub fn check(&self, rounds: u64, elapsed_ms: u64, history: &ScoreHistory) -> Option<Termination> {
        if rounds >= self.max_rounds {
            return Some(Termination::Rounds);
        }
        if elapsed_ms >= self.timeout_ms {
            return Some(Termination::Timeout { elapsed_ms });
        }
        if rounds >= self.history_len as u64
            && history.is_full()
            && history.improvement() < self.min_improvement
        {
            return Some(Termination::Stuck);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SwarmConfig;

    fn policy(max_rounds: u64, timeout_ms: u64, history_len: usize) -> TerminationPolicy {
        let config = SwarmConfig {
            max_rounds,
            timeout_ms,
            history_len,
            min_improvement: 0.5,
            ..SwarmConfig::default()
        };
        TerminationPolicy::new(&config.resolve(1).unwrap())
    }

    fn history(capacity: usize, scores: &[f64]) -> ScoreHistory {
        let mut history = ScoreHistory::new(capacity);
        for &s in scores {
            history.push(s);
        }
        history
    }

    #[test]
    fn window_slides() {
        let h = history(3, &[1.0, 2.0, 4.0, 7.0]);
        assert!(h.is_full());
        assert_eq!(h.len(), 3);
        assert_eq!(h.last(), Some(7.0));
        assert_eq!(h.improvement(), 5.0);
    }

    #[test]
    fn round_cap_wins_over_everything() {
        let p = policy(10, 100, 2);
        let h = history(2, &[1.0, 1.0]);
        assert_eq!(p.check(10, 500, &h), Some(Termination::Rounds));
    }

    #[test]
    fn timeout_before_stagnation() {
        let p = policy(10, 100, 2);
        let h = history(2, &[1.0, 1.0]);
        assert_eq!(
            p.check(5, 100, &h),
            Some(Termination::Timeout { elapsed_ms: 100 })
        );
    }

    #[test]
    fn stuck_needs_a_full_window() {
        let p = policy(100, 1_000, 3);
        assert_eq!(p.check(2, 0, &history(3, &[1.0, 1.0])), None);
        assert_eq!(p.check(3, 0, &history(3, &[1.0, 1.0, 1.2])), Some(Termination::Stuck));
        assert_eq!(p.check(3, 0, &history(3, &[1.0, 1.0, 2.0])), None);
    }

    #[test]
    fn negative_infinity_window_is_not_stuck() {
        let p = policy(100, 1_000, 2);
        let h = history(2, &[f64::NEG_INFINITY, f64::NEG_INFINITY]);
        assert!(h.improvement().is_nan());
        assert_eq!(p.check(5, 0, &h), None);
    }
}
