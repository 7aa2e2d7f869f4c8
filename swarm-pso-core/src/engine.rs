//! The round loop
//!
//! [`Swarm::search`] seeds a fresh swarm, runs rounds until the
//! [`TerminationPolicy`] fires, and returns the personal bests as
//! [`Solutions`]. Within a round particles are processed in index order:
//!
//! 1. score the current position and personal best (cached),
//! 2. promote the position to personal best if it scores strictly higher,
//! 3. find the nearest neighbors and the fittest among them,
//! 4. update velocity then position, and drop the cached current score.

use core::iter::FusedIterator;

use rand::Rng;

use crate::clock::Clock;
use crate::config::{ConfigError, ResolvedConfig, SwarmConfig};
use crate::fitness::{FitnessCache, Objective, ScoreKind};
use crate::observe::{SwarmEvent, SwarmObserver};
use crate::state::SwarmState;
use crate::termination::{ScoreHistory, Termination, TerminationPolicy};
use crate::topology::Neighborhood;
use crate::update::step_particle;

/// A particle swarm maximizing `objective`
#[derive(Debug, Clone)]
pub struct Swarm<F> {
    objective: F,
    config: ResolvedConfig,
}

impl<F: Objective> Swarm<F> {
    /// Validate `config` for a `dims`-dimensional search.
    ///
    /// Fails before the objective is ever evaluated.
    pub fn new(objective: F, dims: usize, config: &SwarmConfig) -> Result<Self, ConfigError> {
        let config = config.resolve(dims)?;
        Ok(Self { objective, config })
    }

    /// Resolved configuration for every run of this swarm
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Run one search from a freshly seeded swarm.
    ///
    /// Termination is reported only through `observer`; the return value
    /// carries the personal-best positions. An objective error aborts the
    /// run and is returned as-is.
    pub fn search<R, C, O>(
        &mut self,
        rng: &mut R,
        clock: &C,
        observer: &O,
    ) -> Result<Solutions, F::Error>
    where
        R: Rng + ?Sized,
        C: Clock + ?Sized,
        O: SwarmObserver + ?Sized,
    {
        let config = &self.config;
        let n = config.particles;
        observer.notify(&SwarmEvent::Init);

        let mut state = SwarmState::new(n, config.dims);
        observer.notify(&SwarmEvent::Generate {
            particles: n,
            dims: config.dims,
        });
        state.randomize(config, rng);
        observer.notify(&SwarmEvent::Randomize);

        let mut cache = FitnessCache::new(n);
        let mut hood = Neighborhood::new(n);
        let mut history = ScoreHistory::new(config.history_len);
        let policy = TerminationPolicy::new(config);

        let start = clock.now_millis();
        observer.notify(&SwarmEvent::Start {
            start_unix_ms: start,
            config: config.clone(),
        });

        let mut rounds: u64 = 0;
        let termination = loop {
            let elapsed = clock.now_millis().saturating_sub(start);
            if let Some(termination) = policy.check(rounds, elapsed, &history) {
                break termination;
            }
            observer.notify(&SwarmEvent::Round { round: rounds });
            rounds += 1;

            let weight = config.inertia.weight(elapsed, config.timeout_ms);
            observer.notify(&SwarmEvent::Inertia { weight });

            let mut round_best: Option<(usize, f64)> = None;
            for p in 0..n {
                let current =
                    cache.score_of(p, ScoreKind::Current, &state, &mut self.objective, observer)?;
                cache.score_of(p, ScoreKind::PersonalBest, &state, &mut self.objective, observer)?;
                if cache.offer_best(p, current) {
                    state.promote_position(p);
                }
                if round_best.map_or(true, |(_, best)| current > best) {
                    round_best = Some((p, current));
                }

                hood.nearest(&state, p, config.neighbors);
                let fittest = hood.fittest(&mut cache, &state, &mut self.objective, observer)?;

                step_particle(
                    &mut state,
                    p,
                    fittest.map(|(neighbor, _)| neighbor),
                    weight,
                    config,
                    rng,
                );
                cache.invalidate(p);
            }

            if let Some((particle, score)) = round_best {
                let improvement = history.last().map_or(0.0, |previous| score - previous);
                history.push(score);
                observer.notify(&SwarmEvent::Best {
                    particle,
                    score,
                    improvement,
                });
            }
        };

        observer.notify(&match termination {
            Termination::Rounds => SwarmEvent::Rounds,
            Termination::Timeout { elapsed_ms } => SwarmEvent::Timeout { elapsed_ms },
            Termination::Stuck => SwarmEvent::Stuck,
        });

        let end = clock.now_millis();
        observer.notify(&SwarmEvent::End {
            rounds,
            end_unix_ms: end,
            elapsed_ms: end.saturating_sub(start),
        });

        Ok(Solutions::new(state.snapshot_bests()))
    }
}

/// Personal-best positions of a finished run, in particle order
///
/// Each item is an owned copy; nothing aliases engine state.
#[derive(Debug)]
pub struct Solutions {
    inner: std::vec::IntoIter<Vec<f64>>,
}

impl Solutions {
    fn new(bests: Vec<Vec<f64>>) -> Self {
        Self {
            inner: bests.into_iter(),
        }
    }
}

impl Iterator for Solutions {
    type Item = Vec<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Solutions {}

impl FusedIterator for Solutions {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::{Inertia, Neighbors};
    use crate::fitness::Fallible;
    use crate::observe::{EventLog, NoopObserver};
    use core::cell::Cell;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config(particles: usize, max_rounds: u64) -> SwarmConfig {
        SwarmConfig {
            particles,
            max_rounds,
            inertia: Inertia::Fixed(0.6),
            min_pos: -5.0,
            max_pos: 5.0,
            min_vel: -1.0,
            max_vel: 1.0,
            history_len: 20,
            ..SwarmConfig::default()
        }
    }

    fn sphere(x: &[f64]) -> f64 {
        -x.iter().map(|v| v * v).sum::<f64>()
    }

    #[test]
    fn invalid_config_fails_before_evaluation() {
        let calls = Cell::new(0);
        let objective = |_: &[f64]| {
            calls.set(calls.get() + 1);
            0.0
        };
        let config = SwarmConfig {
            particles: 4,
            neighbors: Neighbors::Count(4),
            ..SwarmConfig::default()
        };
        assert!(matches!(
            Swarm::new(objective, 2, &config),
            Err(ConfigError::TooManyNeighbors { .. })
        ));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn unbounded_box_fails_before_evaluation() {
        let calls = Cell::new(0);
        let objective = |x: &[f64]| {
            calls.set(calls.get() + 1);
            -x[0] * x[0]
        };
        let config = SwarmConfig {
            min_pos: f64::NEG_INFINITY,
            max_pos: f64::INFINITY,
            ..config(4, 20)
        };
        assert!(matches!(
            Swarm::new(objective, 2, &config),
            Err(ConfigError::InvalidPositionBounds { .. })
        ));

        let config = SwarmConfig {
            min_improvement: f64::NAN,
            ..self::config(4, 20)
        };
        assert!(matches!(
            Swarm::new(objective, 2, &config),
            Err(ConfigError::InvalidMinImprovement(_))
        ));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn lifecycle_events_arrive_in_order() {
        let mut swarm = Swarm::new(sphere, 2, &config(5, 3)).unwrap();
        let log = EventLog::new();
        let clock = ManualClock::new(10_000);
        let solutions = swarm
            .search(&mut StdRng::seed_from_u64(1), &clock, &log)
            .unwrap();
        assert_eq!(solutions.len(), 5);

        let names: Vec<&str> = log.events().iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec![
                "init", "generate", "randomize", "start", "round", "inertia", "best", "round",
                "inertia", "best", "round", "inertia", "best", "rounds", "end",
            ]
        );
        assert_eq!(
            log.events().last(),
            Some(&SwarmEvent::End {
                rounds: 3,
                end_unix_ms: 10_000,
                elapsed_ms: 0,
            })
        );
    }

    #[test]
    fn best_names_the_fittest_particle_of_the_round() {
        let config = config(7, 1);
        let resolved = config.resolve(2).unwrap();
        let seeded = SwarmState::seeded(&resolved, &mut StdRng::seed_from_u64(12));
        let scores: Vec<f64> = (0..7).map(|p| sphere(seeded.position(p))).collect();
        let fittest = (0..7).fold(0, |best, p| if scores[p] > scores[best] { p } else { best });

        let mut swarm = Swarm::new(sphere, 2, &config).unwrap();
        let log = EventLog::new();
        swarm
            .search(&mut StdRng::seed_from_u64(12), &ManualClock::new(0), &log)
            .unwrap();

        let best = log
            .events()
            .into_iter()
            .find(|e| matches!(e, SwarmEvent::Best { .. }));
        assert_eq!(
            best,
            Some(SwarmEvent::Best {
                particle: fittest,
                score: scores[fittest],
                improvement: 0.0,
            })
        );
    }

    #[test]
    fn zero_rounds_returns_seeded_bests() {
        let config = config(6, 0);
        let resolved = config.resolve(3).unwrap();
        let expected = SwarmState::seeded(&resolved, &mut StdRng::seed_from_u64(8)).snapshot_bests();

        let mut swarm = Swarm::new(sphere, 3, &config).unwrap();
        let solutions: Vec<Vec<f64>> = swarm
            .search(&mut StdRng::seed_from_u64(8), &ManualClock::new(0), &NoopObserver)
            .unwrap()
            .collect();
        assert_eq!(solutions, expected);
    }

    #[test]
    fn objective_error_aborts_the_run() {
        let calls = Cell::new(0);
        let objective = Fallible(|x: &[f64]| {
            calls.set(calls.get() + 1);
            if calls.get() > 7 {
                Err("objective failed")
            } else {
                Ok(sphere(x))
            }
        });
        let mut swarm = Swarm::new(objective, 2, &config(4, 100)).unwrap();
        let log = EventLog::new();
        let result = swarm.search(&mut StdRng::seed_from_u64(2), &ManualClock::new(0), &log);

        assert_eq!(result.err(), Some("objective failed"));
        assert_eq!(log.count("end"), 0);
    }

    #[test]
    fn time_budget_is_enforced() {
        let clock = ManualClock::new(0);
        let objective = |x: &[f64]| {
            clock.advance(core::time::Duration::from_millis(1));
            sphere(x)
        };
        let config = SwarmConfig {
            timeout_ms: 50,
            ..config(4, 1_000_000)
        };
        let mut swarm = Swarm::new(objective, 2, &config).unwrap();
        let log = EventLog::new();
        swarm
            .search(&mut StdRng::seed_from_u64(3), &clock, &log)
            .unwrap();

        let timeout = log
            .events()
            .into_iter()
            .find_map(|e| match e {
                SwarmEvent::Timeout { elapsed_ms } => Some(elapsed_ms),
                _ => None,
            })
            .unwrap();
        assert!(timeout >= 50);
        assert_eq!(log.count("rounds") + log.count("stuck"), 0);
    }

    #[test]
    fn time_decayed_inertia_follows_the_clock() {
        let clock = ManualClock::new(0);
        let objective = |x: &[f64]| {
            clock.advance(core::time::Duration::from_millis(1));
            sphere(x)
        };
        let config = SwarmConfig {
            inertia: Inertia::TimeDecayed,
            timeout_ms: 1_000,
            ..config(3, 5)
        };
        let mut swarm = Swarm::new(objective, 1, &config).unwrap();
        let log = EventLog::new();
        swarm
            .search(&mut StdRng::seed_from_u64(4), &clock, &log)
            .unwrap();

        let weights: Vec<f64> = log
            .events()
            .into_iter()
            .filter_map(|e| match e {
                SwarmEvent::Inertia { weight } => Some(weight),
                _ => None,
            })
            .collect();
        assert_eq!(weights.len(), 5);
        assert_eq!(weights[0], 1.0);
        assert!(weights.windows(2).all(|w| w[1] < w[0]));
        assert!(weights.iter().all(|w| (0.0..=1.0).contains(w)));
    }

    #[test]
    fn current_scores_are_cached_within_a_round() {
        let calls = Cell::new(0usize);
        let objective = |x: &[f64]| {
            calls.set(calls.get() + 1);
            sphere(x)
        };
        let config = SwarmConfig {
            neighbors: Neighbors::Count(3),
            ..config(4, 1)
        };
        let mut swarm = Swarm::new(objective, 2, &config).unwrap();
        swarm
            .search(&mut StdRng::seed_from_u64(5), &ManualClock::new(0), &NoopObserver)
            .unwrap();

        // 4 personal bests + at most one evaluation per position a particle
        // can occupy during the round (seeded and moved)
        assert!(calls.get() <= 4 + 4 * 2);
    }
}
