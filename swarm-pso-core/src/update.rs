//! Velocity and position update rule
//!
//! ```text
//! v[d] = clamp(w * v[d] + r1 * (best[d] - x[d]) + r2 * (nbest[d] - x[d]), min_vel, max_vel)
//! x[d] = clamp(x[d] + v[d], min_pos, max_pos)
//! ```
//!
//! `r1` and `r2` are fresh `U[0, 1)` draws per dimension. Every velocity
//! component is computed from pre-update positions before any position
//! moves; positions then use the fresh velocity.

use rand::Rng;

use crate::config::ResolvedConfig;
use crate::state::SwarmState;

/// Move `particle` one step.
///
/// `neighbor_best` is the particle whose position drives the social term;
/// with `None` the social term is dropped entirely.
pub fn step_particle<R: Rng + ?Sized>(
    state: &mut SwarmState,
    particle: usize,
    neighbor_best: Option<usize>,
    weight: f64,
    config: &ResolvedConfig,
    rng: &mut R,
) {
    let dims = state.dims();
    let pos = state.position_range(particle).start;
    let best = state.best_range(particle).start;
    let vel = state.velocity_range(particle).start;
    let social = neighbor_best.map(|n| state.position_range(n).start);
    let buf = state.buffer_mut();

    for d in 0..dims {
        let x = buf[pos + d];
        let mut v = weight * buf[vel + d] + rng.gen::<f64>() * (buf[best + d] - x);
        if let Some(nbest) = social {
            v += rng.gen::<f64>() * (buf[nbest + d] - x);
        }
        buf[vel + d] = v.clamp(config.min_vel, config.max_vel);
    }

    for d in 0..dims {
        buf[pos + d] = (buf[pos + d] + buf[vel + d]).clamp(config.min_pos, config.max_pos);
    }
}
