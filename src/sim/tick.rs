//! Per-frame simulation step
//!
//! One tick advances the whole field: ship, projectiles, asteroids,
//! particles, stars, spawn scheduling, then the collision pass. The tick
//! runs to completion atomically - input handlers only ever mutate the
//! `InputState` snapshot read by the next frame.

use super::collision::{projectile_hits_asteroid, ship_hits_asteroid};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;
use rand::Rng;

/// Input snapshot for a single frame.
///
/// Turn and thrust are level-triggered (true for every frame the key is
/// held). Fire and pause are one-shot edges set on key press; the platform
/// loop clears them after each processed tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub thrust: bool,
    pub reverse: bool,
    pub fire: bool,
    pub pause: bool,
}

/// Advance the game by one frame of `dt_ms` milliseconds.
///
/// `now_ms` is the platform wall clock; the displayed timer derives from it
/// rather than from accumulated deltas, so it stays monotonic across frame
/// drops. The tick is a no-op outside the Running phase - a directly
/// invoked tick while paused leaves state untouched.
pub fn tick(state: &mut GameState, input: &InputState, dt_ms: f32, now_ms: f64) {
    if input.pause {
        state.toggle_pause();
    }
    if state.phase != GamePhase::Running {
        return;
    }

    state.elapsed_secs = ((now_ms - state.started_at_ms).max(0.0) / 1000.0) as u32;

    // Ship consumes the input snapshot
    if input.left {
        state.ship.turn_left();
    }
    if input.right {
        state.ship.turn_right();
    }
    if input.thrust {
        state.ship.apply_thrust(1.0, dt_ms);
    }
    if input.reverse {
        state.ship.apply_thrust(-1.0, dt_ms);
    }
    let (width, height) = (state.width, state.height);
    state.ship.integrate(dt_ms, width, height);
    if input.fire {
        let projectile = state.ship.fire();
        state.projectiles.push(projectile);
        state.push_event(GameEvent::Fired);
    }

    // Advance and compact in a single pass per collection; an entity whose
    // update reports expiry is gone before the next frame, and nothing is
    // updated twice.
    state.projectiles.retain_mut(|p| p.update(dt_ms));
    for asteroid in &mut state.asteroids {
        asteroid.update(dt_ms, width, height);
    }
    state.particles.retain_mut(|p| p.update(dt_ms));

    // Pure scroll and wrap; stars never interact with gameplay
    for star in &mut state.stars {
        star.pos.x -= star.speed * dt_ms * DT_SCALE;
        if star.pos.x < 0.0 {
            star.pos.x += width;
        }
    }

    state.spawn_timer_ms += dt_ms;
    if state.spawn_timer_ms > SPAWN_INTERVAL_MS && state.asteroids.len() < MAX_ASTEROIDS {
        state.spawn_edge_asteroid();
        state.spawn_timer_ms = 0.0;
    }

    resolve_collisions(state);
}

/// Collision pass, resolved centrally by the controller.
///
/// Order matters: ship-asteroid first (any hit ends the run immediately,
/// no partial damage), then projectile-asteroid where each projectile may
/// destroy at most one asteroid per frame. Destroyed asteroids are not
/// split into fragments.
fn resolve_collisions(state: &mut GameState) {
    if state
        .asteroids
        .iter()
        .any(|a| ship_hits_asteroid(&state.ship, a))
    {
        state.end();
        return;
    }

    let mut pi = 0;
    while pi < state.projectiles.len() {
        let hit = state
            .asteroids
            .iter()
            .position(|a| projectile_hits_asteroid(&state.projectiles[pi], a));
        match hit {
            Some(ai) => {
                let asteroid = state.asteroids.remove(ai);
                state.score += (asteroid.radius * 10.0).floor() as u32;
                state.spawn_burst(asteroid.pos, asteroid.radius);
                let pitch = state.rng.random_range(80.0..160.0);
                state.push_event(GameEvent::Explosion { pitch });
                state.projectiles.remove(pi);
            }
            None => pi += 1,
        }
    }
}
