//! Astro Drift - a wrap-around Asteroids arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (motion, collisions, game state)
//! - `renderer`: 2D immediate-mode draw pass over an abstract surface
//! - `audio`: Procedural tone synthesis (Web Audio on wasm, no-op native)
//! - `settings`: User preferences persisted to LocalStorage

pub mod audio;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Converts a millisecond delta into frame-relative units (~60 Hz).
    /// All per-frame velocities and decay factors assume this scale.
    pub const DT_SCALE: f32 = 0.016;
    /// Longest delta the loop will integrate in one step, in milliseconds.
    /// Caps catch-up after a dropped frame or a background tab.
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Ship collision radius and draw size, in pixels
    pub const SHIP_SIZE: f32 = 20.0;
    /// Speed cap (uniform velocity rescale above this)
    pub const SHIP_MAX_SPEED: f32 = 8.0;
    /// Velocity retained per frame
    pub const SHIP_FRICTION: f32 = 0.98;
    /// Acceleration added along the heading while thrusting
    pub const SHIP_THRUST: f32 = 0.5;
    /// Discrete turn step - the ship is 8-directional
    pub const TURN_STEP: f32 = std::f32::consts::FRAC_PI_4;

    /// Projectile collision radius
    pub const PROJECTILE_SIZE: f32 = 3.0;
    /// Projectile lifetime in milliseconds
    pub const PROJECTILE_LIFE_MS: f32 = 1000.0;
    /// Muzzle speed added on top of the ship's velocity
    pub const PROJECTILE_SPEED: f32 = 15.0;

    /// Asteroid radius range (half-open)
    pub const ASTEROID_MIN_RADIUS: f32 = 15.0;
    pub const ASTEROID_MAX_RADIUS: f32 = 35.0;
    /// Vertex count range for the procedural outline (inclusive)
    pub const ASTEROID_MIN_VERTICES: usize = 8;
    pub const ASTEROID_MAX_VERTICES: usize = 11;
    /// Per-vertex radius jitter as a fraction of the base radius
    pub const ASTEROID_VERTEX_MIN: f32 = 0.7;
    pub const ASTEROID_VERTEX_MAX: f32 = 1.3;
    /// Drift speed range for freshly spawned asteroids, per axis
    pub const ASTEROID_MAX_DRIFT: f32 = 1.5;
    /// Rotation drift range, radians per frame unit
    pub const ASTEROID_MAX_SPIN: f32 = 0.05;

    /// Milliseconds between spawn-timer asteroid spawns
    pub const SPAWN_INTERVAL_MS: f32 = 2000.0;
    /// Field cap, enforced at spawn time only
    pub const MAX_ASTEROIDS: usize = 8;
    /// Asteroids seeded by `start()`
    pub const INITIAL_ASTEROIDS: usize = 3;

    /// Particle velocity retained per frame
    pub const PARTICLE_DRAG: f32 = 0.99;
    /// Particle speed range inside an explosion burst
    pub const PARTICLE_MIN_SPEED: f32 = 1.0;
    pub const PARTICLE_MAX_SPEED: f32 = 2.0;
    /// Particle lifetime range in milliseconds
    pub const PARTICLE_MIN_LIFE_MS: f32 = 500.0;
    pub const PARTICLE_MAX_LIFE_MS: f32 = 1500.0;
    /// Particle draw size range
    pub const PARTICLE_MIN_SIZE: f32 = 1.0;
    pub const PARTICLE_MAX_SIZE: f32 = 4.0;

    /// Stars per square pixel of canvas
    pub const STAR_DENSITY: f32 = 1.0 / 4000.0;
    /// Star draw size range
    pub const STAR_MIN_SIZE: f32 = 1.0;
    pub const STAR_MAX_SIZE: f32 = 3.2;
    /// Star scroll speed range, pixels per frame unit
    pub const STAR_MIN_SPEED: f32 = 0.1;
    pub const STAR_MAX_SPEED: f32 = 0.6;
}

/// Wrap a single axis coordinate into `[0, limit)` with a margin.
///
/// An entity fully exits the visible area (beyond `margin`) before it
/// reappears just outside the opposite edge.
#[inline]
pub fn wrap_axis(value: f32, limit: f32, margin: f32) -> f32 {
    if value < -margin {
        limit + margin
    } else if value > limit + margin {
        -margin
    } else {
        value
    }
}

/// Normalize an angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_axis_left_edge() {
        assert_eq!(wrap_axis(-21.0, 800.0, 20.0), 820.0);
        // Still within the margin - untouched
        assert_eq!(wrap_axis(-19.0, 800.0, 20.0), -19.0);
    }

    #[test]
    fn test_wrap_axis_right_edge() {
        assert_eq!(wrap_axis(821.0, 800.0, 20.0), -20.0);
        assert_eq!(wrap_axis(819.0, 800.0, 20.0), 819.0);
    }

    #[test]
    fn test_wrap_axis_interior_untouched() {
        assert_eq!(wrap_axis(400.0, 800.0, 20.0), 400.0);
        assert_eq!(wrap_axis(0.0, 800.0, 20.0), 0.0);
    }

    #[test]
    fn test_normalize_angle() {
        use std::f32::consts::PI;
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI) - (-PI)).abs() < 1e-5);
        assert_eq!(normalize_angle(0.5), 0.5);
    }
}
