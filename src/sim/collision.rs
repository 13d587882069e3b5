//! Circle-circle collision tests
//!
//! Every collidable entity in the field is a circle: the ship by its size,
//! projectiles by their fixed radius, asteroids by their base radius (the
//! procedural outline is draw-only). All pairwise checks reduce to one
//! overlap primitive so the tests stay symmetric.

use glam::Vec2;

use super::state::{Asteroid, Projectile, Ship};
use crate::consts::{PROJECTILE_SIZE, SHIP_SIZE};

/// True when two circles overlap: `distance < r_a + r_b`
#[inline]
pub fn circles_overlap(a: Vec2, r_a: f32, b: Vec2, r_b: f32) -> bool {
    let reach = r_a + r_b;
    a.distance_squared(b) < reach * reach
}

/// Ship-asteroid hit test; any hit ends the run
#[inline]
pub fn ship_hits_asteroid(ship: &Ship, asteroid: &Asteroid) -> bool {
    circles_overlap(ship.pos, SHIP_SIZE, asteroid.pos, asteroid.radius)
}

/// Projectile-asteroid hit test
#[inline]
pub fn projectile_hits_asteroid(projectile: &Projectile, asteroid: &Asteroid) -> bool {
    circles_overlap(
        projectile.pos,
        PROJECTILE_SIZE,
        asteroid.pos,
        asteroid.radius,
    )
}
