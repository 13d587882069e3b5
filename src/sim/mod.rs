//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - The controller is the sole mutator of every entity collection
//! - No rendering, audio, or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{circles_overlap, projectile_hits_asteroid, ship_hits_asteroid};
pub use state::{Asteroid, GameEvent, GamePhase, GameState, Particle, Projectile, Ship, Star};
pub use tick::{InputState, tick};
