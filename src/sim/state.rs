//! Game state and core simulation types
//!
//! The controller (`GameState`) exclusively owns every entity collection.
//! Entities never reference each other; collisions are detected and
//! resolved centrally in the tick.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::consts::*;
use crate::{normalize_angle, wrap_axis};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No session yet (page just loaded)
    Idle,
    /// Active gameplay
    Running,
    /// Session suspended; the scheduler withholds frames
    Paused,
    /// Run ended by a ship-asteroid collision
    GameOver,
}

/// Events emitted by the simulation for the platform layer to act on
/// (tones, HUD flashes). Drained once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    Started,
    Fired,
    Explosion { pitch: f32 },
    Paused,
    Resumed,
    GameOver,
}

/// The player's ship
#[derive(Debug, Clone)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Heading in radians, kept in [-π, π) and a multiple of `TURN_STEP`
    /// under manual turns
    pub angle: f32,
}

impl Ship {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            angle: -FRAC_PI_2,
        }
    }

    /// Reset in place for a new session (the ship is never recreated)
    pub fn reset(&mut self, center: Vec2) {
        self.pos = center;
        self.vel = Vec2::ZERO;
        self.angle = -FRAC_PI_2;
    }

    /// Unit vector along the current heading
    #[inline]
    pub fn facing(&self) -> Vec2 {
        Vec2::new(self.angle.cos(), self.angle.sin())
    }

    /// Snap one 45° step counter-clockwise.
    ///
    /// The snap-to-grid behavior is deliberate: holding the key steps the
    /// heading once per frame, but it always lands on the 8-direction grid.
    /// Normalizing after the snap keeps the quotient exact; an unbounded
    /// angle loses float precision and stalls the step after a few
    /// revolutions.
    pub fn turn_left(&mut self) {
        let step = (self.angle / TURN_STEP).floor();
        self.angle = normalize_angle((step - 1.0) * TURN_STEP);
    }

    /// Snap one 45° step clockwise
    pub fn turn_right(&mut self) {
        let step = (self.angle / TURN_STEP).floor();
        self.angle = normalize_angle((step + 1.0) * TURN_STEP);
    }

    /// Accelerate along the heading; `dir` is +1 forward, -1 reverse
    pub fn apply_thrust(&mut self, dir: f32, dt_ms: f32) {
        self.vel += self.facing() * SHIP_THRUST * dt_ms * DT_SCALE * dir;
    }

    /// Friction, speed clamp, motion, and screen wrap for one frame.
    /// Friction applies every frame whether or not thrust is held.
    pub fn integrate(&mut self, dt_ms: f32, width: f32, height: f32) {
        self.vel *= SHIP_FRICTION;
        let speed = self.vel.length();
        if speed > SHIP_MAX_SPEED {
            self.vel *= SHIP_MAX_SPEED / speed;
        }
        self.pos += self.vel * dt_ms * DT_SCALE;
        self.pos.x = wrap_axis(self.pos.x, width, SHIP_SIZE);
        self.pos.y = wrap_axis(self.pos.y, height, SHIP_SIZE);
    }

    /// Tip of the ship, where projectiles are emitted
    #[inline]
    pub fn nose(&self) -> Vec2 {
        self.pos + self.facing() * SHIP_SIZE
    }

    /// Emit one projectile. It inherits the ship's momentum plus a fixed
    /// muzzle speed along the heading.
    pub fn fire(&self) -> Projectile {
        Projectile {
            pos: self.nose(),
            vel: self.vel + self.facing() * PROJECTILE_SPEED,
            life_ms: PROJECTILE_LIFE_MS,
        }
    }
}

/// A short-lived shot moving in a straight line
#[derive(Debug, Clone)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life_ms: f32,
}

impl Projectile {
    /// Advance one frame; returns false once the lifetime runs out.
    /// Projectiles never wrap - they expire in flight.
    pub fn update(&mut self, dt_ms: f32) -> bool {
        self.pos += self.vel * dt_ms * DT_SCALE;
        self.life_ms -= dt_ms;
        self.life_ms > 0.0
    }
}

/// A drifting rock with a procedurally generated outline
#[derive(Debug, Clone)]
pub struct Asteroid {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub rotation_speed: f32,
    /// Outline points in local space, frozen at construction.
    /// Rotation is a draw-time transform, never baked into these.
    pub vertices: Vec<Vec2>,
}

impl Asteroid {
    pub fn new(pos: Vec2, vel: Vec2, radius: f32, rotation_speed: f32, rng: &mut Pcg32) -> Self {
        let count = rng.random_range(ASTEROID_MIN_VERTICES..=ASTEROID_MAX_VERTICES);
        let vertices = (0..count)
            .map(|i| {
                let theta = TAU * i as f32 / count as f32;
                let r = radius * rng.random_range(ASTEROID_VERTEX_MIN..ASTEROID_VERTEX_MAX);
                Vec2::new(theta.cos() * r, theta.sin() * r)
            })
            .collect();
        Self {
            pos,
            vel,
            radius,
            rotation: 0.0,
            rotation_speed,
            vertices,
        }
    }

    /// Constant linear and rotational drift, wrapping with a radius margin
    pub fn update(&mut self, dt_ms: f32, width: f32, height: f32) {
        self.pos += self.vel * dt_ms * DT_SCALE;
        self.rotation += self.rotation_speed * dt_ms * DT_SCALE;
        self.pos.x = wrap_axis(self.pos.x, width, self.radius);
        self.pos.y = wrap_axis(self.pos.y, height, self.radius);
    }
}

/// Ephemeral explosion debris
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life_ms: f32,
    pub max_life_ms: f32,
    pub size: f32,
}

impl Particle {
    /// Drift with drag; no wrap - particles may leave the visible area
    /// and are only ever removed by expiry.
    pub fn update(&mut self, dt_ms: f32) -> bool {
        self.pos += self.vel * dt_ms * DT_SCALE;
        self.vel *= PARTICLE_DRAG;
        self.life_ms -= dt_ms;
        self.life_ms > 0.0
    }

    /// Draw alpha, fading linearly with remaining lifetime
    #[inline]
    pub fn alpha(&self) -> f32 {
        (self.life_ms / self.max_life_ms).clamp(0.0, 1.0)
    }
}

/// A decorative background star. Scrolls on its own horizontal axis,
/// recycled in place, no collision.
#[derive(Debug, Clone)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
}

/// Complete game state. The tick is the sole mutator.
pub struct GameState {
    pub phase: GamePhase,
    pub score: u32,
    /// Wall-clock timestamp of the last `start()`, in milliseconds
    pub started_at_ms: f64,
    /// Recomputed from the wall clock each frame, so the displayed timer
    /// is monotonic and immune to frame drops
    pub elapsed_secs: u32,
    pub ship: Ship,
    pub projectiles: Vec<Projectile>,
    pub asteroids: Vec<Asteroid>,
    pub particles: Vec<Particle>,
    pub stars: Vec<Star>,
    /// Accumulator gating periodic asteroid spawns, reset on each spawn
    pub spawn_timer_ms: f32,
    pub width: f32,
    pub height: f32,
    pub rng: Pcg32,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create an idle state sized to the drawing surface
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        let mut state = Self {
            phase: GamePhase::Idle,
            score: 0,
            started_at_ms: 0.0,
            elapsed_secs: 0,
            ship: Ship::new(Vec2::new(width / 2.0, height / 2.0)),
            projectiles: Vec::new(),
            asteroids: Vec::new(),
            particles: Vec::new(),
            stars: Vec::new(),
            spawn_timer_ms: 0.0,
            width,
            height,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        };
        state.regenerate_stars(width, height);
        state
    }

    /// Begin (or reset) a session: clear the field, re-center the ship,
    /// seed the initial asteroid field, and start the clock.
    pub fn start(&mut self, now_ms: f64) {
        self.score = 0;
        self.elapsed_secs = 0;
        self.started_at_ms = now_ms;
        self.spawn_timer_ms = 0.0;
        self.projectiles.clear();
        self.asteroids.clear();
        self.particles.clear();
        self.ship.reset(Vec2::new(self.width / 2.0, self.height / 2.0));
        for _ in 0..INITIAL_ASTEROIDS {
            self.spawn_edge_asteroid();
        }
        self.phase = GamePhase::Running;
        self.events.push(GameEvent::Started);
        log::info!("session started ({}x{})", self.width, self.height);
    }

    /// Toggle Running ⇄ Paused. No state decays while paused; the platform
    /// loop stops scheduling frames and the tick gates on the phase too.
    pub fn toggle_pause(&mut self) {
        match self.phase {
            GamePhase::Running => {
                self.phase = GamePhase::Paused;
                self.events.push(GameEvent::Paused);
            }
            GamePhase::Paused => {
                self.phase = GamePhase::Running;
                self.events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    /// End the run. Final score and time stay readable for the UI.
    pub(crate) fn end(&mut self) {
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver);
        log::info!(
            "game over: score {} after {}s",
            self.score,
            self.elapsed_secs
        );
    }

    /// Spawn one asteroid just outside a randomly chosen edge.
    /// The field cap is enforced here and only here - collision removals
    /// may freely drop the count between spawns.
    pub fn spawn_edge_asteroid(&mut self) {
        if self.asteroids.len() >= MAX_ASTEROIDS {
            return;
        }
        let radius = self
            .rng
            .random_range(ASTEROID_MIN_RADIUS..ASTEROID_MAX_RADIUS);
        let pos = match self.rng.random_range(0..4u8) {
            0 => Vec2::new(self.rng.random_range(0.0..self.width), -radius),
            1 => Vec2::new(self.width + radius, self.rng.random_range(0.0..self.height)),
            2 => Vec2::new(self.rng.random_range(0.0..self.width), self.height + radius),
            _ => Vec2::new(-radius, self.rng.random_range(0.0..self.height)),
        };
        let vel = Vec2::new(
            self.rng.random_range(-ASTEROID_MAX_DRIFT..ASTEROID_MAX_DRIFT),
            self.rng.random_range(-ASTEROID_MAX_DRIFT..ASTEROID_MAX_DRIFT),
        );
        let spin = self.rng.random_range(-ASTEROID_MAX_SPIN..ASTEROID_MAX_SPIN);
        let asteroid = Asteroid::new(pos, vel, radius, spin, &mut self.rng);
        self.asteroids.push(asteroid);
    }

    /// Radial particle burst at a destroyed asteroid's last position:
    /// `floor(2 * radius)` particles at evenly spaced angles.
    pub fn spawn_burst(&mut self, origin: Vec2, radius: f32) {
        let count = (radius * 2.0).floor() as usize;
        for i in 0..count {
            let theta = TAU * i as f32 / count as f32;
            let speed = self
                .rng
                .random_range(PARTICLE_MIN_SPEED..PARTICLE_MAX_SPEED);
            let life = self
                .rng
                .random_range(PARTICLE_MIN_LIFE_MS..PARTICLE_MAX_LIFE_MS);
            let size = self.rng.random_range(PARTICLE_MIN_SIZE..PARTICLE_MAX_SIZE);
            self.particles.push(Particle {
                pos: origin,
                vel: Vec2::new(theta.cos(), theta.sin()) * speed,
                life_ms: life,
                max_life_ms: life,
                size,
            });
        }
    }

    /// Regenerate the starfield for new surface dimensions. The set is
    /// rebuilt, not resampled - there is no path that preserves star
    /// positions across a dimension change.
    pub fn regenerate_stars(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        let count = (width * height * STAR_DENSITY) as usize;
        self.stars = (0..count)
            .map(|_| Star {
                pos: Vec2::new(
                    self.rng.random_range(0.0..width),
                    self.rng.random_range(0.0..height),
                ),
                size: self.rng.random_range(STAR_MIN_SIZE..STAR_MAX_SIZE),
                speed: self.rng.random_range(STAR_MIN_SPEED..STAR_MAX_SPEED),
            })
            .collect();
    }

    /// Asteroid count readout for the HUD
    #[inline]
    pub fn asteroid_count(&self) -> usize {
        self.asteroids.len()
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_4, PI};

    fn test_rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn test_asteroid_outline_generation() {
        let mut rng = test_rng();
        for _ in 0..50 {
            let a = Asteroid::new(Vec2::ZERO, Vec2::ZERO, 20.0, 0.01, &mut rng);
            assert!(a.vertices.len() >= ASTEROID_MIN_VERTICES);
            assert!(a.vertices.len() <= ASTEROID_MAX_VERTICES);
            for (i, v) in a.vertices.iter().enumerate() {
                let r = v.length();
                assert!(r >= 20.0 * ASTEROID_VERTEX_MIN - 1e-3);
                assert!(r < 20.0 * ASTEROID_VERTEX_MAX + 1e-3);
                // Angularly evenly spaced
                let expected = TAU * i as f32 / a.vertices.len() as f32;
                let actual = v.y.atan2(v.x).rem_euclid(TAU);
                assert!((actual - expected).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_asteroid_outline_frozen() {
        let mut rng = test_rng();
        let mut a = Asteroid::new(Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0), 20.0, 0.02, &mut rng);
        let before = a.vertices.clone();
        for _ in 0..100 {
            a.update(16.0, 800.0, 600.0);
        }
        assert_eq!(a.vertices, before);
        assert!(a.rotation > 0.0);
    }

    #[test]
    fn test_turn_snapping_from_off_grid() {
        let mut ship = Ship::new(Vec2::ZERO);
        ship.angle = 0.3; // knocked off the grid
        ship.turn_left();
        assert!((ship.angle - (-FRAC_PI_4)).abs() < 1e-5);
        ship.angle = 0.3;
        ship.turn_right();
        assert!((ship.angle - FRAC_PI_4).abs() < 1e-5);
    }

    #[test]
    fn test_turn_steps_stay_on_grid() {
        let mut ship = Ship::new(Vec2::ZERO);
        for _ in 0..7 {
            ship.turn_right();
            let steps = ship.angle / FRAC_PI_4;
            assert!((steps - steps.round()).abs() < 1e-4);
        }
        for _ in 0..13 {
            ship.turn_left();
            let steps = ship.angle / FRAC_PI_4;
            assert!((steps - steps.round()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sustained_turns_always_advance() {
        // Holding a turn key must step the heading every frame, even after
        // many full revolutions; each snap moves exactly one 45° step.
        let mut ship = Ship::new(Vec2::ZERO);
        for _ in 0..2000 {
            let before = ship.angle;
            ship.turn_right();
            let delta = normalize_angle(ship.angle - before);
            assert!((delta - FRAC_PI_4).abs() < 1e-4, "right turn stalled");
            assert!(ship.angle >= -PI && ship.angle < PI);
        }
        for _ in 0..2000 {
            let before = ship.angle;
            ship.turn_left();
            let delta = normalize_angle(ship.angle - before);
            assert!((delta + FRAC_PI_4).abs() < 1e-4, "left turn stalled");
            assert!(ship.angle >= -PI && ship.angle < PI);
        }
    }

    #[test]
    fn test_projectile_inherits_momentum() {
        let mut ship = Ship::new(Vec2::new(400.0, 300.0));
        ship.angle = 0.0;
        ship.vel = Vec2::new(2.0, -1.0);
        let p = ship.fire();
        assert_eq!(p.pos, ship.nose());
        assert!((p.vel.x - (2.0 + PROJECTILE_SPEED)).abs() < 1e-5);
        assert!((p.vel.y - (-1.0)).abs() < 1e-5);
    }

    #[test]
    fn test_particle_fade_and_drag() {
        let mut p = Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(2.0, 0.0),
            life_ms: 1000.0,
            max_life_ms: 1000.0,
            size: 2.0,
        };
        assert_eq!(p.alpha(), 1.0);
        assert!(p.update(900.0));
        // Nearing expiry the particle is mostly transparent
        assert!(p.alpha() < 0.2);
        assert!((p.vel.x - 2.0 * PARTICLE_DRAG).abs() < 1e-6);
        // Removed exactly when life runs out, never before
        assert!(!p.update(100.0));
    }

    #[test]
    fn test_starfield_regeneration() {
        let mut state = GameState::new(7, 800.0, 600.0);
        let expected = (800.0 * 600.0 * STAR_DENSITY) as usize;
        assert_eq!(state.stars.len(), expected);
        for star in &state.stars {
            assert!(star.size >= STAR_MIN_SIZE && star.size < STAR_MAX_SIZE);
            assert!(star.speed >= STAR_MIN_SPEED && star.speed < STAR_MAX_SPEED);
        }
        state.regenerate_stars(400.0, 300.0);
        assert_eq!(state.stars.len(), (400.0 * 300.0 * STAR_DENSITY) as usize);
        assert_eq!(state.width, 400.0);
        for star in &state.stars {
            assert!(star.pos.x < 400.0 && star.pos.y < 300.0);
        }
    }

    #[test]
    fn test_edge_spawn_is_off_screen() {
        let mut state = GameState::new(3, 800.0, 600.0);
        for _ in 0..MAX_ASTEROIDS {
            state.spawn_edge_asteroid();
        }
        assert_eq!(state.asteroids.len(), MAX_ASTEROIDS);
        for a in &state.asteroids {
            let off_left = (a.pos.x - (-a.radius)).abs() < 1e-3;
            let off_right = (a.pos.x - (800.0 + a.radius)).abs() < 1e-3;
            let off_top = (a.pos.y - (-a.radius)).abs() < 1e-3;
            let off_bottom = (a.pos.y - (600.0 + a.radius)).abs() < 1e-3;
            assert!(off_left || off_right || off_top || off_bottom);
        }
        // Cap enforced at spawn time
        state.spawn_edge_asteroid();
        assert_eq!(state.asteroids.len(), MAX_ASTEROIDS);
    }

    #[test]
    fn test_burst_count_and_spread() {
        let mut state = GameState::new(11, 800.0, 600.0);
        let origin = Vec2::new(200.0, 200.0);
        state.spawn_burst(origin, 20.0);
        assert_eq!(state.particles.len(), 40);
        for (i, p) in state.particles.iter().enumerate() {
            assert_eq!(p.pos, origin);
            let expected = TAU * i as f32 / 40.0;
            let actual = p.vel.y.atan2(p.vel.x).rem_euclid(TAU);
            assert!((actual - expected).abs() < 1e-3);
            let speed = p.vel.length();
            assert!(speed >= PARTICLE_MIN_SPEED && speed < PARTICLE_MAX_SPEED);
            assert!(p.life_ms >= PARTICLE_MIN_LIFE_MS && p.life_ms < PARTICLE_MAX_LIFE_MS);
            assert_eq!(p.life_ms, p.max_life_ms);
        }
    }

    #[test]
    fn test_start_resets_session() {
        let mut state = GameState::new(5, 800.0, 600.0);
        state.start(1000.0);
        state.score = 777;
        state.projectiles.push(state.ship.fire());
        state.spawn_burst(Vec2::ZERO, 20.0);
        state.phase = GamePhase::GameOver;

        state.start(9000.0);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.score, 0);
        assert_eq!(state.asteroids.len(), INITIAL_ASTEROIDS);
        assert!(state.projectiles.is_empty());
        assert!(state.particles.is_empty());
        assert_eq!(state.started_at_ms, 9000.0);
        assert_eq!(state.ship.pos, Vec2::new(400.0, 300.0));
        assert_eq!(state.ship.vel, Vec2::ZERO);
    }
}
