//! 2D immediate-mode draw pass
//!
//! Entities never touch the drawing surface directly. The draw pass walks
//! the game state in a fixed order (clear, stars, ship, projectiles,
//! asteroids, particles) so later entities always render on top, and every
//! positioned entity is drawn inside a scoped save/restore so no transform
//! leaks between entities.

use glam::Vec2;

use crate::consts::SHIP_SIZE;
use crate::sim::GameState;

const COLOR_SHIP: &str = "#e8f0ff";
const COLOR_PROJECTILE: &str = "#ffd166";
const COLOR_ASTEROID: &str = "#b8c4d9";
const COLOR_PARTICLE: &str = "#ff9f43";
const COLOR_STAR: &str = "#ffffff";

/// Minimal immediate-mode drawing contract.
///
/// Mirrors the subset of a 2D canvas the game needs; the engine owns the
/// draw calls but not the surface's pixel format.
pub trait Surface {
    /// Clear the full surface to the background color
    fn clear(&self, width: f32, height: f32);
    /// Set global alpha for subsequent draws
    fn set_alpha(&self, alpha: f32);
    fn fill_circle(&self, center: Vec2, radius: f32, color: &str);
    /// Stroke a polyline through `points`, optionally closing it
    fn stroke_path(&self, points: &[Vec2], closed: bool, color: &str, line_width: f32);
    fn save(&self);
    fn restore(&self);
    fn translate_rotate(&self, translation: Vec2, rotation: f32);
}

/// Run `f` inside a scoped translate+rotate. The save/restore pair wraps
/// every entity draw, so a panic-free pass can never leak a transform.
fn with_transform<S: Surface + ?Sized>(
    surface: &S,
    translation: Vec2,
    rotation: f32,
    f: impl FnOnce(&S),
) {
    surface.save();
    surface.translate_rotate(translation, rotation);
    f(surface);
    surface.restore();
}

/// Ship outline in local space, nose along +x
fn ship_outline() -> [Vec2; 4] {
    [
        Vec2::new(SHIP_SIZE, 0.0),
        Vec2::new(-SHIP_SIZE * 0.7, SHIP_SIZE * 0.6),
        Vec2::new(-SHIP_SIZE * 0.4, 0.0),
        Vec2::new(-SHIP_SIZE * 0.7, -SHIP_SIZE * 0.6),
    ]
}

/// Draw one frame. Order is fixed: clear, stars, ship, projectiles,
/// asteroids, particles.
pub fn draw_frame<S: Surface>(state: &GameState, surface: &S, starfield: bool) {
    surface.set_alpha(1.0);
    surface.clear(state.width, state.height);

    if starfield {
        for star in &state.stars {
            // Faster stars read as closer: slightly brighter
            surface.set_alpha(0.3 + star.speed);
            surface.fill_circle(star.pos, star.size / 2.0, COLOR_STAR);
        }
        surface.set_alpha(1.0);
    }

    with_transform(surface, state.ship.pos, state.ship.angle, |s| {
        s.stroke_path(&ship_outline(), true, COLOR_SHIP, 2.0);
    });

    for projectile in &state.projectiles {
        surface.fill_circle(projectile.pos, crate::consts::PROJECTILE_SIZE, COLOR_PROJECTILE);
    }

    for asteroid in &state.asteroids {
        // Rotation is applied here as a transform; the outline itself is
        // frozen at construction
        with_transform(surface, asteroid.pos, asteroid.rotation, |s| {
            s.stroke_path(&asteroid.vertices, true, COLOR_ASTEROID, 1.5);
        });
    }

    for particle in &state.particles {
        surface.set_alpha(particle.alpha());
        surface.fill_circle(particle.pos, particle.size, COLOR_PARTICLE);
    }
    surface.set_alpha(1.0);
}

/// Canvas-backed surface for the browser
#[cfg(target_arch = "wasm32")]
pub struct CanvasSurface {
    ctx: web_sys::CanvasRenderingContext2d,
}

#[cfg(target_arch = "wasm32")]
impl CanvasSurface {
    pub fn new(ctx: web_sys::CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

#[cfg(target_arch = "wasm32")]
impl Surface for CanvasSurface {
    fn clear(&self, width: f32, height: f32) {
        self.ctx.set_fill_style_str("#000000");
        self.ctx.fill_rect(0.0, 0.0, width as f64, height as f64);
    }

    fn set_alpha(&self, alpha: f32) {
        self.ctx.set_global_alpha(alpha as f64);
    }

    fn fill_circle(&self, center: Vec2, radius: f32, color: &str) {
        self.ctx.begin_path();
        let _ = self.ctx.arc(
            center.x as f64,
            center.y as f64,
            radius as f64,
            0.0,
            std::f64::consts::TAU,
        );
        self.ctx.set_fill_style_str(color);
        self.ctx.fill();
    }

    fn stroke_path(&self, points: &[Vec2], closed: bool, color: &str, line_width: f32) {
        let Some(first) = points.first() else { return };
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in &points[1..] {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        if closed {
            self.ctx.close_path();
        }
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width as f64);
        self.ctx.stroke();
    }

    fn save(&self) {
        self.ctx.save();
    }

    fn restore(&self) {
        self.ctx.restore();
    }

    fn translate_rotate(&self, translation: Vec2, rotation: f32) {
        let _ = self
            .ctx
            .translate(translation.x as f64, translation.y as f64);
        let _ = self.ctx.rotate(rotation as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameState, Projectile};
    use glam::Vec2;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clear,
        Alpha(f32),
        Circle(&'static str),
        Path(&'static str),
        Save,
        Restore,
        Transform,
    }

    #[derive(Default)]
    struct RecordingSurface {
        ops: RefCell<Vec<Op>>,
    }

    impl RecordingSurface {
        fn intern(color: &str) -> &'static str {
            match color {
                COLOR_SHIP => COLOR_SHIP,
                COLOR_PROJECTILE => COLOR_PROJECTILE,
                COLOR_ASTEROID => COLOR_ASTEROID,
                COLOR_PARTICLE => COLOR_PARTICLE,
                _ => COLOR_STAR,
            }
        }
    }

    impl Surface for RecordingSurface {
        fn clear(&self, _width: f32, _height: f32) {
            self.ops.borrow_mut().push(Op::Clear);
        }
        fn set_alpha(&self, alpha: f32) {
            self.ops.borrow_mut().push(Op::Alpha(alpha));
        }
        fn fill_circle(&self, _center: Vec2, _radius: f32, color: &str) {
            self.ops.borrow_mut().push(Op::Circle(Self::intern(color)));
        }
        fn stroke_path(&self, _points: &[Vec2], _closed: bool, color: &str, _width: f32) {
            self.ops.borrow_mut().push(Op::Path(Self::intern(color)));
        }
        fn save(&self) {
            self.ops.borrow_mut().push(Op::Save);
        }
        fn restore(&self) {
            self.ops.borrow_mut().push(Op::Restore);
        }
        fn translate_rotate(&self, _t: Vec2, _r: f32) {
            self.ops.borrow_mut().push(Op::Transform);
        }
    }

    fn populated_state() -> GameState {
        let mut state = GameState::new(21, 800.0, 600.0);
        state.start(0.0);
        state.projectiles.push(Projectile {
            pos: Vec2::new(50.0, 50.0),
            vel: Vec2::ZERO,
            life_ms: 500.0,
        });
        state.spawn_burst(Vec2::new(60.0, 60.0), 15.0);
        state
    }

    #[test]
    fn test_draw_order_is_fixed() {
        let state = populated_state();
        let surface = RecordingSurface::default();
        draw_frame(&state, &surface, true);
        let ops = surface.ops.borrow();

        // Alpha reset precedes the clear; nothing draws before the clear
        assert_eq!(ops[0], Op::Alpha(1.0));
        assert_eq!(ops[1], Op::Clear);

        let pos = |op: &Op| ops.iter().position(|o| o == op).unwrap();
        let last = |op: &Op| ops.iter().rposition(|o| o == op).unwrap();
        let star = last(&Op::Circle(COLOR_STAR));
        let ship = pos(&Op::Path(COLOR_SHIP));
        let projectile = pos(&Op::Circle(COLOR_PROJECTILE));
        let asteroid = pos(&Op::Path(COLOR_ASTEROID));
        let particle = pos(&Op::Circle(COLOR_PARTICLE));
        assert!(star < ship && ship < projectile);
        assert!(projectile < asteroid && asteroid < particle);
    }

    #[test]
    fn test_transforms_are_scoped() {
        let state = populated_state();
        let surface = RecordingSurface::default();
        draw_frame(&state, &surface, false);
        let ops = surface.ops.borrow();

        let saves = ops.iter().filter(|o| **o == Op::Save).count();
        let restores = ops.iter().filter(|o| **o == Op::Restore).count();
        // One scoped transform per ship + per asteroid, always balanced
        assert_eq!(saves, restores);
        assert_eq!(saves, 1 + state.asteroids.len());

        // Every transform sits inside a save/restore pair
        let mut depth = 0;
        for op in ops.iter() {
            match op {
                Op::Save => depth += 1,
                Op::Restore => depth -= 1,
                Op::Transform => assert!(depth > 0),
                _ => {}
            }
            assert!(depth >= 0);
        }
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_particle_alpha_tracks_lifetime() {
        let mut state = GameState::new(22, 800.0, 600.0);
        state.start(0.0);
        state.asteroids.clear();
        state.spawn_burst(Vec2::new(60.0, 60.0), 15.0);
        for p in &mut state.particles {
            p.life_ms = p.max_life_ms * 0.25;
        }
        let surface = RecordingSurface::default();
        draw_frame(&state, &surface, false);
        let ops = surface.ops.borrow();

        // Each particle draw is preceded by its own fade alpha
        let mut current_alpha = 1.0;
        for op in ops.iter() {
            match op {
                Op::Alpha(a) => current_alpha = *a,
                Op::Circle(c) if *c == COLOR_PARTICLE => {
                    assert!((current_alpha - 0.25).abs() < 1e-5);
                }
                _ => {}
            }
        }
        // The pass leaves alpha reset for the next consumer
        assert_eq!(*ops.last().unwrap(), Op::Alpha(1.0));
    }

    #[test]
    fn test_starfield_can_be_disabled() {
        let state = populated_state();
        let surface = RecordingSurface::default();
        draw_frame(&state, &surface, false);
        let ops = surface.ops.borrow();
        assert!(!ops.iter().any(|o| *o == Op::Circle(COLOR_STAR)));
    }
}
