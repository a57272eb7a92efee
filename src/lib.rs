//! Mini Golf - a miniature golf simulation core
//!
//! Core modules:
//! - `sim`: Frame-coupled simulation (gesture input, physics, collisions, session state)
//! - `course`: Static hole descriptions and validation
//! - `renderer`: Per-frame transform snapshot for an external renderer
//! - `platform`: Host input routing (browser bindings on wasm32)
//! - `persistence`: Score submission seam
//! - `settings`: Tunable constants and presentation flags

pub mod course;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use course::{Course, Level, LevelError};
pub use highscores::BestScores;
pub use settings::{Settings, Tuning, TuningError};
pub use sim::{GameEvent, GamePhase, Session, SessionError};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Ball radius in world units
    pub const BALL_RADIUS: f32 = 0.15;

    /// Per-frame gravity (frame-coupled, not scaled by dt)
    pub const GRAVITY: Vec3 = Vec3::new(0.0, -0.01, 0.0);

    /// Ground plane height
    pub const GROUND_LEVEL: f32 = 0.0;
    /// Default half-width of the square ground plane
    pub const GROUND_HALF_EXTENT: f32 = 25.0;

    /// Screen-space drag distance that maps to full power
    pub const MAX_DRAG_DISTANCE: f32 = 80.0;
    /// Shots below this power are treated as accidental taps
    pub const MIN_SHOT_POWER: f32 = 5.0;
    /// Velocity per unit of charge power
    pub const SHOT_POWER_SCALE: f32 = 0.007;

    /// Vertical velocity multiplier on a ground bounce
    pub const GROUND_BOUNCE: f32 = -0.3;
    /// Velocity multiplier after an obstacle hit
    pub const COLLISION_DAMPING: f32 = 0.7;
    /// Push-out factor applied to the radius after an obstacle hit
    pub const COLLISION_SKIN: f32 = 1.01;
    /// Faces whose normal.y exceeds this can be stood on
    pub const WALKABLE_NORMAL_Y: f32 = 0.7;
    /// Surfaces whose normal.y exceeds this count as flat
    pub const FLAT_NORMAL_Y: f32 = 0.99;

    /// Horizontal friction multipliers
    pub const GROUND_FRICTION: f32 = 0.98;
    pub const SAND_FRICTION: f32 = 0.8;
    /// Vertical tolerance for being "in" a sandpit
    pub const SAND_TOLERANCE: f32 = 0.2;
    /// Vertical speeds below this are zeroed while on a surface
    pub const VERTICAL_SETTLE: f32 = 0.01;

    /// Max squared speed for the ball to drop into the cup
    pub const HOLE_CAPTURE_SPEED_SQ: f32 = 0.05;
    /// Hole gravity reaches this many hole radii out
    pub const HOLE_GRAVITY_RANGE: f32 = 2.5;
    /// Max squared speed for hole gravity to act
    pub const HOLE_GRAVITY_SPEED_SQ: f32 = 0.5;
    pub const HOLE_GRAVITY_PULL: f32 = 0.0035;
    pub const HOLE_GRAVITY_DAMPING: f32 = 0.975;

    /// Below this height the ball is out of bounds
    pub const OUT_OF_BOUNDS_Y: f32 = -2.0;
    /// Squared speed under which a grounded ball comes to rest
    pub const REST_SPEED_SQ: f32 = 0.0001;
    /// Height slack above the ball radius that still counts as grounded
    pub const REST_HEIGHT_SLACK: f32 = 0.01;

    /// Tree trunk collision box
    pub const TRUNK_SIZE: Vec3 = Vec3::new(0.6, 1.5, 0.6);
}

/// Project a vector onto the horizontal (XZ) plane
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Distance between two points ignoring height
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    horizontal(a - b).length()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_distance_ignores_height() {
        let a = Vec3::new(3.0, 10.0, 0.0);
        let b = Vec3::new(0.0, -4.0, 4.0);
        assert!((horizontal_distance(a, b) - 5.0).abs() < 1e-6);
    }
}
