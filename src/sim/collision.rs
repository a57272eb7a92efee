//! Contact resolution against the ground, obstacles and sand
//!
//! Ground first, then obstacles, then sand. At most one obstacle hit is
//! resolved per frame; leftover penetration is left to next frame's ray.

use glam::Vec3;

use super::geometry::{OrientedBox, RayHit, project_on_plane, ray_cast_nearest, reflect};
use super::state::Ball;
use crate::consts::GROUND_LEVEL;
use crate::course::{Level, Sandpit};
use crate::settings::Tuning;

/// What the ball is touching this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceContact {
    /// Resting on something that applies friction
    pub on_surface: bool,
    pub in_sand: bool,
    /// An obstacle face was hit (suppresses the sand check)
    pub obstacle_hit: bool,
    /// Normal of the surface being rolled on
    pub normal: Vec3,
}

impl Default for SurfaceContact {
    fn default() -> Self {
        Self {
            on_surface: false,
            in_sand: false,
            obstacle_hit: false,
            normal: Vec3::Y,
        }
    }
}

/// Resolve ground, obstacle and sand contacts, adjusting the ball in place
///
/// The ground plane is finite: it is the square `level.ground_half_extent`
/// either side of the origin. Past its edge there is no ground clamp and
/// the ball falls until the out-of-bounds check returns it to the tee.
pub fn resolve_contacts(
    ball: &mut Ball,
    level: &Level,
    boxes: &[OrientedBox],
    tuning: &Tuning,
) -> SurfaceContact {
    let mut contact = SurfaceContact::default();

    // Ground plane (finite: past its edge the ball falls)
    let rest_height = GROUND_LEVEL + ball.radius;
    if level.over_ground(ball.position) && ball.position.y < rest_height && ball.velocity.y < 0.0 {
        ball.position.y = rest_height;
        ball.velocity.y *= tuning.ground_bounce;
        contact.on_surface = true;
    }

    if let Some(hit) = sweep_obstacles(ball, boxes) {
        contact.obstacle_hit = true;
        ball.position = hit.point + hit.normal * (ball.radius * tuning.collision_skin);
        ball.velocity = reflect(ball.velocity, hit.normal) * tuning.collision_damping;

        if hit.normal.y > tuning.walkable_normal_y {
            contact.on_surface = true;
            contact.normal = hit.normal;
        }
    }

    if !contact.obstacle_hit && level.sandpits.iter().any(|pit| in_sandpit(ball, pit, tuning)) {
        contact.in_sand = true;
        contact.on_surface = true;
    }

    contact
}

/// Ray cast along this frame's movement, padded by the ball radius
fn sweep_obstacles(ball: &Ball, boxes: &[OrientedBox]) -> Option<RayHit> {
    let distance = ball.velocity.length();
    if distance <= 0.0 {
        return None;
    }
    let dir = ball.velocity / distance;
    ray_cast_nearest(boxes, ball.position, dir, distance + ball.radius)
}

fn in_sandpit(ball: &Ball, pit: &Sandpit, tuning: &Tuning) -> bool {
    let flattened = Vec3::new(ball.position.x, pit.position.y, ball.position.z);
    flattened.distance(pit.position) < pit.radius
        && (ball.position.y - (pit.position.y + ball.radius)).abs() < tuning.sand_tolerance
}

/// Friction, vertical settling and slope gravity for a supported ball
pub fn apply_surface_effects(ball: &mut Ball, contact: &SurfaceContact, tuning: &Tuning) {
    if !contact.on_surface {
        return;
    }

    let friction = if contact.in_sand {
        tuning.sand_friction
    } else {
        tuning.ground_friction
    };
    ball.velocity.x *= friction;
    ball.velocity.z *= friction;

    if ball.velocity.y.abs() < tuning.vertical_settle {
        ball.velocity.y = 0.0;
    }

    if contact.normal.y <= tuning.flat_normal_y {
        ball.velocity += project_on_plane(tuning.gravity, contact.normal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::BALL_RADIUS;

    fn open_level() -> Level {
        Level::new(1, "Open", Vec3::new(0.0, 0.2, 8.0), Vec3::new(0.0, 0.01, -8.0), 0.25)
    }

    fn ball_at(position: Vec3, velocity: Vec3) -> Ball {
        let mut ball = Ball::new(position, BALL_RADIUS);
        ball.velocity = velocity;
        ball
    }

    #[test]
    fn test_ground_bounce_clamps_and_dampens() {
        let tuning = Tuning::default();
        let mut ball = ball_at(Vec3::new(0.0, 0.1, 0.0), Vec3::new(0.0, -0.1, 0.0));
        let contact = resolve_contacts(&mut ball, &open_level(), &[], &tuning);
        assert!(contact.on_surface);
        assert_eq!(ball.position.y, BALL_RADIUS);
        assert!((ball.velocity.y - 0.03).abs() < 1e-6);
    }

    #[test]
    fn test_no_ground_past_edge() {
        let tuning = Tuning::default();
        let mut ball = ball_at(Vec3::new(30.0, 0.1, 0.0), Vec3::new(0.0, -0.1, 0.0));
        let contact = resolve_contacts(&mut ball, &open_level(), &[], &tuning);
        assert!(!contact.on_surface);
        assert_eq!(ball.position.y, 0.1);
    }

    #[test]
    fn test_wall_reflects_and_dampens() {
        let tuning = Tuning::default();
        let wall = OrientedBox::axis_aligned(Vec3::new(1.0, 0.5, 0.0), Vec3::new(1.0, 1.0, 4.0));
        let mut ball = ball_at(Vec3::new(0.2, BALL_RADIUS, 0.0), Vec3::new(0.3, 0.0, 0.0));
        let contact = resolve_contacts(&mut ball, &open_level(), &[wall], &tuning);

        assert!(contact.obstacle_hit);
        assert!(!contact.on_surface);
        assert!((ball.velocity.x + 0.21).abs() < 1e-6);
        // Pushed back out of the face at x = 0.5
        assert!((ball.position.x - (0.5 - BALL_RADIUS * 1.01)).abs() < 1e-5);
    }

    #[test]
    fn test_walkable_top_face_counts_as_surface() {
        let tuning = Tuning::default();
        let block = OrientedBox::axis_aligned(Vec3::new(0.0, 0.25, 0.0), Vec3::new(2.0, 0.5, 2.0));
        let mut ball = ball_at(Vec3::new(0.0, 0.7, 0.0), Vec3::new(0.0, -0.1, 0.0));
        let contact = resolve_contacts(&mut ball, &open_level(), &[block], &tuning);
        assert!(contact.on_surface);
        assert!((contact.normal - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn test_sand_skipped_after_obstacle_hit() {
        let tuning = Tuning::default();
        let mut level = open_level();
        level.sandpits.push(Sandpit {
            position: Vec3::new(0.0, 0.02, 0.0),
            radius: 3.0,
        });
        let wall = OrientedBox::axis_aligned(Vec3::new(1.0, 0.5, 0.0), Vec3::new(1.0, 1.0, 4.0));
        let mut ball = ball_at(Vec3::new(0.2, BALL_RADIUS, 0.0), Vec3::new(0.3, 0.0, 0.0));
        let contact = resolve_contacts(&mut ball, &level, &[wall], &tuning);
        assert!(contact.obstacle_hit);
        assert!(!contact.in_sand);
    }

    #[test]
    fn test_sand_detected_near_pit_surface() {
        let tuning = Tuning::default();
        let mut level = open_level();
        level.sandpits.push(Sandpit {
            position: Vec3::new(3.0, 0.02, 0.0),
            radius: 1.5,
        });
        let mut ball = ball_at(Vec3::new(3.5, BALL_RADIUS, 0.5), Vec3::new(0.05, -0.01, 0.0));
        let contact = resolve_contacts(&mut ball, &level, &[], &tuning);
        assert!(contact.in_sand && contact.on_surface);

        let mut airborne = ball_at(Vec3::new(3.5, 1.0, 0.5), Vec3::new(0.05, -0.01, 0.0));
        assert!(!resolve_contacts(&mut airborne, &level, &[], &tuning).in_sand);
    }

    #[test]
    fn test_sand_friction_stronger_than_grass() {
        let tuning = Tuning::default();
        let velocity = Vec3::new(0.2, 0.0, 0.1);

        let mut grass = ball_at(Vec3::ZERO, velocity);
        let on_grass = SurfaceContact {
            on_surface: true,
            ..Default::default()
        };
        apply_surface_effects(&mut grass, &on_grass, &tuning);

        let mut sand = ball_at(Vec3::ZERO, velocity);
        let in_sand = SurfaceContact {
            on_surface: true,
            in_sand: true,
            ..Default::default()
        };
        apply_surface_effects(&mut sand, &in_sand, &tuning);

        assert!(sand.velocity.length() < grass.velocity.length());
        assert!((grass.velocity.x - 0.196).abs() < 1e-6);
        assert!((sand.velocity.x - 0.16).abs() < 1e-6);
    }

    #[test]
    fn test_slope_gravity_pulls_downhill() {
        let tuning = Tuning::default();
        // Surface descending toward +Z
        let angle: f32 = 0.25;
        let normal = Vec3::new(0.0, angle.cos(), angle.sin());
        let contact = SurfaceContact {
            on_surface: true,
            normal,
            ..Default::default()
        };

        let mut ball = ball_at(Vec3::ZERO, Vec3::ZERO);
        apply_surface_effects(&mut ball, &contact, &tuning);
        let first = ball.velocity.z;
        assert!(first > 0.0);

        for _ in 0..10 {
            apply_surface_effects(&mut ball, &contact, &tuning);
        }
        assert!(ball.velocity.z > first);
    }

    #[test]
    fn test_flat_surface_adds_no_slide() {
        let tuning = Tuning::default();
        let contact = SurfaceContact {
            on_surface: true,
            ..Default::default()
        };
        let mut ball = ball_at(Vec3::ZERO, Vec3::ZERO);
        apply_surface_effects(&mut ball, &contact, &tuning);
        assert_eq!(ball.velocity, Vec3::ZERO);
    }
}
