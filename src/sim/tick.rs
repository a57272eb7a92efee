//! Per-frame simulation tick
//!
//! One call per rendered frame. Integration is frame-coupled: every constant
//! is "per frame" and there is no delta-time scaling or sub-stepping.

use glam::Vec3;

use super::collision::{apply_surface_effects, resolve_contacts};
use super::geometry::OrientedBox;
use super::state::{Ball, GameEvent, GamePhase, Session};
use crate::course::Level;
use crate::horizontal_distance;
use crate::settings::Tuning;

/// Indicator ring spin per frame (radians)
const INDICATOR_SPIN: f32 = 0.01;
/// Sinking animation per frame once holed
const SINK_DROP: f32 = 0.05;
const SINK_SHRINK: f32 = 0.95;
const SINK_HIDE_SCALE: f32 = 0.1;
const FLAG_FADE: f32 = 0.05;

/// How a physics step ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Still in motion
    Rolling,
    /// Dropped into the cup (ball snapped to the hole)
    Holed,
    /// Fell off the world (ball returned to the tee)
    OutOfBounds,
    /// Came to rest on the ground
    AtRest,
}

/// Advance the session by one frame
pub fn tick(session: &mut Session) {
    session.frame += 1;

    // The ring keeps spinning even while paused
    session.presentation.indicator_spin += INDICATOR_SPIN;

    if session.is_paused() {
        return;
    }

    if session.phase == GamePhase::Holed {
        animate_completion(session);
        return;
    }

    if session.shot.is_dragging() {
        session.shot.update_charge();
        session.report_power();
    }

    if session.phase != GamePhase::Moving {
        return;
    }

    let outcome = step_ball(&mut session.ball, &session.level, &session.boxes, &session.tuning);
    match outcome {
        StepOutcome::Rolling => {}
        StepOutcome::Holed => session.complete_hole(),
        StepOutcome::OutOfBounds => {
            log::debug!("Out of bounds, penalty stroke");
            session.phase = GamePhase::Idle;
            session.record_stroke();
            session.emit(GameEvent::OutOfBounds {
                strokes: session.strokes,
            });
        }
        StepOutcome::AtRest => {
            session.phase = GamePhase::Idle;
            session.emit(GameEvent::BallStopped);
        }
    }
}

/// Run one physics frame for the ball
///
/// Order: gravity, contacts (ground, obstacles, sand), surface effects,
/// integration, hole capture, hole gravity, out-of-bounds, rest.
pub fn step_ball(ball: &mut Ball, level: &Level, boxes: &[OrientedBox], tuning: &Tuning) -> StepOutcome {
    ball.velocity += tuning.gravity;

    let contact = resolve_contacts(ball, level, boxes, tuning);
    apply_surface_effects(ball, &contact, tuning);

    ball.position += ball.velocity;

    let hole = level.hole_position;
    let on_hole_plane = (ball.position.y - hole.y).abs() < ball.radius;
    let hole_distance = horizontal_distance(ball.position, hole);
    let speed_sq = ball.speed_sq();

    if on_hole_plane && hole_distance < level.hole_radius && speed_sq < tuning.hole_capture_speed_sq {
        ball.velocity = Vec3::ZERO;
        ball.position = Vec3::new(hole.x, hole.y + ball.radius, hole.z);
        return StepOutcome::Holed;
    }

    // Lip catch: nudge a slow ball toward the cup
    if on_hole_plane
        && hole_distance < level.hole_radius * tuning.hole_gravity_range
        && speed_sq < tuning.hole_gravity_speed_sq
    {
        let mut pull = (hole - ball.position).normalize_or_zero();
        pull.y = 0.0;
        ball.velocity += pull * tuning.hole_gravity_pull;
        ball.velocity *= tuning.hole_gravity_damping;
    }

    if ball.position.y < tuning.out_of_bounds_y {
        ball.reset_to(level.start_position);
        return StepOutcome::OutOfBounds;
    }

    let grounded = ball.position.y <= ball.radius + tuning.rest_height_slack;
    if grounded && ball.speed_sq() < tuning.rest_speed_sq {
        ball.velocity = Vec3::ZERO;
        return StepOutcome::AtRest;
    }

    StepOutcome::Rolling
}

/// Sink the ball and fade the flag after capture
fn animate_completion(session: &mut Session) {
    let ball = &mut session.ball;
    if ball.visible {
        ball.position.y -= SINK_DROP;
        ball.scale *= SINK_SHRINK;
        if ball.scale < SINK_HIDE_SCALE {
            ball.visible = false;
        }
    }

    let flag = &mut session.presentation;
    if flag.flag_visible {
        if flag.flag_opacity > 0.0 {
            flag.flag_opacity = (flag.flag_opacity - FLAG_FADE).max(0.0);
        } else {
            flag.flag_visible = false;
        }
    }
}
