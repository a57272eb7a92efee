//! Drag-to-shoot gesture handling
//!
//! Pull back and release: the ball travels opposite the drag vector, with
//! power proportional to drag length.

use glam::{Vec2, Vec3};

use crate::settings::Tuning;

/// A shot produced by releasing a drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotRelease {
    /// Unit vector on the horizontal plane
    pub aim: Vec3,
    /// Charge power in [min_shot_power, 100]
    pub power: f32,
}

impl ShotRelease {
    /// Initial ball velocity for this shot
    pub fn impulse(&self, tuning: &Tuning) -> Vec3 {
        self.aim * self.power * tuning.shot_power_scale
    }
}

/// Outcome of lifting the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// No drag was in progress
    Ignored,
    /// Drag too short; treated as an accidental tap
    Cancelled,
    Shot(ShotRelease),
}

/// Gesture state: where the drag began and where it is now
#[derive(Debug, Clone)]
pub struct ShotController {
    dragging: bool,
    drag_start: Vec2,
    drag_current: Vec2,
    aim_direction: Vec3,
    charge_power: f32,
    max_drag_distance: f32,
    min_shot_power: f32,
}

impl ShotController {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            dragging: false,
            drag_start: Vec2::ZERO,
            drag_current: Vec2::ZERO,
            aim_direction: Vec3::NEG_Z,
            charge_power: 0.0,
            max_drag_distance: tuning.max_drag_distance,
            min_shot_power: tuning.min_shot_power,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn aim_direction(&self) -> Vec3 {
        self.aim_direction
    }

    /// Current charge power (0 when not dragging)
    pub fn charge_power(&self) -> f32 {
        self.charge_power
    }

    pub fn drag_vector(&self) -> Vec2 {
        self.drag_current - self.drag_start
    }

    /// Begin a drag. Gating on game phase is the caller's job.
    pub fn pointer_down(&mut self, pos: Vec2) {
        self.dragging = true;
        self.drag_start = pos;
        self.drag_current = pos;
        self.charge_power = 0.0;
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        if self.dragging {
            self.drag_current = pos;
        }
    }

    /// Recompute aim and power from the drag so far
    pub fn update_charge(&mut self) {
        if !self.dragging {
            self.charge_power = 0.0;
            return;
        }

        let drag = self.drag_vector();
        let distance = drag.length();
        if distance > 0.0 {
            self.aim_direction = Vec3::new(-drag.x, 0.0, -drag.y) / distance;
        }
        self.charge_power = (distance / self.max_drag_distance * 100.0).min(100.0);
    }

    pub fn pointer_up(&mut self) -> Release {
        if !self.dragging {
            return Release::Ignored;
        }

        self.update_charge();
        let power = self.charge_power;
        self.cancel();

        if power < self.min_shot_power {
            return Release::Cancelled;
        }
        Release::Shot(ShotRelease {
            aim: self.aim_direction,
            power,
        })
    }

    /// Drop any drag in progress and report zero power
    pub fn cancel(&mut self) {
        self.dragging = false;
        self.charge_power = 0.0;
    }
}
