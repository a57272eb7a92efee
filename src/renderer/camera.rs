//! Perspective camera that chases the ball while it rolls

use glam::{Mat4, Vec3};

/// Camera offset from the ball when following
pub const FOLLOW_OFFSET: Vec3 = Vec3::new(0.0, 5.0, 8.0);
const POSITION_LERP: f32 = 0.05;
const TARGET_LERP: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    /// Look-at point
    pub target: Vec3,
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraRig {
    /// Camera behind and above the tee
    pub fn new(tee: Vec3, width: u32, height: u32) -> Self {
        let mut rig = Self {
            position: Vec3::new(tee.x, FOLLOW_OFFSET.y, tee.z + FOLLOW_OFFSET.z),
            target: tee,
            fov_y_degrees: 60.0,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
        };
        rig.resize(width, height);
        rig
    }

    /// Keep the aspect ratio in sync with the canvas; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            log::trace!("ignoring degenerate resize {width}x{height}");
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    /// Ease toward the follow position for a moving ball
    pub fn follow(&mut self, ball: Vec3) {
        self.position = self.position.lerp(ball + FOLLOW_OFFSET, POSITION_LERP);
        self.target = self.target.lerp(ball, TARGET_LERP);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }
}
