//! Render adapter
//!
//! The simulation knows nothing about drawing. Each frame the host captures a
//! `FrameSnapshot` (plain transforms for every mesh in the scene) and hands it
//! to whatever `RenderSurface` it owns.

pub mod camera;
pub mod instance;

pub use camera::CameraRig;
pub use instance::{InstanceBuffer, RenderInstance};

use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::{EulerRot, Quat, Vec3};

use crate::settings::Settings;
use crate::sim::{GamePhase, Session};

/// Number of dots in the aim line
pub const AIM_DOTS: usize = 10;
/// Aim line length at full power (world units)
const AIM_LINE_MAX: f32 = 4.0;
/// Aim dots hover just above the grass
const AIM_LINE_HEIGHT: f32 = 0.1;
/// Ring sits just under the ball centre
const RING_DROP: f32 = 0.14;
const RING_OPACITY: f32 = 0.7;
const AIM_DOT_OPACITY: f32 = 0.8;

const FLAG_POLE_HEIGHT: f32 = 1.5;
const FLAG_CLOTH_OFFSET: Vec3 = Vec3::new(0.3, 1.2, 0.0);
const FOLIAGE_HEIGHT: f32 = 2.5;

// Linear RGBA colours
const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const GRASS: [f32; 4] = [0.133, 0.545, 0.133, 1.0];
const WOOD: [f32; 4] = [0.545, 0.271, 0.075, 1.0];
const LEAVES: [f32; 4] = [0.0, 0.392, 0.0, 1.0];
const SAND: [f32; 4] = [0.957, 0.643, 0.376, 1.0];
const POLE: [f32; 4] = [0.867, 0.867, 0.867, 1.0];
const FLAG_RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Mesh the host should draw for an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MeshKind {
    Ground = 0,
    Ball = 1,
    /// Flat disc at the cup
    Hole = 2,
    FlagPole = 3,
    FlagCloth = 4,
    /// Unit box scaled to the obstacle size
    Obstacle = 5,
    Trunk = 6,
    Foliage = 7,
    /// Flat disc scaled to the pit radius
    Sandpit = 8,
    AimDot = 9,
    Ring = 10,
}

impl MeshKind {
    const ALL: [MeshKind; 11] = [
        MeshKind::Ground,
        MeshKind::Ball,
        MeshKind::Hole,
        MeshKind::FlagPole,
        MeshKind::FlagCloth,
        MeshKind::Obstacle,
        MeshKind::Trunk,
        MeshKind::Foliage,
        MeshKind::Sandpit,
        MeshKind::AimDot,
        MeshKind::Ring,
    ];

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// Placement of one mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub visible: bool,
    pub opacity: f32,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            visible: true,
            opacity: 1.0,
        }
    }

    fn rotated(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    fn scaled(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    fn shown(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    fn faded(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// A mesh, where it goes and its tint
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub mesh: MeshKind,
    pub transform: Transform,
    pub color: [f32; 4],
}

/// Power bar colour band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerBand {
    Low,
    Medium,
    High,
}

impl PowerBand {
    pub fn from_power(power: f32) -> Self {
        if power < 50.0 {
            PowerBand::Low
        } else if power < 85.0 {
            PowerBand::Medium
        } else {
            PowerBand::High
        }
    }

    pub fn color(self) -> [f32; 4] {
        match self {
            PowerBand::Low => [0.0, 1.0, 0.0, 1.0],
            PowerBand::Medium => [1.0, 1.0, 0.0, 1.0],
            PowerBand::High => [1.0, 0.0, 0.0, 1.0],
        }
    }
}

/// Everything needed to draw one frame
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub phase: GamePhase,
    pub strokes: u32,
    pub power: f32,
    pub power_band: PowerBand,
    pub drawables: Vec<Drawable>,
}

impl FrameSnapshot {
    /// Capture the scene for the session's current frame
    pub fn capture(session: &Session, settings: &Settings) -> Self {
        let level = session.level();
        let ball = session.ball();
        let presentation = session.presentation();
        let power = session.power();
        let power_band = PowerBand::from_power(power);
        let flat = Quat::from_rotation_x(-FRAC_PI_2);

        let mut drawables = Vec::with_capacity(
            8 + AIM_DOTS + level.obstacles.len() + level.sandpits.len() + level.trees.len() * 2,
        );
        let mut push = |mesh, transform, color| {
            drawables.push(Drawable {
                mesh,
                transform,
                color,
            })
        };

        let extent = level.ground_half_extent * 2.0;
        push(
            MeshKind::Ground,
            Transform::at(Vec3::ZERO).scaled(Vec3::new(extent, 1.0, extent)),
            GRASS,
        );

        let cup = level.hole_position;
        push(
            MeshKind::Hole,
            Transform::at(cup)
                .rotated(flat)
                .scaled(Vec3::new(level.hole_radius, level.hole_radius, 1.0)),
            BLACK,
        );
        push(
            MeshKind::FlagPole,
            Transform::at(cup + Vec3::Y * (FLAG_POLE_HEIGHT / 2.0))
                .shown(presentation.flag_visible)
                .faded(presentation.flag_opacity),
            POLE,
        );
        push(
            MeshKind::FlagCloth,
            Transform::at(cup + FLAG_CLOTH_OFFSET)
                .shown(presentation.flag_visible)
                .faded(presentation.flag_opacity),
            FLAG_RED,
        );

        for obstacle in &level.obstacles {
            let rotation = obstacle
                .rotation
                .map(|r| Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z))
                .unwrap_or(Quat::IDENTITY);
            push(
                MeshKind::Obstacle,
                Transform::at(obstacle.position)
                    .rotated(rotation)
                    .scaled(obstacle.size),
                WOOD,
            );
        }

        for pit in &level.sandpits {
            push(
                MeshKind::Sandpit,
                Transform::at(pit.position)
                    .rotated(flat)
                    .scaled(Vec3::new(pit.radius, pit.radius, 1.0)),
                SAND,
            );
        }

        for tree in &level.trees {
            let trunk = tree.trunk();
            push(MeshKind::Trunk, Transform::at(trunk.center), WOOD);
            push(
                MeshKind::Foliage,
                Transform::at(tree.position + Vec3::Y * FOLIAGE_HEIGHT),
                LEAVES,
            );
        }

        push(
            MeshKind::Ball,
            Transform::at(ball.position)
                .scaled(Vec3::splat(ball.scale))
                .shown(ball.visible),
            WHITE,
        );

        let ring_visible = settings.show_indicator
            && session.phase() == GamePhase::Idle
            && !session.shot().is_dragging();
        push(
            MeshKind::Ring,
            Transform::at(ball.position - Vec3::Y * RING_DROP)
                .rotated(Quat::from_euler(
                    EulerRot::XYZ,
                    -FRAC_PI_2,
                    0.0,
                    presentation.indicator_spin,
                ))
                .shown(ring_visible)
                .faded(RING_OPACITY),
            WHITE,
        );

        // Aim line: dots along the aim from the ball, shrinking with distance
        let aim = session.shot().aim_direction();
        let length = power / 100.0 * AIM_LINE_MAX;
        let dots_visible = settings.show_aim_line && session.shot().is_dragging() && length > 0.0;
        let origin = Vec3::new(ball.position.x, AIM_LINE_HEIGHT, ball.position.z);
        let segment = length / AIM_DOTS as f32;
        for i in 0..AIM_DOTS {
            let scale = 1.0 - (i as f32 / AIM_DOTS as f32) * 0.5;
            push(
                MeshKind::AimDot,
                Transform::at(origin + aim * ((i + 1) as f32 * segment))
                    .rotated(flat)
                    .scaled(Vec3::splat(scale))
                    .shown(dots_visible)
                    .faded(AIM_DOT_OPACITY),
                power_band.color(),
            );
        }

        Self {
            frame: session.frame(),
            phase: session.phase(),
            strokes: session.strokes(),
            power,
            power_band,
            drawables,
        }
    }

    pub fn of_kind(&self, mesh: MeshKind) -> impl Iterator<Item = &Drawable> {
        self.drawables.iter().filter(move |d| d.mesh == mesh)
    }

    pub fn first(&self, mesh: MeshKind) -> Option<&Drawable> {
        self.of_kind(mesh).next()
    }

    /// Pack the visible entries for upload
    pub fn write_instances(&self, buffer: &mut InstanceBuffer) {
        buffer.fill(&self.drawables);
    }
}

/// Errors from a render surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// Surface was already torn down
    AlreadyDetached,
    /// Backend lost the surface (context loss, closed window)
    Lost(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::AlreadyDetached => write!(f, "render surface already detached"),
            SurfaceError::Lost(reason) => write!(f, "render surface lost: {reason}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// Something that can draw snapshots
pub trait RenderSurface {
    fn present(&mut self, frame: &FrameSnapshot) -> Result<(), SurfaceError>;
    fn resize(&mut self, width: u32, height: u32);
    fn detach(&mut self) -> Result<(), SurfaceError>;
}

/// Tear down a surface; failures are logged and otherwise ignored
pub fn detach_surface(surface: &mut dyn RenderSurface) {
    match surface.detach() {
        Ok(()) => log::info!("Render surface detached"),
        Err(e) => log::warn!("Detach failed: {}", e),
    }
}

/// Surface that only packs instances; used headlessly and in tests
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    buffer: InstanceBuffer,
    size: (u32, u32),
    frames_presented: u64,
    detached: bool,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ..Default::default()
        }
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Instances packed by the last `present`
    pub fn last_instances(&self) -> &[RenderInstance] {
        &self.buffer.instances
    }
}

impl RenderSurface for HeadlessSurface {
    fn present(&mut self, frame: &FrameSnapshot) -> Result<(), SurfaceError> {
        if self.detached {
            return Err(SurfaceError::AlreadyDetached);
        }
        frame.write_instances(&mut self.buffer);
        self.frames_presented += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn detach(&mut self) -> Result<(), SurfaceError> {
        if self.detached {
            return Err(SurfaceError::AlreadyDetached);
        }
        self.detached = true;
        self.buffer.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::course::{Level, Tree};
    use crate::settings::Tuning;

    fn session() -> Session {
        let mut level = Level::new(1, "Test", Vec3::new(0.0, 0.2, 8.0), Vec3::new(0.0, 0.01, -8.0), 0.25);
        level.trees.push(Tree {
            position: Vec3::new(4.0, 0.0, 0.0),
        });
        Session::new(level, Tuning::default()).unwrap()
    }

    #[test]
    fn test_idle_shows_ring_hides_dots() {
        let s = session();
        let frame = FrameSnapshot::capture(&s, &Settings::default());
        let ring = frame.first(MeshKind::Ring).unwrap();
        assert!(ring.transform.visible);
        assert!((ring.transform.position.y - (0.2 - RING_DROP)).abs() < 1e-6);
        assert_eq!(frame.of_kind(MeshKind::AimDot).count(), AIM_DOTS);
        assert!(frame.of_kind(MeshKind::AimDot).all(|d| !d.transform.visible));
        assert_eq!(frame.of_kind(MeshKind::Trunk).count(), 1);
    }

    #[test]
    fn test_aim_line_follows_drag() {
        let mut s = session();
        s.pointer_down(Vec2::ZERO);
        s.pointer_move(Vec2::new(0.0, 40.0));
        s.tick();
        let frame = FrameSnapshot::capture(&s, &Settings::default());

        assert!((frame.power - 50.0).abs() < 1e-4);
        assert_eq!(frame.power_band, PowerBand::Medium);
        assert!(!frame.first(MeshKind::Ring).unwrap().transform.visible);

        let dots: Vec<_> = frame.of_kind(MeshKind::AimDot).collect();
        assert!(dots.iter().all(|d| d.transform.visible));
        // Line is 2 units long toward -Z, ten segments of 0.2
        let first = &dots[0].transform;
        assert!((first.position - Vec3::new(0.0, AIM_LINE_HEIGHT, s.ball().position.z - 0.2)).length() < 1e-4);
        let last = &dots[AIM_DOTS - 1].transform;
        assert!((last.position.z - (s.ball().position.z - 2.0)).abs() < 1e-4);
        assert!((last.scale.x - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_aim_line_respects_setting() {
        let mut s = session();
        s.pointer_down(Vec2::ZERO);
        s.pointer_move(Vec2::new(0.0, 40.0));
        s.tick();
        let settings = Settings {
            show_aim_line: false,
            ..Default::default()
        };
        let frame = FrameSnapshot::capture(&s, &settings);
        assert!(frame.of_kind(MeshKind::AimDot).all(|d| !d.transform.visible));
    }

    #[test]
    fn test_power_bands() {
        assert_eq!(PowerBand::from_power(0.0), PowerBand::Low);
        assert_eq!(PowerBand::from_power(49.9), PowerBand::Low);
        assert_eq!(PowerBand::from_power(50.0), PowerBand::Medium);
        assert_eq!(PowerBand::from_power(85.0), PowerBand::High);
    }

    #[test]
    fn test_headless_surface_lifecycle() {
        let s = session();
        let frame = FrameSnapshot::capture(&s, &Settings::default());
        let mut surface = HeadlessSurface::new(800, 600);
        surface.present(&frame).unwrap();
        assert_eq!(surface.frames_presented(), 1);
        // Dots are hidden while idle
        assert!(surface.last_instances().iter().all(|i| i.mesh_kind() != Some(MeshKind::AimDot)));

        surface.resize(1024, 768);
        assert_eq!(surface.size(), (1024, 768));

        assert!(surface.detach().is_ok());
        assert_eq!(surface.detach(), Err(SurfaceError::AlreadyDetached));
        assert_eq!(surface.present(&frame), Err(SurfaceError::AlreadyDetached));
        // Second detach only logs
        detach_surface(&mut surface);
    }

    #[test]
    fn test_mesh_index_round_trip() {
        assert_eq!(MeshKind::from_index(MeshKind::Ring as u32), Some(MeshKind::Ring));
        assert_eq!(MeshKind::from_index(99), None);
    }
}
