//! Session state and the game state machine
//!
//! A `Session` owns everything about one hole in play: the ball, the drag
//! gesture, stroke count and phase. Hosts drive it through pointer methods
//! and one `tick()` per rendered frame, then drain the emitted events.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::geometry::OrientedBox;
use super::input::{Release, ShotController, ShotRelease};
use crate::course::{Course, Level, LevelError};
use crate::persistence::ScoreSink;
use crate::settings::{Tuning, TuningError};

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Ball at rest, waiting for a drag
    #[default]
    Idle,
    /// Drag in progress
    Charging,
    /// Physics running
    Moving,
    /// Ball sunk; terminal for this level
    Holed,
}

/// Notifications for the UI layer, drained once per frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A stroke was counted (shot or penalty)
    Stroke { strokes: u32 },
    /// Charge power for the power bar (0-100)
    PowerChanged(f32),
    /// Drag released below minimum power
    ShotCancelled,
    /// Ball fell off the world and was returned to the tee
    OutOfBounds { strokes: u32 },
    /// Ball came to rest; input is accepted again
    BallStopped,
    HoleComplete { level_id: u32, strokes: u32 },
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
    /// Render scale (shrinks while sinking into the cup)
    #[serde(skip, default = "default_scale")]
    pub scale: f32,
    #[serde(skip, default = "default_visible")]
    pub visible: bool,
}

fn default_scale() -> f32 {
    1.0
}

fn default_visible() -> bool {
    true
}

impl Ball {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            radius,
            scale: 1.0,
            visible: true,
        }
    }

    /// Put the ball back at a position, stopped and fully visible
    pub fn reset_to(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
        self.scale = 1.0;
        self.visible = true;
    }

    #[inline]
    pub fn speed_sq(&self) -> f32 {
        self.velocity.length_squared()
    }
}

/// Cosmetic state animated by the frame tick
#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    /// Interaction ring rotation (radians)
    pub indicator_spin: f32,
    pub flag_opacity: f32,
    pub flag_visible: bool,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            indicator_spin: 0.0,
            flag_opacity: 1.0,
            flag_visible: true,
        }
    }
}

/// Why a session could not be started or switched
#[derive(Debug)]
pub enum SessionError {
    Level(LevelError),
    Tuning(TuningError),
    /// No level with this id in the course
    UnknownLevel(u32),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Level(e) => write!(f, "{e}"),
            SessionError::Tuning(e) => write!(f, "bad tuning: {e}"),
            SessionError::UnknownLevel(id) => write!(f, "no level with id {id}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Level(e) => Some(e),
            SessionError::Tuning(e) => Some(e),
            SessionError::UnknownLevel(_) => None,
        }
    }
}

impl From<LevelError> for SessionError {
    fn from(e: LevelError) -> Self {
        SessionError::Level(e)
    }
}

impl From<TuningError> for SessionError {
    fn from(e: TuningError) -> Self {
        SessionError::Tuning(e)
    }
}

/// One hole in play
pub struct Session {
    pub(super) level: Level,
    pub(super) boxes: Vec<OrientedBox>,
    pub(super) tuning: Tuning,
    pub(super) ball: Ball,
    pub(super) shot: ShotController,
    pub(super) phase: GamePhase,
    pub(super) strokes: u32,
    /// Frames ticked since the session was built
    pub(super) frame: u64,
    pub(super) paused_at_frame: Option<u64>,
    pub(super) reported_power: f32,
    pub(super) presentation: Presentation,
    events: Vec<GameEvent>,
    score_sink: Option<Box<dyn ScoreSink>>,
}

impl Session {
    /// Start a session on a validated level with validated tuning
    pub fn new(level: Level, tuning: Tuning) -> Result<Self, SessionError> {
        tuning.validate()?;
        level.validate()?;
        let boxes = level.collision_boxes();
        let ball = Ball::new(level.start_position, tuning.ball_radius);
        let shot = ShotController::new(&tuning);
        log::info!(
            "Level {} '{}' loaded ({} colliders, {} sandpits)",
            level.id,
            level.name,
            boxes.len(),
            level.sandpits.len()
        );
        Ok(Self {
            level,
            boxes,
            tuning,
            ball,
            shot,
            phase: GamePhase::Idle,
            strokes: 0,
            frame: 0,
            paused_at_frame: None,
            reported_power: 0.0,
            presentation: Presentation::default(),
            events: Vec::with_capacity(8),
            score_sink: None,
        })
    }

    /// Attach the collaborator that stores best scores
    pub fn with_score_sink(mut self, sink: Box<dyn ScoreSink>) -> Self {
        self.score_sink = Some(sink);
        self
    }

    pub fn set_score_sink(&mut self, sink: Box<dyn ScoreSink>) {
        self.score_sink = Some(sink);
    }

    // === Accessors ===

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn shot(&self) -> &ShotController {
        &self.shot
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn strokes(&self) -> u32 {
        self.strokes
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// Charge power for the power bar
    pub fn power(&self) -> f32 {
        self.shot.charge_power()
    }

    pub fn is_ball_moving(&self) -> bool {
        self.phase == GamePhase::Moving
    }

    pub fn is_hole_completed(&self) -> bool {
        self.phase == GamePhase::Holed
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at_frame.is_some()
    }

    /// Frame at which the session was paused, if it is
    pub fn paused_at_frame(&self) -> Option<u64> {
        self.paused_at_frame
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(super) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    // === Input ===

    /// Whether a new drag may start
    pub fn accepts_input(&self) -> bool {
        !self.is_paused() && self.phase == GamePhase::Idle
    }

    pub fn pointer_down(&mut self, pos: Vec2) {
        if !self.accepts_input() {
            log::trace!("pointer down ignored in {:?}", self.phase);
            return;
        }
        self.shot.pointer_down(pos);
        self.phase = GamePhase::Charging;
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        if self.is_paused() {
            return;
        }
        self.shot.pointer_move(pos);
    }

    pub fn pointer_up(&mut self) {
        if self.is_paused() {
            return;
        }
        match self.shot.pointer_up() {
            Release::Ignored => {}
            Release::Cancelled => {
                log::debug!("Shot cancelled (drag too short)");
                self.phase = GamePhase::Idle;
                self.emit(GameEvent::ShotCancelled);
            }
            Release::Shot(shot) => self.strike(shot),
        }
        self.report_power();
    }

    /// Abandon a drag without shooting (e.g. the pointer left the window)
    pub fn cancel_drag(&mut self) {
        if self.shot.is_dragging() {
            self.shot.cancel();
            self.phase = GamePhase::Idle;
            self.report_power();
        }
    }

    fn strike(&mut self, shot: ShotRelease) {
        self.ball.velocity = shot.impulse(&self.tuning);
        self.phase = GamePhase::Moving;
        log::debug!(
            "Shot: aim=({:.2}, {:.2}) power={:.1}",
            shot.aim.x,
            shot.aim.z,
            shot.power
        );
        self.record_stroke();
    }

    /// Emit a power update if the displayed value changed
    pub(super) fn report_power(&mut self) {
        let power = self.shot.charge_power();
        if power != self.reported_power {
            self.reported_power = power;
            self.emit(GameEvent::PowerChanged(power));
        }
    }

    // === State machine ===

    /// Count a stroke (shot or penalty). Ignored once the hole is complete.
    pub fn record_stroke(&mut self) {
        if self.phase == GamePhase::Holed {
            log::trace!("stroke ignored after completion");
            return;
        }
        self.strokes += 1;
        self.emit(GameEvent::Stroke {
            strokes: self.strokes,
        });
    }

    /// Sink the ball. Only the first call per level has any effect.
    pub fn complete_hole(&mut self) {
        if self.phase == GamePhase::Holed {
            log::trace!("complete_hole ignored, already holed");
            return;
        }
        self.phase = GamePhase::Holed;
        self.ball.velocity = Vec3::ZERO;
        self.shot.cancel();

        let (level_id, strokes) = (self.level.id, self.strokes);
        log::info!("Hole {} complete in {} strokes (par {})", level_id, strokes, self.level.par);
        self.emit(GameEvent::HoleComplete { level_id, strokes });

        if let Some(sink) = self.score_sink.as_mut() {
            // Best effort: a failed save never affects play
            if let Err(e) = sink.submit_score(level_id, strokes) {
                log::warn!("Score for level {} not saved: {}", level_id, e);
            }
        }
    }

    /// Restart the current level: strokes zeroed, ball back on the tee
    pub fn reset(&mut self) {
        self.strokes = 0;
        self.ball = Ball::new(self.level.start_position, self.tuning.ball_radius);
        self.shot.cancel();
        self.phase = GamePhase::Idle;
        self.paused_at_frame = None;
        self.presentation = Presentation::default();
        self.report_power();
        log::info!("Level {} reset", self.level.id);
    }

    /// Switch to another level and start it fresh
    ///
    /// Takes the level itself; `reset_to_id` looks one up in a course.
    pub fn reset_to(&mut self, level: Level) -> Result<(), LevelError> {
        level.validate()?;
        self.boxes = level.collision_boxes();
        self.level = level;
        self.reset();
        Ok(())
    }

    /// Switch to the course level with this id. The session is untouched
    /// if the id is unknown.
    pub fn reset_to_id(&mut self, course: &Course, level_id: u32) -> Result<(), SessionError> {
        let level = course.find(level_id).ok_or(SessionError::UnknownLevel(level_id))?;
        self.reset_to(level.clone())?;
        Ok(())
    }

    /// Suspend physics and input without touching game state
    pub fn pause(&mut self) {
        if self.paused_at_frame.is_some() {
            return;
        }
        self.paused_at_frame = Some(self.frame);
        self.cancel_drag();
        log::debug!("Paused at frame {}", self.frame);
    }

    pub fn resume(&mut self) {
        if let Some(frame) = self.paused_at_frame.take() {
            log::debug!("Resumed after {} frames", self.frame - frame);
        }
    }

    /// Advance one rendered frame
    pub fn tick(&mut self) {
        super::tick::tick(self);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("level", &self.level.id)
            .field("phase", &self.phase)
            .field("strokes", &self.strokes)
            .field("ball", &self.ball)
            .field("frame", &self.frame)
            .field("paused_at_frame", &self.paused_at_frame)
            .finish_non_exhaustive()
    }
}
