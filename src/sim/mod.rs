//! Ball simulation module
//!
//! All gameplay logic lives here. It has no rendering or platform
//! dependencies:
//! - One physics step per rendered frame (no elapsed-time scaling)
//! - Seeded RNG only (autoplay)
//! - Colliders resolved in level order

pub mod autoplay;
pub mod collision;
pub mod geometry;
pub mod input;
pub mod state;
pub mod tick;

pub use autoplay::{Autoplayer, Gesture};
pub use collision::{SurfaceContact, apply_surface_effects, resolve_contacts};
pub use geometry::{OrientedBox, RayHit, project_on_plane, ray_cast_nearest, reflect};
pub use input::{Release, ShotController, ShotRelease};
pub use state::{Ball, GameEvent, GamePhase, Presentation, Session, SessionError};
pub use tick::{StepOutcome, step_ball, tick};
