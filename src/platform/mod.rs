//! Platform abstraction layer
//!
//! Host events (browser pointer/touch/focus) are normalised into `HostInput`
//! and routed to the session by `InputRouter`. The browser bindings live in
//! `web` and only build for wasm32.

#[cfg(target_arch = "wasm32")]
pub mod web;

use glam::Vec2;

use crate::sim::Session;

/// Primary mouse button as reported by DOM `button`
pub const PRIMARY_BUTTON: i16 = 0;

/// Device behind a pointer event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    /// Map a DOM `pointerType` string
    pub fn from_dom(pointer_type: &str) -> Self {
        match pointer_type {
            "touch" => PointerKind::Touch,
            "pen" => PointerKind::Pen,
            _ => PointerKind::Mouse,
        }
    }
}

/// A host event in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostInput {
    PointerDown {
        kind: PointerKind,
        button: i16,
        position: Vec2,
    },
    PointerMove {
        kind: PointerKind,
        position: Vec2,
    },
    PointerUp {
        kind: PointerKind,
    },
    /// `touches` is the number of active touches, `first` the first one
    TouchStart {
        touches: u32,
        first: Vec2,
    },
    TouchMove {
        touches: u32,
        first: Vec2,
    },
    TouchEnd,
    /// Window lost focus or the tab was hidden
    Blur,
    /// Explicit resume from the pause menu
    Resume,
    /// Restart button
    Reset,
}

/// Routes host input to a session
///
/// Touch screens deliver both pointer and touch events for the same finger;
/// touch-typed pointer events are dropped so each gesture is seen once.
#[derive(Debug, Clone, Default)]
pub struct InputRouter {
    /// Pause automatically when the window loses focus
    pub pause_on_blur: bool,
}

impl InputRouter {
    pub fn new() -> Self {
        Self {
            pause_on_blur: true,
        }
    }

    /// Apply one host event. Returns false if it was ignored.
    pub fn route(&mut self, session: &mut Session, input: HostInput) -> bool {
        match input {
            HostInput::PointerDown {
                kind,
                button,
                position,
            } => {
                if kind == PointerKind::Touch || button != PRIMARY_BUTTON {
                    return false;
                }
                session.pointer_down(position);
            }
            HostInput::PointerMove { kind, position } => {
                if kind == PointerKind::Touch {
                    return false;
                }
                session.pointer_move(position);
            }
            HostInput::PointerUp { kind } => {
                if kind == PointerKind::Touch {
                    return false;
                }
                session.pointer_up();
            }
            HostInput::TouchStart { touches, first } => {
                // Two or more fingers belong to the camera
                if touches != 1 {
                    return false;
                }
                session.pointer_down(first);
            }
            HostInput::TouchMove { touches, first } => {
                if touches != 1 {
                    return false;
                }
                session.pointer_move(first);
            }
            HostInput::TouchEnd => session.pointer_up(),
            HostInput::Blur => {
                if !self.pause_on_blur {
                    return false;
                }
                session.pause();
            }
            HostInput::Resume => session.resume(),
            HostInput::Reset => session.reset(),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::course::Level;
    use crate::settings::Tuning;
    use crate::sim::GamePhase;

    fn session() -> Session {
        let level = Level::new(1, "Test", Vec3::new(0.0, 0.2, 8.0), Vec3::new(0.0, 0.01, -8.0), 0.25);
        Session::new(level, Tuning::default()).unwrap()
    }

    fn mouse_down(button: i16, position: Vec2) -> HostInput {
        HostInput::PointerDown {
            kind: PointerKind::Mouse,
            button,
            position,
        }
    }

    #[test]
    fn test_secondary_button_ignored() {
        let mut s = session();
        let mut router = InputRouter::new();
        assert!(!router.route(&mut s, mouse_down(2, Vec2::ZERO)));
        assert_eq!(s.phase(), GamePhase::Idle);
    }

    #[test]
    fn test_mouse_drag_shoots() {
        let mut s = session();
        let mut router = InputRouter::new();
        router.route(&mut s, mouse_down(PRIMARY_BUTTON, Vec2::new(100.0, 100.0)));
        router.route(
            &mut s,
            HostInput::PointerMove {
                kind: PointerKind::Mouse,
                position: Vec2::new(100.0, 160.0),
            },
        );
        router.route(&mut s, HostInput::PointerUp { kind: PointerKind::Mouse });
        assert_eq!(s.strokes(), 1);
        assert!(s.is_ball_moving());
    }

    #[test]
    fn test_pen_acts_like_mouse() {
        let mut s = session();
        let mut router = InputRouter::new();
        assert!(router.route(
            &mut s,
            HostInput::PointerDown {
                kind: PointerKind::Pen,
                button: PRIMARY_BUTTON,
                position: Vec2::ZERO,
            },
        ));
        assert_eq!(s.phase(), GamePhase::Charging);
    }

    #[test]
    fn test_touch_pointer_events_left_to_touch_listeners() {
        let mut s = session();
        let mut router = InputRouter::new();
        let down = HostInput::PointerDown {
            kind: PointerKind::Touch,
            button: PRIMARY_BUTTON,
            position: Vec2::ZERO,
        };
        assert!(!router.route(&mut s, down));
        assert_eq!(s.phase(), GamePhase::Idle);
    }

    #[test]
    fn test_multi_touch_ignored() {
        let mut s = session();
        let mut router = InputRouter::new();
        let pinch = HostInput::TouchStart {
            touches: 2,
            first: Vec2::ZERO,
        };
        assert!(!router.route(&mut s, pinch));
        assert_eq!(s.phase(), GamePhase::Idle);
    }

    #[test]
    fn test_single_touch_drag_shoots() {
        let mut s = session();
        let mut router = InputRouter::new();
        router.route(
            &mut s,
            HostInput::TouchStart {
                touches: 1,
                first: Vec2::new(50.0, 50.0),
            },
        );
        router.route(
            &mut s,
            HostInput::TouchMove {
                touches: 1,
                first: Vec2::new(50.0, 100.0),
            },
        );
        // A second finger mid-drag does not move the aim
        router.route(
            &mut s,
            HostInput::TouchMove {
                touches: 2,
                first: Vec2::new(500.0, 500.0),
            },
        );
        router.route(&mut s, HostInput::TouchEnd);
        assert_eq!(s.strokes(), 1);
        assert!((s.ball().velocity - Vec3::new(0.0, 0.0, -0.4375)).length() < 1e-5);
    }

    #[test]
    fn test_blur_pauses_and_resume_continues() {
        let mut s = session();
        let mut router = InputRouter::new();
        router.route(&mut s, HostInput::Blur);
        assert!(s.is_paused());
        router.route(&mut s, HostInput::Resume);
        assert!(!s.is_paused());

        router.pause_on_blur = false;
        assert!(!router.route(&mut s, HostInput::Blur));
        assert!(!s.is_paused());
    }
}
