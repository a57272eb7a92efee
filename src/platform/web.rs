//! Browser bindings (wasm32 only)
//!
//! DOM listeners feed `HostInput` into the shared session. Every listener is
//! owned by a `Listeners` guard and unregistered when the guard drops.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, EventTarget, PointerEvent, TouchEvent};

use super::{HostInput, InputRouter, PointerKind};
use crate::sim::Session;

pub type SharedSession = Rc<RefCell<Session>>;

struct Registration {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// Owns DOM listener closures; removes them on drop
#[derive(Default)]
pub struct Listeners {
    registrations: Vec<Registration>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&mut self, target: &EventTarget, kind: &'static str, handler: F) -> Result<(), JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref::<js_sys::Function>())?;
        self.registrations.push(Registration {
            target: target.clone(),
            kind,
            closure,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

impl Drop for Listeners {
    fn drop(&mut self) {
        for reg in self.registrations.drain(..) {
            let callback = reg.closure.as_ref().unchecked_ref::<js_sys::Function>();
            if let Err(e) = reg.target.remove_event_listener_with_callback(reg.kind, callback) {
                log::warn!("Failed to remove {} listener: {:?}", reg.kind, e);
            }
        }
        log::debug!("DOM listeners removed");
    }
}

/// Route one event, skipping it if the session is busy (re-entrant dispatch)
fn dispatch(session: &SharedSession, router: &Rc<RefCell<InputRouter>>, input: HostInput) {
    match session.try_borrow_mut() {
        Ok(mut session) => {
            router.borrow_mut().route(&mut session, input);
        }
        Err(_) => log::trace!("session busy, dropped {:?}", input),
    }
}

/// First touch in canvas coordinates
fn first_touch(canvas: &Element, event: &TouchEvent) -> Option<(u32, Vec2)> {
    let touches = event.touches();
    let touch = touches.get(0)?;
    let rect = canvas.get_bounding_client_rect();
    let position = Vec2::new(
        touch.client_x() as f32 - rect.left() as f32,
        touch.client_y() as f32 - rect.top() as f32,
    );
    Some((touches.length(), position))
}

/// Register pointer, touch and focus listeners for a canvas
pub fn bind_input(
    canvas: &Element,
    session: SharedSession,
    router: Rc<RefCell<InputRouter>>,
) -> Result<Listeners, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let window_target: &EventTarget = window.as_ref();
    let canvas_target: &EventTarget = canvas.as_ref();
    let mut listeners = Listeners::new();

    {
        let (session, router) = (session.clone(), router.clone());
        listeners.add(canvas_target, "pointerdown", move |event: Event| {
            if let Some(event) = event.dyn_ref::<PointerEvent>() {
                let input = HostInput::PointerDown {
                    kind: PointerKind::from_dom(&event.pointer_type()),
                    button: event.button(),
                    position: Vec2::new(event.offset_x() as f32, event.offset_y() as f32),
                };
                dispatch(&session, &router, input);
            }
        })?;
    }

    {
        let (session, router) = (session.clone(), router.clone());
        listeners.add(canvas_target, "pointermove", move |event: Event| {
            if let Some(event) = event.dyn_ref::<PointerEvent>() {
                let input = HostInput::PointerMove {
                    kind: PointerKind::from_dom(&event.pointer_type()),
                    position: Vec2::new(event.offset_x() as f32, event.offset_y() as f32),
                };
                dispatch(&session, &router, input);
            }
        })?;
    }

    // Released outside the canvas still ends the drag
    {
        let (session, router) = (session.clone(), router.clone());
        listeners.add(window_target, "pointerup", move |event: Event| {
            if let Some(event) = event.dyn_ref::<PointerEvent>() {
                let input = HostInput::PointerUp {
                    kind: PointerKind::from_dom(&event.pointer_type()),
                };
                dispatch(&session, &router, input);
            }
        })?;
    }

    {
        let (session, router, canvas) = (session.clone(), router.clone(), canvas.clone());
        listeners.add(canvas_target, "touchstart", move |event: Event| {
            if let Some(event) = event.dyn_ref::<TouchEvent>() {
                event.prevent_default();
                if let Some((touches, first)) = first_touch(&canvas, event) {
                    dispatch(&session, &router, HostInput::TouchStart { touches, first });
                }
            }
        })?;
    }

    {
        let (session, router, canvas) = (session.clone(), router.clone(), canvas.clone());
        listeners.add(canvas_target, "touchmove", move |event: Event| {
            if let Some(event) = event.dyn_ref::<TouchEvent>() {
                event.prevent_default();
                if let Some((touches, first)) = first_touch(&canvas, event) {
                    dispatch(&session, &router, HostInput::TouchMove { touches, first });
                }
            }
        })?;
    }

    {
        let (session, router) = (session.clone(), router.clone());
        listeners.add(canvas_target, "touchend", move |_event: Event| {
            dispatch(&session, &router, HostInput::TouchEnd);
        })?;
    }

    listeners.add(window_target, "blur", move |_event: Event| {
        dispatch(&session, &router, HostInput::Blur);
    })?;

    log::info!("Bound {} input listeners", listeners.len());
    Ok(listeners)
}
