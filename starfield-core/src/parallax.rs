/// Pointer-driven tilt of the sky layer
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::input::{InputBus, InputEvent, Subscription, Viewport};
use crate::transform::{RotationState, Transform};

/// Tilt applied per unit of normalized pointer offset, in radians
pub const PARALLAX_STRENGTH: f32 = 0.1;

/// Pointer position normalized to [-1, 1] on both axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    /// Normalize client coordinates against `viewport`
    ///
    /// Returns `None` when the viewport has no area.
    pub fn from_client(client_x: f32, client_y: f32, viewport: Viewport) -> Option<Self> {
        if viewport.is_degenerate() {
            return None;
        }

        Some(Self {
            x: (client_x / viewport.width) * 2.0 - 1.0,
            y: (client_y / viewport.height) * 2.0 - 1.0,
        })
    }

    /// Sky rotation for this pointer position. Vertical movement tilts around x.
    pub fn rotation(&self) -> RotationState {
        RotationState::new(self.y * PARALLAX_STRENGTH, self.x * PARALLAX_STRENGTH, 0.0)
    }

    /// Overwrite the x and y angles of `rotation`
    pub fn apply(&self, rotation: &mut RotationState) {
        let tilt = self.rotation();
        rotation.x = tilt.x;
        rotation.y = tilt.y;
    }
}

struct TrackerState {
    viewport: Cell<Viewport>,
    pointer: Cell<Option<PointerState>>,
}

/// Tilts a shared transform towards the pointer while subscribed
///
/// Each pointer move overwrites whatever rotation the animator last wrote.
/// Dropping the tracker releases its bus subscription.
pub struct PointerParallaxTracker {
    state: Rc<TrackerState>,
    subscription: Subscription,
}

impl PointerParallaxTracker {
    pub fn attach(bus: &InputBus, viewport: Viewport, target: Rc<RefCell<Transform>>) -> Self {
        let state = Rc::new(TrackerState {
            viewport: Cell::new(viewport),
            pointer: Cell::new(None),
        });

        let listener_state = Rc::clone(&state);
        let subscription = bus.subscribe(move |event| match *event {
            InputEvent::Resize(viewport) => listener_state.viewport.set(viewport),
            InputEvent::PointerMove { client_x, client_y } => {
                let viewport = listener_state.viewport.get();
                let Some(pointer) = PointerState::from_client(client_x, client_y, viewport) else {
                    log::trace!("ignoring pointer move on empty viewport {viewport:?}");
                    return;
                };
                listener_state.pointer.set(Some(pointer));
                pointer.apply(&mut target.borrow_mut().rotation);
            }
        });

        Self {
            state,
            subscription,
        }
    }

    /// Last pointer position seen, if any
    pub fn pointer(&self) -> Option<PointerState> {
        self.state.pointer.get()
    }

    pub fn viewport(&self) -> Viewport {
        self.state.viewport.get()
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }

    /// Stop tracking. Equivalent to dropping the tracker.
    pub fn detach(self) {
        self.subscription.unsubscribe();
    }
}
