/// Single-threaded input event bus with scoped subscriptions
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Size of the surface pointer coordinates are measured against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Events delivered by the host input system
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove { client_x: f32, client_y: f32 },
    Resize(Viewport),
}

type Listener = Rc<RefCell<dyn FnMut(&InputEvent)>>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

impl Listeners {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|(entry, _)| *entry == id)
    }
}

/// Fan-out of input events to subscribed listeners
///
/// Cloning the bus yields another handle to the same listener list.
#[derive(Clone, Default)]
pub struct InputBus {
    listeners: Rc<RefCell<Listeners>>,
}

impl InputBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` until the returned guard is dropped
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&InputEvent) + 'static,
    {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        let listener: Listener = Rc::new(RefCell::new(listener));
        listeners.entries.push((id, listener));

        Subscription {
            listeners: Rc::downgrade(&self.listeners),
            id: Some(id),
        }
    }

    /// Deliver `event` to every listener registered at the time of the call
    pub fn publish(&self, event: InputEvent) {
        let snapshot: Vec<(u64, Listener)> = self
            .listeners
            .borrow()
            .entries
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();

        for (id, listener) in snapshot {
            // An earlier listener may have released this one
            if !self.listeners.borrow().contains(id) {
                continue;
            }
            match listener.try_borrow_mut() {
                Ok(mut callback) => (*callback)(&event),
                Err(_) => log::trace!("skipping re-entrant delivery to listener {id}"),
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

/// Keeps a listener registered on an [`InputBus`]
///
/// The listener is removed when the guard is dropped or [`unsubscribe`]d.
///
/// [`unsubscribe`]: Subscription::unsubscribe
#[must_use = "dropping a subscription removes its listener immediately"]
pub struct Subscription {
    listeners: Weak<RefCell<Listeners>>,
    id: Option<u64>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        match (self.id, self.listeners.upgrade()) {
            (Some(id), Some(listeners)) => listeners.borrow().contains(id),
            _ => false,
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().entries.retain(|(entry, _)| *entry != id);
            log::trace!("released input listener {id}");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
