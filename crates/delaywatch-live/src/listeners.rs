//! Listener registry and fan-out.
//!
//! Listeners are shared callbacks (`Rc<dyn Fn>`). Registering the same `Rc`
//! twice under one category is a no-op. Dispatch walks a snapshot of the
//! category's listeners, so a listener may unsubscribe itself (or anyone
//! else) mid-delivery without disturbing the current dispatch.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::events::{Category, ChannelEvent};

/// Callback invoked for each delivered event.
pub type Listener = Rc<dyn Fn(&ChannelEvent)>;

type Slots = RefCell<HashMap<Category, Vec<Listener>>>;

/// Per-category listener sets.
#[derive(Default)]
pub struct ListenerRegistry {
    slots: Rc<Slots>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `category`.
    ///
    /// The returned [`Subscription`] removes it again. Dropping the
    /// subscription without calling `unsubscribe` leaves the listener
    /// registered.
    pub fn subscribe(&self, category: Category, listener: Listener) -> Subscription {
        {
            let mut slots = self.slots.borrow_mut();
            let set = slots.entry(category).or_default();
            if !set.iter().any(|l| Rc::ptr_eq(l, &listener)) {
                set.push(Rc::clone(&listener));
            }
        }
        Subscription {
            slots: Rc::downgrade(&self.slots),
            category,
            listener,
            active: Cell::new(true),
        }
    }

    /// Deliver `event` to every listener of its category.
    ///
    /// Returns how many listeners were invoked.
    pub fn dispatch(&self, event: &ChannelEvent) -> usize {
        let snapshot: Vec<Listener> = self
            .slots
            .borrow()
            .get(&event.category())
            .cloned()
            .unwrap_or_default();

        for listener in &snapshot {
            listener(event);
        }
        snapshot.len()
    }

    pub fn count(&self, category: Category) -> usize {
        self.slots.borrow().get(&category).map_or(0, Vec::len)
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.borrow();
        f.debug_map()
            .entries(slots.iter().map(|(category, set)| (category, set.len())))
            .finish()
    }
}

/// Handle returned by `subscribe`; removes the listener when asked.
pub struct Subscription {
    slots: Weak<Slots>,
    category: Category,
    listener: Listener,
    active: Cell<bool>,
}

impl Subscription {
    /// Remove the listener. Idempotent; safe to call from inside a listener
    /// during dispatch, and after the registry is gone.
    pub fn unsubscribe(&self) {
        if !self.active.replace(false) {
            return;
        }
        if let Some(slots) = self.slots.upgrade() {
            if let Some(set) = slots.borrow_mut().get_mut(&self.category) {
                set.retain(|l| !Rc::ptr_eq(l, &self.listener));
            }
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("category", &self.category)
            .field("active", &self.active.get())
            .finish()
    }
}
