#![forbid(unsafe_code)]

//! One DOM event listener with an explicit attach/detach lifecycle.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget};

/// Owns the closure backing a listener; dropping it removes the listener.
pub struct Subscription {
    target: EventTarget,
    event_type: &'static str,
    callback: Closure<dyn FnMut(Event)>,
    attached: bool,
}

impl Subscription {
    pub fn new(
        target: &EventTarget,
        event_type: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Self {
        Self {
            target: target.clone(),
            event_type,
            callback: Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>),
            attached: false,
        }
    }

    #[must_use]
    pub const fn is_attached(&self) -> bool {
        self.attached
    }

    /// Register the listener. Attaching twice is a no-op.
    pub fn attach(&mut self) -> Result<(), JsValue> {
        if self.attached {
            return Ok(());
        }
        self.target
            .add_event_listener_with_callback(self.event_type, self.callback.as_ref().unchecked_ref())?;
        self.attached = true;
        Ok(())
    }

    /// Remove the listener. Safe to call multiple times.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event_type, self.callback.as_ref().unchecked_ref());
        self.attached = false;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event_type", &self.event_type)
            .field("attached", &self.attached)
            .finish()
    }
}
