use std::collections::HashMap;

use super::events::{TriggerEvent, UnknownEvent};

/// Zero-argument callback run when an event fires
pub type Listener = Box<dyn Fn() + Send + Sync>;

/// Something that raises named content-lifecycle events.
///
/// The host CMS is the real implementation; the crate only needs to hang a
/// callback on each event.
pub trait EventSource {
    fn add_listener(&mut self, event: TriggerEvent, listener: Listener);
}

/// In-process event source: listeners run inline, in registration order.
#[derive(Default)]
pub struct LocalEventBus {
    listeners: HashMap<TriggerEvent, Vec<Listener>>,
}

impl LocalEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every listener bound to `event`, returning how many ran
    pub fn emit(&self, event: TriggerEvent) -> usize {
        let Some(listeners) = self.listeners.get(&event) else {
            tracing::trace!("No listeners for {}", event);
            return 0;
        };
        for listener in listeners {
            listener();
        }
        listeners.len()
    }

    /// Same as `emit`, by hook name
    pub fn emit_name(&self, name: &str) -> Result<usize, UnknownEvent> {
        Ok(self.emit(name.parse()?))
    }

    pub fn listener_count(&self, event: TriggerEvent) -> usize {
        self.listeners.get(&event).map_or(0, Vec::len)
    }
}

impl EventSource for LocalEventBus {
    fn add_listener(&mut self, event: TriggerEvent, listener: Listener) {
        self.listeners.entry(event).or_default().push(listener);
    }
}
