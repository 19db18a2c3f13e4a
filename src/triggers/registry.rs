use std::collections::BTreeMap;
use std::sync::Arc;

use super::bus::EventSource;
use super::events::{TriggerEvent, UnknownEvent};
use crate::purge::{PurgeEngine, PurgeResult};

/// The whole-cache purge, as a shareable zero-argument action
pub type PurgeAction = Arc<dyn Fn() -> PurgeResult + Send + Sync>;

/// Wrap an engine into a purge action
pub fn purge_action(engine: PurgeEngine) -> PurgeAction {
    Arc::new(move || engine.purge())
}

/// Fixed event → purge bindings, built once at startup.
///
/// Events carry no payload the action uses: every binding purges the whole
/// cache. Binding the same event twice keeps a single binding.
#[derive(Clone)]
pub struct TriggerRegistry {
    bindings: BTreeMap<TriggerEvent, PurgeAction>,
}

impl TriggerRegistry {
    /// Bind `action` to every event in `events`
    pub fn register_auto_triggers<I>(events: I, action: PurgeAction) -> Self
    where
        I: IntoIterator<Item = TriggerEvent>,
    {
        let bindings = events
            .into_iter()
            .map(|event| (event, Arc::clone(&action)))
            .collect();
        Self { bindings }
    }

    /// Bind `action` to the full default event set
    pub fn with_default_events(action: PurgeAction) -> Self {
        Self::register_auto_triggers(TriggerEvent::ALL, action)
    }

    /// Bound events, in declaration order
    pub fn events(&self) -> impl Iterator<Item = TriggerEvent> + '_ {
        self.bindings.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn is_bound(&self, event: TriggerEvent) -> bool {
        self.bindings.contains_key(&event)
    }

    /// Run the action bound to `event`. `None` when the event is unbound.
    pub fn dispatch(&self, event: TriggerEvent) -> Option<PurgeResult> {
        let action = self.bindings.get(&event)?;
        tracing::debug!("Purge triggered by {}", event);
        Some(action())
    }

    /// Same as `dispatch`, by hook name
    pub fn dispatch_name(&self, name: &str) -> Result<Option<PurgeResult>, UnknownEvent> {
        Ok(self.dispatch(name.parse()?))
    }

    /// Hang one listener per bound event on an external event source
    pub fn attach(&self, source: &mut dyn EventSource) {
        for (&event, action) in &self.bindings {
            let action = Arc::clone(action);
            source.add_listener(
                event,
                Box::new(move || {
                    let result = action();
                    tracing::info!(
                        event = event.as_str(),
                        status = result.status(),
                        "{}",
                        result.summary()
                    );
                }),
            );
        }
    }
}

impl std::fmt::Debug for TriggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriggerRegistry")
            .field("events", &self.bindings.keys().collect::<Vec<_>>())
            .finish()
    }
}
