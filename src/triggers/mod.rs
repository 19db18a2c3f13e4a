pub mod bus;
pub mod events;
pub mod manual;
pub mod registry;

pub use bus::{EventSource, Listener, LocalEventBus};
pub use events::{TriggerEvent, UnknownEvent};
pub use manual::{manual_trigger_path, ActionRequest, ManualTrigger, Redirect, PURGE_ACTION};
pub use registry::{purge_action, PurgeAction, TriggerRegistry};
