//! Topic-based event bus for runtime events.
//!
//! Every executed invocation is published to [`Topic::Interaction`]; every
//! trigger fire and clock advance to [`Topic::Trigger`]. Consumers subscribe
//! only to the topics they need.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{InteractionEvent, TriggerEvent};
