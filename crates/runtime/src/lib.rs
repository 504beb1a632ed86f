//! Async host runtime for a rules-engine world.
//!
//! Each [`lldm_core::World`] is owned by one worker task fed through a
//! bounded command channel, so invocations and clock advances against that
//! world never interleave. Consumers embed [`Runtime`] to start a world,
//! drive it through [`WorldHandle`], and subscribe to events.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`workers`] keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod logging;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, WorldHandle};
pub use events::{Event, EventBus, InteractionEvent, Topic, TriggerEvent};
pub use logging::init_tracing;
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
