//! Worker tasks that back the runtime orchestration.
//!
//! The world worker executes every command against its world; one worker per
//! world, so independent worlds run without coordination.

mod world;

pub use world::{Command, WorldWorker};
