//! High-level runtime orchestrator.
//!
//! The runtime owns the world worker, wires up command/event channels, and
//! exposes a builder-based API for hosts to drive one world.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use lldm_core::{EngineConfig, EntityRecord, LoadReport, World};

use crate::api::{Result, RuntimeError, WorldHandle};
use crate::events::EventBus;
use crate::workers::{Command, WorldWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Used when the builder assembles the world from records.
    pub engine: EngineConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

/// Main runtime that owns one world worker.
///
/// [`WorldHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: WorldHandle,
    worker: JoinHandle<()>,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }

    /// Spawns a worker for an already loaded world.
    pub fn start(world: World, config: &RuntimeConfig) -> Self {
        let (command_tx, command_rx) = mpsc::channel::<Command>(config.command_buffer_size);
        let event_bus = EventBus::with_capacity(config.event_buffer_size);
        let handle = WorldHandle::new(command_tx, event_bus.clone());

        let worker = WorldWorker::new(world, command_rx, event_bus);
        let worker = tokio::spawn(async move {
            worker.run().await;
        });

        Self { handle, worker }
    }

    pub fn handle(&self) -> WorldHandle {
        self.handle.clone()
    }

    /// Stops the worker after the commands already queued, and waits for it.
    pub async fn shutdown(self) -> Result<()> {
        self.handle.shutdown().await?;
        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`].
#[derive(Default)]
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    world: Option<World>,
    records: Vec<EntityRecord>,
}

impl RuntimeBuilder {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Starts from an existing world instead of an empty one.
    pub fn world(mut self, world: World) -> Self {
        self.world = Some(world);
        self
    }

    /// Records loaded into the world at build time.
    pub fn records(mut self, records: impl IntoIterator<Item = EntityRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Loads pending records and spawns the worker.
    ///
    /// Rejected records are returned in the report, never fatal.
    pub fn build(self) -> (Runtime, LoadReport) {
        let mut world = self
            .world
            .unwrap_or_else(|| World::new(self.config.engine.clone()));
        let report = world.load_batch(self.records);
        (Runtime::start(world, &self.config), report)
    }
}
