//! Cloneable façade for issuing commands to a world worker.
//!
//! [`WorldHandle`] hides channel plumbing and offers async helpers for
//! running interactions, advancing the clock, or streaming events from
//! specific topics. Commands from every clone are processed strictly one at
//! a time.
use tokio::sync::{broadcast, mpsc, oneshot};

use lldm_core::{
    EntityId, ExecutionResult, GameTime, InteractionSlot, Invocation, TriggerFireResult, World,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with one world
#[derive(Clone)]
pub struct WorldHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl WorldHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Run `owner`'s `index`-th interaction with the owner as user.
    pub async fn execute_interaction(
        &self,
        owner: EntityId,
        index: usize,
        targets: Vec<EntityId>,
    ) -> Result<ExecutionResult> {
        self.invoke(Invocation::by_owner(
            owner,
            InteractionSlot::Interaction(index),
            targets,
        ))
        .await
    }

    /// Run an invocation with explicit owner, user and slot.
    pub async fn invoke(&self, invocation: Invocation) -> Result<ExecutionResult> {
        self.request(|reply| Command::Invoke { invocation, reply })
            .await?
    }

    /// Advance the world clock by `delta_secs` and fire due triggers.
    pub async fn advance_clock(&self, delta_secs: u64) -> Result<Vec<TriggerFireResult>> {
        self.request(|reply| Command::AdvanceClock { delta_secs, reply })
            .await
    }

    /// Advance the world clock to `at`. Re-delivering a time that was
    /// already reached fires nothing.
    pub async fn advance_clock_to(&self, at: GameTime) -> Result<Vec<TriggerFireResult>> {
        self.request(|reply| Command::AdvanceClockTo { at, reply })
            .await
    }

    /// Query the current world (read-only snapshot)
    pub async fn query_world(&self) -> Result<World> {
        self.request(|reply| Command::QueryWorld { reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Interaction` - Host-requested invocations
    /// - `Topic::Trigger` - Trigger fires and clock advances
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
