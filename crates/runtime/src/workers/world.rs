//! World worker that owns one authoritative [`lldm_core::World`].
//!
//! Receives commands from [`crate::WorldHandle`], runs them through
//! [`lldm_core::RulesEngine`] one at a time, and publishes events to the
//! [`EventBus`]. Serializing every command through this loop is what keeps
//! each invocation's evaluation and commit free of interleaving.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use lldm_core::{
    ExecutionResult, GameTime, Invocation, RulesEngine, TriggerFireResult, World,
};

use crate::api::Result;
use crate::events::{Event, EventBus, InteractionEvent, TriggerEvent};

/// Commands that can be sent to the world worker
pub enum Command {
    /// Run one interaction.
    Invoke {
        invocation: Invocation,
        reply: oneshot::Sender<Result<ExecutionResult>>,
    },
    /// Advance the clock by a number of seconds.
    AdvanceClock {
        delta_secs: u64,
        reply: oneshot::Sender<Vec<TriggerFireResult>>,
    },
    /// Advance the clock to an absolute time. Earlier times are a no-op.
    AdvanceClockTo {
        at: GameTime,
        reply: oneshot::Sender<Vec<TriggerFireResult>>,
    },
    /// Query the current world (read-only snapshot).
    QueryWorld { reply: oneshot::Sender<World> },
    /// Stop the worker loop.
    Shutdown,
}

/// Background task that processes world commands.
pub struct WorldWorker {
    world: World,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
}

impl WorldWorker {
    pub fn new(world: World, command_rx: mpsc::Receiver<Command>, event_bus: EventBus) -> Self {
        info!(
            target: "lldm::runtime",
            entities = world.len(),
            clock = %world.clock(),
            "WorldWorker initialized"
        );

        Self {
            world,
            command_rx,
            event_bus,
        }
    }

    /// Main worker loop. Ends on [`Command::Shutdown`] or when every handle
    /// is dropped.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            if !self.handle_command(cmd) {
                break;
            }
        }
        info!(target: "lldm::runtime", nonce = self.world.nonce(), "WorldWorker stopped");
    }

    /// Returns `false` when the loop should stop.
    fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Invoke { invocation, reply } => {
                let result = self.handle_invocation(invocation);
                if reply.send(result).is_err() {
                    debug!("Invoke reply channel closed (caller dropped)");
                }
            }
            Command::AdvanceClock { delta_secs, reply } => {
                let at = self.world.clock().saturating_add(delta_secs);
                let fired = self.handle_advance(at);
                if reply.send(fired).is_err() {
                    debug!("AdvanceClock reply channel closed (caller dropped)");
                }
            }
            Command::AdvanceClockTo { at, reply } => {
                let fired = self.handle_advance(at);
                if reply.send(fired).is_err() {
                    debug!("AdvanceClockTo reply channel closed (caller dropped)");
                }
            }
            Command::QueryWorld { reply } => {
                if reply.send(self.world.clone()).is_err() {
                    debug!("QueryWorld reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn handle_invocation(&mut self, invocation: Invocation) -> Result<ExecutionResult> {
        let result = RulesEngine::new(&mut self.world).invoke(invocation)?;

        self.event_bus
            .publish(Event::Interaction(InteractionEvent::Executed {
                clock: self.world.clock(),
                result: Box::new(result.clone()),
            }));
        Ok(result)
    }

    fn handle_advance(&mut self, at: GameTime) -> Vec<TriggerFireResult> {
        let from = self.world.clock();
        let fired = RulesEngine::new(&mut self.world).advance_clock_to(at);
        let to = self.world.clock();
        if to == from {
            return fired;
        }

        for fire in &fired {
            self.event_bus
                .publish(Event::Trigger(TriggerEvent::Fired(Box::new(fire.clone()))));
        }
        self.event_bus
            .publish(Event::Trigger(TriggerEvent::ClockAdvanced {
                from,
                to,
                fired: fired.len(),
            }));
        fired
    }
}
