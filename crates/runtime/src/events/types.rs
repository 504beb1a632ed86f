//! Event types for different topics.

use lldm_core::{ExecutionResult, GameTime, TriggerFireResult};
use serde::{Deserialize, Serialize};

/// Events for host-requested invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InteractionEvent {
    /// An invocation ran; its status says whether anything changed.
    Executed {
        clock: GameTime,
        result: Box<ExecutionResult>,
    },
}

/// Events for the world clock and triggers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TriggerEvent {
    Fired(Box<TriggerFireResult>),

    /// Published after every fire of the advance.
    ClockAdvanced {
        from: GameTime,
        to: GameTime,
        fired: usize,
    },
}
