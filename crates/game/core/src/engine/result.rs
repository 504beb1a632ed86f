use crate::rules::{
    AppliedChange, ExecutionError, InteractionSlot, RequirementError, TraceNode, TriggerPhase,
};
use crate::state::{EntityId, GameTime};

/// What started an execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvocationSource {
    Interaction(InteractionSlot),
    /// Index into the owner's trigger list.
    Trigger(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStatus {
    /// Requirements passed and every effect committed.
    Applied,
    /// Requirements failed; nothing changed. Authoring defects, if any,
    /// are listed.
    RequirementsFailed { defects: Vec<RequirementError> },
    /// Effect application failed and was rolled back.
    Aborted(ExecutionError),
}

/// Full report of one invocation or trigger fire.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutionResult {
    pub source: InvocationSource,
    pub owner: EntityId,
    pub user: EntityId,
    pub targets: Vec<EntityId>,
    pub nonce: u64,
    pub status: ExecutionStatus,
    /// Requirement trace: one child per evaluated context.
    pub trace: TraceNode,
    /// Committed mutations in application order. Empty unless applied.
    pub applied: Vec<AppliedChange>,
    pub narrative: Vec<String>,
}

impl ExecutionResult {
    pub fn is_applied(&self) -> bool {
        matches!(self.status, ExecutionStatus::Applied)
    }

    pub fn error(&self) -> Option<&ExecutionError> {
        match &self.status {
            ExecutionStatus::Aborted(err) => Some(err),
            _ => None,
        }
    }
}

/// One trigger fire during a clock advance.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerFireResult {
    pub owner: EntityId,
    pub index: usize,
    pub fired_at: GameTime,
    pub result: ExecutionResult,
    /// Phase the trigger settled in after firing.
    pub phase: TriggerPhase,
}
