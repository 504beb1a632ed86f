//! Unified error types surfaced by the runtime API.
//!
//! Wraps worker coordination failures and engine caller errors so clients
//! can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use lldm_core::{ErrorSeverity, ExecuteError, GameError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("world worker command channel closed")]
    CommandChannelClosed,

    #[error("world worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("world worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Execute(#[from] ExecuteError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Execute(e) => e.severity(),
            _ => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::Execute(e) => e.error_code(),
        }
    }
}
