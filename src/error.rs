use rust_decimal::Decimal;
use thiserror::Error;

use crate::permission::{Action, Role};
use crate::state_machine::{GateCondition, JobStatus};

/// Business-rule rejections raised by the workflow, custody and ledger operations.
///
/// None of these are fatal: the job snapshot passed in is never modified when
/// one is returned, and the caller is expected to retry with corrected input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// The role lacks authority for the action, regardless of job data.
    #[error("{advisory} (role {role} may not {action})")]
    PermissionDenied {
        role: Role,
        action: Action,
        advisory: &'static str,
    },

    /// The current status has an unmet precondition.
    #[error("{status} is gate-blocked: {}", condition.reason())]
    GateBlocked {
        status: JobStatus,
        condition: GateCondition,
    },

    #[error("Job is COMPLETED; no further operations are accepted")]
    TerminalState,

    #[error("Routing decision (WAREHOUSE or DIRECT) required to leave IN_TRANSIT")]
    RoutingRequired,

    #[error("Operation requires status {expected}, job is at {actual}")]
    WrongState {
        expected: &'static str,
        actual: JobStatus,
    },

    #[error("Payment amount must be greater than zero, got {0}")]
    InvalidAmount(Decimal),

    #[error("Charge field `{field}` must not be negative")]
    InvalidCharge { field: &'static str },

    /// A ledger total no longer fits in a `Decimal`.
    #[error("Ledger arithmetic overflowed while computing {0}")]
    AmountOverflow(&'static str),

    #[error("Outstanding balance of {0} must be settled before payment can be cleared")]
    BalanceOutstanding(Decimal),

    #[error("{0} already recorded")]
    AlreadyRecorded(&'static str),

    #[error("Warehouse arrival must be recorded before the custody handshake")]
    ArrivalNotRecorded,

    #[error("SCHEDULE_LOCK: set an outbound date before dispatching from the warehouse")]
    ScheduleRequired,

    #[error("Inventory is locked at {0}")]
    InventoryLocked(JobStatus),

    #[error("Inventory group not found: {0}")]
    GroupNotFound(String),

    #[error("Invalid inventory item: {0}")]
    InvalidItem(&'static str),
}

/// Application-level errors surfaced by the binary, the snapshot store and the job actor.
#[derive(Debug, Error)]
pub enum MoveError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("No job snapshot at {0}. Run `movemaster new` first.")]
    NoJob(String),

    #[error("Job actor has shut down")]
    ActorClosed,

    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
