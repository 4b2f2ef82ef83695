pub mod gate;
mod job;
pub mod signoff;
mod state;

pub use gate::{BoardStep, Gate, GateCondition, GateEffect, StepState};
pub use job::{Address, AuditRecord, CustodyHolder, Job, TransitionRecord, ValuationOption};
pub use state::{JobStatus, RoutingDecision, StateMachine};
