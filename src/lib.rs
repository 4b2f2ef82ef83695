//! Relocation job workflow and tariff ledger.
//!
//! A job moves through fourteen gated statuses from dispatch to completion.
//! Gates enforce role authority, client signatures, warehouse custody and
//! payment clearance; the ledger prices the job and derives the balance due.

pub mod actor;
pub mod config;
pub mod custody;
pub mod desk;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod permission;
pub mod state_machine;
pub mod store;

pub use desk::JobDesk;
pub use error::{MoveError, WorkflowError};
pub use ledger::{ChargeLedger, LedgerTotals, compute_ledger_totals};
pub use permission::Role;
pub use state_machine::{Job, JobStatus, RoutingDecision};
