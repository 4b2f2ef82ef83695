use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::gate::{self, GateCondition};
use super::state::JobStatus;
use crate::error::WorkflowError;
use crate::inventory::InventoryItem;
use crate::ledger::ChargeLedger;
use crate::permission::Role;

/// The party currently bearing liability for the goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustodyHolder {
    Driver,
    Warehouse,
    Client,
}

impl fmt::Display for CustodyHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustodyHolder::Driver => write!(f, "DRIVER"),
            CustodyHolder::Warehouse => write!(f, "WAREHOUSE"),
            CustodyHolder::Client => write!(f, "CLIENT"),
        }
    }
}

/// Liability coverage the shipper selects on the bill of lading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValuationOption {
    /// No additional charge; liability capped at 0.60 per pound per item.
    ReleasedValue,
    /// Replacement value of lost or damaged items, subject to a deductible.
    #[default]
    FullValueProtection,
}

impl fmt::Display for ValuationOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValuationOption::ReleasedValue => write!(f, "Option 1: Released Value"),
            ValuationOption::FullValueProtection => write!(f, "Option 2: Full Value Protection"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub name: String,
    pub street: String,
    pub city_state_zip: String,
    #[serde(default)]
    pub phone: String,
}

/// One committed status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: JobStatus,
    pub to: JobStatus,
    pub actor: Role,
    pub at: DateTime<Utc>,
}

/// A single relocation job from dispatch to completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub origin: Address,
    pub destination: Address,
    #[serde(default)]
    pub pickup_date: Option<NaiveDate>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub assigned_helpers: Vec<String>,
    #[serde(default)]
    pub valuation_option: ValuationOption,
    pub charges: ChargeLedger,
    pub origin_signed: bool,
    pub delivery_signed: bool,
    pub pickup_paid: bool,
    pub delivery_paid: bool,
    pub custody_holder: CustodyHolder,
    /// Day the goods were routed into storage.
    #[serde(default)]
    pub storage_entry_date: Option<NaiveDate>,
    #[serde(default)]
    pub warehouse_arrival_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub warehouse_handshake_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub outbound_scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    #[serde(default)]
    pub history: Vec<TransitionRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a freshly dispatched job with the driver holding custody.
    /// A ledger with a negative charge, a non-positive payment or totals
    /// beyond `Decimal` range is refused.
    pub fn dispatch(
        origin: Address,
        destination: Address,
        charges: ChargeLedger,
    ) -> Result<Self, WorkflowError> {
        charges.validate()?;
        let now = Utc::now();
        Ok(Self {
            id: format!("ORD-{}", &Uuid::new_v4().simple().to_string()[..8].to_uppercase()),
            status: JobStatus::Dispatched,
            origin,
            destination,
            pickup_date: None,
            vehicle_id: None,
            assigned_helpers: Vec::new(),
            valuation_option: ValuationOption::default(),
            charges,
            origin_signed: false,
            delivery_signed: false,
            pickup_paid: false,
            delivery_paid: false,
            custody_holder: CustodyHolder::Driver,
            storage_entry_date: None,
            warehouse_arrival_at: None,
            warehouse_handshake_at: None,
            outbound_scheduled_date: None,
            inventory: Vec::new(),
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }

    /// Reject any mutation once the job is terminal.
    pub fn ensure_open(&self) -> Result<(), WorkflowError> {
        if self.is_completed() {
            Err(WorkflowError::TerminalState)
        } else {
            Ok(())
        }
    }

    pub fn ensure_status(
        &self,
        expected: JobStatus,
        label: &'static str,
    ) -> Result<(), WorkflowError> {
        self.ensure_open()?;
        if self.status == expected {
            Ok(())
        } else {
            Err(WorkflowError::WrongState {
                expected: label,
                actual: self.status,
            })
        }
    }

    /// The unmet precondition of the current status, recomputed from fields.
    pub fn blocking_condition(&self) -> Option<GateCondition> {
        gate::unmet_condition(self)
    }

    pub fn is_gate_blocked(&self) -> bool {
        self.blocking_condition().is_some()
    }

    /// Move to `to`, stamping the history and update time.
    pub(crate) fn commit_status(&mut self, to: JobStatus, actor: Role, at: DateTime<Utc>) {
        self.history.push(TransitionRecord {
            from: self.status,
            to,
            actor,
            at,
        });
        self.status = to;
        self.updated_at = at;
    }
}

/// Structured audit record produced from a job, usually at completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub job_id: String,
    pub status: JobStatus,
    pub transitions: Vec<TransitionRecord>,
    pub routed_via_warehouse: bool,
    pub signatures: u8,
    pub pickup_paid: bool,
    pub delivery_paid: bool,
    pub payments_received: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl AuditRecord {
    pub fn from_job(job: &Job) -> Self {
        let completed_at = job.updated_at;
        Self {
            job_id: job.id.clone(),
            status: job.status,
            transitions: job.history.clone(),
            routed_via_warehouse: job
                .history
                .iter()
                .any(|t| t.to == JobStatus::WarehouseCustody),
            signatures: u8::from(job.origin_signed) + u8::from(job.delivery_signed),
            pickup_paid: job.pickup_paid,
            delivery_paid: job.delivery_paid,
            payments_received: job.charges.partial_payments.len(),
            started_at: job.created_at,
            completed_at,
            duration_ms: (completed_at - job.created_at).num_milliseconds(),
        }
    }
}
