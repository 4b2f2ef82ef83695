//! Warehouse custody handoff: arrival, handshake, outbound dispatch.
//!
//! Active only while the job sits at WAREHOUSE_CUSTODY. The driver logs
//! arrival at the dock; the warehouse (or hub) then accepts liability with a
//! handshake. Goods leave storage only through [`dispatch_from_warehouse`],
//! which needs an outbound date and hands liability back to the driver.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::permission::{self, Action, Role};
use crate::state_machine::{CustodyHolder, Job, JobStatus};

/// Read projection of where the handoff sub-protocol stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustodyStage {
    /// Job is not routed through storage, or has not reached it yet.
    Locked,
    AwaitingArrival,
    AwaitingHandshake,
    InWarehouse,
    /// Dispatched from storage towards the destination.
    Released,
}

impl fmt::Display for CustodyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustodyStage::Locked => write!(f, "LOCKED"),
            CustodyStage::AwaitingArrival => write!(f, "AWAITING_ARRIVAL"),
            CustodyStage::AwaitingHandshake => write!(f, "AWAITING_HANDSHAKE"),
            CustodyStage::InWarehouse => write!(f, "IN_WAREHOUSE"),
            CustodyStage::Released => write!(f, "RELEASED"),
        }
    }
}

pub fn stage(job: &Job) -> CustodyStage {
    if job.status == JobStatus::WarehouseCustody {
        return match (job.warehouse_arrival_at, job.warehouse_handshake_at) {
            (None, _) => CustodyStage::AwaitingArrival,
            (Some(_), None) => CustodyStage::AwaitingHandshake,
            (Some(_), Some(_)) => CustodyStage::InWarehouse,
        };
    }
    let stored = job
        .history
        .iter()
        .any(|t| t.from == JobStatus::WarehouseCustody);
    if stored {
        CustodyStage::Released
    } else {
        CustodyStage::Locked
    }
}

/// Step 1: the driver logs arrival at the warehouse dock. First write wins.
pub fn record_arrival(job: &Job, role: Role, at: DateTime<Utc>) -> Result<Job, WorkflowError> {
    job.ensure_open()?;
    permission::authorize(role, Action::RecordArrival)?;
    if job.warehouse_arrival_at.is_some() {
        return Err(WorkflowError::AlreadyRecorded("Warehouse arrival"));
    }
    job.ensure_status(JobStatus::WarehouseCustody, "WAREHOUSE_CUSTODY")?;

    let mut next = job.clone();
    next.warehouse_arrival_at = Some(at);
    next.updated_at = at;
    Ok(next)
}

/// Step 2: the warehouse accepts liability. Locked until arrival is logged.
pub fn record_handshake(job: &Job, role: Role, at: DateTime<Utc>) -> Result<Job, WorkflowError> {
    job.ensure_open()?;
    permission::authorize(role, Action::RecordHandshake)?;
    if job.warehouse_arrival_at.is_none() {
        return Err(WorkflowError::ArrivalNotRecorded);
    }
    if job.warehouse_handshake_at.is_some() {
        return Err(WorkflowError::AlreadyRecorded("Custody handshake"));
    }
    job.ensure_status(JobStatus::WarehouseCustody, "WAREHOUSE_CUSTODY")?;

    let mut next = job.clone();
    next.warehouse_handshake_at = Some(at);
    next.custody_holder = CustodyHolder::Warehouse;
    next.updated_at = at;
    Ok(next)
}

/// Set (or move) the planned outbound delivery date.
pub fn schedule_outbound(job: &Job, date: NaiveDate, at: DateTime<Utc>) -> Result<Job, WorkflowError> {
    job.ensure_open()?;
    let mut next = job.clone();
    next.outbound_scheduled_date = Some(date);
    next.updated_at = at;
    Ok(next)
}

/// Release goods from storage to the destination leg.
pub fn dispatch_from_warehouse(
    job: &Job,
    role: Role,
    at: DateTime<Utc>,
) -> Result<Job, WorkflowError> {
    job.ensure_open()?;
    permission::authorize(role, Action::DispatchOutbound)?;
    if job.outbound_scheduled_date.is_none() {
        return Err(WorkflowError::ScheduleRequired);
    }
    job.ensure_status(JobStatus::WarehouseCustody, "WAREHOUSE_CUSTODY")?;

    let mut next = job.clone();
    next.commit_status(JobStatus::DestinationGate, role, at);
    next.custody_holder = CustodyHolder::Driver;
    Ok(next)
}
