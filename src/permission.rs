//! Role identities and the capability checks every operation goes through.
//!
//! The workflow never compares roles inline; it asks [`can_cross`] or
//! [`authorize`], which read the gate table in [`crate::state_machine::gate`]
//! and the fixed action grants below.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::state_machine::{JobStatus, gate};

/// The five mutually exclusive actor identities. Selected externally and trusted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Driver,
    Helper,
    Office,
    Warehouse,
    Client,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Driver,
        Role::Helper,
        Role::Office,
        Role::Warehouse,
        Role::Client,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Driver => write!(f, "DRIVER"),
            Role::Helper => write!(f, "HELPER"),
            Role::Office => write!(f, "OFFICE"),
            Role::Warehouse => write!(f, "WAREHOUSE"),
            Role::Client => write!(f, "CLIENT"),
        }
    }
}

/// Something an actor asks to do to a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Leave the given status via `advance`.
    Cross(JobStatus),
    SignOrigin,
    SignDelivery,
    RecordArrival,
    RecordHandshake,
    DispatchOutbound,
    ClearPayment,
    EditCharges,
    EditInventory,
    VerifyInventory,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Cross(status) => write!(f, "cross {status}"),
            Action::SignOrigin => write!(f, "sign the origin bill of lading"),
            Action::SignDelivery => write!(f, "sign the delivery receipt"),
            Action::RecordArrival => write!(f, "record warehouse arrival"),
            Action::RecordHandshake => write!(f, "record the custody handshake"),
            Action::DispatchOutbound => write!(f, "dispatch from the warehouse"),
            Action::ClearPayment => write!(f, "clear a payment flag"),
            Action::EditCharges => write!(f, "edit the charge ledger"),
            Action::EditInventory => write!(f, "edit inventory"),
            Action::VerifyInventory => write!(f, "verify inventory"),
        }
    }
}

/// Whether `role` may leave `status` through `advance`.
///
/// Ungated states and gates without an authority list accept every role; the
/// data preconditions of those gates are checked separately by the state machine.
pub fn can_cross(status: JobStatus, role: Role) -> bool {
    match gate::gate_for(status) {
        Some(g) => g.authority.is_empty() || g.authority.contains(&role),
        None => true,
    }
}

/// Gated statuses that `role` holds explicit crossing authority for.
pub fn crossing_authority(role: Role) -> Vec<JobStatus> {
    gate::GATES
        .iter()
        .filter(|g| g.authority.contains(&role))
        .map(|g| g.status)
        .collect()
}

/// Roles granted a non-transition action.
fn granted_roles(action: Action) -> &'static [Role] {
    match action {
        Action::Cross(_) => &[],
        Action::SignOrigin | Action::SignDelivery => &[Role::Client],
        Action::RecordArrival => &[Role::Driver],
        Action::RecordHandshake | Action::DispatchOutbound => &[Role::Warehouse, Role::Office],
        Action::ClearPayment | Action::EditCharges => &[Role::Office],
        Action::EditInventory => &[Role::Driver, Role::Office],
        Action::VerifyInventory => &[Role::Driver],
    }
}

fn advisory(action: Action) -> &'static str {
    match action {
        Action::Cross(status) => gate::gate_for(status)
            .map(|g| g.advisory)
            .unwrap_or("AUTHORIZATION REQUIRED"),
        Action::SignOrigin | Action::SignDelivery => {
            "CLIENT SIGNATURE REQUIRED: only the client can sign handoff documents"
        }
        Action::RecordArrival => "FLEET ACTION REQUIRED: only the driver can log warehouse arrival",
        Action::RecordHandshake => {
            "CUSTODY AUTHORIZATION REQUIRED: warehouse or hub must accept liability"
        }
        Action::DispatchOutbound => {
            "DISPATCH AUTHORIZATION REQUIRED: warehouse or hub must release the goods"
        }
        Action::ClearPayment => "HUB AUTHORIZATION REQUIRED: only the office can verify funds",
        Action::EditCharges => "HUB AUTHORIZATION REQUIRED: only the office can edit the tariff",
        Action::EditInventory => "CREW AUTHORIZATION REQUIRED: only driver or office edit inventory",
        Action::VerifyInventory => "FOREMAN AUTHORIZATION REQUIRED: only the driver verifies items",
    }
}

/// Check that `role` may perform `action`, yielding `PermissionDenied` otherwise.
pub fn authorize(role: Role, action: Action) -> Result<(), WorkflowError> {
    let allowed = match action {
        Action::Cross(status) => can_cross(status, role),
        other => granted_roles(other).contains(&role),
    };
    if allowed {
        Ok(())
    } else {
        Err(WorkflowError::PermissionDenied {
            role,
            action,
            advisory: advisory(action),
        })
    }
}
