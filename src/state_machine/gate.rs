use std::fmt;

use serde::{Deserialize, Serialize};

use super::job::Job;
use super::state::JobStatus;
use crate::permission::{self, Role};

/// A data precondition that must hold before a gated status can be left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateCondition {
    /// Client signed the bill of lading at origin.
    OriginSignature,
    /// Hub verified the delivery balance.
    DeliveryPayment,
    /// Client signed the final delivery receipt.
    DeliverySignature,
    /// Goods leave storage only through outbound dispatch, never a plain advance.
    OutboundDispatch,
}

impl GateCondition {
    pub fn is_met(&self, job: &Job) -> bool {
        match self {
            GateCondition::OriginSignature => job.origin_signed,
            GateCondition::DeliveryPayment => job.delivery_paid,
            GateCondition::DeliverySignature => job.delivery_signed,
            GateCondition::OutboundDispatch => false,
        }
    }

    /// Human-readable reason shown to the actor when the gate is shut.
    pub fn reason(&self) -> &'static str {
        match self {
            GateCondition::OriginSignature => {
                "LIABILITY GATE: client must sign the bill of lading at origin"
            }
            GateCondition::DeliveryPayment => {
                "FINANCIAL GATE: final balance must be cleared by the hub to unlock unloading"
            }
            GateCondition::DeliverySignature => {
                "COMPLETION GATE: final delivery handoff signature required from client"
            }
            GateCondition::OutboundDispatch => {
                "CUSTODY GATE: goods in storage leave only through outbound dispatch"
            }
        }
    }
}

impl fmt::Display for GateCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// What the state machine does on top of moving to the next status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEffect {
    None,
    /// The caller picks between warehouse storage and direct delivery.
    Routing,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    pub status: JobStatus,
    pub condition: Option<GateCondition>,
    /// Roles allowed to cross. Empty means any role.
    pub authority: &'static [Role],
    pub effect: GateEffect,
    /// Advisory returned when the role lacks authority.
    pub advisory: &'static str,
}

pub const GATES: &[Gate] = &[
    Gate {
        status: JobStatus::BindingEstimate,
        condition: None,
        authority: &[Role::Office],
        effect: GateEffect::None,
        advisory: "HUB AUTHORIZATION REQUIRED: only the hub (office) can lock the binding estimate",
    },
    Gate {
        status: JobStatus::ClientApproval,
        condition: Some(GateCondition::OriginSignature),
        authority: &[],
        effect: GateEffect::None,
        advisory: "",
    },
    Gate {
        status: JobStatus::LoadVerification,
        condition: Some(GateCondition::OriginSignature),
        authority: &[],
        effect: GateEffect::None,
        advisory: "",
    },
    Gate {
        status: JobStatus::InTransit,
        condition: None,
        authority: &[Role::Office],
        effect: GateEffect::Routing,
        advisory: "ROUTING COMMAND REQUIRED: hub must decide between warehouse or direct delivery",
    },
    Gate {
        status: JobStatus::WarehouseCustody,
        condition: Some(GateCondition::OutboundDispatch),
        authority: &[],
        effect: GateEffect::None,
        advisory: "",
    },
    Gate {
        status: JobStatus::DestinationGate,
        condition: Some(GateCondition::DeliveryPayment),
        authority: &[],
        effect: GateEffect::None,
        advisory: "",
    },
    Gate {
        status: JobStatus::FinalAudit,
        condition: Some(GateCondition::DeliverySignature),
        authority: &[],
        effect: GateEffect::None,
        advisory: "",
    },
];

pub fn gate_for(status: JobStatus) -> Option<&'static Gate> {
    GATES.iter().find(|g| g.status == status)
}

/// The unmet data precondition of the job's current status, if any.
///
/// Role authority is not part of this; it is derived purely from job fields.
pub fn unmet_condition(job: &Job) -> Option<GateCondition> {
    gate_for(job.status)
        .and_then(|g| g.condition)
        .filter(|c| !c.is_met(job))
}

/// Where a step sits relative to the job's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepState {
    Done,
    Current,
    Upcoming,
}

/// One row of the stepper shown to an actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardStep {
    pub status: JobStatus,
    pub label: &'static str,
    pub state: StepState,
    pub gated: bool,
    /// The viewing role lacks authority to leave this status.
    pub locked_for_role: bool,
    /// Unmet precondition, reported for the current step only.
    pub blocked: Option<GateCondition>,
}

/// All fourteen steps as seen by `role`.
pub fn board(job: &Job, role: Role) -> Vec<BoardStep> {
    let current = job.status.index();
    JobStatus::SEQUENCE
        .iter()
        .map(|&status| {
            let idx = status.index();
            let state = if idx < current || job.is_completed() {
                StepState::Done
            } else if idx == current {
                StepState::Current
            } else {
                StepState::Upcoming
            };
            let blocked = if state == StepState::Current {
                job.blocking_condition()
            } else {
                None
            };
            BoardStep {
                status,
                label: status.label(),
                state,
                gated: gate_for(status).is_some(),
                locked_for_role: !permission::can_cross(status, role),
                blocked,
            }
        })
        .collect()
}
