use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::gate::{self, GateEffect};
use super::job::{CustodyHolder, Job};
use crate::error::WorkflowError;
use crate::permission::{self, Action, Role};

/// The fourteen statuses of a relocation job, in fixed forward order.
///
/// Each job flows DISPATCHED → … → IN_TRANSIT → [WAREHOUSE_CUSTODY] →
/// DESTINATION_GATE → … → COMPLETED. Storage is the only optional stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Dispatched,
    ArrivedOrigin,
    SurveyWalkthrough,
    BindingEstimate,
    OfficeVerification,
    ClientApproval,
    Loading,
    LoadVerification,
    InTransit,
    WarehouseCustody,
    DestinationGate,
    Unloading,
    FinalAudit,
    Completed,
}

impl JobStatus {
    pub const SEQUENCE: [JobStatus; 14] = [
        JobStatus::Dispatched,
        JobStatus::ArrivedOrigin,
        JobStatus::SurveyWalkthrough,
        JobStatus::BindingEstimate,
        JobStatus::OfficeVerification,
        JobStatus::ClientApproval,
        JobStatus::Loading,
        JobStatus::LoadVerification,
        JobStatus::InTransit,
        JobStatus::WarehouseCustody,
        JobStatus::DestinationGate,
        JobStatus::Unloading,
        JobStatus::FinalAudit,
        JobStatus::Completed,
    ];

    /// Position in [`JobStatus::SEQUENCE`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// The sequential successor, `None` for `Completed`.
    pub fn successor(self) -> Option<JobStatus> {
        Self::SEQUENCE.get(self.index() + 1).copied()
    }

    /// Short stepper label.
    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Dispatched => "Dispatch",
            JobStatus::ArrivedOrigin => "Arrival",
            JobStatus::SurveyWalkthrough => "Survey",
            JobStatus::BindingEstimate => "Rate Lock",
            JobStatus::OfficeVerification => "Review",
            JobStatus::ClientApproval => "Signature",
            JobStatus::Loading => "Loading",
            JobStatus::LoadVerification => "Evidence",
            JobStatus::InTransit => "Transit",
            JobStatus::WarehouseCustody => "Vault",
            JobStatus::DestinationGate => "Payment",
            JobStatus::Unloading => "Unload",
            JobStatus::FinalAudit => "Audit",
            JobStatus::Completed => "Done",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Dispatched => "DISPATCHED",
            JobStatus::ArrivedOrigin => "ARRIVED_ORIGIN",
            JobStatus::SurveyWalkthrough => "SURVEY_WALKTHROUGH",
            JobStatus::BindingEstimate => "BINDING_ESTIMATE",
            JobStatus::OfficeVerification => "OFFICE_VERIFICATION",
            JobStatus::ClientApproval => "CLIENT_APPROVAL",
            JobStatus::Loading => "LOADING",
            JobStatus::LoadVerification => "LOAD_VERIFICATION",
            JobStatus::InTransit => "IN_TRANSIT",
            JobStatus::WarehouseCustody => "WAREHOUSE_CUSTODY",
            JobStatus::DestinationGate => "DESTINATION_GATE",
            JobStatus::Unloading => "UNLOADING",
            JobStatus::FinalAudit => "FINAL_AUDIT",
            JobStatus::Completed => "COMPLETED",
        };
        f.write_str(s)
    }
}

/// Where the hub sends the truck when it leaves IN_TRANSIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingDecision {
    Warehouse,
    Direct,
}

/// Drives a `Job` through the gated status sequence.
pub struct StateMachine;

impl StateMachine {
    /// Check whether `role` could leave the job's current status right now.
    ///
    /// Terminal state first, then role authority, then the data precondition.
    /// Routing is checked by [`StateMachine::advance`] since it is an input,
    /// not job state.
    pub fn check(job: &Job, role: Role) -> Result<(), WorkflowError> {
        job.ensure_open()?;
        permission::authorize(role, Action::Cross(job.status))?;
        match job.blocking_condition() {
            Some(condition) => Err(WorkflowError::GateBlocked {
                status: job.status,
                condition,
            }),
            None => Ok(()),
        }
    }

    /// Compute the successor snapshot of `job` for an `advance` request.
    ///
    /// The input job is never touched; a failure leaves the caller's snapshot
    /// exactly as it was.
    pub fn advance(
        job: &Job,
        role: Role,
        routing: Option<RoutingDecision>,
        at: DateTime<Utc>,
    ) -> Result<Job, WorkflowError> {
        Self::check(job, role)?;

        let effect = gate::gate_for(job.status)
            .map(|g| g.effect)
            .unwrap_or(GateEffect::None);

        let mut next = job.clone();
        match effect {
            GateEffect::Routing => match routing.ok_or(WorkflowError::RoutingRequired)? {
                RoutingDecision::Warehouse => {
                    next.commit_status(JobStatus::WarehouseCustody, role, at);
                    // Driver keeps liability until the warehouse handshake.
                    next.custody_holder = CustodyHolder::Driver;
                    next.storage_entry_date = Some(at.date_naive());
                }
                RoutingDecision::Direct => {
                    next.commit_status(JobStatus::DestinationGate, role, at);
                }
            },
            GateEffect::None => {
                // ensure_open guarantees a successor exists.
                let to = job.status.successor().ok_or(WorkflowError::TerminalState)?;
                next.commit_status(to, role, at);
            }
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ChargeLedger;
    use crate::state_machine::gate::GateCondition;
    use crate::state_machine::job::Address;

    fn make_job() -> Job {
        Job::dispatch(Address::default(), Address::default(), ChargeLedger::default()).unwrap()
    }

    fn at(status: JobStatus) -> Job {
        let mut job = make_job();
        job.status = status;
        job
    }

    fn step(job: &Job, role: Role) -> Result<Job, WorkflowError> {
        StateMachine::advance(job, role, None, Utc::now())
    }

    #[test]
    fn sequence_matches_index() {
        for (i, status) in JobStatus::SEQUENCE.iter().enumerate() {
            assert_eq!(status.index(), i);
        }
        assert_eq!(JobStatus::Completed.successor(), None);
        assert_eq!(
            JobStatus::Dispatched.successor(),
            Some(JobStatus::ArrivedOrigin)
        );
    }

    #[test]
    fn ungated_states_advance_for_any_role() {
        let job = make_job();
        for role in Role::ALL {
            let next = step(&job, role).unwrap();
            assert_eq!(next.status, JobStatus::ArrivedOrigin);
        }
    }

    #[test]
    fn binding_estimate_requires_office() {
        let job = at(JobStatus::BindingEstimate);
        for role in [Role::Driver, Role::Helper, Role::Warehouse, Role::Client] {
            let err = step(&job, role).unwrap_err();
            assert!(matches!(err, WorkflowError::PermissionDenied { .. }));
        }
        assert_eq!(job.status, JobStatus::BindingEstimate);

        let next = step(&job, Role::Office).unwrap();
        assert_eq!(next.status, JobStatus::OfficeVerification);
    }

    #[test]
    fn client_approval_waits_for_origin_signature() {
        let mut job = at(JobStatus::ClientApproval);
        let err = step(&job, Role::Driver).unwrap_err();
        assert_eq!(
            err,
            WorkflowError::GateBlocked {
                status: JobStatus::ClientApproval,
                condition: GateCondition::OriginSignature
            }
        );

        job.origin_signed = true;
        let next = step(&job, Role::Driver).unwrap();
        assert_eq!(next.status, JobStatus::Loading);
    }

    #[test]
    fn load_verification_waits_for_origin_signature() {
        let mut job = at(JobStatus::LoadVerification);
        assert!(matches!(
            step(&job, Role::Client),
            Err(WorkflowError::GateBlocked { .. })
        ));
        job.origin_signed = true;
        assert_eq!(step(&job, Role::Client).unwrap().status, JobStatus::InTransit);
    }

    #[test]
    fn transit_needs_office_and_a_route() {
        let job = at(JobStatus::InTransit);
        assert!(matches!(
            StateMachine::advance(&job, Role::Driver, Some(RoutingDecision::Direct), Utc::now()),
            Err(WorkflowError::PermissionDenied { .. })
        ));
        assert_eq!(step(&job, Role::Office), Err(WorkflowError::RoutingRequired));
    }

    #[test]
    fn warehouse_route_enters_custody_with_driver_liable() {
        let job = at(JobStatus::InTransit);
        let now = Utc::now();
        let next =
            StateMachine::advance(&job, Role::Office, Some(RoutingDecision::Warehouse), now)
                .unwrap();
        assert_eq!(next.status, JobStatus::WarehouseCustody);
        assert_eq!(next.custody_holder, CustodyHolder::Driver);
        assert_eq!(next.storage_entry_date, Some(now.date_naive()));
        assert_eq!(job.storage_entry_date, None);
    }

    #[test]
    fn direct_route_skips_custody() {
        let job = at(JobStatus::InTransit);
        let next =
            StateMachine::advance(&job, Role::Office, Some(RoutingDecision::Direct), Utc::now())
                .unwrap();
        assert_eq!(next.status, JobStatus::DestinationGate);
        assert!(next.history.iter().all(|t| t.to != JobStatus::WarehouseCustody));
        assert_eq!(next.storage_entry_date, None);
    }

    #[test]
    fn routing_ignored_outside_transit() {
        let job = make_job();
        let next = StateMachine::advance(
            &job,
            Role::Driver,
            Some(RoutingDecision::Warehouse),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(next.status, JobStatus::ArrivedOrigin);
    }

    #[test]
    fn warehouse_custody_only_exits_through_dispatch() {
        let job = at(JobStatus::WarehouseCustody);
        for role in Role::ALL {
            assert_eq!(
                step(&job, role),
                Err(WorkflowError::GateBlocked {
                    status: JobStatus::WarehouseCustody,
                    condition: GateCondition::OutboundDispatch
                })
            );
        }
    }

    #[test]
    fn destination_gate_blocked_until_paid_for_every_role() {
        let mut job = at(JobStatus::DestinationGate);
        for role in Role::ALL {
            assert!(matches!(
                step(&job, role),
                Err(WorkflowError::GateBlocked { .. })
            ));
        }
        job.delivery_paid = true;
        for role in Role::ALL {
            assert_eq!(step(&job, role).unwrap().status, JobStatus::Unloading);
        }
    }

    #[test]
    fn final_audit_waits_for_delivery_signature() {
        let mut job = at(JobStatus::FinalAudit);
        assert!(step(&job, Role::Office).is_err());
        job.delivery_signed = true;
        let done = step(&job, Role::Office).unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert_eq!(step(&done, Role::Office), Err(WorkflowError::TerminalState));
    }

    #[test]
    fn history_records_actor_and_edge() {
        let job = make_job();
        let next = step(&job, Role::Driver).unwrap();
        assert_eq!(next.history.len(), 1);
        assert_eq!(next.history[0].from, JobStatus::Dispatched);
        assert_eq!(next.history[0].to, JobStatus::ArrivedOrigin);
        assert_eq!(next.history[0].actor, Role::Driver);
        assert!(job.history.is_empty());
    }

    #[test]
    fn advance_only_yields_sequence_successor_or_documented_branch() {
        for status in JobStatus::SEQUENCE {
            let mut job = at(status);
            job.origin_signed = true;
            job.delivery_signed = true;
            job.delivery_paid = true;
            for route in [None, Some(RoutingDecision::Warehouse), Some(RoutingDecision::Direct)] {
                if let Ok(next) = StateMachine::advance(&job, Role::Office, route, Utc::now()) {
                    let expected = match (status, route) {
                        (JobStatus::InTransit, Some(RoutingDecision::Warehouse)) => {
                            JobStatus::WarehouseCustody
                        }
                        (JobStatus::InTransit, Some(RoutingDecision::Direct)) => {
                            JobStatus::DestinationGate
                        }
                        _ => status.successor().unwrap(),
                    };
                    assert_eq!(next.status, expected);
                }
            }
        }
    }

    #[test]
    fn state_display() {
        assert_eq!(JobStatus::Dispatched.to_string(), "DISPATCHED");
        assert_eq!(JobStatus::WarehouseCustody.to_string(), "WAREHOUSE_CUSTODY");
        assert_eq!(JobStatus::Completed.to_string(), "COMPLETED");
        assert_eq!(JobStatus::DestinationGate.label(), "Payment");
    }
}
