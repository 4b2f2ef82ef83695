//! Signature and payment flags that feed the liability, handoff, financial
//! and completion gates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::job::Job;
use super::state::JobStatus;
use crate::error::WorkflowError;
use crate::ledger::{ChargeLedger, LedgerTotals, SettlementPolicy};
use crate::permission::{self, Action, Role};

/// Client signs the bill of lading at origin, either at the approval gate
/// or while the load is being verified. Signing again is a no-op.
pub fn record_origin_signature(
    job: &Job,
    role: Role,
    at: DateTime<Utc>,
) -> Result<Job, WorkflowError> {
    job.ensure_open()?;
    permission::authorize(role, Action::SignOrigin)?;
    if !matches!(
        job.status,
        JobStatus::ClientApproval | JobStatus::LoadVerification
    ) {
        return Err(WorkflowError::WrongState {
            expected: "CLIENT_APPROVAL or LOAD_VERIFICATION",
            actual: job.status,
        });
    }
    let mut next = job.clone();
    if !next.origin_signed {
        next.origin_signed = true;
        next.updated_at = at;
    }
    Ok(next)
}

/// Client signs the final delivery receipt during the final audit.
/// Signing again is a no-op.
pub fn record_delivery_signature(
    job: &Job,
    role: Role,
    at: DateTime<Utc>,
) -> Result<Job, WorkflowError> {
    job.ensure_open()?;
    permission::authorize(role, Action::SignDelivery)?;
    job.ensure_status(JobStatus::FinalAudit, "FINAL_AUDIT")?;
    let mut next = job.clone();
    if !next.delivery_signed {
        next.delivery_signed = true;
        next.updated_at = at;
    }
    Ok(next)
}

/// Append a payment to the job's ledger.
pub fn register_payment(job: &Job, amount: Decimal, at: DateTime<Utc>) -> Result<Job, WorkflowError> {
    job.ensure_open()?;
    let charges = job.charges.register_payment(amount)?;
    let mut next = job.clone();
    next.charges = charges;
    next.updated_at = at;
    Ok(next)
}

/// Hub confirms the pickup portion was collected.
pub fn clear_pickup_payment(
    job: &Job,
    role: Role,
    at: DateTime<Utc>,
) -> Result<Job, WorkflowError> {
    job.ensure_open()?;
    permission::authorize(role, Action::ClearPayment)?;
    let mut next = job.clone();
    next.pickup_paid = true;
    next.updated_at = at;
    Ok(next)
}

/// Hub verifies funds at the destination gate ("no pay, no key").
///
/// Under a policy requiring a settled balance, any positive balance due
/// refuses the clearance and reports the outstanding amount.
pub fn clear_delivery_payment(
    job: &Job,
    role: Role,
    policy: &SettlementPolicy,
    at: DateTime<Utc>,
) -> Result<Job, WorkflowError> {
    job.ensure_open()?;
    permission::authorize(role, Action::ClearPayment)?;
    job.ensure_status(JobStatus::DestinationGate, "DESTINATION_GATE")?;
    if policy.require_settled_balance {
        let totals = LedgerTotals::compute_with(&job.charges, policy.hourly_billing)?;
        if !totals.is_settled() {
            return Err(WorkflowError::BalanceOutstanding(totals.balance_due));
        }
    }
    let mut next = job.clone();
    next.delivery_paid = true;
    next.updated_at = at;
    Ok(next)
}

/// Replace the priced components of the ledger, keeping the payment trail.
pub fn revise_charges(
    job: &Job,
    role: Role,
    revised: ChargeLedger,
    at: DateTime<Utc>,
) -> Result<Job, WorkflowError> {
    job.ensure_open()?;
    permission::authorize(role, Action::EditCharges)?;
    let charges = job.charges.revise(revised)?;
    let mut next = job.clone();
    next.charges = charges;
    next.updated_at = at;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::HourlyBilling;
    use crate::state_machine::job::Address;

    fn make_job() -> Job {
        let charges = ChargeLedger {
            fuel_surcharge: Decimal::from(100),
            ..Default::default()
        };
        Job::dispatch(Address::default(), Address::default(), charges).unwrap()
    }

    #[test]
    fn only_client_signs() {
        let mut job = make_job();
        job.status = JobStatus::ClientApproval;
        assert!(matches!(
            record_origin_signature(&job, Role::Driver, Utc::now()),
            Err(WorkflowError::PermissionDenied { .. })
        ));
        let signed = record_origin_signature(&job, Role::Client, Utc::now()).unwrap();
        assert!(signed.origin_signed);
        assert!(!job.origin_signed);

        let again = record_origin_signature(&signed, Role::Client, Utc::now()).unwrap();
        assert_eq!(again, signed);
    }

    #[test]
    fn origin_signature_only_at_approval_or_load_check() {
        let mut job = make_job();
        assert_eq!(
            record_origin_signature(&job, Role::Client, Utc::now()),
            Err(WorkflowError::WrongState {
                expected: "CLIENT_APPROVAL or LOAD_VERIFICATION",
                actual: JobStatus::Dispatched
            })
        );
        job.status = JobStatus::InTransit;
        assert!(record_origin_signature(&job, Role::Client, Utc::now()).is_err());
        job.status = JobStatus::LoadVerification;
        assert!(record_origin_signature(&job, Role::Client, Utc::now()).unwrap().origin_signed);
    }

    #[test]
    fn delivery_signature_only_at_final_audit() {
        let mut job = make_job();
        assert_eq!(
            record_delivery_signature(&job, Role::Client, Utc::now()),
            Err(WorkflowError::WrongState {
                expected: "FINAL_AUDIT",
                actual: JobStatus::Dispatched
            })
        );
        assert!(!job.delivery_signed);
        job.status = JobStatus::FinalAudit;
        let signed = record_delivery_signature(&job, Role::Client, Utc::now()).unwrap();
        assert!(signed.delivery_signed);
    }

    #[test]
    fn delivery_signature_rejected_after_completion() {
        let mut job = make_job();
        job.status = JobStatus::Completed;
        assert_eq!(
            record_delivery_signature(&job, Role::Client, Utc::now()),
            Err(WorkflowError::TerminalState)
        );
    }

    #[test]
    fn register_payment_leaves_job_untouched_on_failure() {
        let job = make_job();
        assert_eq!(
            register_payment(&job, Decimal::from(-5), Utc::now()),
            Err(WorkflowError::InvalidAmount(Decimal::from(-5)))
        );
        assert!(job.charges.partial_payments.is_empty());
        let paid = register_payment(&job, Decimal::from(40), Utc::now()).unwrap();
        assert_eq!(paid.charges.partial_payments, vec![Decimal::from(40)]);
    }

    #[test]
    fn delivery_clearance_requires_destination_gate() {
        let job = make_job();
        let err = clear_delivery_payment(&job, Role::Office, &SettlementPolicy::default(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::WrongState { .. }));
    }

    #[test]
    fn delivery_clearance_on_completed_job_is_terminal_for_any_role() {
        let mut job = make_job();
        job.status = JobStatus::Completed;
        let policy = SettlementPolicy::default();
        for role in [Role::Driver, Role::Office] {
            assert_eq!(
                clear_delivery_payment(&job, role, &policy, Utc::now()),
                Err(WorkflowError::TerminalState)
            );
        }
    }

    #[test]
    fn delivery_clearance_refused_with_balance_outstanding() {
        let mut job = make_job();
        job.status = JobStatus::DestinationGate;
        let policy = SettlementPolicy::default();
        assert_eq!(
            clear_delivery_payment(&job, Role::Office, &policy, Utc::now()),
            Err(WorkflowError::BalanceOutstanding(Decimal::from(100)))
        );

        let paid = register_payment(&job, Decimal::from(100), Utc::now()).unwrap();
        let cleared = clear_delivery_payment(&paid, Role::Office, &policy, Utc::now()).unwrap();
        assert!(cleared.delivery_paid);
    }

    #[test]
    fn lenient_policy_clears_partial_payment() {
        let mut job = make_job();
        job.status = JobStatus::DestinationGate;
        let policy = SettlementPolicy {
            require_settled_balance: false,
            hourly_billing: HourlyBilling::Flat,
        };
        let cleared = clear_delivery_payment(&job, Role::Office, &policy, Utc::now()).unwrap();
        assert!(cleared.delivery_paid);
    }

    #[test]
    fn only_office_clears_payments() {
        let mut job = make_job();
        job.status = JobStatus::DestinationGate;
        let policy = SettlementPolicy {
            require_settled_balance: false,
            hourly_billing: HourlyBilling::Flat,
        };
        assert!(matches!(
            clear_delivery_payment(&job, Role::Driver, &policy, Utc::now()),
            Err(WorkflowError::PermissionDenied { .. })
        ));
        assert!(clear_pickup_payment(&job, Role::Client, Utc::now()).is_err());
        assert!(clear_pickup_payment(&job, Role::Office, Utc::now()).unwrap().pickup_paid);
    }

    #[test]
    fn revise_charges_keeps_payments() {
        let job = register_payment(&make_job(), Decimal::from(50), Utc::now()).unwrap();
        let revised = ChargeLedger {
            fuel_surcharge: Decimal::from(120),
            ..Default::default()
        };
        assert!(revise_charges(&job, Role::Driver, revised.clone(), Utc::now()).is_err());
        let next = revise_charges(&job, Role::Office, revised, Utc::now()).unwrap();
        assert_eq!(next.charges.fuel_surcharge, Decimal::from(120));
        assert_eq!(next.charges.partial_payments, vec![Decimal::from(50)]);
    }
}
