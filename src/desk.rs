//! Single-writer owner of one job.
//!
//! [`JobDesk`] is the surface consumed by the presentation, assistant and
//! calendar layers. Each operation computes a new snapshot from the current
//! one and commits it only on success; a rejection leaves the job untouched.
//! Mutation takes `&mut self`, so concurrent callers must go through a single
//! owner such as [`crate::actor::JobHandle`].

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::config::MoveConfig;
use crate::custody::{self, CustodyStage};
use crate::error::WorkflowError;
use crate::inventory::{self, InventoryGroup};
use crate::ledger::{ChargeLedger, LedgerTotals, Payout, PayoutRates, SettlementPolicy};
use crate::permission::Role;
use crate::state_machine::{
    AuditRecord, BoardStep, Job, RoutingDecision, StateMachine, gate, signoff,
};

pub struct JobDesk {
    job: Job,
    policy: SettlementPolicy,
    rates: PayoutRates,
}

impl JobDesk {
    /// Take ownership of `job`, refusing a ledger whose totals cannot be computed.
    pub fn new(job: Job, policy: SettlementPolicy, rates: PayoutRates) -> Result<Self, WorkflowError> {
        job.charges.validate()?;
        Ok(Self { job, policy, rates })
    }

    pub fn from_config(job: Job, config: &MoveConfig) -> Result<Self, WorkflowError> {
        Self::new(job, config.policy, config.payout.clone())
    }

    /// Read snapshot of the job.
    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn into_job(self) -> Job {
        self.job
    }

    pub fn policy(&self) -> &SettlementPolicy {
        &self.policy
    }

    fn apply<F>(&mut self, op: &'static str, role: Option<Role>, f: F) -> Result<Job, WorkflowError>
    where
        F: FnOnce(&Job) -> Result<Job, WorkflowError>,
    {
        match f(&self.job) {
            Ok(next) => {
                if next.status != self.job.status {
                    info!(
                        job_id = %next.id,
                        op,
                        from = %self.job.status,
                        to = %next.status,
                        custody = %next.custody_holder,
                        "transition committed"
                    );
                } else {
                    info!(job_id = %next.id, op, status = %next.status, "job updated");
                }
                self.job = next;
                Ok(self.job.clone())
            }
            Err(e) => {
                warn!(
                    job_id = %self.job.id,
                    op,
                    role = ?role,
                    status = %self.job.status,
                    error = %e,
                    "operation rejected"
                );
                Err(e)
            }
        }
    }

    pub fn advance(
        &mut self,
        role: Role,
        routing: Option<RoutingDecision>,
    ) -> Result<Job, WorkflowError> {
        self.apply("advance", Some(role), |job| {
            StateMachine::advance(job, role, routing, Utc::now())
        })
    }

    pub fn record_origin_signature(&mut self, role: Role) -> Result<Job, WorkflowError> {
        self.apply("sign_origin", Some(role), |job| {
            signoff::record_origin_signature(job, role, Utc::now())
        })
    }

    pub fn record_delivery_signature(&mut self, role: Role) -> Result<Job, WorkflowError> {
        self.apply("sign_delivery", Some(role), |job| {
            signoff::record_delivery_signature(job, role, Utc::now())
        })
    }

    pub fn register_payment(&mut self, amount: Decimal) -> Result<Job, WorkflowError> {
        self.apply("register_payment", None, |job| {
            signoff::register_payment(job, amount, Utc::now())
        })
    }

    pub fn clear_pickup_payment(&mut self, role: Role) -> Result<Job, WorkflowError> {
        self.apply("clear_pickup_payment", Some(role), |job| {
            signoff::clear_pickup_payment(job, role, Utc::now())
        })
    }

    pub fn clear_delivery_payment(&mut self, role: Role) -> Result<Job, WorkflowError> {
        let policy = self.policy;
        self.apply("clear_delivery_payment", Some(role), |job| {
            signoff::clear_delivery_payment(job, role, &policy, Utc::now())
        })
    }

    pub fn revise_charges(
        &mut self,
        role: Role,
        revised: ChargeLedger,
    ) -> Result<Job, WorkflowError> {
        self.apply("revise_charges", Some(role), |job| {
            signoff::revise_charges(job, role, revised, Utc::now())
        })
    }

    pub fn record_warehouse_arrival(&mut self, role: Role) -> Result<Job, WorkflowError> {
        self.apply("warehouse_arrival", Some(role), |job| {
            custody::record_arrival(job, role, Utc::now())
        })
    }

    pub fn record_warehouse_handshake(&mut self, role: Role) -> Result<Job, WorkflowError> {
        self.apply("warehouse_handshake", Some(role), |job| {
            custody::record_handshake(job, role, Utc::now())
        })
    }

    pub fn schedule_outbound(&mut self, date: NaiveDate) -> Result<Job, WorkflowError> {
        self.apply("schedule_outbound", None, |job| {
            custody::schedule_outbound(job, date, Utc::now())
        })
    }

    pub fn dispatch_from_warehouse(&mut self, role: Role) -> Result<Job, WorkflowError> {
        self.apply("dispatch_from_warehouse", Some(role), |job| {
            custody::dispatch_from_warehouse(job, role, Utc::now())
        })
    }

    pub fn add_inventory(
        &mut self,
        role: Role,
        name: &str,
        condition: Option<&str>,
        quantity: u32,
    ) -> Result<Job, WorkflowError> {
        self.apply("add_inventory", Some(role), |job| {
            inventory::add_items(job, role, name, condition, quantity, Utc::now())
        })
    }

    pub fn verify_inventory_group(
        &mut self,
        role: Role,
        key: &str,
        verified: bool,
    ) -> Result<Job, WorkflowError> {
        self.apply("verify_inventory", Some(role), |job| {
            inventory::set_group_verified(job, role, key, verified, Utc::now())
        })
    }

    pub fn edit_inventory_group(
        &mut self,
        role: Role,
        key: &str,
        name: &str,
        condition: &str,
    ) -> Result<Job, WorkflowError> {
        self.apply("edit_inventory", Some(role), |job| {
            inventory::edit_group(job, role, key, name, condition, Utc::now())
        })
    }

    pub fn delete_inventory_group(&mut self, role: Role, key: &str) -> Result<Job, WorkflowError> {
        self.apply("delete_inventory", Some(role), |job| {
            inventory::delete_group(job, role, key, Utc::now())
        })
    }

    /// Totals under the configured hourly billing policy.
    pub fn ledger_totals(&self) -> Result<LedgerTotals, WorkflowError> {
        let totals = LedgerTotals::compute_with(&self.job.charges, self.policy.hourly_billing)?;
        debug!(
            job_id = %self.job.id,
            grand_total = %totals.grand_total,
            balance_due = %totals.balance_due,
            "ledger computed"
        );
        Ok(totals)
    }

    pub fn payout(&self, role: Role) -> Result<Option<Payout>, WorkflowError> {
        let totals = self.ledger_totals()?;
        Ok(self
            .rates
            .for_role(role, &totals, self.job.charges.logged_hours()))
    }

    pub fn inventory_groups(&self) -> Vec<InventoryGroup> {
        inventory::groups(&self.job.inventory)
    }

    pub fn gate_board(&self, role: Role) -> Vec<BoardStep> {
        gate::board(&self.job, role)
    }

    pub fn custody_stage(&self) -> CustodyStage {
        custody::stage(&self.job)
    }

    pub fn audit(&self) -> AuditRecord {
        AuditRecord::from_job(&self.job)
    }
}
