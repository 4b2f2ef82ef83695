//! Built-in walkthrough: one job from dispatch to completion through the
//! warehouse route, driven by several roles through the job actor.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use tracing::info;

use movemaster::actor::{self, JobHandle};
use movemaster::config::MoveConfig;
use movemaster::inventory::{InventoryItem, group_key};
use movemaster::ledger::{ChargeLedger, LaborWindow};
use movemaster::state_machine::{
    Address, AuditRecord, Job, JobStatus, RoutingDecision, ValuationOption,
};
use movemaster::{JobDesk, MoveError, Role, WorkflowError};

use crate::ui::DemoProgress;

/// A freshly dispatched New York to Jersey City job with a 500 deposit.
pub fn sample_job() -> Result<Job, WorkflowError> {
    let customer = |street: &str, city: &str| Address {
        name: "Jonathan Wick".into(),
        street: street.into(),
        city_state_zip: city.into(),
        phone: "(212) 555-0198".into(),
    };
    let charges = ChargeLedger {
        weight_base_lbs: 2000,
        weight_base_rate: Decimal::new(50, 2),
        cubic_estimate_cu_ft: 450,
        cubic_base_cu_ft: 450,
        cubic_base_rate: Decimal::new(650, 2),
        hourly_part1: NaiveTime::from_hms_opt(8, 0, 0)
            .zip(NaiveTime::from_hms_opt(12, 0, 0))
            .map(|(start, end)| LaborWindow::new(start, end)),
        hourly_men: 3,
        hourly_trucks: 1,
        hourly_rate: Decimal::from(150),
        packing_materials: Decimal::from(120),
        fuel_surcharge: Decimal::from(85),
        stairs_origin: Decimal::from(25),
        stairs_dest: Decimal::from(25),
        partial_payments: vec![Decimal::from(500)],
        ..Default::default()
    };

    let mut job = Job::dispatch(
        customer("123 Manhattan Skyline Dr", "New York, NY 10001"),
        customer("456 Continental Ave", "Jersey City, NJ 07302"),
        charges,
    )?;
    job.pickup_date = NaiveDate::from_ymd_opt(2025, 6, 20);
    job.vehicle_id = Some("FLEET-09".into());
    job.assigned_helpers = vec!["Marcus L.".into(), "Riley T.".into()];
    job.valuation_option = ValuationOption::FullValueProtection;
    job.inventory = vec![
        InventoryItem::new("Vintage Armchair", "Pre-existing scratch on leg"),
        InventoryItem::new("75\" OLED TV", "Mint"),
        InventoryItem::new("Dining Table", "Minor scratches"),
    ];
    Ok(job)
}

// Rejections the walkthrough provokes on purpose are shown, not propagated.
fn expect_rejection(progress: &DemoProgress, result: Result<Job, MoveError>) -> Result<(), MoveError> {
    match result {
        Err(MoveError::Workflow(e)) => {
            progress.note(&e.to_string());
            Ok(())
        }
        Err(other) => Err(other),
        Ok(job) => {
            progress.update(&job);
            Ok(())
        }
    }
}

async fn step(
    handle: &JobHandle,
    progress: &DemoProgress,
    role: Role,
    routing: Option<RoutingDecision>,
) -> Result<Job, MoveError> {
    let job = handle.advance(role, routing).await?;
    progress.update(&job);
    Ok(job)
}

/// Run the full walkthrough and return the completion audit.
pub async fn run(config: &MoveConfig) -> Result<AuditRecord, MoveError> {
    let job = sample_job()?;
    info!(job_id = %job.id, "demo started");
    let (handle, task) = actor::spawn(JobDesk::from_config(job, config)?);
    let progress = DemoProgress::start();

    // Origin: arrival, survey and bulk inventory.
    step(&handle, &progress, Role::Driver, None).await?;
    step(&handle, &progress, Role::Driver, None).await?;
    handle
        .call(|desk| desk.add_inventory(Role::Driver, "Box", None, 12))
        .await??;
    step(&handle, &progress, Role::Driver, None).await?;

    // Rate lock belongs to the hub.
    expect_rejection(&progress, handle.advance(Role::Driver, None).await)?;
    step(&handle, &progress, Role::Office, None).await?;
    step(&handle, &progress, Role::Office, None).await?;

    // Liability gate.
    expect_rejection(&progress, handle.advance(Role::Driver, None).await)?;
    handle.record_origin_signature(Role::Client).await?;
    step(&handle, &progress, Role::Driver, None).await?;

    let key = group_key("Box", movemaster::inventory::PACKED_BY_OWNER);
    handle
        .call(move |desk| desk.verify_inventory_group(Role::Driver, &key, true))
        .await??;
    step(&handle, &progress, Role::Driver, None).await?;
    step(&handle, &progress, Role::Driver, None).await?;
    handle.clear_pickup_payment(Role::Office).await?;

    // Routing into storage.
    expect_rejection(&progress, handle.advance(Role::Office, None).await)?;
    step(&handle, &progress, Role::Office, Some(RoutingDecision::Warehouse)).await?;

    // Custody handoff.
    expect_rejection(&progress, handle.record_warehouse_handshake(Role::Warehouse).await)?;
    handle.record_warehouse_arrival(Role::Driver).await?;
    handle.record_warehouse_handshake(Role::Warehouse).await?;
    expect_rejection(&progress, handle.dispatch_from_warehouse(Role::Office).await)?;
    let outbound = NaiveDate::from_ymd_opt(2025, 7, 5)
        .ok_or_else(|| MoveError::Config("invalid outbound date".into()))?;
    handle.schedule_outbound(outbound).await?;
    let job = handle.dispatch_from_warehouse(Role::Office).await?;
    progress.update(&job);

    // No pay, no key.
    expect_rejection(&progress, handle.clear_delivery_payment(Role::Office).await)?;
    let balance = handle.ledger_totals().await?.balance_due;
    if balance > Decimal::ZERO {
        handle.register_payment(balance).await?;
    }
    handle.clear_delivery_payment(Role::Office).await?;
    step(&handle, &progress, Role::Driver, None).await?;
    step(&handle, &progress, Role::Driver, None).await?;

    // Completion gate.
    handle.record_delivery_signature(Role::Client).await?;
    let done = step(&handle, &progress, Role::Driver, None).await?;
    progress.finish();

    let audit = handle.audit().await?;
    drop(handle);
    let _ = task.await;
    info!(job_id = %done.id, status = %JobStatus::Completed, "demo finished");
    Ok(audit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use movemaster::compute_ledger_totals;

    #[test]
    fn sample_job_totals() {
        let job = sample_job().unwrap();
        let totals = compute_ledger_totals(&job.charges).unwrap();
        assert_eq!(totals.grand_total, Decimal::from(4630));
        assert_eq!(totals.balance_due, Decimal::from(4130));
        assert_eq!(job.inventory.len(), 3);
        assert_eq!(job.status, JobStatus::Dispatched);
        assert_eq!(job.assigned_helpers.len(), 2);
    }

    #[tokio::test]
    async fn demo_reaches_completion_via_warehouse() {
        let audit = run(&MoveConfig::default()).await.unwrap();
        assert_eq!(audit.status, JobStatus::Completed);
        assert!(audit.routed_via_warehouse);
        assert_eq!(audit.signatures, 2);
        assert!(audit.pickup_paid && audit.delivery_paid);
        assert_eq!(audit.payments_received, 2);
        assert_eq!(audit.transitions.len(), 13);
    }
}
