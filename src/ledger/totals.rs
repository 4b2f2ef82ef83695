use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::HourlyBilling;
use super::charges::ChargeLedger;
use crate::error::WorkflowError;

/// Aggregate figures derived from a [`ChargeLedger`]. Never stored; always recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub weight_total: Decimal,
    pub cubic_total: Decimal,
    pub hourly_total: Decimal,
    pub packing_total: Decimal,
    pub other_total: Decimal,
    pub storage_total: Decimal,
    pub grand_total: Decimal,
    pub total_paid: Decimal,
    pub balance_due: Decimal,
    /// Measured volume above the estimate, never negative.
    pub overage_cu_ft: u32,
    pub overage_revenue: Decimal,
}

// Checked `Decimal` arithmetic; `what` names the total being built.
fn add(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, WorkflowError> {
    a.checked_add(b).ok_or(WorkflowError::AmountOverflow(what))
}

fn mul(a: Decimal, b: Decimal, what: &'static str) -> Result<Decimal, WorkflowError> {
    a.checked_mul(b).ok_or(WorkflowError::AmountOverflow(what))
}

fn sum<I>(values: I, what: &'static str) -> Result<Decimal, WorkflowError>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| add(acc, v, what))
}

impl LedgerTotals {
    /// Totals with the flat hourly line (men × trucks × rate).
    pub fn compute(ledger: &ChargeLedger) -> Result<Self, WorkflowError> {
        Self::compute_with(ledger, HourlyBilling::Flat)
    }

    /// Every sum and product is checked, so an oversized ledger yields
    /// `AmountOverflow` instead of a panic.
    pub fn compute_with(ledger: &ChargeLedger, billing: HourlyBilling) -> Result<Self, WorkflowError> {
        let l = ledger;

        let weight_total = add(
            mul(Decimal::from(l.weight_base_lbs), l.weight_base_rate, "weight")?,
            mul(Decimal::from(l.weight_add_lbs), l.weight_add_rate, "weight")?,
            "weight",
        )?;
        let cubic_total = add(
            mul(Decimal::from(l.cubic_base_cu_ft), l.cubic_base_rate, "cubic")?,
            mul(Decimal::from(l.cubic_add_cu_ft), l.cubic_add_rate, "cubic")?,
            "cubic",
        )?;

        let crew = mul(
            Decimal::from(l.hourly_men) * Decimal::from(l.hourly_trucks),
            l.hourly_rate,
            "hourly",
        )?;
        let hourly_total = match billing {
            HourlyBilling::Flat => crew,
            HourlyBilling::LoggedDuration => mul(crew, l.logged_hours(), "hourly")?,
        };

        let packing_total = sum(
            [l.packing_materials, l.full_packing_service, l.packing_other],
            "packing",
        )?;
        let other_total = sum(
            [
                l.fuel_surcharge,
                l.stairs_origin,
                l.stairs_dest,
                l.long_carry_origin,
                l.long_carry_dest,
                l.shuttle_origin,
                l.shuttle_dest,
                l.bulky_item,
                l.split_stop_off,
                l.special_service,
                l.valuation_charge,
            ],
            "other services",
        )?;

        let storage_total = if l.storage_days > 0 {
            add(
                mul(Decimal::from(l.storage_cu_ft), l.storage_rate, "storage")?,
                l.storage_other,
                "storage",
            )?
        } else {
            Decimal::ZERO
        };

        let grand_total = sum(
            [
                weight_total,
                cubic_total,
                hourly_total,
                packing_total,
                other_total,
                storage_total,
            ],
            "grand total",
        )?;
        let total_paid = l.total_paid()?;
        let balance_due = grand_total
            .checked_sub(total_paid)
            .and_then(|d| d.checked_add(l.price_adjustment))
            .ok_or(WorkflowError::AmountOverflow("balance due"))?;

        let overage_cu_ft = l.cubic_base_cu_ft.saturating_sub(l.cubic_estimate_cu_ft);
        let overage_revenue = mul(Decimal::from(overage_cu_ft), l.cubic_base_rate, "overage")?;

        Ok(Self {
            weight_total,
            cubic_total,
            hourly_total,
            packing_total,
            other_total,
            storage_total,
            grand_total,
            total_paid,
            balance_due,
            overage_cu_ft,
            overage_revenue,
        })
    }

    pub fn is_settled(&self) -> bool {
        self.balance_due <= Decimal::ZERO
    }
}

/// Free-function form of [`LedgerTotals::compute`].
pub fn compute_ledger_totals(ledger: &ChargeLedger) -> Result<LedgerTotals, WorkflowError> {
    LedgerTotals::compute(ledger)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LaborWindow;
    use chrono::NaiveTime;

    fn reference_ledger() -> ChargeLedger {
        ChargeLedger {
            weight_base_lbs: 2000,
            weight_base_rate: Decimal::new(50, 2),
            cubic_estimate_cu_ft: 450,
            cubic_base_cu_ft: 450,
            cubic_base_rate: Decimal::new(650, 2),
            hourly_men: 3,
            hourly_trucks: 1,
            hourly_rate: Decimal::from(150),
            fuel_surcharge: Decimal::from(85),
            stairs_origin: Decimal::from(25),
            partial_payments: vec![Decimal::from(500)],
            ..Default::default()
        }
    }

    #[test]
    fn reference_job_totals() {
        let t = compute_ledger_totals(&reference_ledger()).unwrap();
        assert_eq!(t.weight_total, Decimal::from(1000));
        assert_eq!(t.cubic_total, Decimal::from(2925));
        assert_eq!(t.hourly_total, Decimal::from(450));
        assert_eq!(t.packing_total, Decimal::ZERO);
        assert_eq!(t.other_total, Decimal::from(110));
        assert_eq!(t.storage_total, Decimal::ZERO);
        assert_eq!(t.grand_total, Decimal::from(4485));
        assert_eq!(t.total_paid, Decimal::from(500));
        assert_eq!(t.balance_due, Decimal::from(3985));
        assert_eq!(t.overage_cu_ft, 0);
        assert!(!t.is_settled());
    }

    #[test]
    fn compute_is_pure() {
        let ledger = reference_ledger();
        let snapshot = ledger.clone();
        assert_eq!(LedgerTotals::compute(&ledger).unwrap(), LedgerTotals::compute(&ledger).unwrap());
        assert_eq!(ledger, snapshot);
    }

    #[test]
    fn overage_against_estimate() {
        let ledger = ChargeLedger {
            cubic_estimate_cu_ft: 450,
            cubic_base_cu_ft: 500,
            cubic_base_rate: Decimal::new(650, 2),
            ..Default::default()
        };
        let t = LedgerTotals::compute(&ledger).unwrap();
        assert_eq!(t.overage_cu_ft, 50);
        assert_eq!(t.overage_revenue, Decimal::new(32500, 2));
    }

    #[test]
    fn overage_never_negative() {
        let ledger = ChargeLedger {
            cubic_estimate_cu_ft: 600,
            cubic_base_cu_ft: 500,
            cubic_base_rate: Decimal::new(650, 2),
            ..Default::default()
        };
        let t = LedgerTotals::compute(&ledger).unwrap();
        assert_eq!(t.overage_cu_ft, 0);
        assert_eq!(t.overage_revenue, Decimal::ZERO);
    }

    #[test]
    fn storage_counts_only_with_days() {
        let mut ledger = ChargeLedger {
            storage_cu_ft: 450,
            storage_rate: Decimal::from(2),
            storage_other: Decimal::from(50),
            ..Default::default()
        };
        assert_eq!(LedgerTotals::compute(&ledger).unwrap().storage_total, Decimal::ZERO);
        ledger.storage_days = 30;
        assert_eq!(LedgerTotals::compute(&ledger).unwrap().storage_total, Decimal::from(950));
    }

    #[test]
    fn price_adjustment_moves_balance_both_ways() {
        let mut ledger = reference_ledger();
        ledger.price_adjustment = Decimal::from(-485);
        assert_eq!(LedgerTotals::compute(&ledger).unwrap().balance_due, Decimal::from(3500));
        ledger.price_adjustment = Decimal::from(15);
        assert_eq!(LedgerTotals::compute(&ledger).unwrap().balance_due, Decimal::from(4000));
    }

    #[test]
    fn settled_when_paid_in_full() {
        let mut ledger = reference_ledger();
        ledger.partial_payments.push(Decimal::from(3985));
        let t = LedgerTotals::compute(&ledger).unwrap();
        assert_eq!(t.balance_due, Decimal::ZERO);
        assert!(t.is_settled());
    }

    #[test]
    fn logged_duration_multiplies_hourly_line() {
        let mut ledger = reference_ledger();
        ledger.hourly_part1 = Some(LaborWindow::new(
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        ));
        let flat = LedgerTotals::compute_with(&ledger, HourlyBilling::Flat).unwrap();
        let timed = LedgerTotals::compute_with(&ledger, HourlyBilling::LoggedDuration).unwrap();
        assert_eq!(flat.hourly_total, Decimal::from(450));
        assert_eq!(timed.hourly_total, Decimal::from(1800));
        assert_eq!(timed.grand_total - flat.grand_total, Decimal::from(1350));
    }

    #[test]
    fn oversized_payments_report_overflow() {
        let ledger = ChargeLedger {
            partial_payments: vec![Decimal::MAX, Decimal::MAX],
            ..Default::default()
        };
        assert_eq!(
            LedgerTotals::compute(&ledger),
            Err(WorkflowError::AmountOverflow("payments"))
        );
    }

    #[test]
    fn oversized_rate_reports_overflow() {
        let ledger = ChargeLedger {
            weight_base_lbs: 2000,
            weight_base_rate: Decimal::MAX,
            ..Default::default()
        };
        assert_eq!(
            LedgerTotals::compute(&ledger),
            Err(WorkflowError::AmountOverflow("weight"))
        );
    }
}
