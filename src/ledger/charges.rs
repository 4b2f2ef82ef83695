use chrono::{NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::HourlyBilling;
use super::totals::LedgerTotals;
use crate::error::WorkflowError;

/// A labor window on the hourly line, e.g. 08:00 to 12:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl LaborWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Length of the window in hours. An end before the start wraps past midnight.
    pub fn hours(&self) -> Decimal {
        let mut delta = self.end - self.start;
        if delta < TimeDelta::zero() {
            delta = delta + TimeDelta::days(1);
        }
        Decimal::from(delta.num_minutes()) / Decimal::from(60)
    }
}

/// Every independently priced component of a job's tariff.
///
/// Quantities are unsigned; money is `Decimal` and must be non-negative,
/// except `price_adjustment` which is a signed discount or surcharge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeLedger {
    pub weight_base_lbs: u32,
    pub weight_base_rate: Decimal,
    pub weight_add_lbs: u32,
    pub weight_add_rate: Decimal,

    /// Volume quoted before the survey; the overage baseline.
    pub cubic_estimate_cu_ft: u32,
    /// Volume actually measured and billed.
    pub cubic_base_cu_ft: u32,
    pub cubic_base_rate: Decimal,
    pub cubic_add_cu_ft: u32,
    pub cubic_add_rate: Decimal,

    pub hourly_part1: Option<LaborWindow>,
    pub hourly_part2: Option<LaborWindow>,
    pub hourly_men: u32,
    pub hourly_trucks: u32,
    pub hourly_rate: Decimal,

    pub packing_materials: Decimal,
    pub full_packing_service: Decimal,
    pub packing_other: Decimal,

    pub fuel_surcharge: Decimal,
    pub stairs_origin: Decimal,
    pub stairs_dest: Decimal,
    pub long_carry_origin: Decimal,
    pub long_carry_dest: Decimal,
    pub shuttle_origin: Decimal,
    pub shuttle_dest: Decimal,
    pub bulky_item: Decimal,
    pub split_stop_off: Decimal,
    pub special_service: Decimal,
    pub valuation_charge: Decimal,

    pub storage_days: u32,
    pub storage_cu_ft: u32,
    pub storage_rate: Decimal,
    pub storage_other: Decimal,

    /// Append-only record of money received.
    pub partial_payments: Vec<Decimal>,
    pub price_adjustment: Decimal,
}

impl ChargeLedger {
    fn money_fields(&self) -> [(&'static str, Decimal); 21] {
        [
            ("weight_base_rate", self.weight_base_rate),
            ("weight_add_rate", self.weight_add_rate),
            ("cubic_base_rate", self.cubic_base_rate),
            ("cubic_add_rate", self.cubic_add_rate),
            ("hourly_rate", self.hourly_rate),
            ("packing_materials", self.packing_materials),
            ("full_packing_service", self.full_packing_service),
            ("packing_other", self.packing_other),
            ("fuel_surcharge", self.fuel_surcharge),
            ("stairs_origin", self.stairs_origin),
            ("stairs_dest", self.stairs_dest),
            ("long_carry_origin", self.long_carry_origin),
            ("long_carry_dest", self.long_carry_dest),
            ("shuttle_origin", self.shuttle_origin),
            ("shuttle_dest", self.shuttle_dest),
            ("bulky_item", self.bulky_item),
            ("split_stop_off", self.split_stop_off),
            ("special_service", self.special_service),
            ("valuation_charge", self.valuation_charge),
            ("storage_rate", self.storage_rate),
            ("storage_other", self.storage_other),
        ]
    }

    /// Reject any negative money field (`price_adjustment` is exempt), any
    /// non-positive payment, and any ledger whose totals overflow under
    /// either hourly billing mode.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if let Some(&(field, _)) = self
            .money_fields()
            .iter()
            .find(|(_, v)| *v < Decimal::ZERO)
        {
            return Err(WorkflowError::InvalidCharge { field });
        }
        if self.partial_payments.iter().any(|p| *p <= Decimal::ZERO) {
            return Err(WorkflowError::InvalidCharge {
                field: "partial_payments",
            });
        }
        for billing in [HourlyBilling::Flat, HourlyBilling::LoggedDuration] {
            LedgerTotals::compute_with(self, billing)?;
        }
        Ok(())
    }

    pub fn total_paid(&self) -> Result<Decimal, WorkflowError> {
        self.partial_payments
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(*p))
            .ok_or(WorkflowError::AmountOverflow("payments"))
    }

    /// Hours covered by the recorded labor windows.
    pub fn logged_hours(&self) -> Decimal {
        [self.hourly_part1, self.hourly_part2]
            .iter()
            .flatten()
            .map(LaborWindow::hours)
            .sum()
    }

    /// Append a received payment. Prior entries are never edited, and a
    /// payment that would push the totals past `Decimal` range is refused.
    pub fn register_payment(&self, amount: Decimal) -> Result<ChargeLedger, WorkflowError> {
        if amount <= Decimal::ZERO {
            return Err(WorkflowError::InvalidAmount(amount));
        }
        let mut next = self.clone();
        next.partial_payments.push(amount);
        next.validate()?;
        Ok(next)
    }

    /// Take every priced component from `revised`, keeping this ledger's payment trail.
    pub fn revise(&self, revised: ChargeLedger) -> Result<ChargeLedger, WorkflowError> {
        let next = ChargeLedger {
            partial_payments: self.partial_payments.clone(),
            ..revised
        };
        next.validate()?;
        Ok(next)
    }
}
