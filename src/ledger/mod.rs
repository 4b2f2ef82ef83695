//! Tariff engine: charge components, derived totals and crew payouts.
//!
//! Everything here is a pure function of a [`ChargeLedger`] snapshot. The
//! workflow reads [`LedgerTotals::balance_due`] when the hub clears the
//! delivery payment.

mod charges;
mod payout;
mod totals;

use serde::{Deserialize, Serialize};

pub use charges::{ChargeLedger, LaborWindow};
pub use payout::{Payout, PayoutLine, PayoutRates};
pub use totals::{LedgerTotals, compute_ledger_totals};

/// How the hourly labor line is priced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourlyBilling {
    /// men × trucks × rate, regardless of time on the clock.
    #[default]
    Flat,
    /// men × trucks × rate × hours in the logged labor windows.
    LoggedDuration,
}

/// Business policy applied when the ledger feeds the workflow gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementPolicy {
    /// Refuse to clear the delivery payment while a balance is outstanding.
    pub require_settled_balance: bool,
    pub hourly_billing: HourlyBilling,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            require_settled_balance: true,
            hourly_billing: HourlyBilling::Flat,
        }
    }
}
