use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::totals::LedgerTotals;
use crate::permission::Role;

/// Crew compensation parameters. Loaded from the `[payout]` table of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutRates {
    pub driver_daily_base: Decimal,
    /// Share of overage revenue paid to the driver.
    pub driver_commission_rate: Decimal,
    pub helper_hourly_rate: Decimal,
    /// Hours credited to a helper when no labor window is logged.
    pub helper_hours: Decimal,
    pub helper_tips: Decimal,
    pub helper_on_time_bonus: Decimal,
    /// Advisory share of gross set aside for self-employment tax.
    pub tax_reserve_rate: Decimal,
}

impl Default for PayoutRates {
    fn default() -> Self {
        Self {
            driver_daily_base: Decimal::from(250),
            driver_commission_rate: Decimal::new(12, 2),
            helper_hourly_rate: Decimal::new(2250, 2),
            helper_hours: Decimal::new(675, 2),
            helper_tips: Decimal::from(40),
            helper_on_time_bonus: Decimal::from(15),
            tax_reserve_rate: Decimal::new(25, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutLine {
    pub label: String,
    pub amount: Decimal,
}

/// A settlement statement for one crew member. Display only; the ledger is untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub role: Role,
    pub lines: Vec<PayoutLine>,
    pub gross: Decimal,
    pub tax_reserve: Decimal,
    pub projected_net: Decimal,
}

impl Payout {
    fn from_lines(role: Role, lines: Vec<PayoutLine>, tax_reserve_rate: Decimal) -> Self {
        let gross: Decimal = lines.iter().map(|l| l.amount).sum();
        let tax_reserve = (gross * tax_reserve_rate).round_dp(2);
        Self {
            role,
            lines,
            gross,
            tax_reserve,
            projected_net: gross - tax_reserve,
        }
    }
}

impl PayoutRates {
    /// Daily base plus commission on the overage revenue of `totals`.
    pub fn driver(&self, totals: &LedgerTotals) -> Payout {
        let commission = (totals.overage_revenue * self.driver_commission_rate).round_dp(2);
        let pct = (self.driver_commission_rate * Decimal::from(100)).normalize();
        let lines = vec![
            PayoutLine {
                label: "Daily Base".into(),
                amount: self.driver_daily_base,
            },
            PayoutLine {
                label: format!("{pct}% Overage"),
                amount: commission,
            },
        ];
        Payout::from_lines(Role::Driver, lines, self.tax_reserve_rate)
    }

    /// Hourly wage for `hours` plus flat tips and bonus. Independent of overage.
    pub fn helper(&self, hours: Decimal) -> Payout {
        let lines = vec![
            PayoutLine {
                label: "Daily Wage".into(),
                amount: (self.helper_hourly_rate * hours).round_dp(2),
            },
            PayoutLine {
                label: "Field Tips".into(),
                amount: self.helper_tips,
            },
            PayoutLine {
                label: "On-Time Bonus".into(),
                amount: self.helper_on_time_bonus,
            },
        ];
        Payout::from_lines(Role::Helper, lines, self.tax_reserve_rate)
    }

    /// Statement for a crew role; `None` for roles that are not paid per job.
    pub fn for_role(&self, role: Role, totals: &LedgerTotals, logged_hours: Decimal) -> Option<Payout> {
        match role {
            Role::Driver => Some(self.driver(totals)),
            Role::Helper => {
                let hours = if logged_hours > Decimal::ZERO {
                    logged_hours
                } else {
                    self.helper_hours
                };
                Some(self.helper(hours))
            }
            Role::Office | Role::Warehouse | Role::Client => None,
        }
    }
}
