//! Commission models
//!
//! A technician earns a percentage of the service work they complete. Each
//! commission row snapshots the employee's rate and the base amount at
//! calculation time, and is settled individually.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A commission owed to an employee for a service order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commission {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub service_order_id: Uuid,
    /// Percentage rate snapshotted from the employee at calculation time
    pub rate: Decimal,
    /// Order amount the commission was calculated from
    pub based_on_amount: Decimal,
    pub amount: Decimal,
    pub paid: bool,
    pub paid_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Commission owed on a base amount at a percentage rate, rounded to cents.
pub fn commission_amount(base: Decimal, rate: Decimal) -> Decimal {
    (base * rate / Decimal::ONE_HUNDRED).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn amount_is_percentage_of_base() {
        assert_eq!(commission_amount(dec("200.00"), dec("10.00")), dec("20.00"));
        assert_eq!(commission_amount(dec("150.00"), dec("7.50")), dec("11.25"));
    }

    #[test]
    fn zero_rate_earns_nothing() {
        assert_eq!(commission_amount(dec("500.00"), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn amount_rounds_to_cents() {
        // 33.33% of 100.00 = 33.3300, kept at two decimal places
        assert_eq!(commission_amount(dec("100.00"), dec("33.33")), dec("33.33"));
        // a third of 100.00 does not divide evenly
        assert_eq!(
            commission_amount(dec("100.00"), dec("33.333")),
            dec("33.33")
        );
    }
}
