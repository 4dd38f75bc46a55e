//! Financial transaction models (expense/income ledger)
//!
//! The order engine writes here (approving a purchase order records the
//! expense) and the reporting surface reads it back as a flat list.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a financial transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

/// A row in the financial ledger. Written when an order commits money
/// (approving a purchase order posts the expense) and read back through
/// the transactions listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialTransaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub category: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub transaction_date: DateTime<Utc>,
    pub service_order_id: Option<Uuid>,
    pub purchase_order_id: Option<Uuid>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_storage_text() {
        for kind in [TransactionKind::Income, TransactionKind::Expense] {
            assert_eq!(TransactionKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn unknown_kind_text_is_rejected() {
        assert_eq!(TransactionKind::parse("refund"), None);
        assert_eq!(TransactionKind::parse(""), None);
    }
}
