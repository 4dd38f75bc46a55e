//! Point-of-sale models and state machine rules

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sale lifecycle states. A sale debits stock while `Completed` and has that
/// debit reversed while `Cancelled` or `Returned`; both directions are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Cancelled,
    Returned,
}

impl SaleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
            SaleStatus::Returned => "returned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(SaleStatus::Completed),
            "cancelled" => Some(SaleStatus::Cancelled),
            "returned" => Some(SaleStatus::Returned),
            _ => None,
        }
    }
}

/// Ledger effect of a sale status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleStockEffect {
    /// Credit every item's quantity back (leaving the debited state)
    Restore,
    /// Re-validate and debit every item's quantity (re-entering `Completed`)
    Debit,
    /// Lateral move or same-state request: stock untouched
    None,
}

/// Stock effect of moving a sale from `current` to `requested`.
///
/// The transition table is keyed purely on whether each side is the debited
/// (`Completed`) state; `Cancelled <-> Returned` is a lateral move.
pub fn sale_stock_effect(current: SaleStatus, requested: SaleStatus) -> SaleStockEffect {
    match (current == SaleStatus::Completed, requested == SaleStatus::Completed) {
        (true, false) => SaleStockEffect::Restore,
        (false, true) => SaleStockEffect::Debit,
        _ => SaleStockEffect::None,
    }
}

/// A point-of-sale transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub total_amount: Decimal,
    pub status: SaleStatus,
    pub sale_date: DateTime<Utc>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line on a sale. The unit price is snapshotted from the product at sale
/// time; items are immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaving_completed_restores_stock() {
        assert_eq!(
            sale_stock_effect(SaleStatus::Completed, SaleStatus::Cancelled),
            SaleStockEffect::Restore
        );
        assert_eq!(
            sale_stock_effect(SaleStatus::Completed, SaleStatus::Returned),
            SaleStockEffect::Restore
        );
    }

    #[test]
    fn reentering_completed_debits_stock() {
        assert_eq!(
            sale_stock_effect(SaleStatus::Cancelled, SaleStatus::Completed),
            SaleStockEffect::Debit
        );
        assert_eq!(
            sale_stock_effect(SaleStatus::Returned, SaleStatus::Completed),
            SaleStockEffect::Debit
        );
    }

    #[test]
    fn lateral_and_same_state_touch_nothing() {
        assert_eq!(
            sale_stock_effect(SaleStatus::Cancelled, SaleStatus::Returned),
            SaleStockEffect::None
        );
        assert_eq!(
            sale_stock_effect(SaleStatus::Returned, SaleStatus::Cancelled),
            SaleStockEffect::None
        );
        assert_eq!(
            sale_stock_effect(SaleStatus::Completed, SaleStatus::Completed),
            SaleStockEffect::None
        );
    }
}
