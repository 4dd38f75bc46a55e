//! Purchase order models and state machine rules

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StockRef;

/// Purchase order lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Pending,
    AwaitingDelivery,
    PartiallyReceived,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "pending",
            PurchaseOrderStatus::AwaitingDelivery => "awaiting_delivery",
            PurchaseOrderStatus::PartiallyReceived => "partially_received",
            PurchaseOrderStatus::Received => "received",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PurchaseOrderStatus::Pending),
            "awaiting_delivery" => Some(PurchaseOrderStatus::AwaitingDelivery),
            "partially_received" => Some(PurchaseOrderStatus::PartiallyReceived),
            "received" => Some(PurchaseOrderStatus::Received),
            "cancelled" => Some(PurchaseOrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Approval commits the financial obligation; only a pending order
    /// can be approved.
    pub fn can_approve(&self) -> bool {
        matches!(self, PurchaseOrderStatus::Pending)
    }

    /// Receipts are only legal once the order is on its way.
    pub fn can_receive(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::AwaitingDelivery | PurchaseOrderStatus::PartiallyReceived
        )
    }

    /// Only an order that never became an obligation can be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(self, PurchaseOrderStatus::Pending)
    }
}

/// A purchase order (restocking from a supplier)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub order_number: String,
    pub supplier: Option<String>,
    pub order_date: DateTime<Utc>,
    pub received_date: Option<DateTime<Utc>>,
    pub received_by: Option<Uuid>,
    pub total_amount: Decimal,
    pub status: PurchaseOrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line on a purchase order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub stock_ref: StockRef,
    pub quantity: i32,
    pub received_quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

impl PurchaseOrderItem {
    /// Quantity still outstanding against this line.
    pub fn remaining(&self) -> i32 {
        self.quantity - self.received_quantity
    }
}

/// Recompute an order's status from its items after a receipt batch:
/// `Received` once every line is complete, else `PartiallyReceived`.
pub fn receipt_status(items: &[(i32, i32)]) -> PurchaseOrderStatus {
    let complete = items.iter().all(|(quantity, received)| received >= quantity);
    if complete {
        PurchaseOrderStatus::Received
    } else {
        PurchaseOrderStatus::PartiallyReceived
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approval_only_from_pending() {
        assert!(PurchaseOrderStatus::Pending.can_approve());
        assert!(!PurchaseOrderStatus::AwaitingDelivery.can_approve());
        assert!(!PurchaseOrderStatus::Received.can_approve());
        assert!(!PurchaseOrderStatus::Cancelled.can_approve());
    }

    #[test]
    fn receipts_from_awaiting_or_partial() {
        assert!(PurchaseOrderStatus::AwaitingDelivery.can_receive());
        assert!(PurchaseOrderStatus::PartiallyReceived.can_receive());
        assert!(!PurchaseOrderStatus::Pending.can_receive());
        assert!(!PurchaseOrderStatus::Received.can_receive());
    }

    #[test]
    fn receipt_status_from_items() {
        assert_eq!(
            receipt_status(&[(10, 10), (5, 5)]),
            PurchaseOrderStatus::Received
        );
        assert_eq!(
            receipt_status(&[(10, 10), (5, 3)]),
            PurchaseOrderStatus::PartiallyReceived
        );
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            PurchaseOrderStatus::Pending,
            PurchaseOrderStatus::AwaitingDelivery,
            PurchaseOrderStatus::PartiallyReceived,
            PurchaseOrderStatus::Received,
            PurchaseOrderStatus::Cancelled,
        ] {
            assert_eq!(PurchaseOrderStatus::parse(status.as_str()), Some(status));
        }
    }
}
