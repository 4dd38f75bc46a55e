//! Purchase order lifecycle tests
//!
//! Simulations of the receiving machine: state gating, delta-based receipts,
//! idempotent full receipt, and deletion reversing exactly what was credited.

use proptest::prelude::*;

use shared::models::{receipt_status, PurchaseOrderStatus};
use shared::validation::validate_receipt_delta;

/// One order line plus the stock row it credits into.
#[derive(Debug, Clone)]
struct Line {
    ordered: i32,
    received: i32,
    stock: i32,
}

#[derive(Debug)]
struct Order {
    status: PurchaseOrderStatus,
    lines: Vec<Line>,
}

impl Order {
    fn new(quantities: &[i32]) -> Self {
        Order {
            status: PurchaseOrderStatus::Pending,
            lines: quantities
                .iter()
                .map(|&ordered| Line {
                    ordered,
                    received: 0,
                    stock: 0,
                })
                .collect(),
        }
    }

    fn approve(&mut self) -> Result<(), ()> {
        if !self.status.can_approve() {
            return Err(());
        }
        self.status = PurchaseOrderStatus::AwaitingDelivery;
        Ok(())
    }

    fn receive(&mut self, line: usize, delta: i32) -> Result<(), ()> {
        if !self.status.can_receive() {
            return Err(());
        }
        let entry = &mut self.lines[line];
        validate_receipt_delta(entry.ordered, entry.received, delta).map_err(|_| ())?;
        entry.received += delta;
        entry.stock += delta;
        self.refresh_status();
        Ok(())
    }

    fn receive_all(&mut self) -> Result<(), ()> {
        if self.status == PurchaseOrderStatus::Received {
            return Ok(());
        }
        if !self.status.can_receive() {
            return Err(());
        }
        for entry in &mut self.lines {
            let remaining = entry.ordered - entry.received;
            entry.received = entry.ordered;
            entry.stock += remaining;
        }
        self.refresh_status();
        Ok(())
    }

    fn cancel(&mut self) -> Result<(), ()> {
        if !self.status.can_cancel() {
            return Err(());
        }
        self.status = PurchaseOrderStatus::Cancelled;
        Ok(())
    }

    /// Deletion debits back everything previously credited.
    fn delete(&mut self) {
        for entry in &mut self.lines {
            entry.stock -= entry.received;
        }
    }

    fn refresh_status(&mut self) {
        let pairs: Vec<(i32, i32)> = self
            .lines
            .iter()
            .map(|entry| (entry.ordered, entry.received))
            .collect();
        self.status = receipt_status(&pairs);
    }

    fn total_stock(&self) -> i32 {
        self.lines.iter().map(|entry| entry.stock).sum()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn full_lifecycle_reaches_received() {
        let mut order = Order::new(&[10, 5]);
        order.approve().unwrap();
        order.receive(0, 10).unwrap();
        assert_eq!(order.status, PurchaseOrderStatus::PartiallyReceived);
        order.receive(1, 5).unwrap();
        assert_eq!(order.status, PurchaseOrderStatus::Received);
        assert_eq!(order.total_stock(), 15);
    }

    #[test]
    fn receipt_before_approval_is_rejected() {
        let mut order = Order::new(&[10]);
        assert!(order.receive(0, 5).is_err());
        assert_eq!(order.total_stock(), 0);
    }

    #[test]
    fn over_receipt_is_rejected() {
        let mut order = Order::new(&[10]);
        order.approve().unwrap();
        order.receive(0, 8).unwrap();
        assert!(order.receive(0, 3).is_err());
        assert_eq!(order.total_stock(), 8);
        assert_eq!(order.status, PurchaseOrderStatus::PartiallyReceived);
    }

    #[test]
    fn receive_all_credits_only_the_remainder() {
        let mut order = Order::new(&[10, 4]);
        order.approve().unwrap();
        order.receive(0, 6).unwrap();
        order.receive_all().unwrap();
        assert_eq!(order.status, PurchaseOrderStatus::Received);
        assert_eq!(order.total_stock(), 14);
    }

    #[test]
    fn receive_all_is_idempotent() {
        let mut order = Order::new(&[3]);
        order.approve().unwrap();
        order.receive_all().unwrap();
        order.receive_all().unwrap();
        assert_eq!(order.total_stock(), 3);
    }

    #[test]
    fn cancel_only_from_pending() {
        let mut order = Order::new(&[3]);
        assert!(order.cancel().is_ok());

        let mut approved = Order::new(&[3]);
        approved.approve().unwrap();
        assert!(approved.cancel().is_err());
    }

    #[test]
    fn approve_twice_is_rejected() {
        let mut order = Order::new(&[3]);
        order.approve().unwrap();
        assert!(order.approve().is_err());
    }

    /// Delete after a partial receipt takes back exactly what was credited.
    #[test]
    fn delete_reverses_partial_receipts() {
        let mut order = Order::new(&[10]);
        order.approve().unwrap();
        order.receive(0, 7).unwrap();
        order.delete();
        assert_eq!(order.total_stock(), 0);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// However receipts are batched, stock credited equals quantity received
    /// and never exceeds what was ordered.
    #[test]
    fn prop_receipts_conserve_and_never_overshoot(
        ordered in 1i32..100,
        batches in prop::collection::vec(1i32..30, 1..10),
    ) {
        let mut order = Order::new(&[ordered]);
        order.approve().unwrap();
        for batch in batches {
            let _ = order.receive(0, batch);
            prop_assert!(order.lines[0].received <= ordered);
            prop_assert_eq!(order.lines[0].stock, order.lines[0].received);
        }
        if order.lines[0].received == ordered {
            prop_assert_eq!(order.status, PurchaseOrderStatus::Received);
        }
    }

    /// receive_all from any receivable point lands exactly on the ordered
    /// quantity, regardless of previous partial receipts.
    #[test]
    fn prop_receive_all_completes_exactly(
        ordered in 1i32..100,
        partial in 0i32..100,
    ) {
        let mut order = Order::new(&[ordered]);
        order.approve().unwrap();
        if partial > 0 {
            let _ = order.receive(0, partial.min(ordered));
        }
        order.receive_all().unwrap();
        prop_assert_eq!(order.status, PurchaseOrderStatus::Received);
        prop_assert_eq!(order.lines[0].stock, ordered);
    }

    /// Delete leaves the ledger where it started, whatever happened before.
    #[test]
    fn prop_delete_always_returns_to_zero(
        quantities in prop::collection::vec(1i32..50, 1..5),
        full in any::<bool>(),
    ) {
        let mut order = Order::new(&quantities);
        order.approve().unwrap();
        if full {
            order.receive_all().unwrap();
        } else {
            let _ = order.receive(0, 1);
        }
        order.delete();
        prop_assert_eq!(order.total_stock(), 0);
    }
}
