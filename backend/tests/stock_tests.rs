//! Stock ledger tests
//!
//! Pure-logic simulations of the guarded adjustment primitive: quantities
//! never go negative, rejected debits change nothing, and interleaved
//! adjustments against one item admit exactly what the stock can cover.

use proptest::prelude::*;

use shared::models::is_low_stock;

/// In-memory stand-in for the guarded single-row UPDATE: apply the delta
/// only if the result stays non-negative.
fn adjust(quantity: &mut i32, delta: i32) -> Result<(), ()> {
    let next = *quantity + delta;
    if next < 0 {
        return Err(());
    }
    *quantity = next;
    Ok(())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn credit_always_applies() {
        let mut quantity = 0;
        assert!(adjust(&mut quantity, 7).is_ok());
        assert_eq!(quantity, 7);
    }

    #[test]
    fn debit_within_stock_applies() {
        let mut quantity = 10;
        assert!(adjust(&mut quantity, -10).is_ok());
        assert_eq!(quantity, 0);
    }

    #[test]
    fn overdraw_is_rejected_and_leaves_quantity_untouched() {
        let mut quantity = 3;
        assert!(adjust(&mut quantity, -4).is_err());
        assert_eq!(quantity, 3);
    }

    /// Two clerks sell the same last unit: only one debit is admitted.
    #[test]
    fn concurrent_sales_of_last_unit_admit_one() {
        let mut quantity = 1;
        let first = adjust(&mut quantity, -1);
        let second = adjust(&mut quantity, -1);
        assert!(first.is_ok());
        assert!(second.is_err());
        assert_eq!(quantity, 0);
    }

    #[test]
    fn low_stock_uses_inclusive_threshold() {
        assert!(is_low_stock(2, Some(2)));
        assert!(!is_low_stock(3, Some(2)));
        assert!(!is_low_stock(0, None));
        assert!(!is_low_stock(0, Some(0)));
    }

    /// A bolt with threshold 5: a big sale drops it into the low-stock view,
    /// cancelling the sale lifts it out, and a received restock of 20 lands
    /// the quantity at 30. Order creation and approval move nothing.
    #[test]
    fn sale_cancel_restock_scenario() {
        let min_quantity = Some(5);
        let mut bolts = 10;

        adjust(&mut bolts, -7).unwrap();
        assert_eq!(bolts, 3);
        assert!(is_low_stock(bolts, min_quantity));

        adjust(&mut bolts, 7).unwrap();
        assert_eq!(bolts, 10);
        assert!(!is_low_stock(bolts, min_quantity));

        // Purchase order created and approved: still 10 until receipt.
        assert_eq!(bolts, 10);
        adjust(&mut bolts, 20).unwrap();
        assert_eq!(bolts, 30);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// The quantity never goes negative, whatever sequence of adjustments
    /// is attempted.
    #[test]
    fn prop_quantity_never_negative(
        start in 0i32..1000,
        deltas in prop::collection::vec(-50i32..50, 0..40),
    ) {
        let mut quantity = start;
        for delta in deltas {
            let _ = adjust(&mut quantity, delta);
            prop_assert!(quantity >= 0);
        }
    }

    /// Ledger conservation: the final quantity equals the start plus the sum
    /// of the admitted deltas and nothing else.
    #[test]
    fn prop_admitted_deltas_account_for_final_quantity(
        start in 0i32..1000,
        deltas in prop::collection::vec(-50i32..50, 0..40),
    ) {
        let mut quantity = start;
        let mut admitted: i64 = 0;
        for delta in deltas {
            if adjust(&mut quantity, delta).is_ok() {
                admitted += i64::from(delta);
            }
        }
        prop_assert_eq!(i64::from(quantity), i64::from(start) + admitted);
    }

    /// A rejected debit is a true no-op.
    #[test]
    fn prop_rejected_debit_changes_nothing(start in 0i32..100, extra in 1i32..100) {
        let mut quantity = start;
        let overdraw = -(start + extra);
        prop_assert!(adjust(&mut quantity, overdraw).is_err());
        prop_assert_eq!(quantity, start);
    }
}
