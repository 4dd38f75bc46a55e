//! Sale lifecycle tests
//!
//! Simulations of the sale machine against a product stock row: creation
//! debits, status flips replay the ledger effect in both directions, and
//! deletion restores the debit only while the sale holds it.

use proptest::prelude::*;

use shared::models::{sale_stock_effect, SaleStatus, SaleStockEffect};

#[derive(Debug)]
struct ShopSale {
    status: SaleStatus,
    quantity: i32,
}

#[derive(Debug)]
struct Shop {
    stock: i32,
}

impl Shop {
    fn sell(&mut self, quantity: i32) -> Result<ShopSale, ()> {
        if quantity <= 0 || self.stock < quantity {
            return Err(());
        }
        self.stock -= quantity;
        Ok(ShopSale {
            status: SaleStatus::Completed,
            quantity,
        })
    }

    fn change_status(&mut self, sale: &mut ShopSale, requested: SaleStatus) -> Result<(), ()> {
        match sale_stock_effect(sale.status, requested) {
            SaleStockEffect::Restore => self.stock += sale.quantity,
            SaleStockEffect::Debit => {
                if self.stock < sale.quantity {
                    return Err(());
                }
                self.stock -= sale.quantity;
            }
            SaleStockEffect::None => {}
        }
        sale.status = requested;
        Ok(())
    }

    fn delete(&mut self, sale: ShopSale) {
        if sale.status == SaleStatus::Completed {
            self.stock += sale.quantity;
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn sale_debits_stock_at_creation() {
        let mut shop = Shop { stock: 10 };
        let sale = shop.sell(4).unwrap();
        assert_eq!(shop.stock, 6);
        assert_eq!(sale.status, SaleStatus::Completed);
    }

    #[test]
    fn sale_beyond_stock_is_rejected() {
        let mut shop = Shop { stock: 3 };
        assert!(shop.sell(4).is_err());
        assert_eq!(shop.stock, 3);
    }

    #[test]
    fn cancellation_restores_stock() {
        let mut shop = Shop { stock: 10 };
        let mut sale = shop.sell(4).unwrap();
        shop.change_status(&mut sale, SaleStatus::Cancelled).unwrap();
        assert_eq!(shop.stock, 10);
    }

    #[test]
    fn recompletion_debits_again() {
        let mut shop = Shop { stock: 10 };
        let mut sale = shop.sell(4).unwrap();
        shop.change_status(&mut sale, SaleStatus::Returned).unwrap();
        shop.change_status(&mut sale, SaleStatus::Completed).unwrap();
        assert_eq!(shop.stock, 6);
    }

    /// Stock restored by a return can be claimed by another sale; the
    /// original sale then cannot be re-completed.
    #[test]
    fn recompletion_fails_when_stock_was_reclaimed() {
        let mut shop = Shop { stock: 4 };
        let mut first = shop.sell(4).unwrap();
        shop.change_status(&mut first, SaleStatus::Returned).unwrap();
        let _second = shop.sell(3).unwrap();
        assert!(shop
            .change_status(&mut first, SaleStatus::Completed)
            .is_err());
        assert_eq!(shop.stock, 1);
    }

    #[test]
    fn lateral_moves_touch_nothing() {
        let mut shop = Shop { stock: 10 };
        let mut sale = shop.sell(4).unwrap();
        shop.change_status(&mut sale, SaleStatus::Cancelled).unwrap();
        shop.change_status(&mut sale, SaleStatus::Returned).unwrap();
        assert_eq!(shop.stock, 10);
        assert_eq!(sale.status, SaleStatus::Returned);
    }

    #[test]
    fn delete_restores_only_completed_sales() {
        let mut shop = Shop { stock: 10 };
        let sale = shop.sell(4).unwrap();
        shop.delete(sale);
        assert_eq!(shop.stock, 10);

        let mut cancelled = shop.sell(4).unwrap();
        shop.change_status(&mut cancelled, SaleStatus::Cancelled)
            .unwrap();
        shop.delete(cancelled);
        assert_eq!(shop.stock, 10);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

fn any_status() -> impl Strategy<Value = SaleStatus> {
    prop_oneof![
        Just(SaleStatus::Completed),
        Just(SaleStatus::Cancelled),
        Just(SaleStatus::Returned),
    ]
}

proptest! {
    /// Round trip: any sequence of successful status changes that ends where
    /// it started leaves stock where it started.
    #[test]
    fn prop_status_round_trip_preserves_stock(
        start in 1i32..100,
        quantity in 1i32..50,
        hops in prop::collection::vec(any_status(), 0..12),
    ) {
        prop_assume!(quantity <= start);
        let mut shop = Shop { stock: start };
        let mut sale = shop.sell(quantity).unwrap();

        for status in hops {
            let _ = shop.change_status(&mut sale, status);
            prop_assert!(shop.stock >= 0);
        }

        let _ = shop.change_status(&mut sale, SaleStatus::Completed);
        if sale.status == SaleStatus::Completed {
            prop_assert_eq!(shop.stock, start - quantity);
        }
    }

    /// Stock held by the sale plus stock on hand is invariant across
    /// transitions.
    #[test]
    fn prop_sale_and_shelf_conserve_units(
        start in 1i32..100,
        quantity in 1i32..50,
        hops in prop::collection::vec(any_status(), 0..12),
    ) {
        prop_assume!(quantity <= start);
        let mut shop = Shop { stock: start };
        let mut sale = shop.sell(quantity).unwrap();

        for status in hops {
            let _ = shop.change_status(&mut sale, status);
            let held = if sale.status == SaleStatus::Completed { quantity } else { 0 };
            prop_assert_eq!(shop.stock + held, start);
        }
    }
}
