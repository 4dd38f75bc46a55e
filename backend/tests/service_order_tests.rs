//! Service order consumption tests
//!
//! Simulations of the replace-as-a-whole component usage set: edits move
//! stock only by the per-component difference, availability is enforced on
//! debits, and deletion credits everything back.

use std::collections::BTreeMap;

use proptest::prelude::*;
use uuid::Uuid;

use shared::models::{next_order_number, usage_deltas, UsageEntry};

#[derive(Debug, Default)]
struct Bench {
    stock: BTreeMap<Uuid, i32>,
    usage: Vec<UsageEntry>,
}

impl Bench {
    fn with_stock(stock: &[(Uuid, i32)]) -> Self {
        Bench {
            stock: stock.iter().copied().collect(),
            usage: Vec::new(),
        }
    }

    /// Replace the usage set, applying only the diff to stock. Debits beyond
    /// availability, or merged totals outside the ledger range, reject the
    /// whole edit.
    fn set_usage(&mut self, new: &[UsageEntry]) -> Result<(), ()> {
        let deltas = usage_deltas(&self.usage, new).map_err(|_| ())?;
        for &(component_id, delta) in &deltas {
            let on_hand = self.stock.get(&component_id).copied().unwrap_or(0);
            if on_hand + delta < 0 {
                return Err(());
            }
        }
        for (component_id, delta) in deltas {
            *self.stock.entry(component_id).or_insert(0) += delta;
        }
        self.usage = new.to_vec();
        Ok(())
    }

    fn delete_order(&mut self) {
        let usage = std::mem::take(&mut self.usage);
        for entry in usage {
            *self.stock.entry(entry.component_id).or_insert(0) += entry.quantity;
        }
    }

    fn total_units(&self) -> i64 {
        let shelf: i64 = self.stock.values().map(|&q| i64::from(q)).sum();
        let held: i64 = self.usage.iter().map(|e| i64::from(e.quantity)).sum();
        shelf + held
    }
}

fn usage(entries: &[(Uuid, i32)]) -> Vec<UsageEntry> {
    entries
        .iter()
        .map(|&(component_id, quantity)| UsageEntry {
            component_id,
            quantity,
        })
        .collect()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn initial_usage_debits_stock() {
        let a = Uuid::new_v4();
        let mut bench = Bench::with_stock(&[(a, 10)]);
        bench.set_usage(&usage(&[(a, 3)])).unwrap();
        assert_eq!(bench.stock[&a], 7);
    }

    #[test]
    fn usage_beyond_stock_is_rejected() {
        let a = Uuid::new_v4();
        let mut bench = Bench::with_stock(&[(a, 2)]);
        assert!(bench.set_usage(&usage(&[(a, 3)])).is_err());
        assert_eq!(bench.stock[&a], 2);
        assert!(bench.usage.is_empty());
    }

    /// The bolt scenario: an edit that keeps one component's quantity
    /// unchanged must not touch that component's stock, even if a concurrent
    /// receipt changed the on-hand number in between.
    #[test]
    fn unchanged_component_survives_concurrent_restock() {
        let bolt = Uuid::new_v4();
        let fuse = Uuid::new_v4();
        let mut bench = Bench::with_stock(&[(bolt, 10), (fuse, 5)]);
        bench.set_usage(&usage(&[(bolt, 2)])).unwrap();
        assert_eq!(bench.stock[&bolt], 8);

        // Concurrent purchase receipt lands between edits.
        *bench.stock.get_mut(&bolt).unwrap() += 100;

        // Edit adds a fuse but keeps the bolts at 2.
        bench.set_usage(&usage(&[(bolt, 2), (fuse, 1)])).unwrap();
        assert_eq!(bench.stock[&bolt], 108);
        assert_eq!(bench.stock[&fuse], 4);
    }

    #[test]
    fn shrinking_usage_credits_the_difference() {
        let a = Uuid::new_v4();
        let mut bench = Bench::with_stock(&[(a, 10)]);
        bench.set_usage(&usage(&[(a, 6)])).unwrap();
        bench.set_usage(&usage(&[(a, 2)])).unwrap();
        assert_eq!(bench.stock[&a], 8);
    }

    #[test]
    fn clearing_usage_restores_everything() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut bench = Bench::with_stock(&[(a, 5), (b, 5)]);
        bench.set_usage(&usage(&[(a, 2), (b, 4)])).unwrap();
        bench.set_usage(&[]).unwrap();
        assert_eq!(bench.stock[&a], 5);
        assert_eq!(bench.stock[&b], 5);
    }

    /// A request with duplicate entries summing past i32 range must be
    /// rejected outright. Were the merged total allowed to wrap, a
    /// multi-billion-unit consumption would land on the ledger as a small
    /// credit while the usage rows recorded the huge debit.
    #[test]
    fn oversized_duplicate_usage_rejects_the_whole_edit() {
        let a = Uuid::new_v4();
        let mut bench = Bench::with_stock(&[(a, 10)]);
        let request = usage(&[(a, i32::MAX), (a, i32::MAX)]);
        assert!(bench.set_usage(&request).is_err());
        assert_eq!(bench.stock[&a], 10);
        assert!(bench.usage.is_empty());
    }

    #[test]
    fn delete_credits_usage_back() {
        let a = Uuid::new_v4();
        let mut bench = Bench::with_stock(&[(a, 5)]);
        bench.set_usage(&usage(&[(a, 4)])).unwrap();
        bench.delete_order();
        assert_eq!(bench.stock[&a], 5);
    }

    #[test]
    fn order_numbers_allocate_sequentially_from_600() {
        assert_eq!(next_order_number([]), "600");
        assert_eq!(next_order_number(["600", "601"]), "602");
        // Legacy imports above one million are ignored.
        assert_eq!(next_order_number(["700", "20230001111"]), "701");
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Units are conserved across any sequence of accepted edits: shelf
    /// stock plus consumed stock is constant.
    #[test]
    fn prop_edits_conserve_units(
        initial in prop::collection::vec(5i32..50, 3),
        edits in prop::collection::vec(prop::collection::vec(0i32..8, 3), 1..10),
    ) {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let stock: Vec<(Uuid, i32)> = ids.iter().copied().zip(initial).collect();
        let mut bench = Bench::with_stock(&stock);
        let start = bench.total_units();

        for edit in edits {
            let entries: Vec<UsageEntry> = ids
                .iter()
                .zip(&edit)
                .filter(|(_, &quantity)| quantity > 0)
                .map(|(&component_id, &quantity)| UsageEntry { component_id, quantity })
                .collect();
            let _ = bench.set_usage(&entries);
            prop_assert_eq!(bench.total_units(), start);
            for &q in bench.stock.values() {
                prop_assert!(q >= 0);
            }
        }
    }

    /// Applying the same usage set twice is a no-op on stock.
    #[test]
    fn prop_reapplying_same_set_is_noop(
        initial in prop::collection::vec(10i32..50, 3),
        edit in prop::collection::vec(0i32..8, 3),
    ) {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let stock: Vec<(Uuid, i32)> = ids.iter().copied().zip(initial).collect();
        let mut bench = Bench::with_stock(&stock);

        let entries: Vec<UsageEntry> = ids
            .iter()
            .zip(&edit)
            .filter(|(_, &quantity)| quantity > 0)
            .map(|(&component_id, &quantity)| UsageEntry { component_id, quantity })
            .collect();

        bench.set_usage(&entries).unwrap();
        let snapshot = bench.stock.clone();
        bench.set_usage(&entries).unwrap();
        prop_assert_eq!(bench.stock, snapshot);
    }

    /// Round trip: editing away and back restores the original stock.
    #[test]
    fn prop_edit_round_trip_restores_stock(
        initial in prop::collection::vec(20i32..50, 3),
        first in prop::collection::vec(0i32..8, 3),
        second in prop::collection::vec(0i32..8, 3),
    ) {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let stock: Vec<(Uuid, i32)> = ids.iter().copied().zip(initial).collect();
        let mut bench = Bench::with_stock(&stock);

        let to_entries = |edit: &[i32]| -> Vec<UsageEntry> {
            ids.iter()
                .zip(edit)
                .filter(|(_, &quantity)| quantity > 0)
                .map(|(&component_id, &quantity)| UsageEntry { component_id, quantity })
                .collect()
        };

        bench.set_usage(&to_entries(&first)).unwrap();
        let snapshot = bench.stock.clone();
        bench.set_usage(&to_entries(&second)).unwrap();
        bench.set_usage(&to_entries(&first)).unwrap();
        prop_assert_eq!(bench.stock, snapshot);
    }

    /// Generated usage sets never drive any component negative.
    #[test]
    fn prop_usage_sets_respect_availability(
        sets in prop::collection::vec(prop::collection::vec(0i32..20, 2), 1..8),
    ) {
        let ids: Vec<Uuid> = (0..2).map(|_| Uuid::new_v4()).collect();
        let stock: Vec<(Uuid, i32)> = ids.iter().map(|&id| (id, 10)).collect();
        let mut bench = Bench::with_stock(&stock);

        for set in sets {
            let entries: Vec<UsageEntry> = ids
                .iter()
                .zip(&set)
                .filter(|(_, &quantity)| quantity > 0)
                .map(|(&component_id, &quantity)| UsageEntry { component_id, quantity })
                .collect();
            let _ = bench.set_usage(&entries);
            for &q in bench.stock.values() {
                prop_assert!(q >= 0);
            }
        }
    }
}
