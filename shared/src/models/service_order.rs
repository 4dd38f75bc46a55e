//! Repair service order models
//!
//! The service order itself is a plain CRUD entity; the part that interacts
//! with the stock ledger is its attached set of component usage rows, which
//! is replaced as a whole whenever the order is edited.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Service order workflow states (no stock effect of their own)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOrderStatus {
    Open,
    AwaitingComponent,
    Approved,
    InRepair,
    Unrepairable,
    Paid,
    Delivered,
    DeliveredUnpaid,
}

impl ServiceOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceOrderStatus::Open => "open",
            ServiceOrderStatus::AwaitingComponent => "awaiting_component",
            ServiceOrderStatus::Approved => "approved",
            ServiceOrderStatus::InRepair => "in_repair",
            ServiceOrderStatus::Unrepairable => "unrepairable",
            ServiceOrderStatus::Paid => "paid",
            ServiceOrderStatus::Delivered => "delivered",
            ServiceOrderStatus::DeliveredUnpaid => "delivered_unpaid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(ServiceOrderStatus::Open),
            "awaiting_component" => Some(ServiceOrderStatus::AwaitingComponent),
            "approved" => Some(ServiceOrderStatus::Approved),
            "in_repair" => Some(ServiceOrderStatus::InRepair),
            "unrepairable" => Some(ServiceOrderStatus::Unrepairable),
            "paid" => Some(ServiceOrderStatus::Paid),
            "delivered" => Some(ServiceOrderStatus::Delivered),
            "delivered_unpaid" => Some(ServiceOrderStatus::DeliveredUnpaid),
            _ => None,
        }
    }

    /// Moving into one of these states stamps `completed_date`.
    pub fn marks_completed(&self) -> bool {
        matches!(self, ServiceOrderStatus::Paid | ServiceOrderStatus::Delivered)
    }

    /// Moving into this state stamps `delivered_date`.
    pub fn marks_delivered(&self) -> bool {
        matches!(self, ServiceOrderStatus::Delivered)
    }
}

/// Kind of repair service offered by the shop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    IndustrialMaintenance,
    FitnessRefrigeration,
    IndustrialAutomation,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::IndustrialMaintenance => "industrial_maintenance",
            ServiceType::FitnessRefrigeration => "fitness_refrigeration",
            ServiceType::IndustrialAutomation => "industrial_automation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "industrial_maintenance" => Some(ServiceType::IndustrialMaintenance),
            "fitness_refrigeration" => Some(ServiceType::FitnessRefrigeration),
            "industrial_automation" => Some(ServiceType::IndustrialAutomation),
            _ => None,
        }
    }
}

/// A repair service order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceOrder {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub service_type: ServiceType,
    pub equipment_description: Option<String>,
    pub reported_issue: Option<String>,
    pub diagnosis: Option<String>,
    pub solution: Option<String>,
    pub status: ServiceOrderStatus,
    pub received_by: Option<Uuid>,
    pub technician_id: Option<Uuid>,
    pub labor_cost: Decimal,
    pub parts_cost: Decimal,
    pub total_cost: Decimal,
    pub received_date: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,
    pub delivered_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A component consumption row attached to a service order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentUsage {
    pub id: Uuid,
    pub service_order_id: Uuid,
    pub component_id: Uuid,
    pub quantity: i32,
}

/// Requested consumption for one component when creating/editing an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub component_id: Uuid,
    pub quantity: i32,
}

/// Per-component stock deltas needed to move from `current` usage to `new`
/// usage. Duplicate component entries on either side are merged first;
/// components whose quantity is unchanged produce no delta at all, so an
/// edit that keeps the set intact is a true ledger no-op.
///
/// A negative delta is a debit (consumption grew), a positive delta a credit.
/// Totals are merged in i64; a merged delta that does not fit a ledger
/// quantity rejects the whole request rather than wrapping.
pub fn usage_deltas(
    current: &[UsageEntry],
    new: &[UsageEntry],
) -> Result<Vec<(Uuid, i32)>, &'static str> {
    let mut merged: BTreeMap<Uuid, i64> = BTreeMap::new();
    for entry in current {
        *merged.entry(entry.component_id).or_default() += i64::from(entry.quantity);
    }
    for entry in new {
        *merged.entry(entry.component_id).or_default() -= i64::from(entry.quantity);
    }
    merged
        .into_iter()
        .filter(|(_, delta)| *delta != 0)
        .map(|(component_id, delta)| {
            i32::try_from(delta)
                .map(|delta| (component_id, delta))
                .map_err(|_| "Component quantity total is out of range")
        })
        .collect()
}

/// Next free service-order number: one past the highest numeric order number
/// on file, starting at 600. Numbers at or above one million are treated as
/// imported/legacy identifiers and ignored.
pub fn next_order_number<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let mut max_number: i64 = 599;
    for number in existing {
        let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
        if let Ok(n) = digits.parse::<i64>() {
            if n < 1_000_000 && n > max_number {
                max_number = n;
            }
        }
    }
    (max_number + 1).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(entries: &[(Uuid, i32)]) -> Vec<UsageEntry> {
        entries
            .iter()
            .map(|&(component_id, quantity)| UsageEntry {
                component_id,
                quantity,
            })
            .collect()
    }

    #[test]
    fn identical_sets_produce_no_deltas() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let current = usage(&[(a, 2), (b, 1)]);
        assert!(usage_deltas(&current, &current).unwrap().is_empty());
    }

    #[test]
    fn grown_consumption_is_a_debit() {
        let a = Uuid::new_v4();
        let deltas = usage_deltas(&usage(&[(a, 1)]), &usage(&[(a, 3)])).unwrap();
        assert_eq!(deltas, vec![(a, -2)]);
    }

    #[test]
    fn removed_component_is_credited_added_is_debited() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut deltas = usage_deltas(&usage(&[(a, 2)]), &usage(&[(b, 1)])).unwrap();
        deltas.sort_by_key(|(_, d)| *d);
        assert!(deltas.contains(&(a, 2)));
        assert!(deltas.contains(&(b, -1)));
    }

    #[test]
    fn duplicate_entries_are_merged() {
        let a = Uuid::new_v4();
        let deltas = usage_deltas(&[], &usage(&[(a, 1), (a, 2)])).unwrap();
        assert_eq!(deltas, vec![(a, -3)]);
    }

    /// Duplicate entries that sum past the ledger range must reject, never
    /// wrap: 2 x i32::MAX units requested would otherwise come back as a
    /// small positive credit.
    #[test]
    fn oversized_merged_totals_are_rejected() {
        let a = Uuid::new_v4();
        let request = usage(&[(a, i32::MAX), (a, i32::MAX)]);
        assert!(usage_deltas(&[], &request).is_err());
        assert!(usage_deltas(&request, &[]).is_err());
    }

    #[test]
    fn order_numbers_start_at_600() {
        assert_eq!(next_order_number([]), "600");
    }

    #[test]
    fn order_numbers_skip_legacy_range() {
        assert_eq!(
            next_order_number(["612", "OS-640", "20240001234"]),
            "641"
        );
    }

    #[test]
    fn completed_and_delivered_stamping() {
        assert!(ServiceOrderStatus::Paid.marks_completed());
        assert!(ServiceOrderStatus::Delivered.marks_completed());
        assert!(ServiceOrderStatus::Delivered.marks_delivered());
        assert!(!ServiceOrderStatus::Paid.marks_delivered());
        assert!(!ServiceOrderStatus::InRepair.marks_completed());
    }
}
