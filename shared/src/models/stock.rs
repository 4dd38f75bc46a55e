//! Stock ledger models
//!
//! Two item kinds share the ledger: electronic components consumed by repair
//! work and resale products sold at the counter. Their on-hand `quantity` is
//! authoritative and is only ever mutated through the backend's stock service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two kinds of stock-tracked items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockKind {
    Component,
    Product,
}

impl StockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockKind::Component => "component",
            StockKind::Product => "product",
        }
    }
}

/// Reference to exactly one stock-tracked item. The sum type makes the
/// "exactly one of component/product" rule structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum StockRef {
    Component(Uuid),
    Product(Uuid),
}

impl StockRef {
    pub fn kind(&self) -> StockKind {
        match self {
            StockRef::Component(_) => StockKind::Component,
            StockRef::Product(_) => StockKind::Product,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            StockRef::Component(id) | StockRef::Product(id) => *id,
        }
    }
}

/// Component category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Capacitor,
    Resistor,
    Inductor,
    Mosfet,
    Ic,
    Other,
}

impl ComponentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Capacitor => "capacitor",
            ComponentType::Resistor => "resistor",
            ComponentType::Inductor => "inductor",
            ComponentType::Mosfet => "mosfet",
            ComponentType::Ic => "ic",
            ComponentType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "capacitor" => Some(ComponentType::Capacitor),
            "resistor" => Some(ComponentType::Resistor),
            "inductor" => Some(ComponentType::Inductor),
            "mosfet" => Some(ComponentType::Mosfet),
            "ic" => Some(ComponentType::Ic),
            "other" => Some(ComponentType::Other),
            _ => None,
        }
    }
}

/// An electronic component in inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: Uuid,
    pub name: String,
    pub component_type: ComponentType,
    pub description: Option<String>,
    pub specifications: Option<String>,
    pub quantity: i32,
    /// Reorder threshold; `None` or zero means "never alert"
    pub min_quantity: Option<i32>,
    pub unit_price: Decimal,
    pub location: Option<String>,
    pub manufacturer: Option<String>,
    pub part_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A resale product in inventory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    /// Reorder threshold; `None` or zero means "never alert"
    pub min_quantity: Option<i32>,
    pub sku: Option<String>,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A ledger row at or below its reorder threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowStockItem {
    pub stock_ref: StockRef,
    pub name: String,
    pub quantity: i32,
    pub min_quantity: i32,
}

/// Whether a reorder threshold should raise a low-stock alert for the given
/// on-hand quantity. A missing or zero threshold never alerts.
pub fn is_low_stock(quantity: i32, min_quantity: Option<i32>) -> bool {
    match min_quantity {
        Some(threshold) if threshold > 0 => quantity <= threshold,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_stock_threshold_inclusive() {
        assert!(is_low_stock(5, Some(5)));
        assert!(is_low_stock(4, Some(5)));
        assert!(!is_low_stock(6, Some(5)));
    }

    #[test]
    fn missing_or_zero_threshold_never_alerts() {
        assert!(!is_low_stock(0, None));
        assert!(!is_low_stock(0, Some(0)));
    }

    #[test]
    fn stock_ref_kind_and_id() {
        let id = Uuid::new_v4();
        assert_eq!(StockRef::Component(id).kind(), StockKind::Component);
        assert_eq!(StockRef::Product(id).id(), id);
    }
}
