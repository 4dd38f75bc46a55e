//! Stock ledger service
//!
//! The single authoritative write path for on-hand quantities. Every order
//! machine (purchasing, sales, service-order consumption) funnels its stock
//! deltas through [`adjust_quantity`]; nothing else in the backend writes a
//! `quantity` column.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::{LowStockItem, StockKind, StockRef};

use crate::error::{AppError, AppResult};

/// Apply a signed stock delta to one ledger row inside the caller's
/// transaction.
///
/// The mutation is a single guarded UPDATE evaluated server-side, so two
/// concurrent transitions against the same item serialize on the row lock
/// instead of racing a read-then-write. Credits (`delta >= 0`) always pass
/// the guard; debits fail with [`AppError::InsufficientStock`] rather than
/// drive the quantity negative.
pub async fn adjust_quantity(
    tx: &mut Transaction<'_, Postgres>,
    stock_ref: StockRef,
    delta: i32,
) -> AppResult<()> {
    if delta == 0 {
        return Ok(());
    }

    let update_sql = match stock_ref.kind() {
        StockKind::Component => {
            r#"
            UPDATE components
            SET quantity = quantity + $1, updated_at = NOW()
            WHERE id = $2 AND quantity + $1 >= 0
            "#
        }
        StockKind::Product => {
            r#"
            UPDATE products
            SET quantity = quantity + $1, updated_at = NOW()
            WHERE id = $2 AND quantity + $1 >= 0
            "#
        }
    };

    let result = sqlx::query(update_sql)
        .bind(delta)
        .bind(stock_ref.id())
        .execute(&mut **tx)
        .await?;

    if result.rows_affected() > 0 {
        return Ok(());
    }

    // Zero rows: either the item does not exist or the debit would go
    // negative. Read the row to tell the two apart.
    let lookup_sql = match stock_ref.kind() {
        StockKind::Component => "SELECT name, quantity FROM components WHERE id = $1",
        StockKind::Product => "SELECT name, quantity FROM products WHERE id = $1",
    };

    let row = sqlx::query_as::<_, (String, i32)>(lookup_sql)
        .bind(stock_ref.id())
        .fetch_optional(&mut **tx)
        .await?;

    match row {
        Some((name, available)) => Err(AppError::InsufficientStock {
            item: name,
            requested: -delta,
            available,
        }),
        None => Err(AppError::NotFound(resource_name(stock_ref.kind()).to_string())),
    }
}

fn resource_name(kind: StockKind) -> &'static str {
    match kind {
        StockKind::Component => "Component",
        StockKind::Product => "Product",
    }
}

/// Read-only views over the stock ledger
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Row for the low-stock union query
#[derive(Debug, sqlx::FromRow)]
struct LowStockRow {
    kind: String,
    id: Uuid,
    name: String,
    quantity: i32,
    min_quantity: i32,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Current on-hand quantity for a ledger row
    pub async fn get_quantity(&self, stock_ref: StockRef) -> AppResult<i32> {
        let sql = match stock_ref.kind() {
            StockKind::Component => "SELECT quantity FROM components WHERE id = $1",
            StockKind::Product => "SELECT quantity FROM products WHERE id = $1",
        };

        sqlx::query_scalar::<_, i32>(sql)
            .bind(stock_ref.id())
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(resource_name(stock_ref.kind()).to_string()))
    }

    /// Every ledger row at or below its reorder threshold, components and
    /// products alike. A null or zero threshold never alerts.
    pub async fn list_low_stock(&self) -> AppResult<Vec<LowStockItem>> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT 'component' AS kind, id, name, quantity, min_quantity
            FROM components
            WHERE min_quantity IS NOT NULL AND min_quantity > 0 AND quantity <= min_quantity
            UNION ALL
            SELECT 'product' AS kind, id, name, quantity, min_quantity
            FROM products
            WHERE active = TRUE
              AND min_quantity IS NOT NULL AND min_quantity > 0 AND quantity <= min_quantity
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| LowStockItem {
                stock_ref: if row.kind == "component" {
                    StockRef::Component(row.id)
                } else {
                    StockRef::Product(row.id)
                },
                name: row.name,
                quantity: row.quantity,
                min_quantity: row.min_quantity,
            })
            .collect())
    }
}
