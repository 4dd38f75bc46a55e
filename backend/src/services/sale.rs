//! Point-of-sale service
//!
//! A sale debits product stock at creation and keeps that debit while it is
//! `completed`. Status changes replay the ledger effect in both directions:
//! leaving `completed` restores every item, re-entering it re-validates and
//! debits again. All of it happens inside one transaction per call.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::{sale_stock_effect, Sale, SaleItem, SaleStatus, SaleStockEffect, StockRef};
use shared::validation::validate_quantity;

use crate::error::{AppError, AppResult};
use crate::services::stock::adjust_quantity;

/// Sale service
#[derive(Clone)]
pub struct SaleService {
    db: PgPool,
}

/// Input line for creating a sale
#[derive(Debug, Deserialize)]
pub struct SaleItemInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Input for creating a sale
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub customer_id: Uuid,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub sale_date: Option<DateTime<Utc>>,
    pub items: Vec<SaleItemInput>,
}

/// Input for changing a sale's status
#[derive(Debug, Deserialize)]
pub struct ChangeSaleStatusInput {
    pub status: SaleStatus,
}

#[derive(Debug, FromRow)]
struct SaleRow {
    id: Uuid,
    customer_id: Uuid,
    total_amount: Decimal,
    status: String,
    sale_date: DateTime<Utc>,
    payment_method: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_model(self) -> AppResult<Sale> {
        let status = SaleStatus::parse(&self.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown sale status: {}", self.status)))?;
        Ok(Sale {
            id: self.id,
            customer_id: self.customer_id,
            total_amount: self.total_amount,
            status,
            sale_date: self.sale_date,
            payment_method: self.payment_method,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct SaleItemRow {
    id: Uuid,
    sale_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
}

impl SaleItemRow {
    fn into_model(self) -> SaleItem {
        SaleItem {
            id: self.id,
            sale_id: self.sale_id,
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
            total_price: self.total_price,
        }
    }
}

const SALE_COLUMNS: &str =
    "id, customer_id, total_amount, status, sale_date, payment_method, notes, created_at, updated_at";

const SALE_ITEM_COLUMNS: &str = "id, sale_id, product_id, quantity, unit_price, total_price";

impl SaleService {
    /// Create a new SaleService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a sale in `completed`, snapshotting the current product price
    /// onto each line and debiting stock atomically. If any line cannot be
    /// covered the whole sale rolls back.
    pub async fn create(&self, input: CreateSaleInput) -> AppResult<Sale> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "A sale needs at least one item".to_string(),
                message_pt: "Uma venda precisa de pelo menos um item".to_string(),
            });
        }
        for item in &input.items {
            if validate_quantity(item.quantity).is_err() {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Quantity must be positive".to_string(),
                    message_pt: "A quantidade deve ser positiva".to_string(),
                });
            }
        }

        let mut tx = self.db.begin().await?;

        let customer_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)",
        )
        .bind(input.customer_id)
        .fetch_one(&mut *tx)
        .await?;
        if !customer_exists {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        // Price snapshot and stock debit per line; the guarded debit is what
        // actually enforces availability under concurrency.
        let mut total_amount = Decimal::ZERO;
        let mut lines: Vec<(Uuid, i32, Decimal, Decimal)> = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let price = sqlx::query_scalar::<_, Decimal>(
                "SELECT price FROM products WHERE id = $1 AND active = TRUE",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            adjust_quantity(&mut tx, StockRef::Product(item.product_id), -item.quantity).await?;

            let total_price = price * Decimal::from(item.quantity);
            total_amount += total_price;
            lines.push((item.product_id, item.quantity, price, total_price));
        }

        let sale_date = input.sale_date.unwrap_or_else(Utc::now);
        let sale_row = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            INSERT INTO sales (customer_id, total_amount, status, sale_date, payment_method, notes)
            VALUES ($1, $2, 'completed', $3, $4, $5)
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(input.customer_id)
        .bind(total_amount)
        .bind(sale_date)
        .bind(&input.payment_method)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        for (product_id, quantity, unit_price, total_price) in &lines {
            sqlx::query(
                r#"
                INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(sale_row.id)
            .bind(product_id)
            .bind(quantity)
            .bind(unit_price)
            .bind(total_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        sale_row.into_model()
    }

    /// Move a sale to a new status, replaying the stock effect of the
    /// transition. Lateral moves between the reversed states touch nothing.
    pub async fn change_status(
        &self,
        id: Uuid,
        input: ChangeSaleStatusInput,
    ) -> AppResult<Sale> {
        let mut tx = self.db.begin().await?;

        let sale = self.lock_sale(&mut tx, id).await?;
        let effect = sale_stock_effect(sale.status, input.status);

        match effect {
            SaleStockEffect::Restore => {
                for item in self.load_items_tx(&mut tx, id).await? {
                    adjust_quantity(&mut tx, StockRef::Product(item.product_id), item.quantity)
                        .await?;
                }
            }
            SaleStockEffect::Debit => {
                for item in self.load_items_tx(&mut tx, id).await? {
                    adjust_quantity(&mut tx, StockRef::Product(item.product_id), -item.quantity)
                        .await?;
                }
            }
            SaleStockEffect::None => {}
        }

        let updated = sqlx::query_as::<_, SaleRow>(&format!(
            r#"
            UPDATE sales
            SET status = $1, updated_at = NOW()
            WHERE id = $2 AND status = $3
            RETURNING {}
            "#,
            SALE_COLUMNS
        ))
        .bind(input.status.as_str())
        .bind(id)
        .bind(sale.status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        updated.into_model()
    }

    /// Delete a sale. If it is currently `completed` its stock debit is
    /// restored first, so deletion never loses inventory.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let sale = self.lock_sale(&mut tx, id).await?;
        if sale.status == SaleStatus::Completed {
            for item in self.load_items_tx(&mut tx, id).await? {
                adjust_quantity(&mut tx, StockRef::Product(item.product_id), item.quantity)
                    .await?;
            }
        }

        // Items go with the sale via ON DELETE CASCADE
        sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// List all sales, newest first
    pub async fn list(&self) -> AppResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM sales ORDER BY sale_date DESC, created_at DESC",
            SALE_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(SaleRow::into_model).collect()
    }

    /// Get one sale
    pub async fn get(&self, id: Uuid) -> AppResult<Sale> {
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM sales WHERE id = $1",
            SALE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        row.into_model()
    }

    /// Get the lines of one sale
    pub async fn get_items(&self, id: Uuid) -> AppResult<Vec<SaleItem>> {
        let rows = sqlx::query_as::<_, SaleItemRow>(&format!(
            "SELECT {} FROM sale_items WHERE sale_id = $1 ORDER BY created_at",
            SALE_ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SaleItemRow::into_model).collect())
    }

    async fn lock_sale(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> AppResult<Sale> {
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {} FROM sales WHERE id = $1 FOR UPDATE",
            SALE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Sale".to_string()))?;

        row.into_model()
    }

    async fn load_items_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sale_id: Uuid,
    ) -> AppResult<Vec<SaleItem>> {
        let rows = sqlx::query_as::<_, SaleItemRow>(&format!(
            "SELECT {} FROM sale_items WHERE sale_id = $1 ORDER BY created_at",
            SALE_ITEM_COLUMNS
        ))
        .bind(sale_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows.into_iter().map(SaleItemRow::into_model).collect())
    }
}
