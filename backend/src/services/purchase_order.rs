//! Purchase order service
//!
//! Restocking from suppliers. The lifecycle is pending -> awaiting_delivery
//! -> (partially_received ->) received, with cancellation only from pending.
//! Receipts credit the stock ledger inside the same transaction that moves
//! the order's status, so stock and status can never disagree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::{
    receipt_status, PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus, StockKind, StockRef,
    TransactionKind,
};
use shared::validation::{validate_price, validate_quantity, validate_receipt_delta};

use crate::error::{AppError, AppResult};
use crate::services::stock::adjust_quantity;

/// Purchase order service
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: PgPool,
}

/// Input line for creating a purchase order
#[derive(Debug, Deserialize)]
pub struct PurchaseItemInput {
    pub stock_ref: StockRef,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Input for creating a purchase order
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseOrderInput {
    pub order_number: String,
    pub supplier: Option<String>,
    pub order_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub items: Vec<PurchaseItemInput>,
}

/// One receipt against an order line, as a positive delta
#[derive(Debug, Deserialize)]
pub struct ReceiptLine {
    pub item_id: Uuid,
    pub quantity: i32,
}

/// Input for recording a (possibly partial) delivery
#[derive(Debug, Deserialize)]
pub struct ReceiveItemsInput {
    pub lines: Vec<ReceiptLine>,
}

#[derive(Debug, FromRow)]
struct PurchaseOrderRow {
    id: Uuid,
    order_number: String,
    supplier: Option<String>,
    order_date: DateTime<Utc>,
    received_date: Option<DateTime<Utc>>,
    received_by: Option<Uuid>,
    total_amount: Decimal,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PurchaseOrderRow {
    fn into_model(self) -> AppResult<PurchaseOrder> {
        let status = PurchaseOrderStatus::parse(&self.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown purchase order status: {}", self.status))
        })?;
        Ok(PurchaseOrder {
            id: self.id,
            order_number: self.order_number,
            supplier: self.supplier,
            order_date: self.order_date,
            received_date: self.received_date,
            received_by: self.received_by,
            total_amount: self.total_amount,
            status,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PurchaseItemRow {
    id: Uuid,
    purchase_order_id: Uuid,
    stock_kind: String,
    stock_item_id: Uuid,
    quantity: i32,
    received_quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
}

impl PurchaseItemRow {
    fn into_model(self) -> AppResult<PurchaseOrderItem> {
        let stock_ref = match self.stock_kind.as_str() {
            "component" => StockRef::Component(self.stock_item_id),
            "product" => StockRef::Product(self.stock_item_id),
            other => {
                return Err(AppError::Internal(format!(
                    "Unknown stock kind on purchase order item: {}",
                    other
                )))
            }
        };
        Ok(PurchaseOrderItem {
            id: self.id,
            purchase_order_id: self.purchase_order_id,
            stock_ref,
            quantity: self.quantity,
            received_quantity: self.received_quantity,
            unit_price: self.unit_price,
            total_price: self.total_price,
        })
    }
}

const ORDER_COLUMNS: &str = "id, order_number, supplier, order_date, received_date, received_by, \
                             total_amount, status, notes, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, purchase_order_id, stock_kind, stock_item_id, quantity, \
                            received_quantity, unit_price, total_price";

impl PurchaseOrderService {
    /// Create a new PurchaseOrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a purchase order in `pending` with its lines. No stock moves
    /// until items are actually received.
    pub async fn create(&self, input: CreatePurchaseOrderInput) -> AppResult<PurchaseOrder> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "A purchase order needs at least one item".to_string(),
                message_pt: "Um pedido de compra precisa de pelo menos um item".to_string(),
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
            if validate_price(item.unit_price).is_err() {
                return Err(AppError::Validation {
                    field: "unit_price".to_string(),
                    message: "Unit price cannot be negative".to_string(),
                    message_pt: "O preço unitário não pode ser negativo".to_string(),
                });
            }
        }

        let total_amount: Decimal = input
            .items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum();
        let order_date = input.order_date.unwrap_or_else(Utc::now);

        let mut tx = self.db.begin().await?;

        for item in &input.items {
            let exists_sql = match item.stock_ref.kind() {
                StockKind::Component => "SELECT EXISTS(SELECT 1 FROM components WHERE id = $1)",
                StockKind::Product => "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)",
            };
            let exists = sqlx::query_scalar::<_, bool>(exists_sql)
                .bind(item.stock_ref.id())
                .fetch_one(&mut *tx)
                .await?;
            if !exists {
                return Err(AppError::NotFound(match item.stock_ref.kind() {
                    StockKind::Component => "Component".to_string(),
                    StockKind::Product => "Product".to_string(),
                }));
            }
        }

        let order_row = sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            r#"
            INSERT INTO purchase_orders (order_number, supplier, order_date, total_amount, status, notes)
            VALUES ($1, $2, $3, $4, 'pending', $5)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(&input.order_number)
        .bind(&input.supplier)
        .bind(order_date)
        .bind(total_amount)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        for item in &input.items {
            let total_price = item.unit_price * Decimal::from(item.quantity);
            sqlx::query(
                r#"
                INSERT INTO purchase_order_items
                    (purchase_order_id, stock_kind, stock_item_id, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order_row.id)
            .bind(item.stock_ref.kind().as_str())
            .bind(item.stock_ref.id())
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(total_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        order_row.into_model()
    }

    /// Approve a pending order: it becomes `awaiting_delivery` and the
    /// expense is posted to the financial ledger in the same transaction.
    pub async fn approve(&self, id: Uuid) -> AppResult<PurchaseOrder> {
        let mut tx = self.db.begin().await?;

        let order = self.lock_order(&mut tx, id).await?;
        if !order.status.can_approve() {
            return Err(AppError::InvalidStateTransition(format!(
                "Purchase order {} cannot be approved from status {}",
                order.order_number,
                order.status.as_str()
            )));
        }

        let updated = sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            r#"
            UPDATE purchase_orders
            SET status = 'awaiting_delivery', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO transactions
                (kind, category, description, amount, transaction_date, purchase_order_id)
            VALUES ($1, 'purchase', $2, $3, $4, $5)
            "#,
        )
        .bind(TransactionKind::Expense.as_str())
        .bind(format!("Purchase order {}", order.order_number))
        .bind(order.total_amount)
        .bind(order.order_date)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(order_number = %updated.order_number, "Purchase order approved");
        updated.into_model()
    }

    /// Record a partial delivery as positive per-line deltas. Each delta
    /// credits the ledger immediately; the order status is recomputed from
    /// its lines afterwards.
    pub async fn receive_items(
        &self,
        id: Uuid,
        received_by: Uuid,
        input: ReceiveItemsInput,
    ) -> AppResult<PurchaseOrder> {
        if input.lines.is_empty() {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "A receipt needs at least one line".to_string(),
                message_pt: "Um recebimento precisa de pelo menos uma linha".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let order = self.lock_order(&mut tx, id).await?;
        if !order.status.can_receive() {
            return Err(AppError::InvalidStateTransition(format!(
                "Purchase order {} cannot receive items from status {}",
                order.order_number,
                order.status.as_str()
            )));
        }

        for line in &input.lines {
            let item = self.load_item(&mut tx, id, line.item_id).await?;
            if let Err(message) =
                validate_receipt_delta(item.quantity, item.received_quantity, line.quantity)
            {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: message.to_string(),
                    message_pt: "Quantidade recebida inválida para esta linha".to_string(),
                });
            }

            sqlx::query(
                "UPDATE purchase_order_items SET received_quantity = received_quantity + $1 WHERE id = $2",
            )
            .bind(line.quantity)
            .bind(line.item_id)
            .execute(&mut *tx)
            .await?;

            adjust_quantity(&mut tx, item.stock_ref, line.quantity).await?;
        }

        let updated = self.finish_receipt(&mut tx, id, received_by).await?;
        tx.commit().await?;

        updated.into_model()
    }

    /// Receive everything still outstanding on the order. Calling this on an
    /// order that is already fully received is a no-op.
    pub async fn receive_all(&self, id: Uuid, received_by: Uuid) -> AppResult<PurchaseOrder> {
        let mut tx = self.db.begin().await?;

        let order = self.lock_order(&mut tx, id).await?;
        if order.status == PurchaseOrderStatus::Received {
            tx.commit().await?;
            return Ok(order);
        }
        if !order.status.can_receive() {
            return Err(AppError::InvalidStateTransition(format!(
                "Purchase order {} cannot receive items from status {}",
                order.order_number,
                order.status.as_str()
            )));
        }

        let items = self.load_items_tx(&mut tx, id).await?;
        for item in &items {
            let remaining = item.remaining();
            if remaining == 0 {
                continue;
            }
            sqlx::query(
                "UPDATE purchase_order_items SET received_quantity = quantity WHERE id = $1",
            )
            .bind(item.id)
            .execute(&mut *tx)
            .await?;

            adjust_quantity(&mut tx, item.stock_ref, remaining).await?;
        }

        let updated = self.finish_receipt(&mut tx, id, received_by).await?;
        tx.commit().await?;

        updated.into_model()
    }

    /// Cancel a pending order. Orders that were approved became a financial
    /// obligation and can no longer be cancelled.
    pub async fn cancel(&self, id: Uuid) -> AppResult<PurchaseOrder> {
        let mut tx = self.db.begin().await?;

        let order = self.lock_order(&mut tx, id).await?;
        if !order.status.can_cancel() {
            return Err(AppError::InvalidStateTransition(format!(
                "Purchase order {} cannot be cancelled from status {}",
                order.order_number,
                order.status.as_str()
            )));
        }

        let updated = sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            r#"
            UPDATE purchase_orders
            SET status = 'cancelled', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        updated.into_model()
    }

    /// Delete an order outright. Any quantities already credited by receipts
    /// are debited back first, so deletion leaves the ledger as if the order
    /// had never existed; the linked expense entry is removed as well.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let order = self.lock_order(&mut tx, id).await?;
        let items = self.load_items_tx(&mut tx, id).await?;

        for item in &items {
            adjust_quantity(&mut tx, item.stock_ref, -item.received_quantity).await?;
        }

        sqlx::query("DELETE FROM transactions WHERE purchase_order_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        // Items go with the order via ON DELETE CASCADE
        sqlx::query("DELETE FROM purchase_orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_number = %order.order_number, "Purchase order deleted");
        Ok(())
    }

    /// List all purchase orders, newest first
    pub async fn list(&self) -> AppResult<Vec<PurchaseOrder>> {
        let rows = sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            "SELECT {} FROM purchase_orders ORDER BY order_date DESC, created_at DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(PurchaseOrderRow::into_model).collect()
    }

    /// Get one purchase order
    pub async fn get(&self, id: Uuid) -> AppResult<PurchaseOrder> {
        let row = sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            "SELECT {} FROM purchase_orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        row.into_model()
    }

    /// Get the lines of one purchase order
    pub async fn get_items(&self, id: Uuid) -> AppResult<Vec<PurchaseOrderItem>> {
        let rows = sqlx::query_as::<_, PurchaseItemRow>(&format!(
            "SELECT {} FROM purchase_order_items WHERE purchase_order_id = $1 ORDER BY created_at",
            ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(PurchaseItemRow::into_model).collect()
    }

    /// Lock the order row for the rest of the transaction.
    async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> AppResult<PurchaseOrder> {
        let row = sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            "SELECT {} FROM purchase_orders WHERE id = $1 FOR UPDATE",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        row.into_model()
    }

    async fn load_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        item_id: Uuid,
    ) -> AppResult<PurchaseOrderItem> {
        let row = sqlx::query_as::<_, PurchaseItemRow>(&format!(
            "SELECT {} FROM purchase_order_items WHERE id = $1 AND purchase_order_id = $2",
            ITEM_COLUMNS
        ))
        .bind(item_id)
        .bind(order_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order item".to_string()))?;

        row.into_model()
    }

    async fn load_items_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> AppResult<Vec<PurchaseOrderItem>> {
        let rows = sqlx::query_as::<_, PurchaseItemRow>(&format!(
            "SELECT {} FROM purchase_order_items WHERE purchase_order_id = $1 ORDER BY created_at",
            ITEM_COLUMNS
        ))
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await?;

        rows.into_iter().map(PurchaseItemRow::into_model).collect()
    }

    /// Recompute the order's status from its lines and stamp the receipt
    /// metadata once every line is complete.
    async fn finish_receipt(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        received_by: Uuid,
    ) -> AppResult<PurchaseOrderRow> {
        let counts = sqlx::query_as::<_, (i32, i32)>(
            "SELECT quantity, received_quantity FROM purchase_order_items WHERE purchase_order_id = $1",
        )
        .bind(id)
        .fetch_all(&mut **tx)
        .await?;

        let status = receipt_status(&counts);

        let row = if status == PurchaseOrderStatus::Received {
            sqlx::query_as::<_, PurchaseOrderRow>(&format!(
                r#"
                UPDATE purchase_orders
                SET status = $1, received_date = NOW(), received_by = $2, updated_at = NOW()
                WHERE id = $3
                RETURNING {}
                "#,
                ORDER_COLUMNS
            ))
            .bind(status.as_str())
            .bind(received_by)
            .bind(id)
            .fetch_one(&mut **tx)
            .await?
        } else {
            sqlx::query_as::<_, PurchaseOrderRow>(&format!(
                r#"
                UPDATE purchase_orders
                SET status = $1, updated_at = NOW()
                WHERE id = $2
                RETURNING {}
                "#,
                ORDER_COLUMNS
            ))
            .bind(status.as_str())
            .bind(id)
            .fetch_one(&mut **tx)
            .await?
        };

        Ok(row)
    }
}
