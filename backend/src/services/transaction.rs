//! Financial transaction service
//!
//! Read-only view over the ledger the order engine writes into. Rows can be
//! narrowed by direction and by date range.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::{FinancialTransaction, TransactionKind};

use crate::error::{AppError, AppResult};

/// Financial transaction service
#[derive(Clone)]
pub struct TransactionService {
    db: PgPool,
}

/// Filters for listing ledger entries
#[derive(Debug, Deserialize)]
pub struct ListTransactionsFilter {
    pub kind: Option<TransactionKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    kind: String,
    category: String,
    description: Option<String>,
    amount: Decimal,
    transaction_date: DateTime<Utc>,
    service_order_id: Option<Uuid>,
    purchase_order_id: Option<Uuid>,
    payment_method: Option<String>,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_model(self) -> AppResult<FinancialTransaction> {
        let kind = TransactionKind::parse(&self.kind)
            .ok_or_else(|| AppError::Internal(format!("Unknown transaction kind: {}", self.kind)))?;
        Ok(FinancialTransaction {
            id: self.id,
            kind,
            category: self.category,
            description: self.description,
            amount: self.amount,
            transaction_date: self.transaction_date,
            service_order_id: self.service_order_id,
            purchase_order_id: self.purchase_order_id,
            payment_method: self.payment_method,
            created_at: self.created_at,
        })
    }
}

const TRANSACTION_COLUMNS: &str = "id, kind, category, description, amount, transaction_date, \
                                   service_order_id, purchase_order_id, payment_method, created_at";

impl TransactionService {
    /// Create a new TransactionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List ledger entries, newest first
    pub async fn list(&self, filter: ListTransactionsFilter) -> AppResult<Vec<FinancialTransaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            r#"
            SELECT {} FROM transactions
            WHERE ($1::text IS NULL OR kind = $1)
              AND ($2::timestamptz IS NULL OR transaction_date >= $2)
              AND ($3::timestamptz IS NULL OR transaction_date <= $3)
            ORDER BY transaction_date DESC, created_at DESC
            "#,
            TRANSACTION_COLUMNS
        ))
        .bind(filter.kind.map(|kind| kind.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(TransactionRow::into_model).collect()
    }
}
