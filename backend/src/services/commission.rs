//! Commission service
//!
//! Calculates what a technician is owed for a service order from their
//! current commission rate, snapshotting both the rate and the base amount
//! onto the row. Settlement is per-row: paying marks the row and stamps the
//! payment date; paying an already-settled row changes nothing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::{commission_amount, Commission};
use shared::validation::validate_price;

use crate::error::{AppError, AppResult};

/// Commission service
#[derive(Clone)]
pub struct CommissionService {
    db: PgPool,
}

/// Input for calculating a commission. When `amount` is absent the service
/// order's total cost is used as the base.
#[derive(Debug, Deserialize)]
pub struct CalculateCommissionInput {
    pub employee_id: Uuid,
    pub service_order_id: Uuid,
    pub amount: Option<Decimal>,
}

/// Filters for listing commissions
#[derive(Debug, Deserialize)]
pub struct ListCommissionsFilter {
    pub employee_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, FromRow)]
struct CommissionRow {
    id: Uuid,
    employee_id: Uuid,
    service_order_id: Uuid,
    rate: Decimal,
    based_on_amount: Decimal,
    amount: Decimal,
    paid: bool,
    paid_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl CommissionRow {
    fn into_model(self) -> Commission {
        Commission {
            id: self.id,
            employee_id: self.employee_id,
            service_order_id: self.service_order_id,
            rate: self.rate,
            based_on_amount: self.based_on_amount,
            amount: self.amount,
            paid: self.paid,
            paid_date: self.paid_date,
            created_at: self.created_at,
        }
    }
}

const COMMISSION_COLUMNS: &str = "id, employee_id, service_order_id, rate, based_on_amount, \
                                  amount, paid, paid_date, created_at";

impl CommissionService {
    /// Create a new CommissionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Calculate and record a commission for an employee on a service order.
    pub async fn calculate(&self, input: CalculateCommissionInput) -> AppResult<Commission> {
        let rate = sqlx::query_scalar::<_, Decimal>(
            "SELECT commission_rate FROM employees WHERE id = $1",
        )
        .bind(input.employee_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee".to_string()))?;

        let total_cost = sqlx::query_scalar::<_, Decimal>(
            "SELECT total_cost FROM service_orders WHERE id = $1",
        )
        .bind(input.service_order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service order".to_string()))?;

        let base = input.amount.unwrap_or(total_cost);
        if validate_price(base).is_err() {
            return Err(AppError::Validation {
                field: "amount".to_string(),
                message: "Base amount cannot be negative".to_string(),
                message_pt: "O valor base não pode ser negativo".to_string(),
            });
        }

        let amount = commission_amount(base, rate);

        let row = sqlx::query_as::<_, CommissionRow>(&format!(
            r#"
            INSERT INTO commissions (employee_id, service_order_id, rate, based_on_amount, amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            COMMISSION_COLUMNS
        ))
        .bind(input.employee_id)
        .bind(input.service_order_id)
        .bind(rate)
        .bind(base)
        .bind(amount)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_model())
    }

    /// List commissions, optionally narrowed to an employee and/or a
    /// creation date range.
    pub async fn list(&self, filter: ListCommissionsFilter) -> AppResult<Vec<Commission>> {
        let rows = sqlx::query_as::<_, CommissionRow>(&format!(
            r#"
            SELECT {} FROM commissions
            WHERE ($1::uuid IS NULL OR employee_id = $1)
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at <= $3)
            ORDER BY created_at DESC
            "#,
            COMMISSION_COLUMNS
        ))
        .bind(filter.employee_id)
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(CommissionRow::into_model).collect())
    }

    /// List unsettled commissions, optionally for one employee.
    pub async fn list_pending(&self, employee_id: Option<Uuid>) -> AppResult<Vec<Commission>> {
        let rows = sqlx::query_as::<_, CommissionRow>(&format!(
            r#"
            SELECT {} FROM commissions
            WHERE paid = FALSE AND ($1::uuid IS NULL OR employee_id = $1)
            ORDER BY created_at
            "#,
            COMMISSION_COLUMNS
        ))
        .bind(employee_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(CommissionRow::into_model).collect())
    }

    /// Settle a commission. Paying an already-paid commission keeps its
    /// original payment date.
    pub async fn pay(&self, id: Uuid) -> AppResult<Commission> {
        sqlx::query("UPDATE commissions SET paid = TRUE, paid_date = NOW() WHERE id = $1 AND paid = FALSE")
            .bind(id)
            .execute(&self.db)
            .await?;

        let row = sqlx::query_as::<_, CommissionRow>(&format!(
            "SELECT {} FROM commissions WHERE id = $1",
            COMMISSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Commission".to_string()))?;

        Ok(row.into_model())
    }

    /// Total commission earned by an employee over a date range.
    pub async fn total_for_employee(
        &self,
        employee_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Decimal> {
        let total = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(amount) FROM commissions
            WHERE employee_id = $1
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at <= $3)
            "#,
        )
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.db)
        .await?;

        Ok(total.unwrap_or(Decimal::ZERO))
    }
}
