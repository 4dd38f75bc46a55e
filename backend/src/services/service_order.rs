//! Repair service order service
//!
//! Service orders carry a replace-as-a-whole set of component usage rows.
//! Edits are applied as per-component deltas against the stored set, so a
//! component whose quantity did not change is never touched on the ledger
//! and an unrelated concurrent receipt cannot be clobbered.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::models::{
    next_order_number, usage_deltas, ComponentUsage, ServiceOrder, ServiceOrderStatus,
    ServiceType, StockRef, UsageEntry,
};
use shared::validation::validate_quantity;

use crate::error::{AppError, AppResult};
use crate::services::stock::adjust_quantity;

/// Service order service
#[derive(Clone)]
pub struct ServiceOrderService {
    db: PgPool,
}

/// Input for creating a service order
#[derive(Debug, Deserialize)]
pub struct CreateServiceOrderInput {
    pub customer_id: Uuid,
    pub service_type: ServiceType,
    pub equipment_description: Option<String>,
    pub reported_issue: Option<String>,
    pub technician_id: Option<Uuid>,
    pub labor_cost: Option<Decimal>,
    pub received_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[serde(default)]
    pub components: Vec<UsageEntry>,
}

/// Input for updating a service order. The components list, when present,
/// replaces the stored set entirely.
#[derive(Debug, Deserialize)]
pub struct UpdateServiceOrderInput {
    pub service_type: Option<ServiceType>,
    pub equipment_description: Option<String>,
    pub reported_issue: Option<String>,
    pub diagnosis: Option<String>,
    pub solution: Option<String>,
    pub status: Option<ServiceOrderStatus>,
    pub technician_id: Option<Uuid>,
    pub labor_cost: Option<Decimal>,
    pub notes: Option<String>,
    pub components: Option<Vec<UsageEntry>>,
}

#[derive(Debug, FromRow)]
struct ServiceOrderRow {
    id: Uuid,
    order_number: String,
    customer_id: Uuid,
    service_type: String,
    equipment_description: Option<String>,
    reported_issue: Option<String>,
    diagnosis: Option<String>,
    solution: Option<String>,
    status: String,
    received_by: Option<Uuid>,
    technician_id: Option<Uuid>,
    labor_cost: Decimal,
    parts_cost: Decimal,
    total_cost: Decimal,
    received_date: DateTime<Utc>,
    completed_date: Option<DateTime<Utc>>,
    delivered_date: Option<DateTime<Utc>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServiceOrderRow {
    fn into_model(self) -> AppResult<ServiceOrder> {
        let status = ServiceOrderStatus::parse(&self.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown service order status: {}", self.status))
        })?;
        let service_type = ServiceType::parse(&self.service_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown service type: {}", self.service_type))
        })?;
        Ok(ServiceOrder {
            id: self.id,
            order_number: self.order_number,
            customer_id: self.customer_id,
            service_type,
            equipment_description: self.equipment_description,
            reported_issue: self.reported_issue,
            diagnosis: self.diagnosis,
            solution: self.solution,
            status,
            received_by: self.received_by,
            technician_id: self.technician_id,
            labor_cost: self.labor_cost,
            parts_cost: self.parts_cost,
            total_cost: self.total_cost,
            received_date: self.received_date,
            completed_date: self.completed_date,
            delivered_date: self.delivered_date,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, order_number, customer_id, service_type, equipment_description, \
                             reported_issue, diagnosis, solution, status, received_by, \
                             technician_id, labor_cost, parts_cost, total_cost, received_date, \
                             completed_date, delivered_date, notes, created_at, updated_at";

impl ServiceOrderService {
    /// Create a new ServiceOrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a service order in `open`, allocating the next order number
    /// and debiting any initial component usage.
    pub async fn create(
        &self,
        received_by: Uuid,
        input: CreateServiceOrderInput,
    ) -> AppResult<ServiceOrder> {
        validate_usage(&input.components)?;

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

        // Serialize number allocation against concurrent creates.
        sqlx::query("LOCK TABLE service_orders IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;
        let existing: Vec<String> =
            sqlx::query_scalar("SELECT order_number FROM service_orders")
                .fetch_all(&mut *tx)
                .await?;
        let order_number = next_order_number(existing.iter().map(String::as_str));

        let labor_cost = input.labor_cost.unwrap_or(Decimal::ZERO);
        let received_date = input.received_date.unwrap_or_else(Utc::now);

        let row = sqlx::query_as::<_, ServiceOrderRow>(&format!(
            r#"
            INSERT INTO service_orders
                (order_number, customer_id, service_type, equipment_description, reported_issue,
                 status, received_by, technician_id, labor_cost, received_date, notes)
            VALUES ($1, $2, $3, $4, $5, 'open', $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(&order_number)
        .bind(input.customer_id)
        .bind(input.service_type.as_str())
        .bind(&input.equipment_description)
        .bind(&input.reported_issue)
        .bind(received_by)
        .bind(input.technician_id)
        .bind(labor_cost)
        .bind(received_date)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        self.apply_usage(&mut tx, row.id, &[], &input.components)
            .await?;
        let updated = self.recompute_costs(&mut tx, row.id, labor_cost).await?;

        tx.commit().await?;

        tracing::info!(order_number = %order_number, "Service order created");
        updated.into_model()
    }

    /// Update a service order. When a components list is supplied, the stored
    /// set is diffed against it and only the changed components move stock.
    pub async fn update(&self, id: Uuid, input: UpdateServiceOrderInput) -> AppResult<ServiceOrder> {
        if let Some(components) = &input.components {
            validate_usage(components)?;
        }

        let mut tx = self.db.begin().await?;
        let order = self.lock_order(&mut tx, id).await?;

        if let Some(components) = &input.components {
            let current = self.load_usage_tx(&mut tx, id).await?;
            let current_entries: Vec<UsageEntry> = current
                .iter()
                .map(|usage| UsageEntry {
                    component_id: usage.component_id,
                    quantity: usage.quantity,
                })
                .collect();
            self.apply_usage(&mut tx, id, &current_entries, components)
                .await?;
        }

        let status = input.status.unwrap_or(order.status);
        let completed_date = if status.marks_completed() {
            order.completed_date.or_else(|| Some(Utc::now()))
        } else {
            order.completed_date
        };
        let delivered_date = if status.marks_delivered() {
            order.delivered_date.or_else(|| Some(Utc::now()))
        } else {
            order.delivered_date
        };

        let labor_cost = input.labor_cost.unwrap_or(order.labor_cost);
        let service_type = input.service_type.unwrap_or(order.service_type);

        sqlx::query(
            r#"
            UPDATE service_orders
            SET service_type = $1,
                equipment_description = COALESCE($2, equipment_description),
                reported_issue = COALESCE($3, reported_issue),
                diagnosis = COALESCE($4, diagnosis),
                solution = COALESCE($5, solution),
                status = $6,
                technician_id = COALESCE($7, technician_id),
                notes = COALESCE($8, notes),
                completed_date = $9,
                delivered_date = $10,
                updated_at = NOW()
            WHERE id = $11
            "#,
        )
        .bind(service_type.as_str())
        .bind(&input.equipment_description)
        .bind(&input.reported_issue)
        .bind(&input.diagnosis)
        .bind(&input.solution)
        .bind(status.as_str())
        .bind(input.technician_id)
        .bind(&input.notes)
        .bind(completed_date)
        .bind(delivered_date)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let updated = self.recompute_costs(&mut tx, id, labor_cost).await?;
        tx.commit().await?;

        updated.into_model()
    }

    /// Delete a service order, crediting all of its component usage back.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        let order = self.lock_order(&mut tx, id).await?;
        for usage in self.load_usage_tx(&mut tx, id).await? {
            adjust_quantity(&mut tx, StockRef::Component(usage.component_id), usage.quantity)
                .await?;
        }

        // Usage rows go with the order via ON DELETE CASCADE
        sqlx::query("DELETE FROM service_orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_number = %order.order_number, "Service order deleted");
        Ok(())
    }

    /// List all service orders, newest first
    pub async fn list(&self) -> AppResult<Vec<ServiceOrder>> {
        let rows = sqlx::query_as::<_, ServiceOrderRow>(&format!(
            "SELECT {} FROM service_orders ORDER BY received_date DESC, created_at DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ServiceOrderRow::into_model).collect()
    }

    /// List service orders in a given workflow state
    pub async fn list_by_status(&self, status: ServiceOrderStatus) -> AppResult<Vec<ServiceOrder>> {
        let rows = sqlx::query_as::<_, ServiceOrderRow>(&format!(
            "SELECT {} FROM service_orders WHERE status = $1 ORDER BY received_date DESC",
            ORDER_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ServiceOrderRow::into_model).collect()
    }

    /// List service orders for one customer
    pub async fn list_by_customer(&self, customer_id: Uuid) -> AppResult<Vec<ServiceOrder>> {
        let rows = sqlx::query_as::<_, ServiceOrderRow>(&format!(
            "SELECT {} FROM service_orders WHERE customer_id = $1 ORDER BY received_date DESC",
            ORDER_COLUMNS
        ))
        .bind(customer_id)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ServiceOrderRow::into_model).collect()
    }

    /// Get one service order
    pub async fn get(&self, id: Uuid) -> AppResult<ServiceOrder> {
        let row = sqlx::query_as::<_, ServiceOrderRow>(&format!(
            "SELECT {} FROM service_orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Service order".to_string()))?;

        row.into_model()
    }

    /// Get the component usage rows of one service order
    pub async fn get_usage(&self, id: Uuid) -> AppResult<Vec<ComponentUsage>> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid, Uuid, i32)>(
            "SELECT id, service_order_id, component_id, quantity \
             FROM service_order_components WHERE service_order_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, service_order_id, component_id, quantity)| ComponentUsage {
                id,
                service_order_id,
                component_id,
                quantity,
            })
            .collect())
    }

    async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> AppResult<ServiceOrder> {
        let row = sqlx::query_as::<_, ServiceOrderRow>(&format!(
            "SELECT {} FROM service_orders WHERE id = $1 FOR UPDATE",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Service order".to_string()))?;

        row.into_model()
    }

    async fn load_usage_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> AppResult<Vec<ComponentUsage>> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid, Uuid, i32)>(
            "SELECT id, service_order_id, component_id, quantity \
             FROM service_order_components WHERE service_order_id = $1",
        )
        .bind(order_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, service_order_id, component_id, quantity)| ComponentUsage {
                id,
                service_order_id,
                component_id,
                quantity,
            })
            .collect())
    }

    /// Replace the stored usage set with `new`, moving stock only by the
    /// per-component difference.
    async fn apply_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        current: &[UsageEntry],
        new: &[UsageEntry],
    ) -> AppResult<()> {
        let deltas = usage_deltas(current, new).map_err(|message| AppError::Validation {
            field: "components".to_string(),
            message: message.to_string(),
            message_pt: "A quantidade total de componentes está fora do intervalo".to_string(),
        })?;
        for (component_id, delta) in deltas {
            adjust_quantity(tx, StockRef::Component(component_id), delta).await?;
        }

        sqlx::query("DELETE FROM service_order_components WHERE service_order_id = $1")
            .bind(order_id)
            .execute(&mut **tx)
            .await?;

        for entry in new {
            sqlx::query(
                r#"
                INSERT INTO service_order_components (service_order_id, component_id, quantity)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(order_id)
            .bind(entry.component_id)
            .bind(entry.quantity)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    /// Recompute parts cost from the current usage set at current component
    /// prices and refresh the totals.
    async fn recompute_costs(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        labor_cost: Decimal,
    ) -> AppResult<ServiceOrderRow> {
        let parts_cost: Decimal = sqlx::query_scalar::<_, Option<Decimal>>(
            r#"
            SELECT SUM(c.unit_price * soc.quantity)
            FROM service_order_components soc
            JOIN components c ON c.id = soc.component_id
            WHERE soc.service_order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_one(&mut **tx)
        .await?
        .unwrap_or(Decimal::ZERO);

        let row = sqlx::query_as::<_, ServiceOrderRow>(&format!(
            r#"
            UPDATE service_orders
            SET labor_cost = $1, parts_cost = $2, total_cost = $1 + $2, updated_at = NOW()
            WHERE id = $3
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(labor_cost)
        .bind(parts_cost)
        .bind(order_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }
}

fn validate_usage(entries: &[UsageEntry]) -> AppResult<()> {
    for entry in entries {
        if validate_quantity(entry.quantity).is_err() {
            return Err(AppError::Validation {
                field: "components".to_string(),
                message: "Component quantity must be positive".to_string(),
                message_pt: "A quantidade de componente deve ser positiva".to_string(),
            });
        }
    }
    Ok(())
}
