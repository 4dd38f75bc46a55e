//! Customer service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::Customer;

use crate::error::{AppError, AppResult};

/// Customer service
#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

/// Input for creating a customer
#[derive(Debug, Deserialize)]
pub struct CreateCustomerInput {
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
}

/// Input for updating a customer
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerInput {
    pub name: Option<String>,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    company: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    tax_id: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip_code: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CustomerRow {
    fn into_model(self) -> Customer {
        Customer {
            id: self.id,
            name: self.name,
            company: self.company,
            email: self.email,
            phone: self.phone,
            tax_id: self.tax_id,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const CUSTOMER_COLUMNS: &str = "id, name, company, email, phone, tax_id, address, city, state, \
                                zip_code, notes, created_at, updated_at";

impl CustomerService {
    /// Create a new CustomerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a customer
    pub async fn create(&self, input: CreateCustomerInput) -> AppResult<Customer> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
                message_pt: "O nome é obrigatório".to_string(),
            });
        }

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            INSERT INTO customers
                (name, company, email, phone, tax_id, address, city, state, zip_code, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.company)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.tax_id)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.zip_code)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_model())
    }

    /// Update a customer
    pub async fn update(&self, id: Uuid, input: UpdateCustomerInput) -> AppResult<Customer> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            UPDATE customers
            SET name = COALESCE($1, name),
                company = COALESCE($2, company),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                tax_id = COALESCE($5, tax_id),
                address = COALESCE($6, address),
                city = COALESCE($7, city),
                state = COALESCE($8, state),
                zip_code = COALESCE($9, zip_code),
                notes = COALESCE($10, notes),
                updated_at = NOW()
            WHERE id = $11
            RETURNING {}
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.company)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.tax_id)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.zip_code)
        .bind(&input.notes)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        Ok(row.into_model())
    }

    /// Delete a customer. Fails while sales or service orders reference them.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM sales WHERE customer_id = $1)
                OR EXISTS(SELECT 1 FROM service_orders WHERE customer_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if in_use {
            return Err(AppError::Validation {
                field: "id".to_string(),
                message: "Customer has orders on file and cannot be deleted".to_string(),
                message_pt: "O cliente possui pedidos registrados e não pode ser excluído"
                    .to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer".to_string()));
        }
        Ok(())
    }

    /// List customers, optionally filtered by a name/company search term
    pub async fn list(&self, search: Option<&str>) -> AppResult<Vec<Customer>> {
        let rows = match search {
            Some(term) if !term.is_empty() => {
                let pattern = format!("%{}%", term);
                sqlx::query_as::<_, CustomerRow>(&format!(
                    "SELECT {} FROM customers \
                     WHERE name ILIKE $1 OR company ILIKE $1 OR phone ILIKE $1 \
                     ORDER BY name",
                    CUSTOMER_COLUMNS
                ))
                .bind(pattern)
                .fetch_all(&self.db)
                .await?
            }
            _ => {
                sqlx::query_as::<_, CustomerRow>(&format!(
                    "SELECT {} FROM customers ORDER BY name",
                    CUSTOMER_COLUMNS
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(CustomerRow::into_model).collect())
    }

    /// Get one customer
    pub async fn get(&self, id: Uuid) -> AppResult<Customer> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {} FROM customers WHERE id = $1",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        Ok(row.into_model())
    }
}
