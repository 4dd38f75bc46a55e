//! Employee service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::Employee;

use crate::error::{AppError, AppResult};

/// Employee service
#[derive(Clone)]
pub struct EmployeeService {
    db: PgPool,
}

/// Input for creating an employee
#[derive(Debug, Deserialize)]
pub struct CreateEmployeeInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub commission_rate: Option<Decimal>,
}

/// Input for updating an employee
#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub commission_rate: Option<Decimal>,
    pub active: Option<bool>,
}

#[derive(Debug, FromRow)]
struct EmployeeRow {
    id: Uuid,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    role: Option<String>,
    commission_rate: Decimal,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EmployeeRow {
    fn into_model(self) -> Employee {
        Employee {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            role: self.role,
            commission_rate: self.commission_rate,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const EMPLOYEE_COLUMNS: &str =
    "id, name, email, phone, role, commission_rate, active, created_at, updated_at";

impl EmployeeService {
    /// Create a new EmployeeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an employee
    pub async fn create(&self, input: CreateEmployeeInput) -> AppResult<Employee> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
                message_pt: "O nome é obrigatório".to_string(),
            });
        }

        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            r#"
            INSERT INTO employees (name, email, phone, role, commission_rate)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            EMPLOYEE_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.role)
        .bind(input.commission_rate.unwrap_or(Decimal::ZERO))
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_model())
    }

    /// Update an employee
    pub async fn update(&self, id: Uuid, input: UpdateEmployeeInput) -> AppResult<Employee> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            r#"
            UPDATE employees
            SET name = COALESCE($1, name),
                email = COALESCE($2, email),
                phone = COALESCE($3, phone),
                role = COALESCE($4, role),
                commission_rate = COALESCE($5, commission_rate),
                active = COALESCE($6, active),
                updated_at = NOW()
            WHERE id = $7
            RETURNING {}
            "#,
            EMPLOYEE_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.role)
        .bind(input.commission_rate)
        .bind(input.active)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee".to_string()))?;

        Ok(row.into_model())
    }

    /// List employees; inactive ones only when explicitly requested
    pub async fn list(&self, include_inactive: bool) -> AppResult<Vec<Employee>> {
        let sql = if include_inactive {
            format!("SELECT {} FROM employees ORDER BY name", EMPLOYEE_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM employees WHERE active = TRUE ORDER BY name",
                EMPLOYEE_COLUMNS
            )
        };

        let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(EmployeeRow::into_model).collect())
    }

    /// Get one employee
    pub async fn get(&self, id: Uuid) -> AppResult<Employee> {
        let row = sqlx::query_as::<_, EmployeeRow>(&format!(
            "SELECT {} FROM employees WHERE id = $1",
            EMPLOYEE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee".to_string()))?;

        Ok(row.into_model())
    }
}
