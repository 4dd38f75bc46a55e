//! Catalog service: components and resale products
//!
//! CRUD over the two stock-tracked item kinds. On-hand quantity is only set
//! here at creation time; afterwards every change goes through the stock
//! service, so the update paths deliberately leave `quantity` alone.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::models::{Component, ComponentType, Product};
use shared::validation::validate_price;

use crate::error::{AppError, AppResult};

/// Catalog service
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Input for creating a component
#[derive(Debug, Deserialize)]
pub struct CreateComponentInput {
    pub name: String,
    pub component_type: ComponentType,
    pub description: Option<String>,
    pub specifications: Option<String>,
    pub quantity: Option<i32>,
    pub min_quantity: Option<i32>,
    pub unit_price: Decimal,
    pub location: Option<String>,
    pub manufacturer: Option<String>,
    pub part_number: Option<String>,
}

/// Input for updating a component (quantity excluded)
#[derive(Debug, Deserialize)]
pub struct UpdateComponentInput {
    pub name: Option<String>,
    pub component_type: Option<ComponentType>,
    pub description: Option<String>,
    pub specifications: Option<String>,
    pub min_quantity: Option<i32>,
    pub unit_price: Option<Decimal>,
    pub location: Option<String>,
    pub manufacturer: Option<String>,
    pub part_number: Option<String>,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub quantity: Option<i32>,
    pub min_quantity: Option<i32>,
    pub sku: Option<String>,
    pub image_url: Option<String>,
}

/// Input for updating a product (quantity excluded)
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub min_quantity: Option<i32>,
    pub sku: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, FromRow)]
struct ComponentRow {
    id: Uuid,
    name: String,
    component_type: String,
    description: Option<String>,
    specifications: Option<String>,
    quantity: i32,
    min_quantity: Option<i32>,
    unit_price: Decimal,
    location: Option<String>,
    manufacturer: Option<String>,
    part_number: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ComponentRow {
    fn into_model(self) -> AppResult<Component> {
        let component_type = ComponentType::parse(&self.component_type).ok_or_else(|| {
            AppError::Internal(format!("Unknown component type: {}", self.component_type))
        })?;
        Ok(Component {
            id: self.id,
            name: self.name,
            component_type,
            description: self.description,
            specifications: self.specifications,
            quantity: self.quantity,
            min_quantity: self.min_quantity,
            unit_price: self.unit_price,
            location: self.location,
            manufacturer: self.manufacturer,
            part_number: self.part_number,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    quantity: i32,
    min_quantity: Option<i32>,
    sku: Option<String>,
    image_url: Option<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_model(self) -> Product {
        Product {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            quantity: self.quantity,
            min_quantity: self.min_quantity,
            sku: self.sku,
            image_url: self.image_url,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const COMPONENT_COLUMNS: &str = "id, name, component_type, description, specifications, quantity, \
                                 min_quantity, unit_price, location, manufacturer, part_number, \
                                 created_at, updated_at";

const PRODUCT_COLUMNS: &str = "id, name, description, price, quantity, min_quantity, sku, \
                               image_url, active, created_at, updated_at";

impl CatalogService {
    /// Create a new CatalogService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a component, optionally with an opening quantity
    pub async fn create_component(&self, input: CreateComponentInput) -> AppResult<Component> {
        validate_name(&input.name)?;
        validate_money(input.unit_price, "unit_price")?;
        let quantity = input.quantity.unwrap_or(0);
        if quantity < 0 {
            return Err(negative_opening_quantity());
        }

        let row = sqlx::query_as::<_, ComponentRow>(&format!(
            r#"
            INSERT INTO components
                (name, component_type, description, specifications, quantity, min_quantity,
                 unit_price, location, manufacturer, part_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            COMPONENT_COLUMNS
        ))
        .bind(&input.name)
        .bind(input.component_type.as_str())
        .bind(&input.description)
        .bind(&input.specifications)
        .bind(quantity)
        .bind(input.min_quantity)
        .bind(input.unit_price)
        .bind(&input.location)
        .bind(&input.manufacturer)
        .bind(&input.part_number)
        .fetch_one(&self.db)
        .await?;

        row.into_model()
    }

    /// Update a component's descriptive fields
    pub async fn update_component(
        &self,
        id: Uuid,
        input: UpdateComponentInput,
    ) -> AppResult<Component> {
        if let Some(price) = input.unit_price {
            validate_money(price, "unit_price")?;
        }

        let row = sqlx::query_as::<_, ComponentRow>(&format!(
            r#"
            UPDATE components
            SET name = COALESCE($1, name),
                component_type = COALESCE($2, component_type),
                description = COALESCE($3, description),
                specifications = COALESCE($4, specifications),
                min_quantity = COALESCE($5, min_quantity),
                unit_price = COALESCE($6, unit_price),
                location = COALESCE($7, location),
                manufacturer = COALESCE($8, manufacturer),
                part_number = COALESCE($9, part_number),
                updated_at = NOW()
            WHERE id = $10
            RETURNING {}
            "#,
            COMPONENT_COLUMNS
        ))
        .bind(&input.name)
        .bind(input.component_type.map(|t| t.as_str()))
        .bind(&input.description)
        .bind(&input.specifications)
        .bind(input.min_quantity)
        .bind(input.unit_price)
        .bind(&input.location)
        .bind(&input.manufacturer)
        .bind(&input.part_number)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Component".to_string()))?;

        row.into_model()
    }

    /// Delete a component. Fails if any service order or purchase order line
    /// still references it.
    pub async fn delete_component(&self, id: Uuid) -> AppResult<()> {
        let in_use = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM service_order_components WHERE component_id = $1)
                OR EXISTS(SELECT 1 FROM purchase_order_items
                          WHERE stock_kind = 'component' AND stock_item_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if in_use {
            return Err(AppError::Validation {
                field: "id".to_string(),
                message: "Component is referenced by orders and cannot be deleted".to_string(),
                message_pt: "O componente é referenciado por pedidos e não pode ser excluído"
                    .to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM components WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Component".to_string()));
        }
        Ok(())
    }

    /// List components, optionally filtered by a name/part-number search term
    /// and/or a component type
    pub async fn list_components(
        &self,
        search: Option<&str>,
        component_type: Option<ComponentType>,
    ) -> AppResult<Vec<Component>> {
        let pattern = search
            .filter(|term| !term.is_empty())
            .map(|term| format!("%{}%", term));

        let rows = sqlx::query_as::<_, ComponentRow>(&format!(
            r#"
            SELECT {} FROM components
            WHERE ($1::text IS NULL
                   OR name ILIKE $1 OR part_number ILIKE $1 OR manufacturer ILIKE $1)
              AND ($2::text IS NULL OR component_type = $2)
            ORDER BY name
            "#,
            COMPONENT_COLUMNS
        ))
        .bind(pattern)
        .bind(component_type.map(|t| t.as_str()))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ComponentRow::into_model).collect()
    }

    /// Get one component
    pub async fn get_component(&self, id: Uuid) -> AppResult<Component> {
        let row = sqlx::query_as::<_, ComponentRow>(&format!(
            "SELECT {} FROM components WHERE id = $1",
            COMPONENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Component".to_string()))?;

        row.into_model()
    }

    /// Create a product, optionally with an opening quantity
    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        validate_name(&input.name)?;
        validate_money(input.price, "price")?;
        let quantity = input.quantity.unwrap_or(0);
        if quantity < 0 {
            return Err(negative_opening_quantity());
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (name, description, price, quantity, min_quantity, sku, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(quantity)
        .bind(input.min_quantity)
        .bind(&input.sku)
        .bind(&input.image_url)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into_model())
    }

    /// Update a product's descriptive fields
    pub async fn update_product(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        if let Some(price) = input.price {
            validate_money(price, "price")?;
        }

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = COALESCE($1, name),
                description = COALESCE($2, description),
                price = COALESCE($3, price),
                min_quantity = COALESCE($4, min_quantity),
                sku = COALESCE($5, sku),
                image_url = COALESCE($6, image_url),
                updated_at = NOW()
            WHERE id = $7
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(input.min_quantity)
        .bind(&input.sku)
        .bind(&input.image_url)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into_model())
    }

    /// Soft-delete a product. Sale history keeps pointing at it, it just
    /// stops being sellable and listed.
    pub async fn deactivate_product(&self, id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE products SET active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.db)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(())
    }

    /// List products; inactive ones only when explicitly requested
    pub async fn list_products(&self, include_inactive: bool) -> AppResult<Vec<Product>> {
        let sql = if include_inactive {
            format!("SELECT {} FROM products ORDER BY name", PRODUCT_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM products WHERE active = TRUE ORDER BY name",
                PRODUCT_COLUMNS
            )
        };

        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(&self.db)
            .await?;
        Ok(rows.into_iter().map(ProductRow::into_model).collect())
    }

    /// Get one product
    pub async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into_model())
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation {
            field: "name".to_string(),
            message: "Name is required".to_string(),
            message_pt: "O nome é obrigatório".to_string(),
        });
    }
    Ok(())
}

fn validate_money(value: Decimal, field: &str) -> AppResult<()> {
    if validate_price(value).is_err() {
        return Err(AppError::Validation {
            field: field.to_string(),
            message: "Price cannot be negative".to_string(),
            message_pt: "O preço não pode ser negativo".to_string(),
        });
    }
    Ok(())
}

fn negative_opening_quantity() -> AppError {
    AppError::Validation {
        field: "quantity".to_string(),
        message: "Opening quantity cannot be negative".to_string(),
        message_pt: "A quantidade inicial não pode ser negativa".to_string(),
    }
}
