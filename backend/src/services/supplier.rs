//! Supplier directory service

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::Supplier;
use shared::validation::{validate_email, validate_phone};

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Input for creating or updating a supplier
#[derive(Debug, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a supplier
    pub async fn create(&self, input: SupplierInput) -> AppResult<Supplier> {
        validate_input(&input)?;

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, phone, email, address)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, phone, email, address, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    /// Update a supplier
    pub async fn update(&self, id: Uuid, input: SupplierInput) -> AppResult<Supplier> {
        validate_input(&input)?;

        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $1, phone = $2, email = $3, address = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING id, name, phone, email, address, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Get a supplier by id
    pub async fn get(&self, id: Uuid) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(
            "SELECT id, name, phone, email, address, created_at, updated_at FROM suppliers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// List all suppliers
    pub async fn list(&self) -> AppResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, phone, email, address, created_at, updated_at FROM suppliers ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(suppliers)
    }

    /// Delete a supplier. Refused while purchases still reference it.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM purchases WHERE supplier_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Err(AppError::Conflict {
                resource: "supplier".to_string(),
                message: "Supplier has purchase history and cannot be deleted".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        Ok(())
    }
}

fn validate_input(input: &SupplierInput) -> AppResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation {
            field: "name".to_string(),
            message: "Supplier name is required".to_string(),
        });
    }

    if let Some(phone) = &input.phone {
        validate_phone(phone).map_err(|msg| AppError::Validation {
            field: "phone".to_string(),
            message: msg.to_string(),
        })?;
    }

    if let Some(email) = &input.email {
        validate_email(email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
        })?;
    }

    Ok(())
}
