//! Product catalog service
//!
//! Owns product records. Stock and the last purchase price are mutated
//! only by the purchase/sales transaction services; this service covers
//! creation, partial updates, search, and soft delete via status.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Product, ProductStatus};
use shared::types::ProductSort;
use shared::validation::{validate_margin, validate_positive_price, validate_product_code};

/// Catalog service
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub code: String,
    pub name: String,
    pub current_stock: Option<i32>,
    pub standard_selling_price: Option<Decimal>,
    pub last_purchase_price: Option<Decimal>,
}

/// Input for partially updating product info
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub code: Option<String>,
    pub name: Option<String>,
    pub standard_selling_price: Option<Decimal>,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a product. New products start Active with the margin rule
    /// (selling price above purchase price) checked up front.
    pub async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        if input.code.trim().is_empty() {
            return Err(AppError::Validation {
                field: "code".to_string(),
                message: "Product code is required".to_string(),
            });
        }

        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Product name is required".to_string(),
            });
        }

        let code = input.code.trim();
        validate_product_code(code).map_err(|msg| AppError::Validation {
            field: "code".to_string(),
            message: msg.to_string(),
        })?;

        // Codes are unique, case-insensitively
        let code_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE LOWER(code) = LOWER($1))",
        )
        .bind(code)
        .fetch_one(&self.db)
        .await?;

        if code_taken {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let current_stock = input.current_stock.unwrap_or(0);
        let selling_price = input.standard_selling_price.unwrap_or(Decimal::ZERO);
        let purchase_price = input.last_purchase_price.unwrap_or(Decimal::ZERO);

        if current_stock < 0 {
            return Err(AppError::Validation {
                field: "current_stock".to_string(),
                message: "Stock cannot be negative".to_string(),
            });
        }

        // Supplied prices must be strictly positive
        if input.standard_selling_price.is_some() {
            validate_positive_price(selling_price).map_err(|msg| AppError::Validation {
                field: "standard_selling_price".to_string(),
                message: msg.to_string(),
            })?;
        }
        if input.last_purchase_price.is_some() {
            validate_positive_price(purchase_price).map_err(|msg| AppError::Validation {
                field: "last_purchase_price".to_string(),
                message: msg.to_string(),
            })?;
        }

        // The margin rule only applies once a selling price is set; a
        // product without one simply cannot be sold yet
        if input.standard_selling_price.is_some() {
            validate_margin(selling_price, purchase_price).map_err(|msg| AppError::Validation {
                field: "standard_selling_price".to_string(),
                message: msg.to_string(),
            })?;
        }

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (code, name, current_stock, standard_selling_price, last_purchase_price, status)
            VALUES ($1, $2, $3, $4, $5, 'active')
            RETURNING id, code, name, current_stock, standard_selling_price, last_purchase_price,
                      status, created_at, updated_at
            "#,
        )
        .bind(code)
        .bind(input.name.trim())
        .bind(current_stock)
        .bind(selling_price)
        .bind(purchase_price)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    /// Partially update product info. Stock and the last purchase price
    /// are not updatable here.
    pub async fn update_info(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let existing = self.get(id).await?;

        let code = match &input.code {
            Some(code) => {
                let code = code.trim();
                validate_product_code(code).map_err(|msg| AppError::Validation {
                    field: "code".to_string(),
                    message: msg.to_string(),
                })?;

                if !code.eq_ignore_ascii_case(&existing.code) {
                    let code_taken = sqlx::query_scalar::<_, bool>(
                        "SELECT EXISTS(SELECT 1 FROM products WHERE LOWER(code) = LOWER($1) AND id != $2)",
                    )
                    .bind(code)
                    .bind(id)
                    .fetch_one(&self.db)
                    .await?;

                    if code_taken {
                        return Err(AppError::DuplicateEntry("code".to_string()));
                    }
                }

                code.to_string()
            }
            None => existing.code,
        };

        let name = input.name.unwrap_or(existing.name);

        let selling_price = match input.standard_selling_price {
            Some(price) => {
                validate_positive_price(price).map_err(|msg| AppError::Validation {
                    field: "standard_selling_price".to_string(),
                    message: msg.to_string(),
                })?;
                validate_margin(price, existing.last_purchase_price).map_err(|msg| {
                    AppError::Validation {
                        field: "standard_selling_price".to_string(),
                        message: msg.to_string(),
                    }
                })?;
                price
            }
            None => existing.standard_selling_price,
        };

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET code = $1, name = $2, standard_selling_price = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, code, name, current_stock, standard_selling_price, last_purchase_price,
                      status, created_at, updated_at
            "#,
        )
        .bind(&code)
        .bind(name.trim())
        .bind(selling_price)
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(product)
    }

    /// Get a product by id
    pub async fn get(&self, id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, current_stock, standard_selling_price, last_purchase_price,
                   status, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Search and sort the product list. The keyword matches the name;
    /// an optional status narrows the result.
    pub async fn search_and_sort(
        &self,
        keyword: Option<&str>,
        status: Option<ProductStatus>,
        sort: ProductSort,
    ) -> AppResult<Vec<Product>> {
        let order_by = match sort {
            ProductSort::NameAsc => "name ASC",
            ProductSort::NameDesc => "name DESC",
            ProductSort::StockAsc => "current_stock ASC",
            ProductSort::StockDesc => "current_stock DESC",
        };

        let query = format!(
            r#"
            SELECT id, code, name, current_stock, standard_selling_price, last_purchase_price,
                   status, created_at, updated_at
            FROM products
            WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
              AND ($2::product_status IS NULL OR status = $2)
            ORDER BY {}
            "#,
            order_by
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(keyword.filter(|k| !k.trim().is_empty()))
            .bind(status)
            .fetch_all(&self.db)
            .await?;

        Ok(products)
    }

    /// List products by status
    pub async fn list_by_status(&self, status: ProductStatus) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, current_stock, standard_selling_price, last_purchase_price,
                   status, created_at, updated_at
            FROM products
            WHERE status = $1
            ORDER BY name
            "#,
        )
        .bind(status)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// Hide a product (soft delete). Historical transactions keep
    /// referencing it.
    pub async fn hide(&self, id: Uuid) -> AppResult<Product> {
        self.set_status(id, ProductStatus::Hidden).await
    }

    /// Re-activate a hidden product
    pub async fn unhide(&self, id: Uuid) -> AppResult<Product> {
        self.set_status(id, ProductStatus::Active).await
    }

    async fn set_status(&self, id: Uuid, status: ProductStatus) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, code, name, current_stock, standard_selling_price, last_purchase_price,
                      status, created_at, updated_at
            "#,
        )
        .bind(status)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }
}
