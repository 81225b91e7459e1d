//! Supplier management service
//!
//! Suppliers are soft-deleted so historical purchase orders keep a valid
//! reference. KPI scores are updated through this service but consumed by
//! the procurement analytics engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{page_count, PageParams, RankingWeights};

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub status: String,
    pub on_time_delivery_rate: f64,
    pub quality_score: f64,
    pub responsiveness_score: f64,
    pub total_spend: Decimal,
    pub orders_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,

    pub contact_person: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,

    #[serde(default = "default_status")]
    pub status: String,

    #[validate(range(min = 0.0, max = 100.0, message = "KPI scores are 0-100"))]
    #[serde(default)]
    pub on_time_delivery_rate: f64,

    #[validate(range(min = 0.0, max = 100.0, message = "KPI scores are 0-100"))]
    #[serde(default)]
    pub quality_score: f64,

    #[validate(range(min = 0.0, max = 100.0, message = "KPI scores are 0-100"))]
    #[serde(default)]
    pub responsiveness_score: f64,
}

fn default_status() -> String {
    "active".to_string()
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierInput {
    pub name: Option<String>,
    pub contact_person: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,

    #[validate(range(min = 0.0, max = 100.0, message = "KPI scores are 0-100"))]
    pub on_time_delivery_rate: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "KPI scores are 0-100"))]
    pub quality_score: Option<f64>,

    #[validate(range(min = 0.0, max = 100.0, message = "KPI scores are 0-100"))]
    pub responsiveness_score: Option<f64>,
}

/// List query: free-text search over name/code/category plus status filter
#[derive(Debug, Deserialize)]
pub struct SupplierListQuery {
    #[serde(flatten)]
    pub page: PageParams,
    pub q: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPage {
    pub suppliers: Vec<Supplier>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

const SUPPLIER_COLUMNS: &str = "id, name, code, contact_person, email, phone, address, country, \
     category, status, on_time_delivery_rate, quality_score, responsiveness_score, \
     total_spend, orders_count, created_at, updated_at";

impl SupplierService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        input.validate()?;

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM suppliers WHERE code = $1 AND deleted = FALSE)",
        )
        .bind(&input.code)
        .fetch_one(&self.db)
        .await?;
        if exists {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            INSERT INTO suppliers
                (name, code, contact_person, email, phone, address, country, category,
                 status, on_time_delivery_rate, quality_score, responsiveness_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.contact_person)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.country)
        .bind(&input.category)
        .bind(&input.status)
        .bind(input.on_time_delivery_rate)
        .bind(input.quality_score)
        .bind(input.responsiveness_score)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    pub async fn list(&self, query: &SupplierListQuery) -> AppResult<SupplierPage> {
        let (page, limit) = query.page.resolve(20, 100);
        let search = query.q.as_ref().map(|q| format!("%{}%", q));

        let sort_clause = match query.sort.as_deref() {
            Some("totalSpend") => "total_spend DESC",
            Some("onTimeDeliveryRate") => "on_time_delivery_rate DESC",
            Some("qualityScore") => "quality_score DESC",
            _ => "name ASC",
        };

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM suppliers
            WHERE deleted = FALSE
              AND ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1 OR category ILIKE $1)
              AND ($2::text IS NULL OR status = $2)
            "#,
        )
        .bind(&search)
        .bind(&query.status)
        .fetch_one(&self.db)
        .await?;

        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            SELECT {SUPPLIER_COLUMNS} FROM suppliers
            WHERE deleted = FALSE
              AND ($1::text IS NULL OR name ILIKE $1 OR code ILIKE $1 OR category ILIKE $1)
              AND ($2::text IS NULL OR status = $2)
            ORDER BY {sort_clause}
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&search)
        .bind(&query.status)
        .bind(i64::from(limit))
        .bind(PageParams::offset(page, limit))
        .fetch_all(&self.db)
        .await?;

        Ok(SupplierPage {
            suppliers,
            page,
            limit,
            total,
            total_pages: page_count(total, limit),
        })
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1 AND deleted = FALSE"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    pub async fn update(&self, id: Uuid, input: UpdateSupplierInput) -> AppResult<Supplier> {
        input.validate()?;

        sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE suppliers SET
                name = COALESCE($2, name),
                contact_person = COALESCE($3, contact_person),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                address = COALESCE($6, address),
                country = COALESCE($7, country),
                category = COALESCE($8, category),
                status = COALESCE($9, status),
                on_time_delivery_rate = COALESCE($10, on_time_delivery_rate),
                quality_score = COALESCE($11, quality_score),
                responsiveness_score = COALESCE($12, responsiveness_score),
                updated_at = NOW()
            WHERE id = $1 AND deleted = FALSE
            RETURNING {SUPPLIER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.country)
        .bind(&input.category)
        .bind(&input.status)
        .bind(input.on_time_delivery_rate)
        .bind(input.quality_score)
        .bind(input.responsiveness_score)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    /// Soft delete: the row stays so purchase orders keep their reference.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE suppliers SET deleted = TRUE, updated_at = NOW() \
             WHERE id = $1 AND deleted = FALSE",
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }
        Ok(())
    }

    /// Suppliers ordered by their default-weighted KPI score, for the
    /// performance widget.
    /// Suppliers ordered by their weighted KPI score, highest first.
    pub async fn rankings(&self, weights: RankingWeights) -> AppResult<Vec<Supplier>> {
        let weights = weights.clamped();
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            SELECT {SUPPLIER_COLUMNS} FROM suppliers
            WHERE deleted = FALSE
            ORDER BY on_time_delivery_rate * $1
                   + quality_score * $2
                   + responsiveness_score * $3 DESC
            "#
        ))
        .bind(weights.w_on_time)
        .bind(weights.w_quality)
        .bind(weights.w_response)
        .fetch_all(&self.db)
        .await?;
        Ok(suppliers)
    }
}
