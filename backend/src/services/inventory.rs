//! Inventory item service
//!
//! Item status is derived from stock level and expiry date on every write:
//! expired > out-of-stock > low-stock > in-stock.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{page_count, PageParams};

/// Inventory service
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub item_type: String,
    pub category: String,
    pub availability: bool,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub max_stock: Decimal,
    pub unit_price: Decimal,
    pub unit: String,
    pub zone_id: Option<Uuid>,
    pub location: Option<String>,
    pub rack: Option<String>,
    pub shelf: Option<String>,
    pub supplier: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub status: String,
    pub condition: String,
    pub notes: Option<String>,
    pub last_restock_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku: String,

    #[validate(length(min = 1, message = "Item type is required"))]
    pub item_type: String,

    #[serde(default = "default_category")]
    pub category: String,

    #[serde(default)]
    pub current_stock: Decimal,

    #[serde(default)]
    pub min_stock: Decimal,

    #[serde(default = "default_max_stock")]
    pub max_stock: Decimal,

    #[serde(default)]
    pub unit_price: Decimal,

    #[serde(default = "default_unit")]
    pub unit: String,

    pub zone_id: Option<Uuid>,
    pub location: Option<String>,
    pub rack: Option<String>,
    pub shelf: Option<String>,
    pub supplier: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

fn default_category() -> String {
    "general".to_string()
}

fn default_unit() -> String {
    "units".to_string()
}

fn default_max_stock() -> Decimal {
    Decimal::from(1000)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemInput {
    pub name: Option<String>,
    pub item_type: Option<String>,
    pub category: Option<String>,
    pub min_stock: Option<Decimal>,
    pub max_stock: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub unit: Option<String>,
    pub zone_id: Option<Uuid>,
    pub location: Option<String>,
    pub rack: Option<String>,
    pub shelf: Option<String>,
    pub supplier: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub condition: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListQuery {
    #[serde(flatten)]
    pub page: PageParams,
    pub q: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub zone_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPage {
    pub items: Vec<InventoryItem>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

const ITEM_COLUMNS: &str = "id, name, sku, item_type, category, availability, current_stock, \
     min_stock, max_stock, unit_price, unit, zone_id, location, rack, shelf, supplier, \
     expiry_date, status, condition, notes, last_restock_date, created_at, updated_at";

/// Status derived from stock level and expiry, in priority order.
pub fn derive_status(
    current_stock: Decimal,
    min_stock: Decimal,
    expiry_date: Option<NaiveDate>,
    today: NaiveDate,
) -> &'static str {
    if expiry_date.is_some_and(|expiry| expiry < today) {
        "expired"
    } else if current_stock <= Decimal::ZERO {
        "out-of-stock"
    } else if current_stock <= min_stock {
        "low-stock"
    } else {
        "in-stock"
    }
}

impl InventoryService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateItemInput) -> AppResult<InventoryItem> {
        input.validate()?;
        if input.current_stock < Decimal::ZERO || input.min_stock < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "currentStock".to_string(),
                message: "Stock levels cannot be negative".to_string(),
            });
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM inventory_items WHERE sku = $1)")
                .bind(&input.sku)
                .fetch_one(&self.db)
                .await?;
        if exists {
            return Err(AppError::DuplicateEntry("sku".to_string()));
        }

        let status = derive_status(
            input.current_stock,
            input.min_stock,
            input.expiry_date,
            Utc::now().date_naive(),
        );

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            INSERT INTO inventory_items
                (name, sku, item_type, category, current_stock, min_stock, max_stock,
                 unit_price, unit, zone_id, location, rack, shelf, supplier, expiry_date,
                 notes, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.sku)
        .bind(&input.item_type)
        .bind(&input.category)
        .bind(input.current_stock)
        .bind(input.min_stock)
        .bind(input.max_stock)
        .bind(input.unit_price)
        .bind(&input.unit)
        .bind(input.zone_id)
        .bind(&input.location)
        .bind(&input.rack)
        .bind(&input.shelf)
        .bind(&input.supplier)
        .bind(input.expiry_date)
        .bind(&input.notes)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        Ok(item)
    }

    pub async fn list(&self, query: &ItemListQuery) -> AppResult<ItemPage> {
        let (page, limit) = query.page.resolve(20, 100);
        let search = query.q.as_ref().map(|q| format!("%{}%", q));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM inventory_items
            WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1)
              AND ($2::text IS NULL OR category = $2)
              AND ($3::text IS NULL OR status = $3)
              AND ($4::uuid IS NULL OR zone_id = $4)
            "#,
        )
        .bind(&search)
        .bind(&query.category)
        .bind(&query.status)
        .bind(query.zone_id)
        .fetch_one(&self.db)
        .await?;

        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            SELECT {ITEM_COLUMNS} FROM inventory_items
            WHERE ($1::text IS NULL OR name ILIKE $1 OR sku ILIKE $1)
              AND ($2::text IS NULL OR category = $2)
              AND ($3::text IS NULL OR status = $3)
              AND ($4::uuid IS NULL OR zone_id = $4)
            ORDER BY name ASC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(&search)
        .bind(&query.category)
        .bind(&query.status)
        .bind(query.zone_id)
        .bind(i64::from(limit))
        .bind(PageParams::offset(page, limit))
        .fetch_all(&self.db)
        .await?;

        Ok(ItemPage {
            items,
            page,
            limit,
            total,
            total_pages: page_count(total, limit),
        })
    }

    pub async fn get(&self, id: Uuid) -> AppResult<InventoryItem> {
        sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }

    pub async fn update(&self, id: Uuid, input: UpdateItemInput) -> AppResult<InventoryItem> {
        let current = self.get(id).await?;

        let min_stock = input.min_stock.unwrap_or(current.min_stock);
        let expiry = input.expiry_date.or(current.expiry_date);
        let status = derive_status(
            current.current_stock,
            min_stock,
            expiry,
            Utc::now().date_naive(),
        );

        sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory_items SET
                name = COALESCE($2, name),
                item_type = COALESCE($3, item_type),
                category = COALESCE($4, category),
                min_stock = COALESCE($5, min_stock),
                max_stock = COALESCE($6, max_stock),
                unit_price = COALESCE($7, unit_price),
                unit = COALESCE($8, unit),
                zone_id = COALESCE($9, zone_id),
                location = COALESCE($10, location),
                rack = COALESCE($11, rack),
                shelf = COALESCE($12, shelf),
                supplier = COALESCE($13, supplier),
                expiry_date = COALESCE($14, expiry_date),
                condition = COALESCE($15, condition),
                notes = COALESCE($16, notes),
                status = $17,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.item_type)
        .bind(&input.category)
        .bind(input.min_stock)
        .bind(input.max_stock)
        .bind(input.unit_price)
        .bind(&input.unit)
        .bind(input.zone_id)
        .bind(&input.location)
        .bind(&input.rack)
        .bind(&input.shelf)
        .bind(&input.supplier)
        .bind(input.expiry_date)
        .bind(&input.condition)
        .bind(&input.notes)
        .bind(status)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }

    /// Set the absolute stock level and re-derive the status. A restock
    /// (stock increase) also stamps the restock date and clears the
    /// low-stock alert flag.
    pub async fn update_stock(&self, id: Uuid, current_stock: Decimal) -> AppResult<InventoryItem> {
        if current_stock < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "currentStock".to_string(),
                message: "Stock cannot be negative".to_string(),
            });
        }

        let current = self.get(id).await?;
        let status = derive_status(
            current_stock,
            current.min_stock,
            current.expiry_date,
            Utc::now().date_naive(),
        );
        let restocked = current_stock > current.current_stock;

        sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory_items SET
                current_stock = $2,
                status = $3,
                last_restock_date = CASE WHEN $4 THEN NOW() ELSE last_restock_date END,
                low_stock_alerted = CASE WHEN $4 THEN FALSE ELSE low_stock_alerted END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(current_stock)
        .bind(status)
        .bind(restocked)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM inventory_items WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Inventory item".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_priority_order() {
        let today = date(2025, 6, 1);
        // expiry wins over stock level
        assert_eq!(
            derive_status(dec!(50), dec!(10), Some(date(2025, 5, 31)), today),
            "expired"
        );
        assert_eq!(derive_status(dec!(0), dec!(10), None, today), "out-of-stock");
        assert_eq!(derive_status(dec!(10), dec!(10), None, today), "low-stock");
        assert_eq!(derive_status(dec!(11), dec!(10), None, today), "in-stock");
    }

    #[test]
    fn expiry_today_is_not_expired() {
        let today = date(2025, 6, 1);
        assert_eq!(derive_status(dec!(5), dec!(1), Some(today), today), "in-stock");
    }
}
