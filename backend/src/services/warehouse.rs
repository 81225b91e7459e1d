//! Warehouse zones and stock movements
//!
//! Stock movements are the only write path that changes item stock and zone
//! occupancy together; both sides update inside one transaction. Outbound
//! and transfer movements check available stock, inbound and transfer
//! movements check destination zone capacity.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{page_count, PageParams};
use crate::services::inventory::derive_status;

/// Warehouse service
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseZone {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub capacity: Decimal,
    pub used_capacity: Decimal,
    pub temperature: String,
    pub humidity: String,
    pub status: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ZoneSummary {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub zone: WarehouseZone,
    pub item_count: i64,
    pub utilization: f64,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateZoneInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,

    pub capacity: Decimal,

    #[serde(default = "default_temperature")]
    pub temperature: String,

    #[serde(default = "default_humidity")]
    pub humidity: String,

    pub description: Option<String>,
    pub location: Option<String>,
}

fn default_temperature() -> String {
    "Room Temperature".to_string()
}

fn default_humidity() -> String {
    "50%".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateZoneInput {
    pub name: Option<String>,
    pub capacity: Option<Decimal>,
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// Stock movement kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    In,
    Out,
    Transfer,
    Adjustment,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Transfer => "transfer",
            MovementType::Adjustment => "adjustment",
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovementInput {
    pub item_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub from_zone: Option<Uuid>,
    pub to_zone: Option<Uuid>,

    #[validate(length(min = 1, message = "Reason is required"))]
    pub reason: String,

    #[validate(length(min = 1, message = "Operator is required"))]
    pub operator: String,

    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    pub movement_type: String,
    pub quantity: Decimal,
    pub from_zone: Option<Uuid>,
    pub to_zone: Option<Uuid>,
    pub reason: String,
    pub operator: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementListQuery {
    #[serde(flatten)]
    pub page: PageParams,
    pub item_id: Option<Uuid>,
    pub movement_type: Option<MovementType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementPage {
    pub movements: Vec<StockMovement>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LowStockItem {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub zone_id: Option<Uuid>,
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseAnalytics {
    pub total_zones: i64,
    pub total_capacity: Decimal,
    pub used_capacity: Decimal,
    pub overall_utilization: f64,
    pub total_items: i64,
    pub low_stock_items: i64,
    pub movements_last_30_days: i64,
}

const ZONE_COLUMNS: &str = "id, name, code, capacity, used_capacity, temperature, humidity, \
     status, description, location, created_at, updated_at";

const MOVEMENT_COLUMNS: &str = "id, item_id, item_name, movement_type, quantity, from_zone, \
     to_zone, reason, operator, reference, notes, status, created_at";

#[derive(Debug, sqlx::FromRow)]
struct ItemStockRow {
    name: String,
    current_stock: Decimal,
    min_stock: Decimal,
    expiry_date: Option<chrono::NaiveDate>,
}

impl WarehouseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // -- Zones ---------------------------------------------------------------

    pub async fn create_zone(&self, input: CreateZoneInput) -> AppResult<WarehouseZone> {
        input.validate()?;
        if input.capacity < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "capacity".to_string(),
                message: "Capacity cannot be negative".to_string(),
            });
        }

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM warehouse_zones WHERE name = $1 OR code = $2)",
        )
        .bind(&input.name)
        .bind(&input.code)
        .fetch_one(&self.db)
        .await?;
        if exists {
            return Err(AppError::DuplicateEntry("code".to_string()));
        }

        let zone = sqlx::query_as::<_, WarehouseZone>(&format!(
            r#"
            INSERT INTO warehouse_zones
                (name, code, capacity, temperature, humidity, description, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ZONE_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.code)
        .bind(input.capacity)
        .bind(&input.temperature)
        .bind(&input.humidity)
        .bind(&input.description)
        .bind(&input.location)
        .fetch_one(&self.db)
        .await?;

        Ok(zone)
    }

    pub async fn list_zones(&self) -> AppResult<Vec<ZoneSummary>> {
        let zones = sqlx::query_as::<_, ZoneSummary>(
            r#"
            SELECT z.id, z.name, z.code, z.capacity, z.used_capacity, z.temperature,
                   z.humidity, z.status, z.description, z.location, z.created_at, z.updated_at,
                   COUNT(i.id) AS item_count,
                   CASE WHEN z.capacity > 0
                        THEN ROUND((z.used_capacity / z.capacity * 100)::numeric, 1)::float8
                        ELSE 0 END AS utilization
            FROM warehouse_zones z
            LEFT JOIN inventory_items i ON i.zone_id = z.id
            GROUP BY z.id
            ORDER BY z.code ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(zones)
    }

    pub async fn get_zone(&self, id: Uuid) -> AppResult<WarehouseZone> {
        sqlx::query_as::<_, WarehouseZone>(&format!(
            "SELECT {ZONE_COLUMNS} FROM warehouse_zones WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse zone".to_string()))
    }

    pub async fn update_zone(&self, id: Uuid, input: UpdateZoneInput) -> AppResult<WarehouseZone> {
        if let Some(capacity) = input.capacity {
            let current = self.get_zone(id).await?;
            if capacity < current.used_capacity {
                return Err(AppError::Validation {
                    field: "capacity".to_string(),
                    message: "Capacity cannot be reduced below current usage".to_string(),
                });
            }
        }

        sqlx::query_as::<_, WarehouseZone>(&format!(
            r#"
            UPDATE warehouse_zones SET
                name = COALESCE($2, name),
                capacity = COALESCE($3, capacity),
                temperature = COALESCE($4, temperature),
                humidity = COALESCE($5, humidity),
                status = COALESCE($6, status),
                description = COALESCE($7, description),
                location = COALESCE($8, location),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ZONE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(input.capacity)
        .bind(&input.temperature)
        .bind(&input.humidity)
        .bind(&input.status)
        .bind(&input.description)
        .bind(&input.location)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse zone".to_string()))
    }

    /// A zone holding items cannot be deleted.
    pub async fn delete_zone(&self, id: Uuid) -> AppResult<()> {
        let item_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM inventory_items WHERE zone_id = $1")
                .bind(id)
                .fetch_one(&self.db)
                .await?;
        if item_count > 0 {
            return Err(AppError::InvalidStateTransition(format!(
                "Zone still holds {} items",
                item_count
            )));
        }

        let result = sqlx::query("DELETE FROM warehouse_zones WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Warehouse zone".to_string()));
        }
        Ok(())
    }

    // -- Stock movements ----------------------------------------------------

    pub async fn create_movement(&self, input: CreateMovementInput) -> AppResult<StockMovement> {
        input.validate()?;
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let item = sqlx::query_as::<_, ItemStockRow>(
            "SELECT name, current_stock, min_stock, expiry_date \
             FROM inventory_items WHERE id = $1 FOR UPDATE",
        )
        .bind(input.item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory item".to_string()))?;

        let new_stock = match input.movement_type {
            MovementType::In => item.current_stock + input.quantity,
            MovementType::Out => {
                if item.current_stock < input.quantity {
                    return Err(AppError::InsufficientStock(format!(
                        "{} has {} in stock, {} requested",
                        item.name, item.current_stock, input.quantity
                    )));
                }
                item.current_stock - input.quantity
            }
            MovementType::Transfer => {
                if item.current_stock < input.quantity {
                    return Err(AppError::InsufficientStock(format!(
                        "{} has {} in stock, {} requested",
                        item.name, item.current_stock, input.quantity
                    )));
                }
                item.current_stock
            }
            MovementType::Adjustment => input.quantity,
        };

        match input.movement_type {
            MovementType::In => {
                let zone = input.to_zone.ok_or_else(|| AppError::Validation {
                    field: "toZone".to_string(),
                    message: "Inbound movements need a destination zone".to_string(),
                })?;
                reserve_zone_capacity(&mut tx, zone, input.quantity).await?;
            }
            MovementType::Out => {
                if let Some(zone) = input.from_zone {
                    release_zone_capacity(&mut tx, zone, input.quantity).await?;
                }
            }
            MovementType::Transfer => {
                let from = input.from_zone.ok_or_else(|| AppError::Validation {
                    field: "fromZone".to_string(),
                    message: "Transfers need a source zone".to_string(),
                })?;
                let to = input.to_zone.ok_or_else(|| AppError::Validation {
                    field: "toZone".to_string(),
                    message: "Transfers need a destination zone".to_string(),
                })?;
                release_zone_capacity(&mut tx, from, input.quantity).await?;
                reserve_zone_capacity(&mut tx, to, input.quantity).await?;
            }
            MovementType::Adjustment => {
                let delta = new_stock - item.current_stock;
                if let Some(zone) = input.to_zone.or(input.from_zone) {
                    if delta > Decimal::ZERO {
                        reserve_zone_capacity(&mut tx, zone, delta).await?;
                    } else if delta < Decimal::ZERO {
                        release_zone_capacity(&mut tx, zone, -delta).await?;
                    }
                }
            }
        }

        let status = derive_status(
            new_stock,
            item.min_stock,
            item.expiry_date,
            Utc::now().date_naive(),
        );
        sqlx::query(
            "UPDATE inventory_items SET current_stock = $2, status = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(input.item_id)
        .bind(new_stock)
        .bind(status)
        .execute(&mut *tx)
        .await?;

        let movement = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            INSERT INTO stock_movements
                (item_id, item_name, movement_type, quantity, from_zone, to_zone,
                 reason, operator, reference, notes, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'completed')
            RETURNING {MOVEMENT_COLUMNS}
            "#
        ))
        .bind(input.item_id)
        .bind(&item.name)
        .bind(input.movement_type.as_str())
        .bind(input.quantity)
        .bind(input.from_zone)
        .bind(input.to_zone)
        .bind(&input.reason)
        .bind(&input.operator)
        .bind(&input.reference)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(movement)
    }

    pub async fn list_movements(&self, query: &MovementListQuery) -> AppResult<MovementPage> {
        let (page, limit) = query.page.resolve(20, 100);
        let movement_type = query.movement_type.map(|t| t.as_str());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM stock_movements
            WHERE ($1::uuid IS NULL OR item_id = $1)
              AND ($2::text IS NULL OR movement_type = $2)
              AND ($3::date IS NULL OR created_at >= $3::date)
              AND ($4::date IS NULL OR created_at < $4::date + 1)
            "#,
        )
        .bind(query.item_id)
        .bind(movement_type)
        .bind(query.start_date)
        .bind(query.end_date)
        .fetch_one(&self.db)
        .await?;

        let movements = sqlx::query_as::<_, StockMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS} FROM stock_movements
            WHERE ($1::uuid IS NULL OR item_id = $1)
              AND ($2::text IS NULL OR movement_type = $2)
              AND ($3::date IS NULL OR created_at >= $3::date)
              AND ($4::date IS NULL OR created_at < $4::date + 1)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#
        ))
        .bind(query.item_id)
        .bind(movement_type)
        .bind(query.start_date)
        .bind(query.end_date)
        .bind(i64::from(limit))
        .bind(PageParams::offset(page, limit))
        .fetch_all(&self.db)
        .await?;

        Ok(MovementPage {
            movements,
            page,
            limit,
            total,
            total_pages: page_count(total, limit),
        })
    }

    // -- Low stock and analytics --------------------------------------------

    pub async fn low_stock(&self) -> AppResult<Vec<LowStockItem>> {
        let items = sqlx::query_as::<_, LowStockItem>(
            r#"
            SELECT id, name, sku, current_stock, min_stock, zone_id, status
            FROM inventory_items
            WHERE current_stock <= min_stock AND status <> 'expired'
            ORDER BY current_stock ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(items)
    }

    /// Flag a low-stock item as alerted. The flag stays set until the item
    /// is restocked, so repeated calls are idempotent.
    pub async fn mark_low_stock_alert(&self, item_id: Uuid) -> AppResult<LowStockItem> {
        sqlx::query_as::<_, LowStockItem>(
            r#"
            UPDATE inventory_items
            SET low_stock_alerted = TRUE, updated_at = NOW()
            WHERE id = $1 AND current_stock <= min_stock AND status <> 'expired'
            RETURNING id, name, sku, current_stock, min_stock, zone_id, status
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Low stock item".to_string()))
    }

    pub async fn analytics(&self) -> AppResult<WarehouseAnalytics> {
        let (total_zones, total_capacity, used_capacity): (i64, Decimal, Decimal) =
            sqlx::query_as(
                "SELECT COUNT(*), COALESCE(SUM(capacity), 0), COALESCE(SUM(used_capacity), 0) \
                 FROM warehouse_zones",
            )
            .fetch_one(&self.db)
            .await?;

        let (total_items, low_stock_items): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE current_stock <= min_stock) \
             FROM inventory_items",
        )
        .fetch_one(&self.db)
        .await?;

        let movements_last_30_days: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM stock_movements \
             WHERE created_at >= NOW() - INTERVAL '30 days'",
        )
        .fetch_one(&self.db)
        .await?;

        let overall_utilization = if total_capacity > Decimal::ZERO {
            use rust_decimal::prelude::ToPrimitive;
            (used_capacity / total_capacity * Decimal::from(100))
                .round_dp(1)
                .to_f64()
                .unwrap_or(0.0)
        } else {
            0.0
        };

        Ok(WarehouseAnalytics {
            total_zones,
            total_capacity,
            used_capacity,
            overall_utilization,
            total_items,
            low_stock_items,
            movements_last_30_days,
        })
    }
}

async fn reserve_zone_capacity(
    tx: &mut Transaction<'_, Postgres>,
    zone_id: Uuid,
    quantity: Decimal,
) -> AppResult<()> {
    let row: Option<(Decimal, Decimal)> = sqlx::query_as(
        "SELECT capacity, used_capacity FROM warehouse_zones WHERE id = $1 FOR UPDATE",
    )
    .bind(zone_id)
    .fetch_optional(&mut **tx)
    .await?;

    let (capacity, used) = row.ok_or_else(|| AppError::NotFound("Warehouse zone".to_string()))?;
    if used + quantity > capacity {
        return Err(AppError::Validation {
            field: "toZone".to_string(),
            message: "Zone capacity exceeded".to_string(),
        });
    }

    sqlx::query(
        "UPDATE warehouse_zones SET used_capacity = used_capacity + $2, updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(zone_id)
    .bind(quantity)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn release_zone_capacity(
    tx: &mut Transaction<'_, Postgres>,
    zone_id: Uuid,
    quantity: Decimal,
) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE warehouse_zones \
         SET used_capacity = GREATEST(used_capacity - $2, 0), updated_at = NOW() \
         WHERE id = $1",
    )
    .bind(zone_id)
    .bind(quantity)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Warehouse zone".to_string()));
    }
    Ok(())
}
