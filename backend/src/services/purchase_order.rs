//! Purchase order service
//!
//! The stored total is always recomputed from line items, and status moves
//! one way: Pending -> Approved -> Delivered. Only pending orders can be
//! deleted. Supplier spend aggregates are kept in step inside the same
//! transaction as the order write.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{order_total, page_count, PageParams, PurchaseOrderItem, PurchaseOrderStatus};

/// Purchase order service
#[derive(Clone)]
pub struct PurchaseOrderService {
    db: PgPool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub po_number: String,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub supplier_code: String,
    pub items: Json<Vec<PurchaseOrderItem>>,
    pub total_amount: Decimal,
    pub status: PurchaseOrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseOrderInput {
    #[validate(length(min = 1, message = "PO number is required"))]
    pub po_number: String,

    pub supplier_id: Uuid,

    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<PurchaseOrderItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePurchaseOrderInput {
    pub items: Option<Vec<PurchaseOrderItem>>,
    pub status: Option<PurchaseOrderStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderListQuery {
    #[serde(flatten)]
    pub page: PageParams,
    pub status: Option<PurchaseOrderStatus>,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderPage {
    pub orders: Vec<PurchaseOrder>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

const ORDER_COLUMNS: &str = "po.id, po.po_number, po.supplier_id, s.name AS supplier_name, \
     s.code AS supplier_code, po.items, po.total_amount, po.status, po.created_at, po.updated_at";

impl PurchaseOrderService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        input: CreatePurchaseOrderInput,
    ) -> AppResult<PurchaseOrder> {
        input.validate()?;
        validate_items(&input.items)?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM purchase_orders WHERE po_number = $1)")
                .bind(&input.po_number)
                .fetch_one(&self.db)
                .await?;
        if exists {
            return Err(AppError::DuplicateEntry("poNumber".to_string()));
        }

        let supplier_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1 AND deleted = FALSE)",
        )
        .bind(input.supplier_id)
        .fetch_one(&self.db)
        .await?;
        if !supplier_exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        let total = order_total(&input.items);
        let mut tx = self.db.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO purchase_orders (po_number, supplier_id, items, total_amount, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&input.po_number)
        .bind(input.supplier_id)
        .bind(Json(&input.items))
        .bind(total)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE suppliers
            SET total_spend = total_spend + $2,
                orders_count = orders_count + 1,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(input.supplier_id)
        .bind(total)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        self.get(id).await
    }

    pub async fn list(&self, query: &PurchaseOrderListQuery) -> AppResult<PurchaseOrderPage> {
        let (page, limit) = query.page.resolve(20, 100);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM purchase_orders
            WHERE ($1::po_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR supplier_id = $2)
            "#,
        )
        .bind(query.status)
        .bind(query.supplier_id)
        .fetch_one(&self.db)
        .await?;

        let orders = sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM purchase_orders po
            JOIN suppliers s ON s.id = po.supplier_id
            WHERE ($1::po_status IS NULL OR po.status = $1)
              AND ($2::uuid IS NULL OR po.supplier_id = $2)
            ORDER BY po.created_at DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(query.status)
        .bind(query.supplier_id)
        .bind(i64::from(limit))
        .bind(PageParams::offset(page, limit))
        .fetch_all(&self.db)
        .await?;

        Ok(PurchaseOrderPage {
            orders,
            page,
            limit,
            total,
            total_pages: page_count(total, limit),
        })
    }

    pub async fn get(&self, id: Uuid) -> AppResult<PurchaseOrder> {
        sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM purchase_orders po
            JOIN suppliers s ON s.id = po.supplier_id
            WHERE po.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))
    }

    pub async fn update(&self, id: Uuid, input: UpdatePurchaseOrderInput) -> AppResult<PurchaseOrder> {
        let current = self.get(id).await?;

        let next_status = match input.status {
            Some(next) => {
                if !current.status.can_transition_to(next) {
                    return Err(AppError::InvalidStateTransition(format!(
                        "Cannot move purchase order from {} to {}",
                        current.status.as_str(),
                        next.as_str()
                    )));
                }
                next
            }
            None => current.status,
        };

        let (items, total) = match input.items {
            Some(items) => {
                validate_items(&items)?;
                let total = order_total(&items);
                (items, total)
            }
            None => (current.items.0.clone(), current.total_amount),
        };

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            UPDATE purchase_orders
            SET items = $2, total_amount = $3, status = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Json(&items))
        .bind(total)
        .bind(next_status)
        .execute(&mut *tx)
        .await?;

        if total != current.total_amount {
            sqlx::query(
                r#"
                UPDATE suppliers
                SET total_spend = total_spend + $2, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(current.supplier_id)
            .bind(total - current.total_amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.get(id).await
    }

    /// Only pending orders can be deleted.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let current = self.get(id).await?;
        if current.status != PurchaseOrderStatus::Pending {
            return Err(AppError::InvalidStateTransition(
                "Only pending purchase orders can be deleted".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM purchase_orders WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE suppliers
            SET total_spend = total_spend - $2,
                orders_count = orders_count - 1,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(current.supplier_id)
        .bind(current.total_amount)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn validate_items(items: &[PurchaseOrderItem]) -> AppResult<()> {
    for item in items {
        if item.material_name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Item material name is required".to_string(),
            });
        }
        if item.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Item quantity must be positive".to_string(),
            });
        }
        if item.unit_price < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Item unit price cannot be negative".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: Decimal, unit_price: Decimal) -> PurchaseOrderItem {
        PurchaseOrderItem {
            material_name: "steel".to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn rejects_non_positive_quantity() {
        assert!(validate_items(&[item(dec!(0), dec!(10))]).is_err());
        assert!(validate_items(&[item(dec!(-1), dec!(10))]).is_err());
        assert!(validate_items(&[item(dec!(1), dec!(10))]).is_ok());
    }

    #[test]
    fn rejects_negative_price_and_blank_name() {
        assert!(validate_items(&[item(dec!(1), dec!(-5))]).is_err());
        let blank = PurchaseOrderItem {
            material_name: "  ".to_string(),
            quantity: dec!(1),
            unit_price: dec!(5),
        };
        assert!(validate_items(&[blank]).is_err());
    }
}
