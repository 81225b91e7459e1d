//! Customer and sales order management
//!
//! Sales orders mirror purchase orders on the outbound side: line items are
//! stored as a JSON document and the total is always recomputed from them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{page_count, PageParams};

/// Customer and order service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    pub company: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    pub phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
}

/// One ordered product line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl OrderItem {
    fn subtotal(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

fn items_total(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::subtotal).sum()
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    pub ordered_on: DateTime<Utc>,
    pub expected_date: Option<DateTime<Utc>>,
    pub priority: String,
    pub status: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub items: Json<Vec<OrderItem>>,
    pub total_amount: Decimal,
    pub payment_status: String,
    pub payment_method: Option<String>,
    pub shipping_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    #[validate(length(min = 1, message = "Order number is required"))]
    pub order_number: String,

    pub customer_id: Uuid,

    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<OrderItem>,

    pub ordered_on: Option<DateTime<Utc>>,
    pub expected_date: Option<DateTime<Utc>>,

    #[serde(default = "default_priority")]
    pub priority: String,

    pub payment_method: Option<String>,
    pub shipping_method: Option<String>,
    pub notes: Option<String>,
}

fn default_priority() -> String {
    "medium".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderInput {
    pub items: Option<Vec<OrderItem>>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub expected_date: Option<DateTime<Utc>>,
    pub payment_status: Option<String>,
    pub payment_method: Option<String>,
    pub shipping_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    #[serde(flatten)]
    pub page: PageParams,
    pub status: Option<String>,
    pub customer_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

const ORDER_COLUMNS: &str = "o.id, o.order_number, o.ordered_on, o.expected_date, o.priority, \
     o.status, o.customer_id, c.name AS customer_name, o.items, o.total_amount, \
     o.payment_status, o.payment_method, o.shipping_method, o.notes, o.created_at, o.updated_at";

impl OrderService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // -- Customers -----------------------------------------------------------

    pub async fn create_customer(&self, input: CreateCustomerInput) -> AppResult<Customer> {
        input.validate()?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, company, email, phone, address, country)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, company, email, phone, address, country, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.company)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.address)
        .bind(&input.country)
        .fetch_one(&self.db)
        .await?;

        Ok(customer)
    }

    pub async fn list_customers(&self) -> AppResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, name, company, email, phone, address, country, created_at, updated_at \
             FROM customers ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(customers)
    }

    pub async fn get_customer(&self, id: Uuid) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(
            "SELECT id, name, company, email, phone, address, country, created_at, updated_at \
             FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    /// Customers with orders cannot be deleted.
    pub async fn delete_customer(&self, id: Uuid) -> AppResult<()> {
        let order_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE customer_id = $1")
                .bind(id)
                .fetch_one(&self.db)
                .await?;
        if order_count > 0 {
            return Err(AppError::InvalidStateTransition(format!(
                "Customer has {} orders",
                order_count
            )));
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

    // -- Orders --------------------------------------------------------------

    pub async fn create_order(&self, input: CreateOrderInput) -> AppResult<Order> {
        input.validate()?;

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE order_number = $1)")
                .bind(&input.order_number)
                .fetch_one(&self.db)
                .await?;
        if exists {
            return Err(AppError::DuplicateEntry("orderNumber".to_string()));
        }

        self.get_customer(input.customer_id).await?;
        let total = items_total(&input.items);

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO orders
                (order_number, ordered_on, expected_date, priority, customer_id, items,
                 total_amount, payment_method, shipping_method, notes)
            VALUES ($1, COALESCE($2, NOW()), $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&input.order_number)
        .bind(input.ordered_on)
        .bind(input.expected_date)
        .bind(&input.priority)
        .bind(input.customer_id)
        .bind(Json(&input.items))
        .bind(total)
        .bind(&input.payment_method)
        .bind(&input.shipping_method)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        self.get_order(id).await
    }

    pub async fn list_orders(&self, query: &OrderListQuery) -> AppResult<OrderPage> {
        let (page, limit) = query.page.resolve(20, 100);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR customer_id = $2)
            "#,
        )
        .bind(&query.status)
        .bind(query.customer_id)
        .fetch_one(&self.db)
        .await?;

        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE ($1::text IS NULL OR o.status = $1)
              AND ($2::uuid IS NULL OR o.customer_id = $2)
            ORDER BY o.ordered_on DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&query.status)
        .bind(query.customer_id)
        .bind(i64::from(limit))
        .bind(PageParams::offset(page, limit))
        .fetch_all(&self.db)
        .await?;

        Ok(OrderPage {
            orders,
            page,
            limit,
            total,
            total_pages: page_count(total, limit),
        })
    }

    pub async fn get_order(&self, id: Uuid) -> AppResult<Order> {
        sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE o.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    pub async fn update_order(&self, id: Uuid, input: UpdateOrderInput) -> AppResult<Order> {
        let current = self.get_order(id).await?;

        let (items, total) = match input.items {
            Some(items) => {
                if items.is_empty() {
                    return Err(AppError::Validation {
                        field: "items".to_string(),
                        message: "At least one item is required".to_string(),
                    });
                }
                let total = items_total(&items);
                (items, total)
            }
            None => (current.items.0.clone(), current.total_amount),
        };

        sqlx::query(
            r#"
            UPDATE orders SET
                items = $2,
                total_amount = $3,
                status = COALESCE($4, status),
                priority = COALESCE($5, priority),
                expected_date = COALESCE($6, expected_date),
                payment_status = COALESCE($7, payment_status),
                payment_method = COALESCE($8, payment_method),
                shipping_method = COALESCE($9, shipping_method),
                notes = COALESCE($10, notes),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(Json(&items))
        .bind(total)
        .bind(&input.status)
        .bind(&input.priority)
        .bind(input.expected_date)
        .bind(&input.payment_status)
        .bind(&input.payment_method)
        .bind(&input.shipping_method)
        .bind(&input.notes)
        .execute(&self.db)
        .await?;

        self.get_order(id).await
    }

    pub async fn delete_order(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Order".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn total_is_sum_of_line_subtotals() {
        let items = vec![
            OrderItem {
                product_name: "Crate".to_string(),
                quantity: dec!(3),
                unit_price: dec!(12.50),
            },
            OrderItem {
                product_name: "Pallet".to_string(),
                quantity: dec!(2),
                unit_price: dec!(40),
            },
        ];
        assert_eq!(items_total(&items), dec!(117.50));
        assert_eq!(items_total(&[]), Decimal::ZERO);
    }
}
