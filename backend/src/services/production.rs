//! Production batch tracking
//!
//! Persistence goes through the `BatchStore` trait with two
//! implementations: the Postgres store used in normal operation and an
//! in-memory store for development without a database. The backend is
//! chosen once at startup from configuration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

pub const PROCESS_STATUSES: [&str; 4] = [
    "getting-raw-materials",
    "in-production",
    "quality-check",
    "completed",
];

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductionBatch {
    pub id: Uuid,
    pub batch_name: String,
    pub product: String,
    pub quantity: Decimal,
    pub process_status: String,
    pub progress: i32,
    pub operator: Option<String>,
    pub quality: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchInput {
    #[validate(length(min = 1, message = "Batch name is required"))]
    pub batch_name: String,

    #[validate(length(min = 1, message = "Product is required"))]
    pub product: String,

    pub quantity: Decimal,
    pub operator: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBatchInput {
    pub process_status: Option<String>,

    #[validate(range(min = 0, max = 100, message = "Progress is 0-100"))]
    pub progress: Option<i32>,

    pub operator: Option<String>,
    pub quality: Option<String>,
}

/// Persistence seam for production batches
#[async_trait]
pub trait BatchStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<ProductionBatch>>;
    async fn get(&self, id: Uuid) -> AppResult<ProductionBatch>;
    async fn insert(&self, batch: ProductionBatch) -> AppResult<ProductionBatch>;
    async fn update(&self, batch: ProductionBatch) -> AppResult<ProductionBatch>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Postgres-backed batch store
pub struct PgBatchStore {
    db: PgPool,
}

impl PgBatchStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const BATCH_COLUMNS: &str = "id, batch_name, product, quantity, process_status, progress, \
     operator, quality, started_at, completed_at, created_at, updated_at";

#[async_trait]
impl BatchStore for PgBatchStore {
    async fn list(&self) -> AppResult<Vec<ProductionBatch>> {
        let batches = sqlx::query_as::<_, ProductionBatch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM production_batches ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;
        Ok(batches)
    }

    async fn get(&self, id: Uuid) -> AppResult<ProductionBatch> {
        sqlx::query_as::<_, ProductionBatch>(&format!(
            "SELECT {BATCH_COLUMNS} FROM production_batches WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Production batch".to_string()))
    }

    async fn insert(&self, batch: ProductionBatch) -> AppResult<ProductionBatch> {
        let stored = sqlx::query_as::<_, ProductionBatch>(&format!(
            r#"
            INSERT INTO production_batches
                (id, batch_name, product, quantity, process_status, progress, operator,
                 quality, started_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {BATCH_COLUMNS}
            "#
        ))
        .bind(batch.id)
        .bind(&batch.batch_name)
        .bind(&batch.product)
        .bind(batch.quantity)
        .bind(&batch.process_status)
        .bind(batch.progress)
        .bind(&batch.operator)
        .bind(&batch.quality)
        .bind(batch.started_at)
        .bind(batch.completed_at)
        .fetch_one(&self.db)
        .await?;
        Ok(stored)
    }

    async fn update(&self, batch: ProductionBatch) -> AppResult<ProductionBatch> {
        sqlx::query_as::<_, ProductionBatch>(&format!(
            r#"
            UPDATE production_batches SET
                process_status = $2, progress = $3, operator = $4, quality = $5,
                completed_at = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING {BATCH_COLUMNS}
            "#
        ))
        .bind(batch.id)
        .bind(&batch.process_status)
        .bind(batch.progress)
        .bind(&batch.operator)
        .bind(&batch.quality)
        .bind(batch.completed_at)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Production batch".to_string()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM production_batches WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Production batch".to_string()));
        }
        Ok(())
    }
}

/// In-memory batch store for running without a database
#[derive(Default)]
pub struct InMemoryBatchStore {
    batches: RwLock<HashMap<Uuid, ProductionBatch>>,
}

impl InMemoryBatchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BatchStore for InMemoryBatchStore {
    async fn list(&self) -> AppResult<Vec<ProductionBatch>> {
        let mut batches: Vec<ProductionBatch> =
            self.batches.read().await.values().cloned().collect();
        batches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(batches)
    }

    async fn get(&self, id: Uuid) -> AppResult<ProductionBatch> {
        self.batches
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Production batch".to_string()))
    }

    async fn insert(&self, batch: ProductionBatch) -> AppResult<ProductionBatch> {
        self.batches.write().await.insert(batch.id, batch.clone());
        Ok(batch)
    }

    async fn update(&self, batch: ProductionBatch) -> AppResult<ProductionBatch> {
        let mut batches = self.batches.write().await;
        if !batches.contains_key(&batch.id) {
            return Err(AppError::NotFound("Production batch".to_string()));
        }
        batches.insert(batch.id, batch.clone());
        Ok(batch)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.batches
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Production batch".to_string()))
    }
}

/// Production service over the configured store
#[derive(Clone)]
pub struct ProductionService {
    store: Arc<dyn BatchStore>,
}

impl ProductionService {
    pub fn new(store: Arc<dyn BatchStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<ProductionBatch>> {
        self.store.list().await
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ProductionBatch> {
        self.store.get(id).await
    }

    pub async fn create(&self, input: CreateBatchInput) -> AppResult<ProductionBatch> {
        input.validate()?;
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
            });
        }

        let now = Utc::now();
        let batch = ProductionBatch {
            id: Uuid::new_v4(),
            batch_name: input.batch_name,
            product: input.product,
            quantity: input.quantity,
            process_status: PROCESS_STATUSES[0].to_string(),
            progress: 0,
            operator: input.operator,
            quality: "good".to_string(),
            started_at: now,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.insert(batch).await
    }

    pub async fn update(&self, id: Uuid, input: UpdateBatchInput) -> AppResult<ProductionBatch> {
        input.validate()?;

        if let Some(status) = &input.process_status {
            if !PROCESS_STATUSES.contains(&status.as_str()) {
                return Err(AppError::Validation {
                    field: "processStatus".to_string(),
                    message: format!("Unknown process status '{}'", status),
                });
            }
        }

        let mut batch = self.store.get(id).await?;
        if let Some(status) = input.process_status {
            if status == "completed" && batch.completed_at.is_none() {
                batch.completed_at = Some(Utc::now());
                batch.progress = 100;
            }
            batch.process_status = status;
        }
        if let Some(progress) = input.progress {
            batch.progress = progress;
        }
        if let Some(operator) = input.operator {
            batch.operator = Some(operator);
        }
        if let Some(quality) = input.quality {
            batch.quality = quality;
        }
        batch.updated_at = Utc::now();

        self.store.update(batch).await
    }

    /// Mark a batch completed: full progress and a completion timestamp.
    pub async fn complete(&self, id: Uuid) -> AppResult<ProductionBatch> {
        let mut batch = self.store.get(id).await?;
        if batch.process_status == "completed" {
            return Err(AppError::InvalidStateTransition(
                "Batch is already completed".to_string(),
            ));
        }
        batch.process_status = "completed".to_string();
        batch.progress = 100;
        batch.completed_at = Some(Utc::now());
        batch.updated_at = Utc::now();
        self.store.update(batch).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.store.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn service() -> ProductionService {
        ProductionService::new(Arc::new(InMemoryBatchStore::new()))
    }

    fn input(name: &str) -> CreateBatchInput {
        CreateBatchInput {
            batch_name: name.to_string(),
            product: "Tomato Sauce".to_string(),
            quantity: dec!(500),
            operator: Some("J. Mills".to_string()),
        }
    }

    #[tokio::test]
    async fn create_starts_at_first_stage() {
        let service = service();
        let batch = service.create(input("B-001")).await.unwrap();
        assert_eq!(batch.process_status, "getting-raw-materials");
        assert_eq!(batch.progress, 0);
        assert!(batch.completed_at.is_none());
    }

    #[tokio::test]
    async fn complete_sets_progress_and_timestamp() {
        let service = service();
        let batch = service.create(input("B-002")).await.unwrap();
        let done = service.complete(batch.id).await.unwrap();
        assert_eq!(done.process_status, "completed");
        assert_eq!(done.progress, 100);
        assert!(done.completed_at.is_some());

        // completing twice is rejected
        assert!(service.complete(batch.id).await.is_err());
    }

    #[tokio::test]
    async fn update_rejects_unknown_status() {
        let service = service();
        let batch = service.create(input("B-003")).await.unwrap();
        let result = service
            .update(
                batch.id,
                UpdateBatchInput {
                    process_status: Some("melting".to_string()),
                    progress: None,
                    operator: None,
                    quality: None,
                },
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn rejects_non_positive_quantity() {
        let service = service();
        let mut bad = input("B-004");
        bad.quantity = dec!(0);
        assert!(service.create(bad).await.is_err());
    }

    #[tokio::test]
    async fn delete_removes_batch() {
        let service = service();
        let batch = service.create(input("B-005")).await.unwrap();
        service.delete(batch.id).await.unwrap();
        assert!(service.get(batch.id).await.is_err());
    }
}
