//! Finance module: transactions, accounts, budgets and the asset/liability
//! register.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{page_count, PageParams};

/// Finance service
#[derive(Clone)]
pub struct FinanceService {
    db: PgPool,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FinanceTransaction {
    pub id: Uuid,
    pub transaction_type: String,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub account: String,
    pub reference: Option<String>,
    pub occurred_on: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionInput {
    #[validate(length(min = 1, message = "Transaction type is required"))]
    pub transaction_type: String,

    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub amount: Decimal,

    #[validate(length(min = 1, message = "Account is required"))]
    pub account: String,

    pub reference: Option<String>,
    pub occurred_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionListQuery {
    #[serde(flatten)]
    pub page: PageParams,
    pub transaction_type: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub transactions: Vec<FinanceTransaction>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FinanceAccount {
    pub id: Uuid,
    pub name: String,
    pub account_type: String,
    pub balance: Decimal,
    pub currency: String,
    pub bank: Option<String>,
    pub account_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct FinanceBudget {
    pub id: Uuid,
    pub category: String,
    pub allocated: Decimal,
    pub spent: Decimal,
    pub period: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssetLiability {
    pub id: Uuid,
    pub entry_type: String,
    pub subtype: String,
    pub name: String,
    pub value: Decimal,
    pub entry_date: DateTime<Utc>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetLiabilityInput {
    #[validate(length(min = 1, message = "Entry type is required"))]
    pub entry_type: String,

    #[validate(length(min = 1, message = "Subtype is required"))]
    pub subtype: String,

    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    pub value: Decimal,
    pub entry_date: Option<DateTime<Utc>>,
}

/// Income, expenses and net over completed transactions
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net: Decimal,
}

const TRANSACTION_COLUMNS: &str = "id, transaction_type, category, description, amount, account, \
     reference, occurred_on, status, created_at, updated_at";

impl FinanceService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_transaction(
        &self,
        input: CreateTransactionInput,
    ) -> AppResult<FinanceTransaction> {
        input.validate()?;
        if input.amount <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "amount".to_string(),
                message: "Amount must be positive".to_string(),
            });
        }

        let transaction = sqlx::query_as::<_, FinanceTransaction>(&format!(
            r#"
            INSERT INTO finance_transactions
                (transaction_type, category, description, amount, account, reference, occurred_on)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(&input.transaction_type)
        .bind(&input.category)
        .bind(&input.description)
        .bind(input.amount)
        .bind(&input.account)
        .bind(&input.reference)
        .bind(input.occurred_on)
        .fetch_one(&self.db)
        .await?;

        Ok(transaction)
    }

    pub async fn list_transactions(
        &self,
        query: &TransactionListQuery,
    ) -> AppResult<TransactionPage> {
        let (page, limit) = query.page.resolve(20, 100);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM finance_transactions
            WHERE ($1::text IS NULL OR transaction_type = $1)
              AND ($2::text IS NULL OR category = $2)
            "#,
        )
        .bind(&query.transaction_type)
        .bind(&query.category)
        .fetch_one(&self.db)
        .await?;

        let transactions = sqlx::query_as::<_, FinanceTransaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS} FROM finance_transactions
            WHERE ($1::text IS NULL OR transaction_type = $1)
              AND ($2::text IS NULL OR category = $2)
            ORDER BY occurred_on DESC
            LIMIT $3 OFFSET $4
            "#
        ))
        .bind(&query.transaction_type)
        .bind(&query.category)
        .bind(i64::from(limit))
        .bind(PageParams::offset(page, limit))
        .fetch_all(&self.db)
        .await?;

        Ok(TransactionPage {
            transactions,
            page,
            limit,
            total,
            total_pages: page_count(total, limit),
        })
    }

    pub async fn delete_transaction(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM finance_transactions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Transaction".to_string()));
        }
        Ok(())
    }

    pub async fn summary(&self) -> AppResult<FinanceSummary> {
        let (total_income, total_expenses): (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE transaction_type = 'income'), 0),
                COALESCE(SUM(amount) FILTER (WHERE transaction_type = 'expense'), 0)
            FROM finance_transactions
            WHERE status = 'completed'
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(FinanceSummary {
            total_income,
            total_expenses,
            net: total_income - total_expenses,
        })
    }

    pub async fn list_accounts(&self) -> AppResult<Vec<FinanceAccount>> {
        let accounts = sqlx::query_as::<_, FinanceAccount>(
            "SELECT id, name, account_type, balance, currency, bank, account_number, created_at \
             FROM finance_accounts ORDER BY name ASC",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(accounts)
    }

    pub async fn list_budgets(&self) -> AppResult<Vec<FinanceBudget>> {
        let budgets = sqlx::query_as::<_, FinanceBudget>(
            "SELECT id, category, allocated, spent, period, created_at \
             FROM finance_budgets ORDER BY category ASC",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(budgets)
    }

    pub async fn create_asset_liability(
        &self,
        input: CreateAssetLiabilityInput,
    ) -> AppResult<AssetLiability> {
        input.validate()?;

        let entry = sqlx::query_as::<_, AssetLiability>(
            r#"
            INSERT INTO assets_liabilities (entry_type, subtype, name, value, entry_date)
            VALUES ($1, $2, $3, $4, COALESCE($5, NOW()))
            RETURNING id, entry_type, subtype, name, value, entry_date, status, created_at
            "#,
        )
        .bind(&input.entry_type)
        .bind(&input.subtype)
        .bind(&input.name)
        .bind(input.value)
        .bind(input.entry_date)
        .fetch_one(&self.db)
        .await?;

        Ok(entry)
    }

    pub async fn list_assets_liabilities(&self) -> AppResult<Vec<AssetLiability>> {
        let entries = sqlx::query_as::<_, AssetLiability>(
            "SELECT id, entry_type, subtype, name, value, entry_date, status, created_at \
             FROM assets_liabilities ORDER BY entry_date DESC",
        )
        .fetch_all(&self.db)
        .await?;
        Ok(entries)
    }

    pub async fn delete_asset_liability(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM assets_liabilities WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Entry".to_string()));
        }
        Ok(())
    }
}
