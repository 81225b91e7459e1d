//! Finance handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::finance::{
    AssetLiability, CreateAssetLiabilityInput, CreateTransactionInput, FinanceAccount,
    FinanceBudget, FinanceService, FinanceSummary, FinanceTransaction, TransactionListQuery,
    TransactionPage,
};
use crate::AppState;

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<TransactionListQuery>,
) -> AppResult<Json<TransactionPage>> {
    let page = FinanceService::new(state.db.clone())
        .list_transactions(&query)
        .await?;
    Ok(Json(page))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    Json(input): Json<CreateTransactionInput>,
) -> AppResult<(StatusCode, Json<FinanceTransaction>)> {
    let transaction = FinanceService::new(state.db.clone())
        .create_transaction(input)
        .await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    FinanceService::new(state.db.clone())
        .delete_transaction(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn finance_summary(State(state): State<AppState>) -> AppResult<Json<FinanceSummary>> {
    let summary = FinanceService::new(state.db.clone()).summary().await?;
    Ok(Json(summary))
}

pub async fn list_accounts(State(state): State<AppState>) -> AppResult<Json<Vec<FinanceAccount>>> {
    let accounts = FinanceService::new(state.db.clone()).list_accounts().await?;
    Ok(Json(accounts))
}

pub async fn list_budgets(State(state): State<AppState>) -> AppResult<Json<Vec<FinanceBudget>>> {
    let budgets = FinanceService::new(state.db.clone()).list_budgets().await?;
    Ok(Json(budgets))
}

pub async fn list_assets_liabilities(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<AssetLiability>>> {
    let entries = FinanceService::new(state.db.clone())
        .list_assets_liabilities()
        .await?;
    Ok(Json(entries))
}

pub async fn create_asset_liability(
    State(state): State<AppState>,
    Json(input): Json<CreateAssetLiabilityInput>,
) -> AppResult<(StatusCode, Json<AssetLiability>)> {
    let entry = FinanceService::new(state.db.clone())
        .create_asset_liability(input)
        .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn delete_asset_liability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    FinanceService::new(state.db.clone())
        .delete_asset_liability(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
