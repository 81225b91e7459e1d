//! Supplier handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use validator::Validate;

use crate::error::AppResult;
use crate::models::RankingWeights;
use crate::services::supplier::{
    CreateSupplierInput, Supplier, SupplierListQuery, SupplierPage, SupplierService,
    UpdateSupplierInput,
};
use crate::AppState;

pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<SupplierListQuery>,
) -> AppResult<Json<SupplierPage>> {
    let page = SupplierService::new(state.db.clone()).list(&query).await?;
    Ok(Json(page))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    Json(input): Json<CreateSupplierInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let supplier = SupplierService::new(state.db.clone()).create(input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    let supplier = SupplierService::new(state.db.clone()).get(id).await?;
    Ok(Json(supplier))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateSupplierInput>,
) -> AppResult<Json<Supplier>> {
    let supplier = SupplierService::new(state.db.clone()).update(id, input).await?;
    Ok(Json(supplier))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    SupplierService::new(state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Suppliers ordered by weighted KPI score; weights default to 0.4/0.4/0.2
pub async fn supplier_rankings(
    State(state): State<AppState>,
    Query(weights): Query<RankingWeights>,
) -> AppResult<Json<Vec<Supplier>>> {
    weights.validate()?;
    let suppliers = SupplierService::new(state.db.clone())
        .rankings(weights)
        .await?;
    Ok(Json(suppliers))
}
