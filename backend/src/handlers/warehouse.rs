//! Warehouse zone and stock movement handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::warehouse::{
    CreateMovementInput, CreateZoneInput, LowStockItem, MovementListQuery, MovementPage,
    StockMovement, UpdateZoneInput, WarehouseAnalytics, WarehouseService, WarehouseZone,
    ZoneSummary,
};
use crate::AppState;

pub async fn list_zones(State(state): State<AppState>) -> AppResult<Json<Vec<ZoneSummary>>> {
    let zones = WarehouseService::new(state.db.clone()).list_zones().await?;
    Ok(Json(zones))
}

pub async fn create_zone(
    State(state): State<AppState>,
    Json(input): Json<CreateZoneInput>,
) -> AppResult<(StatusCode, Json<WarehouseZone>)> {
    let zone = WarehouseService::new(state.db.clone()).create_zone(input).await?;
    Ok((StatusCode::CREATED, Json(zone)))
}

pub async fn get_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<WarehouseZone>> {
    let zone = WarehouseService::new(state.db.clone()).get_zone(id).await?;
    Ok(Json(zone))
}

pub async fn update_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateZoneInput>,
) -> AppResult<Json<WarehouseZone>> {
    let zone = WarehouseService::new(state.db.clone())
        .update_zone(id, input)
        .await?;
    Ok(Json(zone))
}

pub async fn delete_zone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    WarehouseService::new(state.db.clone()).delete_zone(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_movements(
    State(state): State<AppState>,
    Query(query): Query<MovementListQuery>,
) -> AppResult<Json<MovementPage>> {
    let page = WarehouseService::new(state.db.clone())
        .list_movements(&query)
        .await?;
    Ok(Json(page))
}

pub async fn create_movement(
    State(state): State<AppState>,
    Json(input): Json<CreateMovementInput>,
) -> AppResult<(StatusCode, Json<StockMovement>)> {
    let movement = WarehouseService::new(state.db.clone())
        .create_movement(input)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

pub async fn low_stock(State(state): State<AppState>) -> AppResult<Json<Vec<LowStockItem>>> {
    let items = WarehouseService::new(state.db.clone()).low_stock().await?;
    Ok(Json(items))
}

pub async fn mark_low_stock_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<LowStockItem>> {
    let item = WarehouseService::new(state.db.clone())
        .mark_low_stock_alert(id)
        .await?;
    Ok(Json(item))
}

pub async fn warehouse_analytics(
    State(state): State<AppState>,
) -> AppResult<Json<WarehouseAnalytics>> {
    let analytics = WarehouseService::new(state.db.clone()).analytics().await?;
    Ok(Json(analytics))
}
