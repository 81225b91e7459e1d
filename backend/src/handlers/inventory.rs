//! Inventory handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::inventory::{
    CreateItemInput, InventoryItem, InventoryService, ItemListQuery, ItemPage, UpdateItemInput,
};
use crate::AppState;

pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemListQuery>,
) -> AppResult<Json<ItemPage>> {
    let page = InventoryService::new(state.db.clone()).list(&query).await?;
    Ok(Json(page))
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<CreateItemInput>,
) -> AppResult<(StatusCode, Json<InventoryItem>)> {
    let item = InventoryService::new(state.db.clone()).create(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<InventoryItem>> {
    let item = InventoryService::new(state.db.clone()).get(id).await?;
    Ok(Json(item))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateItemInput>,
) -> AppResult<Json<InventoryItem>> {
    let item = InventoryService::new(state.db.clone()).update(id, input).await?;
    Ok(Json(item))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockInput {
    pub current_stock: Decimal,
}

pub async fn update_item_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateStockInput>,
) -> AppResult<Json<InventoryItem>> {
    let item = InventoryService::new(state.db.clone())
        .update_stock(id, input.current_stock)
        .await?;
    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    InventoryService::new(state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
