//! Purchase order handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::purchase_order::{
    CreatePurchaseOrderInput, PurchaseOrder, PurchaseOrderListQuery, PurchaseOrderPage,
    PurchaseOrderService, UpdatePurchaseOrderInput,
};
use crate::AppState;

pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(query): Query<PurchaseOrderListQuery>,
) -> AppResult<Json<PurchaseOrderPage>> {
    let page = PurchaseOrderService::new(state.db.clone()).list(&query).await?;
    Ok(Json(page))
}

pub async fn create_purchase_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(input): Json<CreatePurchaseOrderInput>,
) -> AppResult<(StatusCode, Json<PurchaseOrder>)> {
    let order = PurchaseOrderService::new(state.db.clone())
        .create(user.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrder>> {
    let order = PurchaseOrderService::new(state.db.clone()).get(id).await?;
    Ok(Json(order))
}

pub async fn update_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePurchaseOrderInput>,
) -> AppResult<Json<PurchaseOrder>> {
    let order = PurchaseOrderService::new(state.db.clone())
        .update(id, input)
        .await?;
    Ok(Json(order))
}

pub async fn delete_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    PurchaseOrderService::new(state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
