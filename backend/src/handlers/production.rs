//! Production batch handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::production::{
    CreateBatchInput, ProductionBatch, ProductionService, UpdateBatchInput,
};
use crate::AppState;

fn service(state: &AppState) -> ProductionService {
    ProductionService::new(state.batches.clone())
}

pub async fn list_batches(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ProductionBatch>>> {
    let batches = service(&state).list().await?;
    Ok(Json(batches))
}

pub async fn create_batch(
    State(state): State<AppState>,
    Json(input): Json<CreateBatchInput>,
) -> AppResult<(StatusCode, Json<ProductionBatch>)> {
    let batch = service(&state).create(input).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

pub async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProductionBatch>> {
    let batch = service(&state).get(id).await?;
    Ok(Json(batch))
}

pub async fn update_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateBatchInput>,
) -> AppResult<Json<ProductionBatch>> {
    let batch = service(&state).update(id, input).await?;
    Ok(Json(batch))
}

pub async fn complete_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ProductionBatch>> {
    let batch = service(&state).complete(id).await?;
    Ok(Json(batch))
}

pub async fn delete_batch(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
