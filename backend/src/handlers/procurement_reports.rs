//! Procurement analytics handlers
//!
//! The four generators take a date range body and answer with the stored
//! report snapshot wrapped in `{success, report}`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::models::{GroupBy, RankingWeights, ReportRange};
use crate::services::procurement_reports::{
    ProcurementReportService, ReportListQuery, ReportPage,
};
use crate::AppState;

fn service(state: &AppState) -> ProcurementReportService {
    ProcurementReportService::new(state.db.clone())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRequest {
    #[serde(flatten)]
    pub range: ReportRange,
    pub weights: Option<RankingWeights>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingRequest {
    #[serde(flatten)]
    pub range: ReportRange,
    #[serde(default)]
    pub group_by: GroupBy,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRequest {
    #[serde(flatten)]
    pub range: ReportRange,
}

pub async fn generate_supplier_ranking(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<RankingRequest>,
) -> AppResult<Json<Value>> {
    let weights = request.weights.unwrap_or_default();
    weights.validate()?;

    let report = service(&state)
        .generate_supplier_ranking(user.user_id, request.range, weights)
        .await?;
    Ok(Json(json!({ "success": true, "report": report })))
}

pub async fn generate_spending_analytics(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<SpendingRequest>,
) -> AppResult<Json<Value>> {
    let report = service(&state)
        .generate_spending_analytics(user.user_id, request.range, request.group_by)
        .await?;
    Ok(Json(json!({ "success": true, "report": report })))
}

pub async fn generate_orders_by_supplier(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<RangeRequest>,
) -> AppResult<Json<Value>> {
    let report = service(&state)
        .generate_orders_by_supplier(user.user_id, request.range)
        .await?;
    Ok(Json(json!({ "success": true, "report": report })))
}

pub async fn generate_procurement_cycle(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<RangeRequest>,
) -> AppResult<Json<Value>> {
    let report = service(&state)
        .generate_procurement_cycle(user.user_id, request.range)
        .await?;
    Ok(Json(json!({ "success": true, "report": report })))
}

pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportListQuery>,
) -> AppResult<Json<ReportPage>> {
    let page = service(&state).list(&query).await?;
    Ok(Json(page))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    let report = service(&state).get(id).await?;
    Ok(Json(json!({ "success": true, "report": report })))
}

pub async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    service(&state).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
