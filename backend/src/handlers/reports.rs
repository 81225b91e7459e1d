//! Report catalog handlers: dashboard, file delivery and on-demand
//! generation of the three fixed PDF reports.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::models::{PurchaseOrderStatus, ReportRange};
use crate::services::report_catalog::ReportCatalogService;
use crate::services::report_render::{ReportRenderService, ReportTemplate};
use crate::AppState;

fn service(state: &AppState) -> ReportCatalogService {
    ReportCatalogService::new(
        state.db.clone(),
        ReportRenderService::new(state.config.reports.clone()),
    )
}

pub async fn reports_dashboard(State(state): State<AppState>) -> Json<Value> {
    let reports = service(&state).dashboard().await;
    Json(json!({ "success": true, "reports": reports }))
}

pub async fn view_report(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> AppResult<impl IntoResponse> {
    let (file_name, bytes) = service(&state).file(id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    ))
}

pub async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> AppResult<impl IntoResponse> {
    let (file_name, bytes) = service(&state).file(id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: Option<PurchaseOrderStatus>,
}

pub async fn generate_report(
    State(state): State<AppState>,
    Path(template): Path<String>,
    Query(query): Query<GenerateQuery>,
) -> AppResult<Json<Value>> {
    let template = ReportTemplate::from_slug(&template)
        .ok_or_else(|| AppError::NotFound("Report template".to_string()))?;

    let range = ReportRange {
        start_date: query.start_date,
        end_date: query.end_date,
    };

    let rendered = service(&state)
        .generate(template, range, query.status)
        .await?;

    let slot_id = match template {
        ReportTemplate::ProcurementSummary => 1,
        ReportTemplate::SupplierPerformance => 2,
        ReportTemplate::PurchaseOrders => 3,
    };

    Ok(Json(json!({
        "success": true,
        "filePath": rendered.file_path,
        "size": rendered.size,
        "generatedAt": rendered.generated_at,
        "downloadUrl": format!("/api/reports/download/{}", slot_id),
    })))
}
