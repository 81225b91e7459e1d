//! Report catalog and file delivery
//!
//! Tracks a fixed set of three named report slots backed by files in the
//! reports directory. A slot with no generated file is still listed, as a
//! placeholder entry, so the dashboard always shows the full catalog.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::{GroupBy, PurchaseOrderStatus, RankingWeights, ReportRange};
use crate::services::procurement_reports::{
    build_spending_analytics, build_supplier_ranking, ProcurementReportService,
};
use crate::services::report_render::{
    OrderLine, RenderedReport, ReportContext, ReportRenderService, ReportTemplate,
};

/// One catalog entry
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSlot {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub file_name: String,
    pub is_placeholder: bool,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

const SLOTS: [(u32, ReportTemplate, &str); 3] = [
    (
        1,
        ReportTemplate::ProcurementSummary,
        "Spending totals, top suppliers and category breakdown",
    ),
    (
        2,
        ReportTemplate::SupplierPerformance,
        "Supplier KPI ranking with weighted scores",
    ),
    (
        3,
        ReportTemplate::PurchaseOrders,
        "Purchase order listing for the selected period",
    ),
];

/// Report catalog service
#[derive(Clone)]
pub struct ReportCatalogService {
    engine: ProcurementReportService,
    render: ReportRenderService,
}

impl ReportCatalogService {
    pub fn new(db: PgPool, render: ReportRenderService) -> Self {
        Self {
            engine: ProcurementReportService::new(db),
            render,
        }
    }

    fn template_for(&self, id: u32) -> AppResult<ReportTemplate> {
        SLOTS
            .iter()
            .find(|(slot_id, _, _)| *slot_id == id)
            .map(|(_, template, _)| *template)
            .ok_or_else(|| AppError::NotFound("Report slot".to_string()))
    }

    /// List all three slots; missing files become placeholder entries,
    /// never errors.
    pub async fn dashboard(&self) -> Vec<ReportSlot> {
        let mut slots = Vec::with_capacity(SLOTS.len());
        for (id, template, description) in SLOTS {
            let path = self.render.file_path(template);
            let slot = match tokio::fs::metadata(&path).await {
                Ok(meta) => ReportSlot {
                    id,
                    name: template.title().to_string(),
                    description: description.to_string(),
                    file_name: template.file_name().to_string(),
                    is_placeholder: false,
                    size: meta.len(),
                    last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
                },
                Err(_) => ReportSlot {
                    id,
                    name: template.title().to_string(),
                    description: description.to_string(),
                    file_name: template.file_name().to_string(),
                    is_placeholder: true,
                    size: 0,
                    last_modified: None,
                },
            };
            slots.push(slot);
        }
        slots
    }

    /// Read the generated file for a slot. Used by both the inline view and
    /// the attachment download endpoints.
    pub async fn file(&self, id: u32) -> AppResult<(String, Vec<u8>)> {
        let template = self.template_for(id)?;
        let path = self.render.file_path(template);
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|_| AppError::NotFound("Report file".to_string()))?;
        Ok((template.file_name().to_string(), bytes))
    }

    /// Run the aggregation for a template and render its PDF.
    pub async fn generate(
        &self,
        template: ReportTemplate,
        range: ReportRange,
        status: Option<PurchaseOrderStatus>,
    ) -> AppResult<RenderedReport> {
        range.validate()?;

        let context = match template {
            ReportTemplate::ProcurementSummary => {
                let orders = self.engine.fetch_orders(range, true).await?;
                ReportContext::ProcurementSummary {
                    range,
                    data: build_spending_analytics(&orders, GroupBy::Month),
                }
            }
            ReportTemplate::SupplierPerformance => {
                let suppliers = self.engine.fetch_suppliers().await?;
                let orders = self.engine.fetch_orders(range, true).await?;
                ReportContext::SupplierPerformance {
                    range,
                    data: build_supplier_ranking(&suppliers, &orders, RankingWeights::default()),
                }
            }
            ReportTemplate::PurchaseOrders => {
                let orders = self.engine.fetch_orders(range, false).await?;
                let orders = orders
                    .into_iter()
                    .filter(|order| status.map_or(true, |s| order.status == s))
                    .map(|order| OrderLine {
                        po_number: order.po_number,
                        supplier_name: order.supplier_name,
                        status: order.status.as_str().to_string(),
                        total_amount: crate::models::order_total(&order.items),
                        created_at: order.created_at,
                    })
                    .collect();
                ReportContext::PurchaseOrders { range, orders }
            }
        };

        self.render.render(context).await
    }
}
