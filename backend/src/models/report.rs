//! Procurement report types
//!
//! The persisted `data` payload is a tagged union keyed by report type, one
//! variant per report shape, so rendering and display code can match
//! exhaustively instead of poking at an untyped document.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Report kinds. The last three are reserved slots that no generator
/// produces yet; they are accepted as list filters for forward compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    SupplierRanking,
    SpendingAnalytics,
    OrdersBySupplier,
    ProcurementCycle,
    SupplierPerformance,
    MonthlyProcurementSummary,
    InvoiceMatchingReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Generating,
    Completed,
    Failed,
}

/// Inclusive report date range. `start_date` must be strictly before
/// `end_date`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ReportRange {
    pub fn validate(&self) -> AppResult<()> {
        if self.start_date >= self.end_date {
            return Err(AppError::Validation {
                field: "startDate".to_string(),
                message: "Start date must be before end date".to_string(),
            });
        }
        Ok(())
    }

    /// Timestamp bounds covering the range inclusively:
    /// `[start 00:00, end + 1 day 00:00)`.
    pub fn bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = Utc.from_utc_datetime(&self.start_date.and_hms_opt(0, 0, 0).unwrap());
        let end = Utc.from_utc_datetime(
            &(self.end_date + chrono::Duration::days(1))
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        );
        (start, end)
    }
}

/// Weights for the supplier ranking score. Each weight is clamped to [0, 1]
/// before use so out-of-range values from direct callers cannot distort the
/// ranking scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, validator::Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RankingWeights {
    #[validate(range(min = 0.0, max = 1.0, message = "On-time weight must be between 0 and 1"))]
    pub w_on_time: f64,
    #[validate(range(min = 0.0, max = 1.0, message = "Quality weight must be between 0 and 1"))]
    pub w_quality: f64,
    #[validate(range(min = 0.0, max = 1.0, message = "Response weight must be between 0 and 1"))]
    pub w_response: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            w_on_time: 0.4,
            w_quality: 0.4,
            w_response: 0.2,
        }
    }
}

impl RankingWeights {
    pub fn clamped(self) -> Self {
        Self {
            w_on_time: self.w_on_time.clamp(0.0, 1.0),
            w_quality: self.w_quality.clamp(0.0, 1.0),
            w_response: self.w_response.clamp(0.0, 1.0),
        }
    }
}

/// Time bucket for spending trends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Month,
    Year,
}

/// Supplier identity embedded in report payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRef {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub category: Option<String>,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Report payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingMetrics {
    pub on_time_rate: f64,
    pub quality_score: f64,
    pub response_score: f64,
    pub weighted_score: f64,
    pub total_spend: Decimal,
    pub order_count: i64,
    pub avg_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRanking {
    pub supplier: SupplierRef,
    pub metrics: RankingMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRankingData {
    pub rankings: Vec<SupplierRanking>,
    pub weights: RankingWeights,
    pub total_suppliers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    pub total_spend: Decimal,
    pub total_orders: i64,
    pub avg_order_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingTrendPoint {
    pub period: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierSpend {
    pub supplier: SupplierRef,
    pub total_spend: Decimal,
    pub order_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpend {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingAnalyticsData {
    pub summary: SpendingSummary,
    pub spending_trends: Vec<SpendingTrendPoint>,
    pub top_suppliers: Vec<SupplierSpend>,
    pub category_breakdown: Vec<CategorySpend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierOrderMetrics {
    pub total_orders: i64,
    pub total_value: Decimal,
    pub avg_order_value: Decimal,
    pub status_breakdown: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierOrders {
    pub supplier: SupplierRef,
    pub metrics: SupplierOrderMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersBySupplierData {
    pub orders_by_supplier: Vec<SupplierOrders>,
    pub total_suppliers: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleEntry {
    pub order_id: Uuid,
    pub po_number: String,
    pub supplier_name: String,
    pub supplier_code: String,
    pub status: String,
    /// Whole days between creation and last update, rounded up
    pub cycle_time: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStatistics {
    pub avg_cycle_time: f64,
    pub min_cycle_time: i64,
    pub max_cycle_time: i64,
    pub total_orders: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCycleStats {
    pub count: i64,
    pub total_cycle_time: i64,
    pub avg_cycle_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcurementCycleData {
    pub cycle_data: Vec<CycleEntry>,
    pub statistics: CycleStatistics,
    pub status_breakdown: BTreeMap<String, StatusCycleStats>,
}

/// Persisted report payload, tagged by report type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reportType")]
pub enum ReportData {
    #[serde(rename = "supplier_ranking")]
    SupplierRanking(SupplierRankingData),
    #[serde(rename = "spending_analytics")]
    SpendingAnalytics(SpendingAnalyticsData),
    #[serde(rename = "orders_by_supplier")]
    OrdersBySupplier(OrdersBySupplierData),
    #[serde(rename = "procurement_cycle")]
    ProcurementCycle(ProcurementCycleData),
}

impl ReportData {
    pub fn report_type(&self) -> ReportType {
        match self {
            ReportData::SupplierRanking(_) => ReportType::SupplierRanking,
            ReportData::SpendingAnalytics(_) => ReportType::SpendingAnalytics,
            ReportData::OrdersBySupplier(_) => ReportType::OrdersBySupplier,
            ReportData::ProcurementCycle(_) => ReportType::ProcurementCycle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: (i32, u32, u32), end: (i32, u32, u32)) -> ReportRange {
        ReportRange {
            start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        }
    }

    #[test]
    fn range_rejects_inverted_dates() {
        assert!(range((2025, 3, 1), (2025, 1, 1)).validate().is_err());
        assert!(range((2025, 1, 1), (2025, 1, 1)).validate().is_err());
        assert!(range((2025, 1, 1), (2025, 3, 1)).validate().is_ok());
    }

    #[test]
    fn bounds_cover_end_date_inclusively() {
        let (start, end) = range((2025, 1, 1), (2025, 1, 31)).bounds();
        assert_eq!(start.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-02-01T00:00:00+00:00");
    }

    #[test]
    fn weights_clamp_to_unit_interval() {
        let weights = RankingWeights {
            w_on_time: 1.5,
            w_quality: -0.2,
            w_response: 0.3,
        }
        .clamped();
        assert_eq!(weights.w_on_time, 1.0);
        assert_eq!(weights.w_quality, 0.0);
        assert_eq!(weights.w_response, 0.3);
    }

    #[test]
    fn payload_round_trips_through_json() {
        let data = ReportData::SpendingAnalytics(SpendingAnalyticsData {
            summary: SpendingSummary {
                total_spend: Decimal::new(12550, 2),
                total_orders: 3,
                avg_order_value: Decimal::new(4183, 2),
            },
            spending_trends: vec![SpendingTrendPoint {
                period: "2025-01".to_string(),
                amount: Decimal::new(12550, 2),
            }],
            top_suppliers: vec![],
            category_breakdown: vec![CategorySpend {
                category: "Uncategorized".to_string(),
                amount: Decimal::new(12550, 2),
            }],
        });

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["reportType"], "spending_analytics");
        let back: ReportData = serde_json::from_value(json).unwrap();
        assert_eq!(back, data);
    }
}
