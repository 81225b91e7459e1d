//! Procurement analytics engine
//!
//! Four report generators over purchase orders and suppliers in a date
//! range. Each generator fetches its input rows, runs a pure aggregation
//! function over them, persists the result as a `ProcurementReport`
//! snapshot, and returns the stored record. The aggregation functions take
//! plain row slices so their behavior is testable without a database.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::report::{
    CategorySpend, CycleEntry, CycleStatistics, OrdersBySupplierData, ProcurementCycleData,
    RankingMetrics, ReportData, SpendingAnalyticsData, SpendingSummary, SpendingTrendPoint,
    StatusCycleStats, SupplierOrderMetrics, SupplierOrders, SupplierRanking, SupplierRankingData,
    SupplierRef, SupplierSpend,
};
use crate::models::{
    order_total, page_count, GroupBy, PageParams, PurchaseOrderItem, PurchaseOrderStatus,
    RankingWeights, ReportRange, ReportStatus, ReportType,
};

const MILLIS_PER_DAY: i64 = 86_400_000;
const TOP_SUPPLIERS_LIMIT: usize = 10;

/// Procurement report service
#[derive(Clone)]
pub struct ProcurementReportService {
    db: PgPool,
}

/// Supplier input row for the aggregation functions
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SupplierRow {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub category: Option<String>,
    pub status: String,
    pub on_time_delivery_rate: f64,
    pub quality_score: f64,
    pub responsiveness_score: f64,
}

impl SupplierRow {
    fn supplier_ref(&self) -> SupplierRef {
        SupplierRef {
            id: self.id,
            name: self.name.clone(),
            code: self.code.clone(),
            category: self.category.clone(),
            status: self.status.clone(),
        }
    }
}

/// Purchase order input row, joined with its supplier
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub po_number: String,
    pub supplier_id: Uuid,
    pub items: Json<Vec<PurchaseOrderItem>>,
    pub status: PurchaseOrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub supplier_name: String,
    pub supplier_code: String,
    pub supplier_category: Option<String>,
    pub supplier_status: String,
}

impl OrderRow {
    fn total(&self) -> Decimal {
        order_total(&self.items)
    }

    fn supplier_ref(&self) -> SupplierRef {
        SupplierRef {
            id: self.supplier_id,
            name: self.supplier_name.clone(),
            code: self.supplier_code.clone(),
            category: self.supplier_category.clone(),
            status: self.supplier_status.clone(),
        }
    }
}

/// Stored report snapshot
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProcurementReport {
    pub id: Uuid,
    pub report_type: ReportType,
    pub title: String,
    pub description: String,
    pub generated_by: Option<Uuid>,
    pub range_start: DateTime<Utc>,
    pub range_end: DateTime<Utc>,
    pub data: Json<ReportData>,
    pub status: ReportStatus,
    pub total_records: i64,
    pub generation_time_ms: i64,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for the paginated report list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportListQuery {
    #[serde(flatten)]
    pub page: PageParams,
    pub report_type: Option<ReportType>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPage {
    pub reports: Vec<ProcurementReport>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

const REPORT_COLUMNS: &str = "id, report_type, title, description, generated_by, range_start, \
     range_end, data, status, total_records, generation_time_ms, file_size, created_at";

impl ProcurementReportService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Generate the supplier ranking report: every non-deleted supplier
    /// scored by the weighted combination of its KPI values, with spend
    /// metrics from approved or delivered orders in range.
    pub async fn generate_supplier_ranking(
        &self,
        user_id: Uuid,
        range: ReportRange,
        weights: RankingWeights,
    ) -> AppResult<ProcurementReport> {
        range.validate()?;
        let started = Instant::now();

        let suppliers = self.fetch_suppliers().await?;
        let orders = self.fetch_orders(range, true).await?;
        let total_records = suppliers.len() as i64;
        let data = build_supplier_ranking(&suppliers, &orders, weights);

        self.persist(
            user_id,
            range,
            "Supplier Ranking Report",
            &format!(
                "Supplier performance ranking from {} to {}",
                range.start_date, range.end_date
            ),
            ReportData::SupplierRanking(data),
            total_records,
            started.elapsed().as_millis() as i64,
        )
        .await
    }

    /// Generate the spending analytics report: totals, period trends, top
    /// suppliers and category breakdown over approved or delivered orders.
    pub async fn generate_spending_analytics(
        &self,
        user_id: Uuid,
        range: ReportRange,
        group_by: GroupBy,
    ) -> AppResult<ProcurementReport> {
        range.validate()?;
        let started = Instant::now();

        let orders = self.fetch_orders(range, true).await?;
        let total_records = orders.len() as i64;
        let data = build_spending_analytics(&orders, group_by);

        self.persist(
            user_id,
            range,
            "Spending Analytics Report",
            &format!(
                "Procurement spending analysis from {} to {}",
                range.start_date, range.end_date
            ),
            ReportData::SpendingAnalytics(data),
            total_records,
            started.elapsed().as_millis() as i64,
        )
        .await
    }

    /// Generate the orders-by-supplier report: per-supplier order volume,
    /// value and status histogram over all orders in range.
    pub async fn generate_orders_by_supplier(
        &self,
        user_id: Uuid,
        range: ReportRange,
    ) -> AppResult<ProcurementReport> {
        range.validate()?;
        let started = Instant::now();

        let suppliers = self.fetch_suppliers().await?;
        let orders = self.fetch_orders(range, false).await?;
        let total_records = suppliers.len() as i64;
        let data = build_orders_by_supplier(&suppliers, &orders);

        self.persist(
            user_id,
            range,
            "Orders by Supplier Report",
            &format!(
                "Purchase order distribution by supplier from {} to {}",
                range.start_date, range.end_date
            ),
            ReportData::OrdersBySupplier(data),
            total_records,
            started.elapsed().as_millis() as i64,
        )
        .await
    }

    /// Generate the procurement cycle report: per-order cycle time in days
    /// with aggregate and per-status statistics.
    pub async fn generate_procurement_cycle(
        &self,
        user_id: Uuid,
        range: ReportRange,
    ) -> AppResult<ProcurementReport> {
        range.validate()?;
        let started = Instant::now();

        let orders = self.fetch_orders(range, false).await?;
        let total_records = orders.len() as i64;
        let data = build_procurement_cycle(&orders);

        self.persist(
            user_id,
            range,
            "Procurement Cycle Report",
            &format!(
                "Purchase order cycle time analysis from {} to {}",
                range.start_date, range.end_date
            ),
            ReportData::ProcurementCycle(data),
            total_records,
            started.elapsed().as_millis() as i64,
        )
        .await
    }

    /// List stored reports, newest first, optionally filtered by type and
    /// creation date range.
    pub async fn list(&self, query: &ReportListQuery) -> AppResult<ReportPage> {
        let (page, limit) = query.page.resolve(10, 100);
        let start = query
            .start_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| Utc.from_utc_datetime(&d));
        let end = query
            .end_date
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(|d| Utc.from_utc_datetime(&d));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM procurement_reports
            WHERE ($1::report_type IS NULL OR report_type = $1)
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at <= $3)
            "#,
        )
        .bind(query.report_type)
        .bind(start)
        .bind(end)
        .fetch_one(&self.db)
        .await?;

        let reports = sqlx::query_as::<_, ProcurementReport>(&format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM procurement_reports
            WHERE ($1::report_type IS NULL OR report_type = $1)
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at <= $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(query.report_type)
        .bind(start)
        .bind(end)
        .bind(i64::from(limit))
        .bind(PageParams::offset(page, limit))
        .fetch_all(&self.db)
        .await?;

        Ok(ReportPage {
            reports,
            page,
            limit,
            total,
            total_pages: page_count(total, limit),
        })
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ProcurementReport> {
        sqlx::query_as::<_, ProcurementReport>(&format!(
            "SELECT {REPORT_COLUMNS} FROM procurement_reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Report".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM procurement_reports WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Report".to_string()));
        }
        Ok(())
    }

    pub(crate) async fn fetch_suppliers(&self) -> AppResult<Vec<SupplierRow>> {
        let suppliers = sqlx::query_as::<_, SupplierRow>(
            r#"
            SELECT id, name, code, category, status,
                   on_time_delivery_rate, quality_score, responsiveness_score
            FROM suppliers
            WHERE deleted = FALSE
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(suppliers)
    }

    pub(crate) async fn fetch_orders(
        &self,
        range: ReportRange,
        settled_only: bool,
    ) -> AppResult<Vec<OrderRow>> {
        let (start, end) = range.bounds();
        let status_filter = if settled_only {
            "AND po.status IN ('Approved', 'Delivered')"
        } else {
            ""
        };

        let orders = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            SELECT po.id, po.po_number, po.supplier_id, po.items, po.status,
                   po.created_at, po.updated_at,
                   s.name AS supplier_name, s.code AS supplier_code,
                   s.category AS supplier_category, s.status AS supplier_status
            FROM purchase_orders po
            JOIN suppliers s ON s.id = po.supplier_id
            WHERE po.created_at >= $1 AND po.created_at < $2 {status_filter}
            ORDER BY po.created_at ASC
            "#
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;
        Ok(orders)
    }

    #[allow(clippy::too_many_arguments)]
    async fn persist(
        &self,
        user_id: Uuid,
        range: ReportRange,
        title: &str,
        description: &str,
        data: ReportData,
        total_records: i64,
        generation_time_ms: i64,
    ) -> AppResult<ProcurementReport> {
        let (range_start, range_end) = range.bounds();
        let report_type = data.report_type();

        let report = sqlx::query_as::<_, ProcurementReport>(&format!(
            r#"
            INSERT INTO procurement_reports
                (report_type, title, description, generated_by, range_start, range_end,
                 data, status, total_records, generation_time_ms)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'completed', $8, $9)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(report_type)
        .bind(title)
        .bind(description)
        .bind(user_id)
        .bind(range_start)
        .bind(range_end)
        .bind(Json(data))
        .bind(total_records)
        .bind(generation_time_ms)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            report_id = %report.id,
            report_type = ?report_type,
            total_records,
            generation_time_ms,
            "generated procurement report"
        );

        Ok(report)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn avg_value(total: Decimal, count: i64) -> Decimal {
    if count > 0 {
        (total / Decimal::from(count)).round_dp(2)
    } else {
        Decimal::ZERO
    }
}

/// Rank suppliers by weighted KPI score. Spend metrics come from the given
/// orders, grouped by supplier; suppliers with no orders in range keep zero
/// spend. The sort is stable, so ties preserve supplier fetch order.
pub fn build_supplier_ranking(
    suppliers: &[SupplierRow],
    orders: &[OrderRow],
    weights: RankingWeights,
) -> SupplierRankingData {
    let weights = weights.clamped();

    let mut spend_by_supplier: HashMap<Uuid, (Decimal, i64)> = HashMap::new();
    for order in orders {
        let entry = spend_by_supplier
            .entry(order.supplier_id)
            .or_insert((Decimal::ZERO, 0));
        entry.0 += order.total();
        entry.1 += 1;
    }

    let mut rankings: Vec<SupplierRanking> = suppliers
        .iter()
        .map(|supplier| {
            let (total_spend, order_count) = spend_by_supplier
                .get(&supplier.id)
                .copied()
                .unwrap_or((Decimal::ZERO, 0));

            let weighted_score = supplier.on_time_delivery_rate * weights.w_on_time
                + supplier.quality_score * weights.w_quality
                + supplier.responsiveness_score * weights.w_response;

            SupplierRanking {
                supplier: supplier.supplier_ref(),
                metrics: RankingMetrics {
                    on_time_rate: supplier.on_time_delivery_rate,
                    quality_score: supplier.quality_score,
                    response_score: supplier.responsiveness_score,
                    weighted_score: round2(weighted_score),
                    total_spend,
                    order_count,
                    avg_order_value: avg_value(total_spend, order_count),
                },
            }
        })
        .collect();

    rankings.sort_by(|a, b| b.metrics.weighted_score.total_cmp(&a.metrics.weighted_score));

    SupplierRankingData {
        total_suppliers: rankings.len() as i64,
        rankings,
        weights,
    }
}

/// Aggregate spending over the given orders: overall summary, per-period
/// trend series, top suppliers by spend, and per-category breakdown.
pub fn build_spending_analytics(orders: &[OrderRow], group_by: GroupBy) -> SpendingAnalyticsData {
    let mut total_spend = Decimal::ZERO;
    let mut trends: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut by_supplier: HashMap<Uuid, SupplierSpend> = HashMap::new();
    let mut by_category: HashMap<String, Decimal> = HashMap::new();

    for order in orders {
        let amount = order.total();
        total_spend += amount;

        let period = match group_by {
            GroupBy::Month => order.created_at.format("%Y-%m").to_string(),
            GroupBy::Year => order.created_at.format("%Y").to_string(),
        };
        *trends.entry(period).or_insert(Decimal::ZERO) += amount;

        let entry = by_supplier
            .entry(order.supplier_id)
            .or_insert_with(|| SupplierSpend {
                supplier: order.supplier_ref(),
                total_spend: Decimal::ZERO,
                order_count: 0,
            });
        entry.total_spend += amount;
        entry.order_count += 1;

        let category = order
            .supplier_category
            .clone()
            .unwrap_or_else(|| "Uncategorized".to_string());
        *by_category.entry(category).or_insert(Decimal::ZERO) += amount;
    }

    // BTreeMap iteration gives the period series in ascending order, which
    // is chronological for ISO period strings.
    let spending_trends = trends
        .into_iter()
        .map(|(period, amount)| SpendingTrendPoint { period, amount })
        .collect();

    let mut top_suppliers: Vec<SupplierSpend> = by_supplier.into_values().collect();
    top_suppliers.sort_by(|a, b| b.total_spend.cmp(&a.total_spend));
    top_suppliers.truncate(TOP_SUPPLIERS_LIMIT);

    let mut category_breakdown: Vec<CategorySpend> = by_category
        .into_iter()
        .map(|(category, amount)| CategorySpend { category, amount })
        .collect();
    category_breakdown.sort_by(|a, b| b.amount.cmp(&a.amount));

    SpendingAnalyticsData {
        summary: SpendingSummary {
            total_spend,
            total_orders: orders.len() as i64,
            avg_order_value: avg_value(total_spend, orders.len() as i64),
        },
        spending_trends,
        top_suppliers,
        category_breakdown,
    }
}

/// Group the given orders by supplier. Every supplier appears in the output
/// even with zero orders; the list is sorted descending by total value.
pub fn build_orders_by_supplier(
    suppliers: &[SupplierRow],
    orders: &[OrderRow],
) -> OrdersBySupplierData {
    let mut grouped: HashMap<Uuid, (Decimal, i64, BTreeMap<String, i64>)> = HashMap::new();
    for order in orders {
        let entry = grouped
            .entry(order.supplier_id)
            .or_insert_with(|| (Decimal::ZERO, 0, BTreeMap::new()));
        entry.0 += order.total();
        entry.1 += 1;
        *entry.2.entry(order.status.as_str().to_string()).or_insert(0) += 1;
    }

    let mut orders_by_supplier: Vec<SupplierOrders> = suppliers
        .iter()
        .map(|supplier| {
            let (total_value, total_orders, status_breakdown) = grouped
                .remove(&supplier.id)
                .unwrap_or((Decimal::ZERO, 0, BTreeMap::new()));

            SupplierOrders {
                supplier: supplier.supplier_ref(),
                metrics: SupplierOrderMetrics {
                    total_orders,
                    total_value,
                    avg_order_value: avg_value(total_value, total_orders),
                    status_breakdown,
                },
            }
        })
        .collect();

    orders_by_supplier.sort_by(|a, b| b.metrics.total_value.cmp(&a.metrics.total_value));

    OrdersBySupplierData {
        total_suppliers: orders_by_supplier.len() as i64,
        orders_by_supplier,
    }
}

fn cycle_days(created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> i64 {
    let millis = (updated_at - created_at).num_milliseconds().max(0);
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Compute per-order cycle times in whole days, with aggregate min/max/avg
/// statistics and a per-status breakdown. An empty order set yields zero
/// statistics rather than non-finite values.
pub fn build_procurement_cycle(orders: &[OrderRow]) -> ProcurementCycleData {
    let cycle_data: Vec<CycleEntry> = orders
        .iter()
        .map(|order| CycleEntry {
            order_id: order.id,
            po_number: order.po_number.clone(),
            supplier_name: order.supplier_name.clone(),
            supplier_code: order.supplier_code.clone(),
            status: order.status.as_str().to_string(),
            cycle_time: cycle_days(order.created_at, order.updated_at),
            created_at: order.created_at,
            updated_at: order.updated_at,
        })
        .collect();

    let total_orders = cycle_data.len() as i64;
    let total_cycle: i64 = cycle_data.iter().map(|entry| entry.cycle_time).sum();

    let statistics = CycleStatistics {
        avg_cycle_time: if total_orders > 0 {
            round2(total_cycle as f64 / total_orders as f64)
        } else {
            0.0
        },
        min_cycle_time: cycle_data
            .iter()
            .map(|entry| entry.cycle_time)
            .min()
            .unwrap_or(0),
        max_cycle_time: cycle_data
            .iter()
            .map(|entry| entry.cycle_time)
            .max()
            .unwrap_or(0),
        total_orders,
    };

    let mut status_breakdown: BTreeMap<String, StatusCycleStats> = BTreeMap::new();
    for entry in &cycle_data {
        let stats = status_breakdown
            .entry(entry.status.clone())
            .or_insert(StatusCycleStats {
                count: 0,
                total_cycle_time: 0,
                avg_cycle_time: 0.0,
            });
        stats.count += 1;
        stats.total_cycle_time += entry.cycle_time;
    }
    for stats in status_breakdown.values_mut() {
        stats.avg_cycle_time = round2(stats.total_cycle_time as f64 / stats.count as f64);
    }

    ProcurementCycleData {
        cycle_data,
        statistics,
        status_breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn supplier(name: &str, on_time: f64, quality: f64, response: f64) -> SupplierRow {
        SupplierRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            code: format!("SUP-{}", name),
            category: Some("Raw Materials".to_string()),
            status: "active".to_string(),
            on_time_delivery_rate: on_time,
            quality_score: quality,
            responsiveness_score: response,
        }
    }

    fn order(
        supplier: &SupplierRow,
        items: Vec<(Decimal, Decimal)>,
        status: PurchaseOrderStatus,
        created: (i32, u32, u32),
        updated: (i32, u32, u32),
    ) -> OrderRow {
        OrderRow {
            id: Uuid::new_v4(),
            po_number: format!("PO-{}", Uuid::new_v4()),
            supplier_id: supplier.id,
            items: Json(
                items
                    .into_iter()
                    .map(|(quantity, unit_price)| PurchaseOrderItem {
                        material_name: "material".to_string(),
                        quantity,
                        unit_price,
                    })
                    .collect(),
            ),
            status,
            created_at: Utc
                .with_ymd_and_hms(created.0, created.1, created.2, 8, 0, 0)
                .unwrap(),
            updated_at: Utc
                .with_ymd_and_hms(updated.0, updated.1, updated.2, 8, 0, 0)
                .unwrap(),
            supplier_name: supplier.name.clone(),
            supplier_code: supplier.code.clone(),
            supplier_category: supplier.category.clone(),
            supplier_status: supplier.status.clone(),
        }
    }

    #[test]
    fn default_weights_score_example() {
        let suppliers = vec![supplier("A", 90.0, 80.0, 70.0)];
        let data = build_supplier_ranking(&suppliers, &[], RankingWeights::default());
        assert_eq!(data.rankings[0].metrics.weighted_score, 82.00);
        assert_eq!(data.rankings[0].metrics.total_spend, Decimal::ZERO);
        assert_eq!(data.rankings[0].metrics.avg_order_value, Decimal::ZERO);
    }

    #[test]
    fn ranking_is_sorted_non_increasing() {
        let suppliers = vec![
            supplier("A", 50.0, 50.0, 50.0),
            supplier("B", 95.0, 90.0, 85.0),
            supplier("C", 70.0, 75.0, 60.0),
        ];
        let data = build_supplier_ranking(&suppliers, &[], RankingWeights::default());
        let scores: Vec<f64> = data
            .rankings
            .iter()
            .map(|r| r.metrics.weighted_score)
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(data.rankings[0].supplier.name, "B");
    }

    #[test]
    fn on_time_only_weights_order_by_on_time_rate() {
        let suppliers = vec![
            supplier("A", 60.0, 99.0, 99.0),
            supplier("B", 90.0, 10.0, 10.0),
            supplier("C", 75.0, 50.0, 50.0),
        ];
        let weights = RankingWeights {
            w_on_time: 1.0,
            w_quality: 0.0,
            w_response: 0.0,
        };
        let data = build_supplier_ranking(&suppliers, &[], weights);
        let names: Vec<&str> = data
            .rankings
            .iter()
            .map(|r| r.supplier.name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn ranking_accumulates_spend_per_supplier() {
        let a = supplier("A", 90.0, 80.0, 70.0);
        let b = supplier("B", 50.0, 50.0, 50.0);
        let orders = vec![
            order(
                &a,
                vec![(dec!(2), dec!(50)), (dec!(1), dec!(25))],
                PurchaseOrderStatus::Approved,
                (2025, 1, 10),
                (2025, 1, 12),
            ),
            order(
                &a,
                vec![(dec!(1), dec!(75))],
                PurchaseOrderStatus::Delivered,
                (2025, 1, 15),
                (2025, 1, 20),
            ),
        ];
        let data =
            build_supplier_ranking(&[a.clone(), b], &orders, RankingWeights::default());
        let top = &data.rankings[0];
        assert_eq!(top.supplier.id, a.id);
        assert_eq!(top.metrics.total_spend, dec!(200));
        assert_eq!(top.metrics.order_count, 2);
        assert_eq!(top.metrics.avg_order_value, dec!(100));
    }

    #[test]
    fn trend_amounts_sum_to_total_spend() {
        let a = supplier("A", 90.0, 80.0, 70.0);
        let orders = vec![
            order(
                &a,
                vec![(dec!(3), dec!(10.50))],
                PurchaseOrderStatus::Approved,
                (2025, 1, 5),
                (2025, 1, 6),
            ),
            order(
                &a,
                vec![(dec!(1), dec!(99.99))],
                PurchaseOrderStatus::Delivered,
                (2025, 2, 14),
                (2025, 2, 20),
            ),
            order(
                &a,
                vec![(dec!(4), dec!(25))],
                PurchaseOrderStatus::Approved,
                (2025, 2, 28),
                (2025, 3, 2),
            ),
        ];
        let data = build_spending_analytics(&orders, GroupBy::Month);
        let trend_sum: Decimal = data.spending_trends.iter().map(|p| p.amount).sum();
        assert_eq!(trend_sum, data.summary.total_spend);
        assert_eq!(data.summary.total_orders, 3);
        // January and February buckets, in chronological order
        assert_eq!(data.spending_trends[0].period, "2025-01");
        assert_eq!(data.spending_trends[1].period, "2025-02");
    }

    #[test]
    fn yearly_grouping_collapses_periods() {
        let a = supplier("A", 90.0, 80.0, 70.0);
        let orders = vec![
            order(
                &a,
                vec![(dec!(1), dec!(100))],
                PurchaseOrderStatus::Approved,
                (2024, 12, 30),
                (2024, 12, 31),
            ),
            order(
                &a,
                vec![(dec!(1), dec!(50))],
                PurchaseOrderStatus::Approved,
                (2025, 1, 2),
                (2025, 1, 3),
            ),
        ];
        let data = build_spending_analytics(&orders, GroupBy::Year);
        assert_eq!(data.spending_trends.len(), 2);
        assert_eq!(data.spending_trends[0].period, "2024");
        assert_eq!(data.spending_trends[1].period, "2025");
    }

    #[test]
    fn empty_range_yields_zero_averages() {
        let data = build_spending_analytics(&[], GroupBy::Month);
        assert_eq!(data.summary.total_spend, Decimal::ZERO);
        assert_eq!(data.summary.total_orders, 0);
        assert_eq!(data.summary.avg_order_value, Decimal::ZERO);
        assert!(data.spending_trends.is_empty());
    }

    #[test]
    fn missing_category_falls_back_to_uncategorized() {
        let mut a = supplier("A", 90.0, 80.0, 70.0);
        a.category = None;
        let orders = vec![order(
            &a,
            vec![(dec!(1), dec!(40))],
            PurchaseOrderStatus::Approved,
            (2025, 1, 5),
            (2025, 1, 6),
        )];
        let data = build_spending_analytics(&orders, GroupBy::Month);
        assert_eq!(data.category_breakdown.len(), 1);
        assert_eq!(data.category_breakdown[0].category, "Uncategorized");
        assert_eq!(data.category_breakdown[0].amount, dec!(40));
    }

    #[test]
    fn orders_by_supplier_builds_status_histogram() {
        let a = supplier("A", 90.0, 80.0, 70.0);
        let b = supplier("B", 50.0, 50.0, 50.0);
        let orders = vec![
            order(
                &a,
                vec![(dec!(1), dec!(100))],
                PurchaseOrderStatus::Pending,
                (2025, 1, 1),
                (2025, 1, 1),
            ),
            order(
                &a,
                vec![(dec!(1), dec!(200))],
                PurchaseOrderStatus::Delivered,
                (2025, 1, 2),
                (2025, 1, 9),
            ),
            order(
                &a,
                vec![(dec!(1), dec!(300))],
                PurchaseOrderStatus::Delivered,
                (2025, 1, 3),
                (2025, 1, 10),
            ),
        ];
        let data = build_orders_by_supplier(&[a.clone(), b.clone()], &orders);
        assert_eq!(data.total_suppliers, 2);

        let first = &data.orders_by_supplier[0];
        assert_eq!(first.supplier.id, a.id);
        assert_eq!(first.metrics.total_orders, 3);
        assert_eq!(first.metrics.total_value, dec!(600));
        assert_eq!(first.metrics.avg_order_value, dec!(200));
        assert_eq!(first.metrics.status_breakdown["Pending"], 1);
        assert_eq!(first.metrics.status_breakdown["Delivered"], 2);

        // B has no orders but still appears, with zero metrics
        let second = &data.orders_by_supplier[1];
        assert_eq!(second.supplier.id, b.id);
        assert_eq!(second.metrics.total_orders, 0);
        assert_eq!(second.metrics.total_value, Decimal::ZERO);
        assert!(second.metrics.status_breakdown.is_empty());
    }

    #[test]
    fn orders_by_supplier_is_deterministic() {
        let a = supplier("A", 90.0, 80.0, 70.0);
        let b = supplier("B", 50.0, 50.0, 50.0);
        let orders = vec![
            order(
                &a,
                vec![(dec!(2), dec!(50))],
                PurchaseOrderStatus::Approved,
                (2025, 1, 1),
                (2025, 1, 2),
            ),
            order(
                &b,
                vec![(dec!(1), dec!(30))],
                PurchaseOrderStatus::Pending,
                (2025, 1, 3),
                (2025, 1, 3),
            ),
        ];
        let suppliers = vec![a, b];
        let first = build_orders_by_supplier(&suppliers, &orders);
        let second = build_orders_by_supplier(&suppliers, &orders);
        for (x, y) in first
            .orders_by_supplier
            .iter()
            .zip(second.orders_by_supplier.iter())
        {
            assert_eq!(x.metrics, y.metrics);
        }
    }

    #[test]
    fn cycle_time_rounds_up_to_whole_days() {
        let a = supplier("A", 90.0, 80.0, 70.0);
        let mut po = order(
            &a,
            vec![(dec!(1), dec!(10))],
            PurchaseOrderStatus::Delivered,
            (2025, 1, 1),
            (2025, 1, 1),
        );
        // 36 hours elapsed rounds up to 2 days
        po.updated_at = po.created_at + chrono::Duration::hours(36);
        let data = build_procurement_cycle(&[po]);
        assert_eq!(data.cycle_data[0].cycle_time, 2);
        assert_eq!(data.statistics.min_cycle_time, 2);
        assert_eq!(data.statistics.max_cycle_time, 2);
        assert_eq!(data.statistics.avg_cycle_time, 2.0);
    }

    #[test]
    fn untouched_order_has_zero_cycle_time() {
        let a = supplier("A", 90.0, 80.0, 70.0);
        let po = order(
            &a,
            vec![(dec!(1), dec!(10))],
            PurchaseOrderStatus::Pending,
            (2025, 1, 1),
            (2025, 1, 1),
        );
        let data = build_procurement_cycle(&[po]);
        assert_eq!(data.cycle_data[0].cycle_time, 0);
    }

    #[test]
    fn empty_cycle_statistics_use_zero_sentinels() {
        let data = build_procurement_cycle(&[]);
        assert_eq!(data.statistics.avg_cycle_time, 0.0);
        assert_eq!(data.statistics.min_cycle_time, 0);
        assert_eq!(data.statistics.max_cycle_time, 0);
        assert_eq!(data.statistics.total_orders, 0);
        assert!(data.status_breakdown.is_empty());
    }

    #[test]
    fn cycle_breakdown_groups_by_status() {
        let a = supplier("A", 90.0, 80.0, 70.0);
        let orders = vec![
            order(
                &a,
                vec![(dec!(1), dec!(10))],
                PurchaseOrderStatus::Delivered,
                (2025, 1, 1),
                (2025, 1, 3),
            ),
            order(
                &a,
                vec![(dec!(1), dec!(10))],
                PurchaseOrderStatus::Delivered,
                (2025, 1, 1),
                (2025, 1, 5),
            ),
            order(
                &a,
                vec![(dec!(1), dec!(10))],
                PurchaseOrderStatus::Pending,
                (2025, 1, 1),
                (2025, 1, 1),
            ),
        ];
        let data = build_procurement_cycle(&orders);
        let delivered = &data.status_breakdown["Delivered"];
        assert_eq!(delivered.count, 2);
        assert_eq!(delivered.total_cycle_time, 6);
        assert_eq!(delivered.avg_cycle_time, 3.0);
        assert_eq!(data.status_breakdown["Pending"].count, 1);
    }

    #[test]
    fn out_of_range_weights_are_clamped() {
        let suppliers = vec![supplier("A", 100.0, 100.0, 100.0)];
        let weights = RankingWeights {
            w_on_time: 5.0,
            w_quality: -1.0,
            w_response: 0.5,
        };
        let data = build_supplier_ranking(&suppliers, &[], weights);
        // 100*1.0 + 100*0.0 + 100*0.5
        assert_eq!(data.rankings[0].metrics.weighted_score, 150.0);
        assert_eq!(data.weights.w_on_time, 1.0);
        assert_eq!(data.weights.w_quality, 0.0);
    }
}
