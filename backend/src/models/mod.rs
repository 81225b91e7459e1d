//! Domain types shared across services and handlers

pub mod purchase_order;
pub mod report;

pub use purchase_order::{order_total, PurchaseOrderItem, PurchaseOrderStatus};
pub use report::{GroupBy, RankingWeights, ReportRange, ReportStatus, ReportType};

use serde::Deserialize;

/// Common pagination query parameters.
///
/// `limit` is capped so a single request cannot page through an entire
/// collection.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    /// Resolve the raw parameters against a default and maximum page size.
    pub fn resolve(&self, default_limit: u32, max_limit: u32) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, max_limit);
        (page, limit)
    }

    /// Row offset for the resolved page.
    pub fn offset(page: u32, limit: u32) -> i64 {
        i64::from(page.saturating_sub(1)) * i64::from(limit)
    }
}

/// Total page count for a collection of `total` rows.
pub fn page_count(total: i64, limit: u32) -> i64 {
    if total == 0 {
        0
    } else {
        (total + i64::from(limit) - 1) / i64::from(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_capped() {
        let params = PageParams {
            page: Some(3),
            limit: Some(500),
        };
        let (page, limit) = params.resolve(10, 100);
        assert_eq!(page, 3);
        assert_eq!(limit, 100);
        assert_eq!(PageParams::offset(page, limit), 200);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
    }
}
