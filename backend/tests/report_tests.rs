//! Procurement report math tests
//!
//! Property-based and unit tests for the analytics that back the four
//! procurement reports: supplier ranking scores, spending aggregation
//! and cycle time calculation.

use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

const DAY_MS: i64 = 86_400_000;

/// Weighted ranking score as the ranking report computes it, with each
/// weight clamped to [0, 1] and the result rounded to two decimals.
fn ranking_score(on_time: f64, quality: f64, responsiveness: f64, weights: (f64, f64, f64)) -> f64 {
    let clamp = |w: f64| w.clamp(0.0, 1.0);
    let raw = on_time * clamp(weights.0) + quality * clamp(weights.1) + responsiveness * clamp(weights.2);
    (raw * 100.0).round() / 100.0
}

/// Cycle time in whole days, rounding any started day up. Negative spans
/// (clock skew between created and delivered timestamps) collapse to zero.
fn cycle_days(ms: i64) -> i64 {
    let ms = ms.max(0);
    (ms + DAY_MS - 1) / DAY_MS
}

fn kpi_strategy() -> impl Strategy<Value = f64> {
    (0u32..=10_000).prop_map(|v| f64::from(v) / 100.0)
}

fn weight_strategy() -> impl Strategy<Value = f64> {
    (-50i32..=150).prop_map(|v| f64::from(v) / 100.0)
}

// =============================================================================
// Supplier ranking score
// =============================================================================

mod ranking_scores {
    use super::*;

    #[test]
    fn default_weights_reference_score() {
        // 90 on-time, 80 quality, 70 responsiveness with 0.4/0.4/0.2
        let score = ranking_score(90.0, 80.0, 70.0, (0.4, 0.4, 0.2));
        assert_eq!(score, 82.00);
    }

    #[test]
    fn zero_metrics_score_zero() {
        assert_eq!(ranking_score(0.0, 0.0, 0.0, (0.4, 0.4, 0.2)), 0.0);
    }

    #[test]
    fn single_weight_isolates_metric() {
        // Weight (1, 0, 0) ranks purely by on-time delivery
        assert_eq!(ranking_score(87.5, 10.0, 99.0, (1.0, 0.0, 0.0)), 87.5);
    }

    #[test]
    fn out_of_range_weights_are_clamped() {
        // 1.5 clamps to 1.0, -0.3 clamps to 0.0
        let clamped = ranking_score(80.0, 60.0, 40.0, (1.5, -0.3, 0.0));
        let expected = ranking_score(80.0, 60.0, 40.0, (1.0, 0.0, 0.0));
        assert_eq!(clamped, expected);
    }

    proptest! {
        #[test]
        fn score_bounded_by_max_metric(
            on_time in kpi_strategy(),
            quality in kpi_strategy(),
            responsiveness in kpi_strategy(),
            w1 in weight_strategy(),
            w2 in weight_strategy(),
            w3 in weight_strategy(),
        ) {
            let score = ranking_score(on_time, quality, responsiveness, (w1, w2, w3));
            let max_metric = on_time.max(quality).max(responsiveness);

            // Three clamped weights can each contribute at most the metric itself
            prop_assert!(score >= 0.0);
            prop_assert!(score <= 3.0 * max_metric + 0.01);
        }

        #[test]
        fn score_is_deterministic(
            on_time in kpi_strategy(),
            quality in kpi_strategy(),
            responsiveness in kpi_strategy(),
        ) {
            let a = ranking_score(on_time, quality, responsiveness, (0.4, 0.4, 0.2));
            let b = ranking_score(on_time, quality, responsiveness, (0.4, 0.4, 0.2));
            prop_assert_eq!(a, b);
        }

        #[test]
        fn score_monotone_in_quality(
            quality_low in kpi_strategy(),
            bump in 1u32..=1000,
        ) {
            let quality_high = quality_low + f64::from(bump) / 100.0;
            let low = ranking_score(50.0, quality_low, 50.0, (0.4, 0.4, 0.2));
            let high = ranking_score(50.0, quality_high, 50.0, (0.4, 0.4, 0.2));
            prop_assert!(high >= low);
        }
    }
}

// =============================================================================
// Cycle time (days between order creation and delivery)
// =============================================================================

mod cycle_time {
    use super::*;

    #[test]
    fn same_instant_is_zero_days() {
        assert_eq!(cycle_days(0), 0);
    }

    #[test]
    fn thirty_six_hours_round_up_to_two_days() {
        assert_eq!(cycle_days(36 * 3_600_000), 2);
    }

    #[test]
    fn exact_day_is_one_day() {
        assert_eq!(cycle_days(DAY_MS), 1);
    }

    #[test]
    fn one_millisecond_is_one_day() {
        assert_eq!(cycle_days(1), 1);
    }

    #[test]
    fn negative_span_clamps_to_zero() {
        assert_eq!(cycle_days(-5 * DAY_MS), 0);
    }

    proptest! {
        #[test]
        fn never_negative(ms in i64::MIN / 2..i64::MAX / 2) {
            prop_assert!(cycle_days(ms) >= 0);
        }

        #[test]
        fn rounds_up_within_one_day(ms in 0i64..365 * DAY_MS) {
            let days = cycle_days(ms);
            prop_assert!(days * DAY_MS >= ms);
            prop_assert!((days - 1) * DAY_MS < ms || ms == 0);
        }
    }
}

// =============================================================================
// Spending trend period keys
// =============================================================================

mod trend_periods {
    use super::*;

    #[test]
    fn monthly_key_is_year_dash_month() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        assert_eq!(at.format("%Y-%m").to_string(), "2024-03");
    }

    #[test]
    fn yearly_key_is_year() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        assert_eq!(at.format("%Y").to_string(), "2024");
    }

    #[test]
    fn monthly_keys_sort_chronologically_as_strings() {
        let mut keys = vec!["2024-11", "2024-02", "2023-12", "2024-10"];
        keys.sort();
        assert_eq!(keys, vec!["2023-12", "2024-02", "2024-10", "2024-11"]);
    }

    proptest! {
        #[test]
        fn iso_month_keys_preserve_order(
            y1 in 2000i32..2100, m1 in 1u32..=12,
            y2 in 2000i32..2100, m2 in 1u32..=12,
        ) {
            let d1 = NaiveDate::from_ymd_opt(y1, m1, 1).unwrap();
            let d2 = NaiveDate::from_ymd_opt(y2, m2, 1).unwrap();
            let k1 = d1.format("%Y-%m").to_string();
            let k2 = d2.format("%Y-%m").to_string();

            prop_assert_eq!(d1 <= d2, k1 <= k2);
        }
    }
}

// =============================================================================
// Spend accumulation
// =============================================================================

mod spend_totals {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn grouped_spend_sums_to_total() {
        // Bucketing orders by supplier never loses or duplicates spend
        let orders = [
            ("sup-a", dec("120.50")),
            ("sup-b", dec("99.99")),
            ("sup-a", dec("10.01")),
            ("sup-c", dec("0.00")),
        ];

        let total: Decimal = orders.iter().map(|(_, amount)| *amount).sum();

        let mut by_supplier = std::collections::BTreeMap::new();
        for (supplier, amount) in &orders {
            *by_supplier.entry(*supplier).or_insert(Decimal::ZERO) += *amount;
        }
        let grouped: Decimal = by_supplier.values().copied().sum();

        assert_eq!(total, grouped);
        assert_eq!(grouped, dec("230.50"));
    }

    proptest! {
        #[test]
        fn average_times_count_recovers_total(amounts in prop::collection::vec(0u64..1_000_000, 1..50)) {
            let total: Decimal = amounts.iter().map(|&a| Decimal::from(a)).sum();
            let count = Decimal::from(amounts.len() as u64);
            let average = total / count;

            // round_dp(2) loses at most half a cent per order
            let reconstructed = average * count;
            let diff = (reconstructed - total).abs();
            prop_assert!(diff < Decimal::ONE);
        }
    }
}
