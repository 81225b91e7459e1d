//! Inventory status derivation tests
//!
//! The stock status shown in the inventory module is derived, never
//! stored directly by clients. These tests pin the derivation rules and
//! their priority order.

use chrono::NaiveDate;
use proptest::prelude::*;

/// Mirror of the status derivation used when items are created or their
/// stock changes. Expiry wins over stock level, empty wins over low.
fn derive_status(stock: i32, min_stock: i32, expiry: Option<NaiveDate>, today: NaiveDate) -> &'static str {
    if expiry.is_some_and(|d| d < today) {
        "expired"
    } else if stock == 0 {
        "out-of-stock"
    } else if stock <= min_stock {
        "low-stock"
    } else {
        "in-stock"
    }
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod status_priority {
    use super::*;

    #[test]
    fn expired_beats_everything() {
        let today = day(2024, 6, 1);
        let past = Some(day(2024, 5, 31));

        assert_eq!(derive_status(0, 10, past, today), "expired");
        assert_eq!(derive_status(5, 10, past, today), "expired");
        assert_eq!(derive_status(100, 10, past, today), "expired");
    }

    #[test]
    fn expiry_today_is_not_expired() {
        let today = day(2024, 6, 1);
        assert_eq!(derive_status(100, 10, Some(today), today), "in-stock");
    }

    #[test]
    fn zero_stock_beats_low_stock() {
        let today = day(2024, 6, 1);
        assert_eq!(derive_status(0, 10, None, today), "out-of-stock");
    }

    #[test]
    fn at_threshold_is_low_stock() {
        let today = day(2024, 6, 1);
        assert_eq!(derive_status(10, 10, None, today), "low-stock");
        assert_eq!(derive_status(1, 10, None, today), "low-stock");
    }

    #[test]
    fn above_threshold_is_in_stock() {
        let today = day(2024, 6, 1);
        assert_eq!(derive_status(11, 10, None, today), "in-stock");
    }

    proptest! {
        #[test]
        fn always_one_of_four_statuses(
            stock in 0i32..10_000,
            min_stock in 0i32..1_000,
            offset in -365i64..365,
        ) {
            let today = day(2024, 6, 1);
            let expiry = today.checked_add_signed(chrono::Duration::days(offset));
            let status = derive_status(stock, min_stock, expiry, today);
            prop_assert!(matches!(status, "expired" | "out-of-stock" | "low-stock" | "in-stock"));
        }

        #[test]
        fn future_expiry_never_expired(
            stock in 1i32..10_000,
            days_ahead in 0i64..365,
        ) {
            let today = day(2024, 6, 1);
            let expiry = today.checked_add_signed(chrono::Duration::days(days_ahead));
            prop_assert_ne!(derive_status(stock, 0, expiry, today), "expired");
        }
    }
}

mod purchase_order_lifecycle {
    /// Status ordering used by the transition guard: Pending < Approved < Delivered.
    fn rank(status: &str) -> Option<u8> {
        match status {
            "Pending" => Some(0),
            "Approved" => Some(1),
            "Delivered" => Some(2),
            _ => None,
        }
    }

    fn can_transition(from: &str, to: &str) -> bool {
        match (rank(from), rank(to)) {
            (Some(a), Some(b)) => b >= a,
            _ => false,
        }
    }

    #[test]
    fn forward_transitions_allowed() {
        assert!(can_transition("Pending", "Approved"));
        assert!(can_transition("Pending", "Delivered"));
        assert!(can_transition("Approved", "Delivered"));
    }

    #[test]
    fn self_transitions_allowed() {
        for s in ["Pending", "Approved", "Delivered"] {
            assert!(can_transition(s, s));
        }
    }

    #[test]
    fn backward_transitions_rejected() {
        assert!(!can_transition("Approved", "Pending"));
        assert!(!can_transition("Delivered", "Approved"));
        assert!(!can_transition("Delivered", "Pending"));
    }
}
