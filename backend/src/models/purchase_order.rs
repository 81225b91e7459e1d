//! Purchase order line items and lifecycle status

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Purchase order lifecycle. Progression is one-way:
/// Pending -> Approved -> Delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "po_status")]
pub enum PurchaseOrderStatus {
    Pending,
    Approved,
    Delivered,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "Pending",
            PurchaseOrderStatus::Approved => "Approved",
            PurchaseOrderStatus::Delivered => "Delivered",
        }
    }

    /// Rank within the lifecycle, used to reject backward transitions.
    fn rank(&self) -> u8 {
        match self {
            PurchaseOrderStatus::Pending => 0,
            PurchaseOrderStatus::Approved => 1,
            PurchaseOrderStatus::Delivered => 2,
        }
    }

    pub fn can_transition_to(&self, next: PurchaseOrderStatus) -> bool {
        next.rank() >= self.rank()
    }
}

/// One ordered line on a purchase order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderItem {
    pub material_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl PurchaseOrderItem {
    pub fn subtotal(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Total amount of an order: the sum of item subtotals. The stored
/// `total_amount` is always recomputed from this, never taken from input.
pub fn order_total(items: &[PurchaseOrderItem]) -> Decimal {
    items.iter().map(PurchaseOrderItem::subtotal).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: Decimal, unit_price: Decimal) -> PurchaseOrderItem {
        PurchaseOrderItem {
            material_name: "raw material".to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn total_is_sum_of_subtotals() {
        let items = vec![item(dec!(2), dec!(50)), item(dec!(1), dec!(25))];
        assert_eq!(order_total(&items), dec!(125));
    }

    #[test]
    fn empty_order_totals_zero() {
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn status_progression_is_one_way() {
        use PurchaseOrderStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Delivered));
        assert!(Pending.can_transition_to(Delivered));
        assert!(!Delivered.can_transition_to(Pending));
        assert!(!Approved.can_transition_to(Pending));
        // updating without changing status is allowed
        assert!(Approved.can_transition_to(Approved));
    }
}
