//! # Stock Movement Rules
//!
//! The single source of truth for which way stock moves when an order is
//! created and when it is returned.
//!
//! ## Why One Lookup?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order creation and return processing must mirror each other exactly:  │
//! │                                                                         │
//! │  create SALE qty 3        stock -3   ┐                                 │
//! │  return that SALE         stock +3   ┘  nets to ZERO                   │
//! │                                                                         │
//! │  create PURCHASE qty 5    stock +5   ┐                                 │
//! │  return that PURCHASE     stock -5   ┘  nets to ZERO                   │
//! │                                                                         │
//! │  Encoding the sign in two separate conditionals lets the paths drift   │
//! │  apart silently. Both paths call into THIS module instead.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Note the subtlety: the sign depends on the order/return *type*, not on
//! the arithmetic sign of any quantity. A PURCHASE_RETURN order removes
//! stock that was never kept, even though it is "a return".

use crate::types::OrderType;

// =============================================================================
// Stock Direction
// =============================================================================

/// Which way stock moves for a given order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDirection {
    /// Stock leaves the warehouse (quantity decrements).
    Outbound,
    /// Stock arrives in the warehouse (quantity increments).
    Inbound,
}

impl StockDirection {
    /// Signed stock delta for a (positive) line quantity.
    #[inline]
    pub const fn delta(&self, quantity: i64) -> i64 {
        match self {
            StockDirection::Outbound => -quantity,
            StockDirection::Inbound => quantity,
        }
    }

    /// The opposite direction - what a return applies.
    #[inline]
    pub const fn reversed(&self) -> Self {
        match self {
            StockDirection::Outbound => StockDirection::Inbound,
            StockDirection::Inbound => StockDirection::Outbound,
        }
    }
}

impl OrderType {
    /// Stock direction applied when an order of this type is created.
    ///
    /// | Order type       | Creation | Return (reversed) |
    /// |------------------|----------|-------------------|
    /// | Sale             | Outbound | Inbound           |
    /// | Purchase         | Inbound  | Outbound          |
    /// | SaleReturn       | Inbound  | Outbound          |
    /// | PurchaseReturn   | Outbound | Inbound           |
    pub const fn stock_direction(&self) -> StockDirection {
        match self {
            OrderType::Sale | OrderType::PurchaseReturn => StockDirection::Outbound,
            OrderType::Purchase | OrderType::SaleReturn => StockDirection::Inbound,
        }
    }

    /// Stock direction applied when an order of this type is returned.
    #[inline]
    pub const fn return_stock_direction(&self) -> StockDirection {
        self.stock_direction().reversed()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_directions() {
        assert_eq!(OrderType::Sale.stock_direction(), StockDirection::Outbound);
        assert_eq!(
            OrderType::Purchase.stock_direction(),
            StockDirection::Inbound
        );
        assert_eq!(
            OrderType::SaleReturn.stock_direction(),
            StockDirection::Inbound
        );
        assert_eq!(
            OrderType::PurchaseReturn.stock_direction(),
            StockDirection::Outbound
        );
    }

    #[test]
    fn test_deltas() {
        assert_eq!(StockDirection::Outbound.delta(3), -3);
        assert_eq!(StockDirection::Inbound.delta(3), 3);
    }

    /// The invariant the whole module exists for: creating an order and
    /// returning it must net to zero stock change, for every order type.
    #[test]
    fn test_create_then_return_nets_to_zero() {
        for order_type in [
            OrderType::Sale,
            OrderType::Purchase,
            OrderType::SaleReturn,
            OrderType::PurchaseReturn,
        ] {
            let qty = 7;
            let on_create = order_type.stock_direction().delta(qty);
            let on_return = order_type.return_stock_direction().delta(qty);
            assert_eq!(
                on_create + on_return,
                0,
                "create+return must cancel for {:?}",
                order_type
            );
        }
    }
}
