//! # Sale Totals
//!
//! Pure recompute math for the sale aggregate.
//!
//! ## Recompute, Never Increment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sale Aggregate Consistency                           │
//! │                                                                         │
//! │  Sell-mode scans may land concurrently for different tags, and a       │
//! │  failed scan may leave a partially applied event behind. Incremental   │
//! │  counters drift under both. So after EVERY line mutation the caller    │
//! │  reloads ALL lines and derives the totals from scratch:                │
//! │                                                                         │
//! │    subtotal = Σ line.line_total                                         │
//! │    total_qty = Σ line.quantity                                          │
//! │    total    = subtotal - discount                                       │
//! │                                                                         │
//! │  The invariants hold after each event regardless of ordering.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::SaleLine;

/// Derived totals for a sale, computed from the full set of its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub total_qty: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
}

impl SaleTotals {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Recomputes sale totals from the current set of lines.
///
/// ## Contract
/// Must be called after every sale-line mutation, with the *full* current
/// line set (not a delta). `discount_cents` is the sale's stored discount.
pub fn recompute(lines: &[SaleLine], discount_cents: i64) -> SaleTotals {
    let subtotal: i64 = lines.iter().map(|l| l.line_total_cents).sum();
    let total_qty: i64 = lines.iter().map(|l| l.quantity).sum();

    SaleTotals {
        total_qty,
        subtotal_cents: subtotal,
        discount_cents,
        total_cents: subtotal - discount_cents,
    }
}

/// Validates a discount before it is applied to a sale.
///
/// Negative discounts are rejected; a discount larger than the subtotal is
/// allowed (the total simply goes negative, surfaced to the operator).
pub fn validate_discount(discount_cents: i64) -> CoreResult<()> {
    if discount_cents < 0 {
        return Err(CoreError::InvalidDiscount {
            discount_cents,
        });
    }
    Ok(())
}

/// Computes a line total from a frozen unit price and quantity.
#[inline]
pub fn line_total(unit_price_cents: i64, quantity: i64) -> i64 {
    Money::from_cents(unit_price_cents)
        .multiply_quantity(quantity)
        .cents()
}

// =============================================================================
// Unit Tests
// =============================================================================
