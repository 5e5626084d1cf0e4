//! # Pricing
//!
//! Promo codes and the checkout price breakdown.
//!
//! ## Summary Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Price Summary                                    │
//! │                                                                         │
//! │   subtotal  = Σ quantity_i × price_i   (unknown prices contribute 0)   │
//! │   discount  = apply_promo(code, subtotal).discount                     │
//! │   total     = subtotal - discount + delivery_fee                       │
//! │                                                                         │
//! │   Example: [{20.00 × 2}, {5.00 × 3}], no promo, fee 5.99               │
//! │            subtotal 55.00  →  total 60.99                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is cached. Callers recompute the summary after every change
//! to items, prices or discount.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CartItem, Product};

// =============================================================================
// Promo Codes
// =============================================================================

/// Recognized promo codes (lowercase) and their discount in basis points.
pub const PROMO_CODES: &[(&str, u32)] = &[("save10", 1000)];

/// Result of checking a promo code against a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PromoOutcome {
    pub discount: Money,
    pub accepted: bool,
}

impl PromoOutcome {
    pub const fn rejected() -> Self {
        PromoOutcome {
            discount: Money::zero(),
            accepted: false,
        }
    }
}

/// Looks up a promo code, ignoring case.
///
/// Unrecognized codes yield a zero discount with `accepted = false`.
///
/// ## Example
/// ```rust
/// use storefront_core::{pricing::apply_promo, Money};
///
/// let hundred = Money::from_cents(10_000);
/// assert_eq!(apply_promo("save10", hundred).discount.cents(), 1_000);
/// assert!(!apply_promo("bogus", hundred).accepted);
/// ```
pub fn apply_promo(code: &str, subtotal: Money) -> PromoOutcome {
    let code = code.to_lowercase();

    PROMO_CODES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, bps)| PromoOutcome {
            discount: subtotal.percentage(*bps),
            accepted: true,
        })
        .unwrap_or_else(PromoOutcome::rejected)
}

/// An accepted promo code and the discount it produced.
///
/// Derived from `(code, subtotal)` and never persisted. Call
/// [`PromoState::refresh`] when the subtotal moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PromoState {
    pub code: String,
    pub discount_amount: Money,
}

impl PromoState {
    /// Returns the state for `code`, or `None` if the code is not recognized.
    pub fn evaluate(code: &str, subtotal: Money) -> Option<Self> {
        let outcome = apply_promo(code, subtotal);
        outcome.accepted.then(|| PromoState {
            code: code.to_string(),
            discount_amount: outcome.discount,
        })
    }

    /// Recomputes the discount against a new subtotal.
    pub fn refresh(&mut self, subtotal: Money) {
        self.discount_amount = apply_promo(&self.code, subtotal).discount;
    }
}

// =============================================================================
// Price Summary
// =============================================================================

/// The checkout breakdown shown under the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub subtotal: Money,
    pub discount: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

/// Resolves the unit price for a line: the price index first, then the
/// joined product snapshot.
fn unit_price(item: &CartItem, prices: &HashMap<String, Money>) -> Option<Money> {
    prices
        .get(item.product_id())
        .copied()
        .or_else(|| item.product().map(Product::price))
}

/// Sums `quantity × price` over lines with a known price.
pub fn subtotal(items: &[CartItem], prices: &HashMap<String, Money>) -> Money {
    items
        .iter()
        .filter_map(|item| unit_price(item, prices).map(|price| price * item.quantity()))
        .sum()
}

/// Builds the price breakdown.
///
/// Lines whose product price is unknown contribute zero. The total is not
/// clamped; a discount larger than the subtotal lowers it below the fee.
pub fn compute_summary(
    items: &[CartItem],
    prices: &HashMap<String, Money>,
    discount: Money,
    delivery_fee: Money,
) -> PriceSummary {
    let subtotal = subtotal(items, prices);

    PriceSummary {
        subtotal,
        discount,
        delivery_fee,
        total: subtotal - discount + delivery_fee,
    }
}

/// Builds a `product_id → price` index from product listings.
pub fn price_index<'a>(products: impl IntoIterator<Item = &'a Product>) -> HashMap<String, Money> {
    products
        .into_iter()
        .map(|product| (product.id().to_string(), product.price()))
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, product_id: &str, qty: i64) -> CartItem {
        CartItem::new(id, product_id, "u1", qty).unwrap()
    }

    fn prices(entries: &[(&str, i64)]) -> HashMap<String, Money> {
        entries
            .iter()
            .map(|(id, cents)| (id.to_string(), Money::from_cents(*cents)))
            .collect()
    }

    #[test]
    fn test_summary_scenario() {
        let items = vec![line("c1", "p1", 2), line("c2", "p2", 3)];
        let prices = prices(&[("p1", 2000), ("p2", 500)]);

        let summary = compute_summary(&items, &prices, Money::zero(), Money::from_cents(599));

        assert_eq!(summary.subtotal.cents(), 5500);
        assert_eq!(summary.discount, Money::zero());
        assert_eq!(summary.total.cents(), 6099);
    }

    #[test]
    fn test_total_identity_holds() {
        let items = vec![line("c1", "p1", 4), line("c2", "p2", 1), line("c3", "p3", 7)];
        let prices = prices(&[("p1", 1234), ("p2", 99_999), ("p3", 1)]);

        for discount in [0, 1, 550, 20_000] {
            let discount = Money::from_cents(discount);
            let summary = compute_summary(&items, &prices, discount, Money::from_cents(599));
            assert_eq!(
                summary.total,
                summary.subtotal - summary.discount + summary.delivery_fee
            );
            assert!(!summary.subtotal.is_negative());
        }
    }

    #[test]
    fn test_unknown_prices_contribute_zero() {
        let items = vec![line("c1", "p1", 2), line("c2", "missing", 10)];
        let prices = prices(&[("p1", 2000)]);

        assert_eq!(subtotal(&items, &prices).cents(), 4000);
    }

    #[test]
    fn test_price_index_overrides_snapshot() {
        let snapshot = Product::new("p1", "Mouse", Money::from_cents(1000)).unwrap();
        let items = vec![line("c1", "p1", 2).with_product(snapshot)];

        assert_eq!(subtotal(&items, &HashMap::new()).cents(), 2000);
        assert_eq!(subtotal(&items, &prices(&[("p1", 1500)])).cents(), 3000);
    }

    #[test]
    fn test_empty_cart_is_fee_only() {
        let summary = compute_summary(&[], &HashMap::new(), Money::zero(), Money::from_cents(599));
        assert_eq!(summary.subtotal, Money::zero());
        assert_eq!(summary.total.cents(), 599);
    }

    #[test]
    fn test_apply_promo() {
        let hundred = Money::from_cents(10_000);

        let outcome = apply_promo("SAVE10", hundred);
        assert!(outcome.accepted);
        assert_eq!(outcome.discount.cents(), 1000);

        let outcome = apply_promo("bogus", hundred);
        assert!(!outcome.accepted);
        assert_eq!(outcome.discount, Money::zero());
    }

    #[test]
    fn test_apply_promo_is_case_insensitive_but_not_trimmed() {
        let subtotal = Money::from_cents(5500);
        assert!(apply_promo("save10", subtotal).accepted);
        assert!(apply_promo("SaVe10", subtotal).accepted);
        assert!(!apply_promo(" save10", subtotal).accepted);
        assert!(!apply_promo("", subtotal).accepted);
    }

    #[test]
    fn test_promo_state_refresh() {
        let mut promo = PromoState::evaluate("Save10", Money::from_cents(5500)).unwrap();
        assert_eq!(promo.discount_amount.cents(), 550);

        promo.refresh(Money::from_cents(2000));
        assert_eq!(promo.discount_amount.cents(), 200);

        assert!(PromoState::evaluate("nope", Money::from_cents(5500)).is_none());
    }

    #[test]
    fn test_price_index() {
        let products = vec![
            Product::new("p1", "Mouse", Money::from_cents(2999)).unwrap(),
            Product::new("p2", "Pad", Money::from_cents(999)).unwrap(),
        ];

        let index = price_index(&products);
        assert_eq!(index.len(), 2);
        assert_eq!(index["p2"].cents(), 999);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = compute_summary(
            &[],
            &HashMap::new(),
            Money::zero(),
            Money::from_cents(599),
        );
        let value = serde_json::to_value(summary).unwrap();

        assert_eq!(value["deliveryFee"], 599);
        assert_eq!(value["total"], 599);
        assert!(value.get("delivery_fee").is_none());
    }

    #[test]
    fn test_summary_of_oversized_cart_saturates() {
        use crate::validation::MAX_QUANTITY;

        assert!(CartItem::new("c1", "p1", "u1", i64::MAX / 2).is_err());

        let items = vec![
            CartItem::new("c1", "p1", "u1", MAX_QUANTITY).unwrap(),
            CartItem::new("c2", "p2", "u1", MAX_QUANTITY).unwrap(),
        ];
        let prices = HashMap::from([
            ("p1".to_string(), Money::from_cents(i64::MAX / 2)),
            ("p2".to_string(), Money::from_cents(i64::MAX / 2)),
        ]);

        let summary = compute_summary(&items, &prices, Money::zero(), Money::from_cents(599));
        assert_eq!(summary.subtotal, Money::from_cents(i64::MAX));
        assert_eq!(summary.total, Money::from_cents(i64::MAX));
        assert!(!summary.subtotal.is_negative());
    }
}
