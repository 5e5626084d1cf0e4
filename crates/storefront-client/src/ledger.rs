//! # Cart Ledger
//!
//! Owns the shopper's cart lines and derives the checkout breakdown.
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Ledger Operations                             │
//! │                                                                         │
//! │  Screen Action          Ledger Call            Store Call               │
//! │  ─────────────          ───────────            ──────────               │
//! │                                                                         │
//! │  Open cart ───────────► load(user) ──────────► select by user_id       │
//! │                                                                         │
//! │  Add to cart ─────────► add_item() ──────────► find (user, product)    │
//! │                                                ├─ found: update qty+n   │
//! │                                                └─ none:  insert qty=n   │
//! │                                                                         │
//! │  [-] / [+] ───────────► set_quantity() ──────► update by id            │
//! │                         (n < 1: no-op)                                  │
//! │                                                                         │
//! │  Remove ──────────────► remove_item() ───────► delete by id            │
//! │                                                                         │
//! │  Apply code ──────────► apply_promo()          (none)                   │
//! │  Totals ──────────────► summary()              (none)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Policy
//! Store failures never escape: they are logged and turned into an empty
//! list or a `false` flag. Quantity changes and removals are applied to the
//! in-memory list before the write; [`WriteFailurePolicy`] decides whether a
//! failed write is undone.

use std::collections::HashMap;
use std::sync::Arc;

use storefront_core::pricing::{self, PriceSummary, PromoOutcome, PromoState};
use storefront_core::validation::validate_quantity;
use storefront_core::{CartItem, Money, Product, DEFAULT_DELIVERY_FEE};
use tracing::{debug, error, info, warn};

use crate::store::{CartStore, NewCartItem};

// =============================================================================
// Write Failure Policy
// =============================================================================

/// What to do with an optimistic change when its store write fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteFailurePolicy {
    /// Keep the local change. The list may disagree with the store until
    /// the next `load`.
    #[default]
    KeepOptimistic,
    /// Restore the line as it was before the change.
    Rollback,
}

// =============================================================================
// Cart Ledger
// =============================================================================

/// The shopper's cart.
///
/// ## Invariants
/// - Every line has `quantity >= 1`
/// - At most one line per product for the loaded user
/// - The summary is recomputed on every call, never cached
pub struct CartLedger {
    store: Arc<dyn CartStore>,
    user_id: Option<String>,
    items: Vec<CartItem>,
    prices: HashMap<String, Money>,
    promo: Option<PromoState>,
    delivery_fee: Money,
    policy: WriteFailurePolicy,
}

impl CartLedger {
    /// Creates an empty ledger with the default delivery fee and policy.
    pub fn new(store: Arc<dyn CartStore>) -> Self {
        CartLedger {
            store,
            user_id: None,
            items: Vec::new(),
            prices: HashMap::new(),
            promo: None,
            delivery_fee: DEFAULT_DELIVERY_FEE,
            policy: WriteFailurePolicy::default(),
        }
    }

    pub fn with_delivery_fee(mut self, delivery_fee: Money) -> Self {
        self.delivery_fee = delivery_fee;
        self
    }

    pub fn with_policy(mut self, policy: WriteFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    // =========================================================================
    // Store Operations
    // =========================================================================

    /// Replaces the local list with the user's rows from the store.
    ///
    /// An empty cart and a failed fetch both yield an empty list; the
    /// failure is logged. Rows that violate a line invariant are skipped.
    pub async fn load(&mut self, user_id: &str) -> &[CartItem] {
        self.user_id = Some(user_id.to_string());

        let rows = match self.store.cart_items(user_id).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to load cart");
                Vec::new()
            }
        };

        let previous: HashMap<String, Product> = self
            .items
            .drain(..)
            .filter_map(|item| item.product().cloned().map(|p| (p.id().to_string(), p)))
            .collect();

        self.items = rows
            .into_iter()
            .filter_map(|row| {
                let row_id = row.id.clone();
                match CartItem::try_from(row) {
                    Ok(item) => Some(item),
                    Err(e) => {
                        warn!(item_id = %row_id, error = %e, "Skipping invalid cart row");
                        None
                    }
                }
            })
            .map(|mut item| {
                if let Some(product) = previous.get(item.product_id()) {
                    item.attach_product(product.clone());
                }
                item
            })
            .collect();

        debug!(user_id = %user_id, count = self.items.len(), "Cart loaded");
        &self.items
    }

    /// Adds `quantity` of a product: bumps the existing line or inserts a
    /// new one. Returns false on any store failure and for a quantity, or
    /// a resulting line quantity, outside `1..=MAX_QUANTITY`.
    pub async fn add_item(&mut self, user_id: &str, product_id: &str, quantity: i64) -> bool {
        if let Err(e) = validate_quantity(quantity) {
            debug!(product_id = %product_id, quantity, error = %e, "Ignoring add");
            return false;
        }

        let existing = match self.store.find_cart_item(user_id, product_id).await {
            Ok(existing) => existing,
            Err(e) => {
                error!(user_id = %user_id, product_id = %product_id, error = %e, "Cart lookup failed");
                return false;
            }
        };

        let tracks_user = self.user_id.as_deref() == Some(user_id);

        match existing {
            Some(row) => {
                let new_quantity = row.quantity.saturating_add(quantity);
                if let Err(e) = validate_quantity(new_quantity) {
                    warn!(item_id = %row.id, new_quantity, error = %e, "Refusing to grow cart line");
                    return false;
                }
                if let Err(e) = self.store.update_cart_item_quantity(&row.id, new_quantity).await {
                    error!(item_id = %row.id, error = %e, "Failed to increase cart quantity");
                    return false;
                }

                if tracks_user {
                    match self.items.iter().position(|item| item.id() == row.id) {
                        Some(index) => {
                            if let Err(e) = self.items[index].set_quantity(new_quantity) {
                                warn!(item_id = %row.id, error = %e, "Stored quantity is invalid");
                            }
                        }
                        None => self.push_row(row.id.clone(), product_id, user_id, new_quantity),
                    }
                }
                info!(item_id = %row.id, quantity = new_quantity, "Cart quantity increased");
            }
            None => {
                let inserted = self
                    .store
                    .insert_cart_item(NewCartItem {
                        user_id: user_id.to_string(),
                        product_id: product_id.to_string(),
                        quantity,
                    })
                    .await;

                let row = match inserted {
                    Ok(row) => row,
                    Err(e) => {
                        error!(user_id = %user_id, product_id = %product_id, error = %e, "Failed to add to cart");
                        return false;
                    }
                };

                if tracks_user {
                    self.push_row(row.id.clone(), product_id, user_id, row.quantity);
                }
                info!(item_id = %row.id, product_id = %product_id, quantity, "Added to cart");
            }
        }

        true
    }

    /// Sets a line's quantity. Values outside `1..=MAX_QUANTITY` are ignored
    /// without a store call. Returns whether the store write succeeded.
    pub async fn set_quantity(&mut self, item_id: &str, new_quantity: i64) -> bool {
        if let Err(e) = validate_quantity(new_quantity) {
            debug!(item_id = %item_id, new_quantity, error = %e, "Ignoring quantity");
            return false;
        }

        let previous = self
            .items
            .iter_mut()
            .find(|item| item.id() == item_id)
            .map(|item| {
                let before = item.quantity();
                // new_quantity was validated above
                let _ = item.set_quantity(new_quantity);
                before
            });

        match self.store.update_cart_item_quantity(item_id, new_quantity).await {
            Ok(()) => {
                debug!(item_id = %item_id, new_quantity, "Cart quantity updated");
                true
            }
            Err(e) => {
                error!(item_id = %item_id, error = %e, "Failed to update cart quantity");
                if let (WriteFailurePolicy::Rollback, Some(before)) = (self.policy, previous) {
                    if let Some(item) = self.items.iter_mut().find(|item| item.id() == item_id) {
                        let _ = item.set_quantity(before);
                    }
                }
                false
            }
        }
    }

    /// Removes a line. Returns whether the store delete succeeded.
    pub async fn remove_item(&mut self, item_id: &str) -> bool {
        let removed = self
            .items
            .iter()
            .position(|item| item.id() == item_id)
            .map(|index| (index, self.items.remove(index)));

        match self.store.delete_cart_item(item_id).await {
            Ok(()) => {
                info!(item_id = %item_id, "Removed from cart");
                true
            }
            Err(e) => {
                error!(item_id = %item_id, error = %e, "Failed to remove cart item");
                if let (WriteFailurePolicy::Rollback, Some((index, item))) = (self.policy, removed) {
                    let index = index.min(self.items.len());
                    self.items.insert(index, item);
                }
                false
            }
        }
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    /// Applies a promo code against the current subtotal.
    ///
    /// An accepted code is remembered and re-evaluated on every
    /// [`summary`](Self::summary). An unrecognized code clears any earlier
    /// discount.
    pub fn apply_promo(&mut self, code: &str) -> PromoOutcome {
        let subtotal = self.subtotal();
        let outcome = pricing::apply_promo(code, subtotal);

        self.promo = PromoState::evaluate(code, subtotal);
        debug!(code, accepted = outcome.accepted, "Promo code applied");
        outcome
    }

    pub fn clear_promo(&mut self) {
        self.promo = None;
    }

    /// Current price breakdown.
    pub fn summary(&mut self) -> PriceSummary {
        let subtotal = self.subtotal();
        let discount = match self.promo.as_mut() {
            Some(promo) => {
                promo.refresh(subtotal);
                promo.discount_amount
            }
            None => Money::zero(),
        };

        pricing::compute_summary(&self.items, &self.prices, discount, self.delivery_fee)
    }

    pub fn subtotal(&self) -> Money {
        pricing::subtotal(&self.items, &self.prices)
    }

    /// Sets the known price for a product. Takes precedence over a joined
    /// snapshot's price.
    pub fn set_price(&mut self, product_id: impl Into<String>, price: Money) {
        self.prices.insert(product_id.into(), price);
    }

    pub fn set_prices(&mut self, prices: impl IntoIterator<Item = (String, Money)>) {
        self.prices.extend(prices);
    }

    /// Joins product snapshots onto matching lines.
    pub fn attach_products<'a>(&mut self, products: impl IntoIterator<Item = &'a Product>) {
        let by_id: HashMap<&str, &Product> = products
            .into_iter()
            .map(|product| (product.id(), product))
            .collect();

        for item in &mut self.items {
            if let Some(product) = by_id.get(item.product_id()) {
                item.attach_product((*product).clone());
            }
        }
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of all line quantities.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(CartItem::quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn promo(&self) -> Option<&PromoState> {
        self.promo.as_ref()
    }

    pub fn policy(&self) -> WriteFailurePolicy {
        self.policy
    }

    /// Drops all local state (e.g. after sign-out). The store is untouched.
    pub fn reset(&mut self) {
        self.user_id = None;
        self.items.clear();
        self.prices.clear();
        self.promo = None;
    }

    fn push_row(&mut self, id: String, product_id: &str, user_id: &str, quantity: i64) {
        match CartItem::new(id, product_id, user_id, quantity) {
            Ok(item) => self.items.push(item),
            Err(e) => warn!(product_id = %product_id, error = %e, "Stored cart row is invalid"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
