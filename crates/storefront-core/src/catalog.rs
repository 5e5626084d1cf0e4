//! # Catalog
//!
//! Product search over an in-memory listing, plus the attribute generator
//! for the featured feed.
//!
//! ## Search Pipeline
//! ```text
//! products ──► name contains text? ──► price in range? ──► rating ≥ min? ──► sort
//!              (case-insensitive)      (only if narrowed)   (only if > 0)
//! ```
//!
//! An empty query text yields no results; the search screen shows its
//! "start typing" state instead of the whole catalog.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Product;

/// Upper bound of the price slider. A range of `0..=DEFAULT_MAX_PRICE` means
/// "no price filter".
pub const DEFAULT_MAX_PRICE: Money = Money::from_cents(200_000);

// =============================================================================
// Sort Order
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Keep the listing order.
    #[default]
    Relevance,
    PriceLowHigh,
    PriceHighLow,
    /// Highest rated first.
    Rating,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        SortOrder::Relevance,
        SortOrder::PriceLowHigh,
        SortOrder::PriceHighLow,
        SortOrder::Rating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Relevance => "relevance",
            SortOrder::PriceLowHigh => "price_low_high",
            SortOrder::PriceHighLow => "price_high_low",
            SortOrder::Rating => "rating",
        }
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortOrder::Relevance => Ordering::Equal,
            SortOrder::PriceLowHigh => a.price().cmp(&b.price()),
            SortOrder::PriceHighLow => b.price().cmp(&a.price()),
            SortOrder::Rating => b.rating().total_cmp(&a.rating()),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "sort".to_string(),
                reason: format!(
                    "expected one of relevance, price_low_high, price_high_low, rating; got {s}"
                ),
            })
    }
}

// =============================================================================
// Product Query
// =============================================================================

/// Filters selected on the search screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub text: String,
    pub min_price: Money,
    pub max_price: Money,
    /// Minimum star rating; 0 disables the filter.
    pub min_rating: f32,
    pub sort: SortOrder,
}

impl Default for ProductQuery {
    fn default() -> Self {
        ProductQuery {
            text: String::new(),
            min_price: Money::zero(),
            max_price: DEFAULT_MAX_PRICE,
            min_rating: 0.0,
            sort: SortOrder::Relevance,
        }
    }
}

impl ProductQuery {
    pub fn new(text: impl Into<String>) -> Self {
        ProductQuery {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_price_range(mut self, min: Money, max: Money) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    pub fn with_min_rating(mut self, rating: f32) -> Self {
        self.min_rating = rating;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    fn price_filter_active(&self) -> bool {
        self.min_price > Money::zero() || self.max_price < DEFAULT_MAX_PRICE
    }

    /// Whether a single product passes the text, price and rating filters.
    pub fn matches(&self, product: &Product) -> bool {
        let needle = self.text.to_lowercase();
        if !product.name().to_lowercase().contains(&needle) {
            return false;
        }

        if self.price_filter_active()
            && (product.price() < self.min_price || product.price() > self.max_price)
        {
            return false;
        }

        if self.min_rating > 0.0 && product.rating() < self.min_rating {
            return false;
        }

        true
    }
}

/// Filters and sorts `products` for a query. Sorting is stable, so ties keep
/// their listing order.
pub fn search_products(products: &[Product], query: &ProductQuery) -> Vec<Product> {
    if query.text.trim().is_empty() {
        return Vec::new();
    }

    let mut results: Vec<Product> = products
        .iter()
        .filter(|product| query.matches(product))
        .cloned()
        .collect();

    results.sort_by(|a, b| query.sort.compare(a, b));
    results
}

// =============================================================================
// Featured Feed Attributes
// =============================================================================

/// Storefront attributes for a featured article. The article table has no
/// price, rating or stock columns, so the feed derives them from the id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedAttributes {
    /// 20.00 to 69.99
    pub price: Money,
    /// 20.00 to 119.99
    pub original_price: Money,
    /// 3.0 to 5.0, one decimal
    pub rating: f32,
    /// 10 to 59
    pub stock: u32,
}

/// 64-bit FNV-1a; stable across runs and platforms.
fn fnv1a(bytes: &[u8]) -> u64 {
    // Published 64-bit FNV offset basis and FNV prime.
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    bytes
        .iter()
        .fold(OFFSET, |hash, byte| (hash ^ *byte as u64).wrapping_mul(PRIME))
}

/// Derives the feed attributes for an article id. The same id always
/// produces the same values.
pub fn feed_attributes(article_id: &str) -> FeedAttributes {
    let hash = fnv1a(article_id.as_bytes());
    let lane = |shift: u32| (hash >> shift) & 0xffff;

    FeedAttributes {
        price: Money::from_cents(2000 + (lane(0) % 5000) as i64),
        original_price: Money::from_cents(2000 + (lane(16) % 10_000) as i64),
        rating: (30 + (lane(32) % 21)) as f32 / 10.0,
        stock: 10 + (lane(48) % 50) as u32,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
