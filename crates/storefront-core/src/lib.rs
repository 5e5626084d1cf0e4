//! # storefront-core: Pure Business Logic for the Storefront
//!
//! Everything in this crate is deterministic and free of I/O. The remote
//! store, the session lifecycle and logging live in `storefront-client`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Presentation (mobile screens / CLI)               │   │
//! │  │    Home ──► Search ──► Product ──► Cart ──► Checkout summary    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        storefront-client (SessionManager, CartLedger)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ storefront-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Summary  │  │   rules   │  │   │
//! │  │   │ CartItem  │  │  cents    │  │   Promo   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Product, Category, CartItem)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Promo codes and the cart price breakdown
//! - [`catalog`] - Product search filters and sort orders
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::money::Money;
//! use storefront_core::pricing::apply_promo;
//!
//! let subtotal = Money::from_cents(10_000); // $100.00
//! let promo = apply_promo("SAVE10", subtotal);
//!
//! assert!(promo.accepted);
//! assert_eq!(promo.discount.cents(), 1_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use pricing::{PriceSummary, PromoOutcome, PromoState};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Flat delivery fee added to every checkout summary ($5.99).
pub const DEFAULT_DELIVERY_FEE: Money = Money::from_cents(599);

/// Number of featured products shown on the home feed.
pub const FEATURED_PRODUCT_LIMIT: usize = 6;

/// Image shown when a product or article has none.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg?height=200&width=200";
