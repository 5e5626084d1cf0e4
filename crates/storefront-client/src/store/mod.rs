//! # Remote Store Seams
//!
//! The traits the Session Manager, Cart Ledger and catalog service are
//! written against, and the two implementations of them.
//!
//! ## Implementations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   AuthBackend ─┐                                                        │
//! │   CartStore ───┼──► RestClient      HTTP against /auth/v1 and /rest/v1 │
//! │   CatalogStore ┘                                                        │
//! │                 └─► MemoryBackend   in-process tables, failure toggles │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every call yields data or an error, never both. Callers decide the
//! fallback; implementations only report.

use async_trait::async_trait;
use storefront_core::User;

use crate::error::{AuthResult, StoreResult};

pub mod memory;
pub mod rest;
pub mod rows;

pub use memory::MemoryBackend;
pub use rest::RestClient;
pub use rows::{ArticleRow, AuthUserRow, CartItemRow, CategoryRow, NewCartItem};

/// The credential service.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Provisions an account. `Ok(None)` when the service accepted the
    /// request but returned no user.
    async fn sign_up(&self, email: &str, password: &str, full_name: &str)
        -> AuthResult<Option<User>>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Option<User>>;

    /// Invalidates the current session.
    async fn sign_out(&self) -> AuthResult<()>;

    /// Returns the user of the current session, if there is one.
    async fn get_user(&self) -> StoreResult<Option<User>>;
}

/// The `cart_items` table.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn cart_items(&self, user_id: &str) -> StoreResult<Vec<CartItemRow>>;

    async fn find_cart_item(&self, user_id: &str, product_id: &str)
        -> StoreResult<Option<CartItemRow>>;

    async fn insert_cart_item(&self, item: NewCartItem) -> StoreResult<CartItemRow>;

    async fn update_cart_item_quantity(&self, item_id: &str, quantity: i64) -> StoreResult<()>;

    async fn delete_cart_item(&self, item_id: &str) -> StoreResult<()>;
}

/// The `categories` and `articles` tables.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn categories(&self) -> StoreResult<Vec<CategoryRow>>;

    /// Featured articles, at most `limit`.
    async fn featured_articles(&self, limit: usize) -> StoreResult<Vec<ArticleRow>>;
}
