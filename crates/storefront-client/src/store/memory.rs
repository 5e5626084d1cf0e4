//! # In-Memory Backend
//!
//! A process-local stand-in for the remote store. Implements all three
//! store traits over plain tables behind a mutex, with switches that make
//! reads, writes or sign-out fail. Used by the tests and by the CLI's
//! `--offline` demo mode.
//!
//! Behavior follows the remote service where it is observable:
//! - duplicate sign-up answers "User already registered"
//! - bad credentials answer "Invalid login credentials"
//! - updates and deletes that match no row succeed silently
//! - a second row for the same `(user_id, product_id)` is a conflict

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use storefront_core::User;
use tracing::debug;
use uuid::Uuid;

use super::rows::{ArticleRow, CartItemRow, CategoryRow, NewCartItem};
use super::{AuthBackend, CartStore, CatalogStore};
use crate::error::{AuthError, AuthResult, StoreError, StoreResult};

/// Minimum password length the credential service accepts.
const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    user: User,
    password: String,
}

struct Article {
    row: ArticleRow,
    featured: bool,
}

#[derive(Default)]
struct MemoryState {
    accounts: Vec<Account>,
    session: Option<String>,
    cart: Vec<CartItemRow>,
    categories: Vec<CategoryRow>,
    articles: Vec<Article>,

    fail_reads: bool,
    fail_writes: bool,
    fail_sign_out: bool,
    sign_up_returns_user: bool,

    cart_calls: usize,
}

/// In-memory implementation of [`AuthBackend`], [`CartStore`] and
/// [`CatalogStore`].
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend {
            state: Mutex::new(MemoryState {
                sign_up_returns_user: true,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Seeding
    // =========================================================================

    /// Registers an account directly, bypassing sign-up.
    pub fn add_account(&self, email: &str, password: &str, full_name: Option<&str>) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            full_name: full_name.map(str::to_string),
            avatar_url: None,
        };

        self.lock().accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    /// Marks the account with `email` as signed in, as if a session had
    /// survived a restart. Returns false when no such account exists.
    pub fn restore_session(&self, email: &str) -> bool {
        let mut state = self.lock();
        let id = state
            .accounts
            .iter()
            .find(|account| account.user.email == email)
            .map(|account| account.user.id.clone());

        let found = id.is_some();
        state.session = id;
        found
    }

    pub fn add_category(&self, id: &str, name: &str, slug: &str) {
        self.lock().categories.push(CategoryRow {
            id: id.to_string(),
            name: name.to_string(),
            slug: Some(slug.to_string()),
        });
    }

    pub fn add_article(&self, id: &str, title: &str, featured: bool) {
        self.lock().articles.push(Article {
            row: ArticleRow {
                id: id.to_string(),
                title: title.to_string(),
                excerpt: None,
                image_url: None,
            },
            featured,
        });
    }

    /// Inserts a cart row directly, bypassing the uniqueness check.
    pub fn add_cart_row(&self, user_id: &str, product_id: &str, quantity: i64) -> CartItemRow {
        let row = CartItemRow {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            user_id: user_id.to_string(),
            quantity,
        };
        self.lock().cart.push(row.clone());
        row
    }

    // =========================================================================
    // Failure Injection
    // =========================================================================

    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn set_fail_sign_out(&self, fail: bool) {
        self.lock().fail_sign_out = fail;
    }

    /// When false, sign-up succeeds but hands back no user.
    pub fn set_sign_up_returns_user(&self, returns_user: bool) {
        self.lock().sign_up_returns_user = returns_user;
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Snapshot of the cart table.
    pub fn cart_rows(&self) -> Vec<CartItemRow> {
        self.lock().cart.clone()
    }

    /// Number of calls made through [`CartStore`].
    pub fn cart_calls(&self) -> usize {
        self.lock().cart_calls
    }

    pub fn session_user_id(&self) -> Option<String> {
        self.lock().session.clone()
    }
}

fn unavailable(operation: &str) -> StoreError {
    StoreError::Unavailable(format!("{operation} failed (injected)"))
}

/// Guard for the cart table: counts the call and applies the failure switch.
fn cart_call(state: &mut MemoryState, write: bool, operation: &str) -> StoreResult<()> {
    state.cart_calls += 1;
    let failing = if write { state.fail_writes } else { state.fail_reads };
    if failing {
        return Err(unavailable(operation));
    }
    Ok(())
}

// =============================================================================
// Auth
// =============================================================================

#[async_trait]
impl AuthBackend for MemoryBackend {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> AuthResult<Option<User>> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(AuthError::Transport("sign-up failed (injected)".to_string()));
        }

        if state.accounts.iter().any(|account| account.user.email == email) {
            return Err(AuthError::Rejected("User already registered".to_string()));
        }

        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Rejected(format!(
                "Password should be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            full_name: Some(full_name.to_string()).filter(|name| !name.is_empty()),
            avatar_url: None,
        };
        state.accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        debug!(user_id = %user.id, "Account created");

        if !state.sign_up_returns_user {
            return Ok(None);
        }

        state.session = Some(user.id.clone());
        Ok(Some(user))
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Option<User>> {
        let mut state = self.lock();
        if state.fail_reads {
            return Err(AuthError::Transport("sign-in failed (injected)".to_string()));
        }

        let user = state
            .accounts
            .iter()
            .find(|account| account.user.email == email && account.password == password)
            .map(|account| account.user.clone())
            .ok_or_else(|| AuthError::Rejected("Invalid login credentials".to_string()))?;

        state.session = Some(user.id.clone());
        Ok(Some(user))
    }

    async fn sign_out(&self) -> AuthResult<()> {
        let mut state = self.lock();
        state.session = None;

        if state.fail_sign_out {
            return Err(AuthError::Transport("sign-out failed (injected)".to_string()));
        }
        Ok(())
    }

    async fn get_user(&self) -> StoreResult<Option<User>> {
        let state = self.lock();
        if state.fail_reads {
            return Err(unavailable("get_user"));
        }

        let Some(session) = state.session.as_deref() else {
            return Ok(None);
        };

        Ok(state
            .accounts
            .iter()
            .find(|account| account.user.id == session)
            .map(|account| account.user.clone()))
    }
}

// =============================================================================
// Cart Items
// =============================================================================

#[async_trait]
impl CartStore for MemoryBackend {
    async fn cart_items(&self, user_id: &str) -> StoreResult<Vec<CartItemRow>> {
        let mut state = self.lock();
        cart_call(&mut state, false, "cart_items")?;

        Ok(state
            .cart
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_cart_item(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> StoreResult<Option<CartItemRow>> {
        let mut state = self.lock();
        cart_call(&mut state, false, "find_cart_item")?;

        Ok(state
            .cart
            .iter()
            .find(|row| row.user_id == user_id && row.product_id == product_id)
            .cloned())
    }

    async fn insert_cart_item(&self, item: NewCartItem) -> StoreResult<CartItemRow> {
        let mut state = self.lock();
        cart_call(&mut state, true, "insert_cart_item")?;

        if state
            .cart
            .iter()
            .any(|row| row.user_id == item.user_id && row.product_id == item.product_id)
        {
            return Err(StoreError::Api {
                status: 409,
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }

        let row = CartItemRow {
            id: Uuid::new_v4().to_string(),
            product_id: item.product_id,
            user_id: item.user_id,
            quantity: item.quantity,
        };
        state.cart.push(row.clone());
        Ok(row)
    }

    async fn update_cart_item_quantity(&self, item_id: &str, quantity: i64) -> StoreResult<()> {
        let mut state = self.lock();
        cart_call(&mut state, true, "update_cart_item_quantity")?;

        if let Some(row) = state.cart.iter_mut().find(|row| row.id == item_id) {
            row.quantity = quantity;
        }
        Ok(())
    }

    async fn delete_cart_item(&self, item_id: &str) -> StoreResult<()> {
        let mut state = self.lock();
        cart_call(&mut state, true, "delete_cart_item")?;

        state.cart.retain(|row| row.id != item_id);
        Ok(())
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[async_trait]
impl CatalogStore for MemoryBackend {
    async fn categories(&self) -> StoreResult<Vec<CategoryRow>> {
        let state = self.lock();
        if state.fail_reads {
            return Err(unavailable("categories"));
        }
        Ok(state.categories.clone())
    }

    async fn featured_articles(&self, limit: usize) -> StoreResult<Vec<ArticleRow>> {
        let state = self.lock();
        if state.fail_reads {
            return Err(unavailable("featured_articles"));
        }

        Ok(state
            .articles
            .iter()
            .filter(|article| article.featured)
            .take(limit)
            .map(|article| article.row.clone())
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
