//! # storefront-client: Session and Cart over the Remote Store
//!
//! The two stateful components of the storefront and the store they talk to.
//!
//! ## Components
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌────────────────────┐   ┌────────────────────┐   ┌────────────────┐  │
//! │  │  SessionManager    │   │   CartLedger       │   │ CatalogService │  │
//! │  │  who is signed in  │   │   lines + summary  │   │ home feed      │  │
//! │  └─────────┬──────────┘   └─────────┬──────────┘   └───────┬────────┘  │
//! │            │                        │                      │           │
//! │            │  Arc<dyn AuthBackend>  │ Arc<dyn CartStore>   │           │
//! │            ▼                        ▼                      ▼           │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   RestClient (reqwest)          │   MemoryBackend (in-process)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  The session manager and the ledger do not know about each other.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Lifecycle
//! Construct both components once at process start, call
//! [`SessionManager::initialize`], hand them to the presentation layer,
//! and drop them at exit. Nothing here is global.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use storefront_client::{CartLedger, MemoryBackend, SessionManager};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let backend = Arc::new(MemoryBackend::new());
//! let session = SessionManager::new(backend.clone());
//! session.initialize().await;
//!
//! let user = session
//!     .sign_up("ada@example.com", "secret123", "Ada Lovelace")
//!     .await
//!     .unwrap()
//!     .unwrap();
//!
//! let mut cart = CartLedger::new(backend);
//! cart.load(&user.id).await;
//! assert!(cart.add_item(&user.id, "p1", 1).await);
//! assert_eq!(cart.total_quantity(), 1);
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod ledger;
pub mod session;
pub mod store;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::CatalogService;
pub use config::{ConfigError, StorefrontConfig};
pub use error::{AuthError, AuthResult, StoreError, StoreResult};
pub use ledger::{CartLedger, WriteFailurePolicy};
pub use session::{SessionManager, SessionState};
pub use store::{AuthBackend, CartStore, CatalogStore, MemoryBackend, RestClient};
