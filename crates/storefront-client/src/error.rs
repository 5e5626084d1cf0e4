//! # Client Error Types
//!
//! Error types for calls against the remote store.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────────────┐        ┌─────────────────────────────────┐ │
//! │  │       AuthError         │        │          StoreError             │ │
//! │  │                         │        │                                 │ │
//! │  │  Rejected(msg)          │        │  Request     (network)          │ │
//! │  │  Transport              │        │  Response    (unreadable body)  │ │
//! │  │  SessionResolving       │        │  Api         (status + message) │ │
//! │  │  AlreadySignedIn        │        │  Decode      (bad JSON shape)   │ │
//! │  │                         │        │  InvalidRecord (bad row values) │ │
//! │  │  → shown to the user    │        │  Unavailable                    │ │
//! │  └─────────────────────────┘        │                                 │ │
//! │                                     │  → logged, then replaced by a   │ │
//! │                                     │    fallback (empty list, false) │ │
//! │                                     └─────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use storefront_core::ValidationError;
use thiserror::Error;

/// Result type alias for data calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for credential calls.
pub type AuthResult<T> = Result<T, AuthError>;

// =============================================================================
// Auth Error
// =============================================================================

/// Failures from sign-in, sign-up and sign-out.
///
/// `Rejected` carries the credential service's message verbatim; the auth
/// screen shows it as-is ("Invalid login credentials", "User already
/// registered").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The service refused the request.
    #[error("{0}")]
    Rejected(String),

    /// The service could not be reached or answered garbage.
    #[error("Could not reach the sign-in service: {0}")]
    Transport(String),

    /// Startup session resolution has not finished yet.
    #[error("Session is still being resolved")]
    SessionResolving,

    /// A user is already signed in; sign out first.
    #[error("Already signed in")]
    AlreadySignedIn,
}

impl AuthError {
    /// Message suitable for the auth screen.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Api { message, .. } => AuthError::Rejected(message),
            other => AuthError::Transport(other.to_string()),
        }
    }
}

// =============================================================================
// Store Error
// =============================================================================

/// Failures from table reads and writes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request could not be sent (connection, DNS, timeout).
    #[error("Request failed: {0}")]
    Request(String),

    /// The response body could not be read.
    #[error("Response failed: {0}")]
    Response(String),

    /// The store answered with an error status.
    #[error("Store error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The body was not the expected JSON shape.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// A row decoded but violated a domain invariant.
    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] ValidationError),

    /// The store is not usable right now (e.g. no session for a user-scoped table).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}
