//! # Session Manager
//!
//! Single source of truth for who is signed in.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Session State Machine                              │
//! │                                                                         │
//! │                    ┌─────────────┐                                      │
//! │     start ────────►│  RESOLVING  │  loading = true                      │
//! │                    └──────┬──────┘  (exited exactly once)               │
//! │                           │ initialize()                                │
//! │            no session /   │   session found                             │
//! │            lookup failed  │                                             │
//! │              ┌────────────┴─────────────┐                               │
//! │              ▼                          ▼                               │
//! │      ┌─────────────┐  sign_in/up ok ┌───────────────┐                   │
//! │      │  ANONYMOUS  │───────────────►│ AUTHENTICATED │                   │
//! │      │             │◄───────────────│    (User)     │                   │
//! │      └─────────────┘    sign_out    └───────────────┘                   │
//! │                                                                         │
//! │  A failed sign_in/sign_up leaves the state where it was.               │
//! │  sign_out always ends without a user, even if the remote call fails.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The state is held in a `watch` channel; presentation code reads it with
//! [`SessionManager::state`] or follows it with [`SessionManager::subscribe`].
//! Only the four operations on this type write it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use storefront_core::User;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::error::{AuthError, AuthResult};
use crate::store::AuthBackend;

// =============================================================================
// Session State
// =============================================================================

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "user", rename_all = "camelCase")]
pub enum SessionState {
    /// Startup lookup has not completed. Consumers must not treat the
    /// absence of a user as authoritative.
    Resolving,
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self, SessionState::Resolving)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Resolving => write!(f, "resolving"),
            SessionState::Anonymous => write!(f, "anonymous"),
            SessionState::Authenticated(user) => write!(f, "authenticated as {}", user.email),
        }
    }
}

// =============================================================================
// Session Manager
// =============================================================================

/// Owns the signed-in user for the lifetime of the process.
pub struct SessionManager {
    backend: Arc<dyn AuthBackend>,
    state_tx: watch::Sender<SessionState>,
    initialize_started: AtomicBool,
}

impl SessionManager {
    /// Creates a manager in the `Resolving` state.
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Resolving);

        SessionManager {
            backend,
            state_tx,
            initialize_started: AtomicBool::new(false),
        }
    }

    /// Resolves an existing session with the credential service.
    ///
    /// Leaves `Resolving` for `Authenticated` when a user comes back and for
    /// `Anonymous` otherwise. A failed lookup is logged and treated as "no
    /// user"; it is not retried.
    ///
    /// Only the first call performs the lookup. Later calls wait for it to
    /// finish and return the resolved user.
    pub async fn initialize(&self) -> Option<User> {
        if self.initialize_started.swap(true, Ordering::SeqCst) {
            debug!("Session initialization already started");
            let mut rx = self.state_tx.subscribe();
            return match rx.wait_for(|state| !state.is_resolving()).await {
                Ok(state) => state.user().cloned(),
                Err(_) => None,
            };
        }

        let user = match self.backend.get_user().await {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, "Failed to resolve existing session");
                None
            }
        };

        let resolved = match &user {
            Some(user) => {
                info!(user_id = %user.id, "Resumed existing session");
                SessionState::Authenticated(user.clone())
            }
            None => {
                debug!("No existing session");
                SessionState::Anonymous
            }
        };

        self.state_tx.send_if_modified(|state| {
            if state.is_resolving() {
                *state = resolved;
                true
            } else {
                false
            }
        });

        self.current_user()
    }

    /// Signs in with email and password.
    ///
    /// ## Returns
    /// - `Ok(Some(user))`: now `Authenticated`
    /// - `Ok(None)`: accepted but no user came back; state unchanged
    /// - `Err(AuthError::Rejected(msg))`: the service's message, verbatim
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Option<User>> {
        self.ensure_anonymous()?;

        let result = self.backend.sign_in_with_password(email, password).await;
        self.apply_credential_result(result, "sign-in").await
    }

    /// Creates an account and signs it in.
    ///
    /// `full_name` is not validated here; the sign-up form checks it before
    /// calling.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> AuthResult<Option<User>> {
        self.ensure_anonymous()?;

        let result = self.backend.sign_up(email, password, full_name).await;
        self.apply_credential_result(result, "sign-up").await
    }

    /// Ends the session. Local state never keeps a user past this call,
    /// whatever the remote service reports.
    pub async fn sign_out(&self) {
        if let Err(e) = self.backend.sign_out().await {
            warn!(error = %e, "Remote sign-out failed; clearing local session anyway");
        }

        self.state_tx.send_if_modified(|state| match state {
            SessionState::Authenticated(user) => {
                info!(user_id = %user.id, "Signed out");
                *state = SessionState::Anonymous;
                true
            }
            _ => false,
        });
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state_tx.borrow().user().cloned()
    }

    /// True until the startup lookup has completed.
    pub fn is_loading(&self) -> bool {
        self.state_tx.borrow().is_resolving()
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn ensure_anonymous(&self) -> AuthResult<()> {
        match &*self.state_tx.borrow() {
            SessionState::Resolving => Err(AuthError::SessionResolving),
            SessionState::Authenticated(_) => Err(AuthError::AlreadySignedIn),
            SessionState::Anonymous => Ok(()),
        }
    }

    /// Publishes the outcome of a sign-in or sign-up.
    ///
    /// The state may have moved while the call was in flight (a concurrent
    /// sign-in, or startup resolution). A result for the user already shown
    /// is accepted as is. Any other user is not applied, and the session the
    /// backend just stored for it is revoked so the backend never holds a
    /// session the manager does not show.
    async fn apply_credential_result(
        &self,
        result: AuthResult<Option<User>>,
        operation: &str,
    ) -> AuthResult<Option<User>> {
        match result {
            Ok(Some(user)) => {
                let mut conflict = None;
                let applied = self.state_tx.send_if_modified(|state| match state {
                    SessionState::Anonymous => {
                        *state = SessionState::Authenticated(user.clone());
                        true
                    }
                    SessionState::Authenticated(current) if current.id == user.id => false,
                    SessionState::Authenticated(_) => {
                        conflict = Some(AuthError::AlreadySignedIn);
                        false
                    }
                    SessionState::Resolving => {
                        conflict = Some(AuthError::SessionResolving);
                        false
                    }
                });

                if let Some(err) = conflict {
                    warn!(user_id = %user.id, operation, "Session changed during the call; result not applied");
                    self.revoke_unapplied().await;
                    return Err(err);
                }

                if applied {
                    info!(user_id = %user.id, operation, "Signed in");
                } else {
                    debug!(user_id = %user.id, operation, "Already signed in as this user");
                }
                Ok(Some(user))
            }
            Ok(None) => {
                info!(operation, "Accepted without a user; session unchanged");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, operation, "Credential call failed");
                Err(e)
            }
        }
    }

    /// Drops the backend session created by a result that was not applied.
    /// The backend keeps a single session, so a user shown before the call
    /// has lost theirs too and the state falls back to `Anonymous`.
    async fn revoke_unapplied(&self) {
        if let Err(e) = self.backend.sign_out().await {
            warn!(error = %e, "Failed to revoke unapplied session");
        }

        self.state_tx.send_if_modified(|state| match state {
            SessionState::Authenticated(user) => {
                info!(user_id = %user.id, "Signed out after a conflicting sign-in");
                *state = SessionState::Anonymous;
                true
            }
            _ => false,
        });
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
