//! # REST Client
//!
//! HTTP implementation of the store traits against a Supabase-style
//! backend: GoTrue-compatible `/auth/v1` endpoints for credentials and
//! PostgREST-compatible `/rest/v1` endpoints for tables.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         REST Request Flow                               │
//! │                                                                         │
//! │  ┌────────────────┐     ┌─────────────────┐     ┌─────────────────┐    │
//! │  │  RestClient    │     │  /auth/v1       │     │  /rest/v1       │    │
//! │  └───────┬────────┘     └────────┬────────┘     └────────┬────────┘    │
//! │          │                       │                       │             │
//! │          │  1. token?grant_type=password                 │             │
//! │          │──────────────────────►│                       │             │
//! │          │  2. access + refresh  │                       │             │
//! │          │◄──────────────────────│                       │             │
//! │          │                       │                       │             │
//! │          │  3. GET cart_items?user_id=eq.{id}            │             │
//! │          │     apikey + Bearer access_token              │             │
//! │          │──────────────────────────────────────────────►│             │
//! │          │◄──────────────────────────────────────────────│             │
//! │          │                       │                       │             │
//! │          │  [Later: token within 60s of expiry]          │             │
//! │          │                       │                       │             │
//! │          │  4. token?grant_type=refresh_token            │             │
//! │          │──────────────────────►│                       │             │
//! │          │  5. new access token  │                       │             │
//! │          │◄──────────────────────│                       │             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Token Storage
//! Tokens live in memory only. Without a session, requests carry the anon
//! key as bearer.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use storefront_core::User;
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

use super::rows::{
    ArticleRow, AuthUserRow, CartItemRow, CategoryRow, NewCartItem, SessionRow, SignUpResponse,
};
use super::{AuthBackend, CartStore, CatalogStore};
use crate::config::StorefrontConfig;
use crate::error::{AuthError, AuthResult, StoreError, StoreResult};

/// Margin before token expiration to trigger refresh (60 seconds)
const REFRESH_MARGIN_SECS: u64 = 60;

// =============================================================================
// Token Info
// =============================================================================

/// Session tokens held after sign-in.
#[derive(Clone)]
pub struct TokenInfo {
    /// The JWT access token
    pub access_token: String,
    /// Refresh token, absent for tokens seeded without one
    pub refresh_token: Option<String>,
    /// When the access token expires (local time); unknown for seeded tokens
    pub expires_at: Option<Instant>,
}

impl TokenInfo {
    fn from_session(session: &SessionRow) -> Self {
        TokenInfo {
            access_token: session.access_token.clone(),
            refresh_token: Some(session.refresh_token.clone()),
            expires_at: session
                .expires_in
                .map(|secs| Instant::now() + Duration::from_secs(secs)),
        }
    }

    /// Check if the token is expired or about to expire
    pub fn needs_refresh(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                Instant::now() + Duration::from_secs(REFRESH_MARGIN_SECS) >= expires_at
            }
            None => false,
        }
    }

    /// Get remaining valid time, `None` when the expiry is unknown
    pub fn remaining_secs(&self) -> Option<u64> {
        self.expires_at
            .map(|expires_at| expires_at.saturating_duration_since(Instant::now()).as_secs())
    }
}

impl fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenInfo")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("remaining_secs", &self.remaining_secs())
            .finish()
    }
}

// =============================================================================
// Rest Client
// =============================================================================

/// HTTP client for the backend-as-a-service project.
pub struct RestClient {
    http: Client,
    base_url: Url,
    anon_key: String,
    token: RwLock<Option<TokenInfo>>,
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl RestClient {
    /// Builds a client from configuration, seeding the session tokens if the
    /// configuration carries them.
    pub fn new(config: &StorefrontConfig) -> StoreResult<Self> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let token = config.access_token.as_ref().map(|access_token| TokenInfo {
            access_token: access_token.clone(),
            refresh_token: config.refresh_token.clone(),
            expires_at: None,
        });

        Ok(RestClient {
            http,
            base_url: config.supabase_url.clone(),
            anon_key: config.anon_key.clone(),
            token: RwLock::new(token),
        })
    }

    /// Current access token, if a session is held.
    pub async fn access_token(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|token| token.access_token.clone())
    }

    /// Current token info (without triggering refresh)
    pub async fn current_token(&self) -> Option<TokenInfo> {
        self.token.read().await.clone()
    }

    /// Replaces the held session tokens.
    pub async fn set_session(&self, access_token: String, refresh_token: Option<String>) {
        *self.token.write().await = Some(TokenInfo {
            access_token,
            refresh_token,
            expires_at: None,
        });
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn endpoint(&self, path: &str) -> StoreResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| StoreError::Request(format!("invalid endpoint {path}: {e}")))
    }

    /// Returns a usable access token, refreshing it first when it is close
    /// to expiry.
    ///
    /// ## Flow
    /// 1. No token: `None` (requests fall back to the anon key)
    /// 2. Token fresh: return it
    /// 3. Token near expiry: refresh; on failure keep using the old one
    async fn valid_access_token(&self) -> Option<String> {
        {
            let guard = self.token.read().await;
            match guard.as_ref() {
                None => return None,
                Some(token) if !token.needs_refresh() => {
                    return Some(token.access_token.clone());
                }
                Some(_) => {}
            }
        }

        let mut guard = self.token.write().await;

        // Double-check after acquiring write lock
        let current = guard.as_ref()?.clone();
        if !current.needs_refresh() {
            return Some(current.access_token);
        }

        let Some(refresh_token) = current.refresh_token.as_deref() else {
            return Some(current.access_token);
        };

        match self.request_refresh(refresh_token).await {
            Ok(session) => {
                let refreshed = TokenInfo::from_session(&session);
                info!(
                    expires_in_secs = ?refreshed.remaining_secs(),
                    "Session token refreshed"
                );
                let access_token = refreshed.access_token.clone();
                *guard = Some(refreshed);
                Some(access_token)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, using current token");
                Some(current.access_token)
            }
        }
    }

    async fn request_refresh(&self, refresh_token: &str) -> StoreResult<SessionRow> {
        let url = self.endpoint("/auth/v1/token")?;
        let request = self
            .http
            .post(url)
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));

        let response = self.send(request, &self.anon_key).await?;
        read_json(response).await
    }

    /// Builds a request carrying the project key and the current bearer.
    async fn request(&self, method: Method, path: &str) -> StoreResult<(RequestBuilder, String)> {
        let url = self.endpoint(path)?;
        let bearer = self
            .valid_access_token()
            .await
            .unwrap_or_else(|| self.anon_key.clone());
        Ok((self.http.request(method, url), bearer))
    }

    async fn send(&self, request: RequestBuilder, bearer: &str) -> StoreResult<Response> {
        let response = request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Response(e.to_string()))?;

        Err(StoreError::Api {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }

    async fn store_session(&self, session: &SessionRow) {
        *self.token.write().await = Some(TokenInfo::from_session(session));
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> StoreResult<T> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| StoreError::Response(e.to_string()))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Pulls a human-readable message out of an error body.
///
/// The auth service uses `error_description` or `msg`; the table service
/// uses `message`. Falls back to the raw body, then the status reason.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(Value::String(message)) = fields.get(key) {
                if !message.is_empty() {
                    return message.clone();
                }
            }
        }
    }

    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

fn to_user(row: AuthUserRow) -> StoreResult<User> {
    Ok(User::try_from(row)?)
}

// =============================================================================
// Auth
// =============================================================================

#[async_trait]
impl AuthBackend for RestClient {
    #[instrument(skip(self, password, full_name))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> AuthResult<Option<User>> {
        let url = self.endpoint("/auth/v1/signup")?;
        let request = self.http.post(url).json(&json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        }));

        let response = self.send(request, &self.anon_key).await?;
        let user_row = match read_json::<SignUpResponse>(response).await? {
            SignUpResponse::Session(session) => {
                self.store_session(&session).await;
                session.user
            }
            SignUpResponse::User(user) => {
                debug!("Sign-up accepted without a session");
                Some(user)
            }
        };

        Ok(user_row.map(to_user).transpose()?)
    }

    #[instrument(skip(self, password))]
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AuthResult<Option<User>> {
        let url = self.endpoint("/auth/v1/token")?;
        let request = self
            .http
            .post(url)
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));

        let response = self.send(request, &self.anon_key).await?;
        let session: SessionRow = read_json(response).await?;
        self.store_session(&session).await;

        Ok(session.user.map(to_user).transpose()?)
    }

    #[instrument(skip(self))]
    async fn sign_out(&self) -> AuthResult<()> {
        // The local session is gone whatever the service answers.
        let Some(token) = self.token.write().await.take() else {
            debug!("Sign-out without a held session");
            return Ok(());
        };

        let url = self.endpoint("/auth/v1/logout")?;
        let result = self.send(self.http.post(url), &token.access_token).await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                error!(error = %e, "Remote sign-out failed");
                Err(AuthError::from(e))
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_user(&self) -> StoreResult<Option<User>> {
        let Some(access_token) = self.valid_access_token().await else {
            return Ok(None);
        };

        let url = self.endpoint("/auth/v1/user")?;
        let result = self.send(self.http.get(url), &access_token).await;

        let response = match result {
            Ok(response) => response,
            Err(StoreError::Api { status: 401 | 403, message }) => {
                info!(%message, "Held session is no longer valid");
                self.token.write().await.take();
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let row: AuthUserRow = read_json(response).await?;
        to_user(row).map(Some)
    }
}

// =============================================================================
// Cart Items
// =============================================================================

#[async_trait]
impl CartStore for RestClient {
    #[instrument(skip(self))]
    async fn cart_items(&self, user_id: &str) -> StoreResult<Vec<CartItemRow>> {
        let (request, bearer) = self.request(Method::GET, "/rest/v1/cart_items").await?;
        let request = request.query(&[("select", "*".to_string()), ("user_id", format!("eq.{user_id}"))]);

        let rows: Vec<CartItemRow> = read_json(self.send(request, &bearer).await?).await?;
        debug!(count = rows.len(), "Fetched cart rows");
        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn find_cart_item(
        &self,
        user_id: &str,
        product_id: &str,
    ) -> StoreResult<Option<CartItemRow>> {
        let (request, bearer) = self.request(Method::GET, "/rest/v1/cart_items").await?;
        let request = request.query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{user_id}")),
            ("product_id", format!("eq.{product_id}")),
            ("limit", "1".to_string()),
        ]);

        let rows: Vec<CartItemRow> = read_json(self.send(request, &bearer).await?).await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self), fields(user_id = %item.user_id, product_id = %item.product_id))]
    async fn insert_cart_item(&self, item: NewCartItem) -> StoreResult<CartItemRow> {
        let (request, bearer) = self.request(Method::POST, "/rest/v1/cart_items").await?;
        let request = request
            .header("Prefer", "return=representation")
            .json(&item);

        let rows: Vec<CartItemRow> = read_json(self.send(request, &bearer).await?).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Decode("insert returned no row".to_string()))
    }

    #[instrument(skip(self))]
    async fn update_cart_item_quantity(&self, item_id: &str, quantity: i64) -> StoreResult<()> {
        let (request, bearer) = self.request(Method::PATCH, "/rest/v1/cart_items").await?;
        let request = request
            .query(&[("id", format!("eq.{item_id}"))])
            .header("Prefer", "return=minimal")
            .json(&json!({ "quantity": quantity }));

        self.send(request, &bearer).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_cart_item(&self, item_id: &str) -> StoreResult<()> {
        let (request, bearer) = self.request(Method::DELETE, "/rest/v1/cart_items").await?;
        let request = request.query(&[("id", format!("eq.{item_id}"))]);

        self.send(request, &bearer).await?;
        Ok(())
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[async_trait]
impl CatalogStore for RestClient {
    #[instrument(skip(self))]
    async fn categories(&self) -> StoreResult<Vec<CategoryRow>> {
        let (request, bearer) = self.request(Method::GET, "/rest/v1/categories").await?;
        let request = request.query(&[("select", "*")]);

        read_json(self.send(request, &bearer).await?).await
    }

    #[instrument(skip(self))]
    async fn featured_articles(&self, limit: usize) -> StoreResult<Vec<ArticleRow>> {
        let (request, bearer) = self.request(Method::GET, "/rest/v1/articles").await?;
        let request = request.query(&[
            ("select", "*".to_string()),
            ("featured", "eq.true".to_string()),
            ("limit", limit.to_string()),
        ]);

        read_json(self.send(request, &bearer).await?).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StorefrontConfig {
        StorefrontConfig::new(
            Url::parse("https://project.supabase.co").unwrap(),
            "anon-key",
        )
    }

    #[test]
    fn test_error_message_extraction() {
        let cases = [
            (r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#, "Invalid login credentials"),
            (r#"{"code":400,"msg":"User already registered"}"#, "User already registered"),
            (r#"{"code":"23505","message":"duplicate key value"}"#, "duplicate key value"),
            (r#"{"error":"not_found"}"#, "not_found"),
            ("gateway down", "gateway down"),
        ];

        for (body, expected) in cases {
            assert_eq!(error_message(StatusCode::BAD_REQUEST, body), expected);
        }

        assert_eq!(error_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
    }

    #[test]
    fn test_token_needs_refresh() {
        let token = |expires_in: Option<u64>| TokenInfo {
            access_token: "at".into(),
            refresh_token: Some("rt".into()),
            expires_at: expires_in.map(|secs| Instant::now() + Duration::from_secs(secs)),
        };

        assert!(!token(Some(3600)).needs_refresh());
        assert!(token(Some(30)).needs_refresh());
        assert!(token(Some(0)).needs_refresh());
        assert!(!token(None).needs_refresh());
        assert_eq!(token(None).remaining_secs(), None);
    }

    #[test]
    fn test_endpoint_join() {
        let client = RestClient::new(&config()).unwrap();
        assert_eq!(
            client.endpoint("/rest/v1/cart_items").unwrap().as_str(),
            "https://project.supabase.co/rest/v1/cart_items"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let client = RestClient::new(&config()).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("anon-key"));

        let token = TokenInfo {
            access_token: "secret".into(),
            refresh_token: None,
            expires_at: None,
        };
        assert!(!format!("{token:?}").contains("secret"));
    }

    #[tokio::test]
    async fn test_seeded_session_from_config() {
        let mut config = config();
        config.access_token = Some("seeded".into());

        let client = RestClient::new(&config).unwrap();
        assert_eq!(client.access_token().await.as_deref(), Some("seeded"));
        assert_eq!(client.valid_access_token().await.as_deref(), Some("seeded"));
    }

    #[tokio::test]
    async fn test_without_session_no_network_calls() {
        let client = RestClient::new(&config()).unwrap();

        assert!(client.get_user().await.unwrap().is_none());
        assert!(client.sign_out().await.is_ok());
        assert!(client.access_token().await.is_none());
    }

    /// Serves a single canned HTTP response on a local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> Url {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn seeded_client(base_url: Url) -> RestClient {
        let mut config = StorefrontConfig::new(base_url, "anon-key");
        config.access_token = Some("seeded".into());
        config.http_timeout = Duration::from_secs(5);
        RestClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_sign_out_drops_token_when_service_unreachable() {
        let client = seeded_client(Url::parse("http://127.0.0.1:1").unwrap());
        assert_eq!(client.access_token().await.as_deref(), Some("seeded"));

        let err = client.sign_out().await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
        assert!(client.access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_drops_token_when_service_rejects() {
        let url = serve_once("500 Internal Server Error", r#"{"msg":"logout failed"}"#).await;
        let client = seeded_client(url);

        let err = client.sign_out().await.unwrap_err();
        assert_eq!(err, AuthError::Rejected("logout failed".into()));
        assert!(client.access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_get_user_drops_rejected_token() {
        let url = serve_once("401 Unauthorized", r#"{"msg":"invalid JWT"}"#).await;
        let client = seeded_client(url);

        assert!(client.get_user().await.unwrap().is_none());
        assert!(client.access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_get_user_resolves_seeded_session() {
        let url = serve_once(
            "200 OK",
            r#"{"id":"u-1","email":"ada@example.com","user_metadata":{"full_name":"Ada"}}"#,
        )
        .await;
        let client = seeded_client(url);

        let user = client.get_user().await.unwrap().unwrap();
        assert_eq!(user.id, "u-1");
        assert_eq!(user.display_name(), "Ada");
        assert_eq!(client.access_token().await.as_deref(), Some("seeded"));
    }
}
