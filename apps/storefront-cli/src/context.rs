//! Wiring of the components for one CLI invocation.

use std::sync::Arc;

use anyhow::{Context, Result};
use storefront_client::{
    CartLedger, CatalogService, RestClient, SessionManager, StorefrontConfig,
};

use crate::demo;

/// The components a command works with. Built once per process.
pub struct AppContext {
    pub session: SessionManager,
    pub cart: CartLedger,
    pub catalog: CatalogService,
    /// Present when talking to the remote service; used to print the
    /// access token after sign-in.
    pub rest: Option<Arc<RestClient>>,
}

impl AppContext {
    /// Connects to the remote service configured in the environment.
    pub fn from_env() -> Result<Self> {
        let config = StorefrontConfig::from_env()
            .context("Set SUPABASE_URL and SUPABASE_ANON_KEY, or pass --offline")?;
        tracing::debug!(?config, "Configuration loaded");

        let rest = Arc::new(RestClient::new(&config).context("Failed to build HTTP client")?);

        Ok(AppContext {
            session: SessionManager::new(rest.clone()),
            cart: CartLedger::new(rest.clone()).with_delivery_fee(config.delivery_fee),
            catalog: CatalogService::new(rest.clone()).with_featured_limit(config.featured_limit),
            rest: Some(rest),
        })
    }

    /// Uses the in-process demo store.
    pub fn offline() -> Self {
        let backend = Arc::new(demo::backend());

        AppContext {
            session: SessionManager::new(backend.clone()),
            cart: CartLedger::new(backend.clone()),
            catalog: CatalogService::new(backend),
            rest: None,
        }
    }

    /// Access token of the current remote session, if any.
    pub async fn access_token(&self) -> Option<String> {
        match &self.rest {
            Some(rest) => rest.access_token().await,
            None => None,
        }
    }
}
