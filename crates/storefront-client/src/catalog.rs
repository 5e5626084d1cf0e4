//! Catalog service: categories and the featured product feed.
//!
//! Both reads fall back to an empty list when the store fails; the home
//! screen then renders its empty state.

use std::sync::Arc;

use storefront_core::catalog::{search_products, ProductQuery};
use storefront_core::{Category, Product, FEATURED_PRODUCT_LIMIT};
use tracing::{debug, error, warn};

use crate::store::CatalogStore;

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    featured_limit: usize,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        CatalogService {
            store,
            featured_limit: FEATURED_PRODUCT_LIMIT,
        }
    }

    pub fn with_featured_limit(mut self, limit: usize) -> Self {
        self.featured_limit = limit;
        self
    }

    /// All categories, each with its display icon.
    pub async fn categories(&self) -> Vec<Category> {
        let rows = match self.store.categories().await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "Error fetching categories");
                return Vec::new();
            }
        };

        rows.into_iter()
            .filter_map(|row| {
                let row_id = row.id.clone();
                Category::try_from(row)
                    .map_err(|e| warn!(category_id = %row_id, error = %e, "Skipping invalid category"))
                    .ok()
            })
            .collect()
    }

    /// Featured articles presented as products.
    pub async fn featured_products(&self) -> Vec<Product> {
        let rows = match self.store.featured_articles(self.featured_limit).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "Error fetching featured products");
                return Vec::new();
            }
        };

        let products: Vec<Product> = rows
            .into_iter()
            .filter_map(|row| {
                let row_id = row.id.clone();
                Product::try_from(row)
                    .map_err(|e| warn!(article_id = %row_id, error = %e, "Skipping invalid article"))
                    .ok()
            })
            .collect();

        debug!(count = products.len(), "Featured products loaded");
        products
    }

    /// Runs a search over the featured feed, the only product listing the
    /// store exposes.
    pub async fn search(&self, query: &ProductQuery) -> Vec<Product> {
        let listing = self.featured_products().await;
        search_products(&listing, query)
    }
}
