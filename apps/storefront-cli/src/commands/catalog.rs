//! Catalog commands - categories, featured, search

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use storefront_core::catalog::{ProductQuery, SortOrder, DEFAULT_MAX_PRICE};
use storefront_core::validation::{validate_rating, validate_search_query};
use storefront_core::Money;

use crate::context::AppContext;
use crate::output;

pub async fn categories(ctx: &AppContext, json: bool) -> Result<()> {
    let categories = ctx.catalog.categories().await;

    if json {
        return output::json(&categories);
    }

    if categories.is_empty() {
        println!("No categories found.");
    }
    for category in &categories {
        println!("{} {:<20} {}", category.icon, category.name, category.slug);
    }
    Ok(())
}

pub async fn featured(ctx: &AppContext, json: bool) -> Result<()> {
    let products = ctx.catalog.featured_products().await;

    if json {
        return output::json(&products);
    }

    output::product_lines(&products);
    Ok(())
}

/// Turns the command-line filters into a query. Prices are given in dollars.
pub fn build_query(
    text: String,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
    min_rating: f32,
    sort: SortOrder,
) -> Result<ProductQuery> {
    let text = validate_search_query(&text)?;
    validate_rating(min_rating)?;

    let min = match min_price {
        Some(amount) => Money::from_decimal(amount).context("Invalid --min-price")?,
        None => Money::zero(),
    };
    let max = match max_price {
        Some(amount) => Money::from_decimal(amount).context("Invalid --max-price")?,
        None => DEFAULT_MAX_PRICE,
    };

    Ok(ProductQuery::new(text)
        .with_price_range(min, max)
        .with_min_rating(min_rating)
        .with_sort(sort))
}

pub async fn search(ctx: &AppContext, query: &ProductQuery, json: bool) -> Result<()> {
    let results = ctx.catalog.search(query).await;

    if json {
        return output::json(&results);
    }

    output::product_lines(&results);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_query_defaults() {
        let query = build_query("  shoes ".into(), None, None, 0.0, SortOrder::Relevance).unwrap();
        assert_eq!(query, ProductQuery::new("shoes"));
    }

    #[test]
    fn test_build_query_converts_dollars() {
        let query = build_query(
            "lamp".into(),
            Some(Decimal::new(10, 0)),
            Some(Decimal::new(4999, 2)),
            4.0,
            SortOrder::PriceLowHigh,
        )
        .unwrap();
        assert_eq!(query.min_price, Money::from_cents(1_000));
        assert_eq!(query.max_price, Money::from_cents(4_999));
        assert_eq!(query.sort, SortOrder::PriceLowHigh);
    }

    #[test]
    fn test_build_query_rejects_bad_rating() {
        assert!(build_query("lamp".into(), None, None, 7.5, SortOrder::Rating).is_err());
    }
}
