//! Cart commands - show, add, set-quantity, remove
//!
//! Each command loads the signed-in user's cart, performs its change and
//! prints the refreshed cart with its price summary. Prices come from the
//! featured feed.

use anyhow::{bail, Result};
use serde_json::json;
use storefront_core::pricing::price_index;

use super::require_user;
use crate::context::AppContext;
use crate::output;

/// Loads the cart for the signed-in user and attaches feed prices.
async fn load(ctx: &mut AppContext) -> Result<String> {
    let user = require_user(ctx)?;
    let products = ctx.catalog.featured_products().await;

    ctx.cart.load(&user.id).await;
    ctx.cart.set_prices(price_index(&products));
    ctx.cart.attach_products(&products);
    Ok(user.id)
}

fn print_cart(ctx: &mut AppContext, json: bool) -> Result<()> {
    let summary = ctx.cart.summary();

    if json {
        return output::json(&json!({
            "items": ctx.cart.items(),
            "promo": ctx.cart.promo(),
            "summary": summary,
        }));
    }

    output::cart_lines(ctx.cart.items());
    if let Some(promo) = ctx.cart.promo() {
        println!();
        println!("Promo code {} applied", promo.code);
    }
    output::summary(&summary);
    Ok(())
}

pub async fn show(ctx: &mut AppContext, promo: Option<&str>, json: bool) -> Result<()> {
    load(ctx).await?;

    if let Some(code) = promo {
        if !ctx.cart.apply_promo(code).accepted {
            bail!("Promo code \"{code}\" is not valid");
        }
    }

    print_cart(ctx, json)
}

pub async fn add(ctx: &mut AppContext, product_id: &str, quantity: i64, json: bool) -> Result<()> {
    let user_id = load(ctx).await?;

    if !ctx.cart.add_item(&user_id, product_id, quantity).await {
        bail!("Could not add {product_id} to the cart");
    }

    load(ctx).await?;
    print_cart(ctx, json)
}

pub async fn set_quantity(
    ctx: &mut AppContext,
    item_id: &str,
    quantity: i64,
    json: bool,
) -> Result<()> {
    load(ctx).await?;

    if quantity < 1 {
        bail!("Quantity must be at least 1. Use `storefront remove` to drop a line");
    }
    if !ctx.cart.set_quantity(item_id, quantity).await {
        bail!("Could not update cart line {item_id}");
    }

    print_cart(ctx, json)
}

pub async fn remove(ctx: &mut AppContext, item_id: &str, json: bool) -> Result<()> {
    load(ctx).await?;

    if !ctx.cart.remove_item(item_id).await {
        bail!("Could not remove cart line {item_id}");
    }

    print_cart(ctx, json)
}
