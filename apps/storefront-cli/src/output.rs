//! Output formatting utilities

use anyhow::Result;
use serde::Serialize;
use storefront_core::{CartItem, PriceSummary, Product};

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("Error: {msg}");
}

/// Print a machine-readable value
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One product per line: id, name, price, rating
pub fn product_lines(products: &[Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }

    for product in products {
        let badge = product
            .discount_percent()
            .map(|percent| format!("  {percent}% OFF"))
            .unwrap_or_default();
        println!(
            "{:<8} {:<28} {:>10}  ★ {:.1}{}",
            product.id(),
            product.name(),
            product.price().to_string(),
            product.rating(),
            badge
        );
    }
}

pub fn cart_lines(items: &[CartItem]) {
    if items.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for item in items {
        let name = item.product().map(Product::name).unwrap_or(item.product_id());
        let line_total = item
            .line_total()
            .map(|total| total.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<38} {:<28} x{:<4} {:>10}",
            item.id(),
            name,
            item.quantity(),
            line_total
        );
    }
}

pub fn summary(summary: &PriceSummary) {
    println!();
    println!("{:<14}{:>12}", "Subtotal", summary.subtotal.to_string());
    if !summary.discount.is_zero() {
        println!("{:<14}{:>12}", "Discount", format!("-{}", summary.discount));
    }
    println!("{:<14}{:>12}", "Delivery", summary.delivery_fee.to_string());
    println!("{:<14}{:>12}", "Total", summary.total.to_string());
}
