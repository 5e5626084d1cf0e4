//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      User       │   │     Product     │   │    CartItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  email          │   │  name           │   │  product_id     │       │
//! │  │  full_name?     │   │  price ≥ 0      │   │  user_id        │       │
//! │  │  avatar_url?    │   │  rating 0..=5   │   │  quantity ≥ 1   │       │
//! │  └─────────────────┘   └─────────────────┘   │  product?       │       │
//! │                                              └─────────────────┘       │
//! │  ┌─────────────────┐                                                   │
//! │  │    Category     │   Invariant-bearing fields (price, quantity) are  │
//! │  │  id, name, slug │   private and only set through validating         │
//! │  │  icon           │   constructors and setters.                       │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Remote rows are never deserialized straight into these types; the client
//! crate parses wire rows first and converts them with the constructors here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::validation::{
    validate_price, validate_quantity, validate_rating, validate_required, ValidationResult,
};
use crate::PLACEHOLDER_IMAGE;

// =============================================================================
// User
// =============================================================================

/// The signed-in shopper as reported by the credential service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl User {
    /// Creates a user. The id is required; the email may be empty when the
    /// provider signed the user in by other means.
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> ValidationResult<Self> {
        let id = id.into();
        validate_required("id", &id)?;

        Ok(User {
            id,
            email: email.into(),
            full_name: None,
            avatar_url: None,
        })
    }

    pub fn with_full_name(mut self, full_name: Option<String>) -> Self {
        self.full_name = full_name.filter(|name| !name.trim().is_empty());
        self
    }

    pub fn with_avatar_url(mut self, avatar_url: Option<String>) -> Self {
        self.avatar_url = avatar_url.filter(|url| !url.trim().is_empty());
        self
    }

    /// Name to greet the user with: full name when known, else the email.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}

// =============================================================================
// Category
// =============================================================================

/// A browsable product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    /// Display glyph chosen from the category name.
    pub icon: String,
}

/// Fallback glyph for categories without a dedicated icon.
const DEFAULT_CATEGORY_ICON: &str = "📦";

const CATEGORY_ICONS: &[(&str, &str)] = &[
    ("Electronics", "📱"),
    ("Fashion", "👕"),
    ("Home", "🏠"),
    ("Beauty", "💄"),
    ("Sports", "⚽"),
    ("Books", "📚"),
    ("Toys", "🧸"),
    ("Groceries", "🛒"),
];

/// Returns the display icon for a category name (exact, case-sensitive match).
pub fn category_icon(name: &str) -> &'static str {
    CATEGORY_ICONS
        .iter()
        .find(|(category, _)| *category == name)
        .map(|(_, icon)| *icon)
        .unwrap_or(DEFAULT_CATEGORY_ICON)
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        slug: impl Into<String>,
    ) -> ValidationResult<Self> {
        let id = id.into();
        let name = name.into();
        validate_required("id", &id)?;
        validate_required("name", &name)?;

        let icon = category_icon(&name).to_string();
        Ok(Category {
            id,
            name,
            slug: slug.into(),
            icon,
        })
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product as shown in listings and joined onto cart lines.
///
/// ## Invariants
/// - `price >= 0` and `original_price >= 0`
/// - `0.0 <= rating <= 5.0`
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    id: String,
    name: String,
    price: Money,
    original_price: Option<Money>,
    image: String,
    rating: f32,
    stock: Option<u32>,
    description: Option<String>,
}

impl Product {
    /// Creates a product with the placeholder image and no rating.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::{Money, Product};
    ///
    /// assert!(Product::new("p1", "Wireless Mouse", Money::from_cents(2999)).is_ok());
    /// assert!(Product::new("p2", "Broken", Money::from_cents(-1)).is_err());
    /// ```
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Money,
    ) -> ValidationResult<Self> {
        let id = id.into();
        validate_required("id", &id)?;
        validate_price("price", price)?;

        Ok(Product {
            id,
            name: name.into(),
            price,
            original_price: None,
            image: PLACEHOLDER_IMAGE.to_string(),
            rating: 0.0,
            stock: None,
            description: None,
        })
    }

    /// Sets the pre-sale price shown struck through next to `price`.
    pub fn with_original_price(mut self, original_price: Money) -> ValidationResult<Self> {
        validate_price("original_price", original_price)?;
        self.original_price = Some(original_price);
        Ok(self)
    }

    pub fn with_rating(mut self, rating: f32) -> ValidationResult<Self> {
        validate_rating(rating)?;
        self.rating = rating;
        Ok(self)
    }

    /// Empty strings keep the placeholder image.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        let image = image.into();
        if !image.trim().is_empty() {
            self.image = image;
        }
        self
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn original_price(&self) -> Option<Money> {
        self.original_price
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    pub fn rating(&self) -> f32 {
        self.rating
    }

    pub fn stock(&self) -> Option<u32> {
        self.stock
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Percentage off the original price, rounded to the nearest whole
    /// percent ("27% OFF" badge). `None` unless the product is marked down.
    pub fn discount_percent(&self) -> Option<u32> {
        let original = self.original_price?;
        if original.cents() <= 0 || original <= self.price {
            return None;
        }

        let saved = (original - self.price).cents() as i128;
        let percent = (saved * 100 * 2 + original.cents() as i128) / (original.cents() as i128 * 2);
        Some(percent as u32)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One line of a shopper's cart.
///
/// ## Invariants
/// - `quantity >= 1`; there is no zero-quantity line, removal deletes it
/// - At most one line per `(user_id, product_id)`. This is enforced by the
///   ledger that owns the list, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    id: String,
    product_id: String,
    user_id: String,
    quantity: i64,
    /// Product snapshot joined for display and pricing, when available.
    product: Option<Product>,
}

impl CartItem {
    pub fn new(
        id: impl Into<String>,
        product_id: impl Into<String>,
        user_id: impl Into<String>,
        quantity: i64,
    ) -> ValidationResult<Self> {
        let id = id.into();
        let product_id = product_id.into();
        let user_id = user_id.into();
        validate_required("id", &id)?;
        validate_required("product_id", &product_id)?;
        validate_required("user_id", &user_id)?;
        validate_quantity(quantity)?;

        Ok(CartItem {
            id,
            product_id,
            user_id,
            quantity,
            product: None,
        })
    }

    /// Joins a product snapshot. Ignored when the ids do not match.
    pub fn with_product(mut self, product: Product) -> Self {
        if product.id() == self.product_id {
            self.product = Some(product);
        }
        self
    }

    /// In-place form of [`CartItem::with_product`]. Returns whether the
    /// snapshot was attached.
    pub fn attach_product(&mut self, product: Product) -> bool {
        if product.id() != self.product_id {
            return false;
        }
        self.product = Some(product);
        true
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn product(&self) -> Option<&Product> {
        self.product.as_ref()
    }

    /// Replaces the quantity; values below 1 are rejected and leave the
    /// line untouched.
    pub fn set_quantity(&mut self, quantity: i64) -> ValidationResult<()> {
        validate_quantity(quantity)?;
        self.quantity = quantity;
        Ok(())
    }

    /// Adds to the quantity (re-adding a product already in the cart).
    pub fn increase_quantity(&mut self, by: i64) -> ValidationResult<()> {
        validate_quantity(by)?;
        self.set_quantity(self.quantity.saturating_add(by))
    }

    /// Line total from the joined snapshot, `None` when no product is joined.
    pub fn line_total(&self) -> Option<Money> {
        self.product
            .as_ref()
            .map(|product| product.price().multiply_quantity(self.quantity))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;

    #[test]
    fn test_user_display_name() {
        let user = User::new("u1", "ada@example.com").unwrap();
        assert_eq!(user.display_name(), "ada@example.com");

        let user = user.with_full_name(Some("Ada Lovelace".into()));
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_user_blank_metadata_is_dropped() {
        let user = User::new("u1", "ada@example.com")
            .unwrap()
            .with_full_name(Some("   ".into()))
            .with_avatar_url(Some(String::new()));
        assert!(user.full_name.is_none());
        assert!(user.avatar_url.is_none());
    }

    #[test]
    fn test_user_requires_id() {
        assert!(matches!(
            User::new("", "ada@example.com"),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_category_icons() {
        assert_eq!(Category::new("c1", "Electronics", "electronics").unwrap().icon, "📱");
        assert_eq!(Category::new("c2", "Groceries", "groceries").unwrap().icon, "🛒");
        assert_eq!(Category::new("c3", "Garden", "garden").unwrap().icon, "📦");
        // Lookup is case-sensitive
        assert_eq!(category_icon("books"), "📦");
    }

    #[test]
    fn test_product_rejects_negative_prices() {
        assert!(Product::new("p1", "Mouse", Money::from_cents(-1)).is_err());

        let product = Product::new("p1", "Mouse", Money::from_cents(2999)).unwrap();
        assert!(product.with_original_price(Money::from_cents(-5)).is_err());
    }

    #[test]
    fn test_product_rating_bounds() {
        let product = Product::new("p1", "Mouse", Money::zero()).unwrap();
        assert!(product.clone().with_rating(4.5).is_ok());
        assert!(product.clone().with_rating(5.5).is_err());
        assert!(product.with_rating(-0.1).is_err());
    }

    #[test]
    fn test_product_image_defaults_to_placeholder() {
        let product = Product::new("p1", "Mouse", Money::zero()).unwrap().with_image("");
        assert_eq!(product.image(), PLACEHOLDER_IMAGE);

        let product = product.with_image("https://cdn.example.com/mouse.png");
        assert_eq!(product.image(), "https://cdn.example.com/mouse.png");
    }

    #[test]
    fn test_discount_percent() {
        let product = Product::new("p1", "Phone", Money::from_cents(69_999))
            .unwrap()
            .with_original_price(Money::from_cents(89_999))
            .unwrap();
        // (899.99 - 699.99) / 899.99 = 22.2%
        assert_eq!(product.discount_percent(), Some(22));

        let full_price = Product::new("p2", "Case", Money::from_cents(1000))
            .unwrap()
            .with_original_price(Money::from_cents(1000))
            .unwrap();
        assert_eq!(full_price.discount_percent(), None);

        let no_original = Product::new("p3", "Cable", Money::from_cents(1000)).unwrap();
        assert_eq!(no_original.discount_percent(), None);
    }

    #[test]
    fn test_cart_item_rejects_quantity_below_one() {
        assert!(CartItem::new("c1", "p1", "u1", 0).is_err());
        assert!(CartItem::new("c1", "p1", "u1", -1).is_err());
        assert!(CartItem::new("c1", "p1", "u1", 1).is_ok());
    }

    #[test]
    fn test_cart_item_set_quantity_keeps_value_on_rejection() {
        let mut item = CartItem::new("c1", "p1", "u1", 3).unwrap();

        assert!(item.set_quantity(0).is_err());
        assert!(item.set_quantity(-1).is_err());
        assert_eq!(item.quantity(), 3);

        item.set_quantity(5).unwrap();
        assert_eq!(item.quantity(), 5);

        item.increase_quantity(2).unwrap();
        assert_eq!(item.quantity(), 7);
    }

    #[test]
    fn test_cart_item_line_total() {
        let product = Product::new("p1", "Mouse", Money::from_cents(2000)).unwrap();
        let item = CartItem::new("c1", "p1", "u1", 2).unwrap();
        assert_eq!(item.line_total(), None);

        let item = item.with_product(product);
        assert_eq!(item.line_total(), Some(Money::from_cents(4000)));
    }

    #[test]
    fn test_cart_item_ignores_mismatched_product() {
        let other = Product::new("p2", "Keyboard", Money::from_cents(5999)).unwrap();
        let mut item = CartItem::new("c1", "p1", "u1", 1).unwrap().with_product(other.clone());
        assert!(item.product().is_none());

        assert!(!item.attach_product(other));
        let mouse = Product::new("p1", "Mouse", Money::from_cents(2000)).unwrap();
        assert!(item.attach_product(mouse));
        assert_eq!(item.line_total(), Some(Money::from_cents(2000)));
    }
}
