//! # Wire Rows
//!
//! Serde shapes of the JSON the remote store returns, kept apart from the
//! domain types. Each row converts into its domain type with `TryFrom`, which
//! runs the domain constructors' checks.
//!
//! ```text
//! JSON ──serde──► CartItemRow ──TryFrom──► CartItem   (quantity ≥ 1 checked)
//! JSON ──serde──► CategoryRow ──TryFrom──► Category   (icon assigned)
//! JSON ──serde──► ArticleRow  ──TryFrom──► Product    (feed attributes derived)
//! JSON ──serde──► AuthUserRow ──TryFrom──► User       (metadata flattened)
//! ```
//!
//! Ids are accepted as JSON strings or integers, since tables keyed by
//! serial integers and by UUIDs are both common on the backend.

use serde::{Deserialize, Deserializer, Serialize};
use storefront_core::catalog::feed_attributes;
use storefront_core::{CartItem, Category, Product, User, ValidationError};

// =============================================================================
// Id Helper
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

// =============================================================================
// Cart Items
// =============================================================================

/// A row of the `cart_items` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItemRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(deserialize_with = "id_string")]
    pub product_id: String,
    pub user_id: String,
    pub quantity: i64,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = ValidationError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        CartItem::new(row.id, row.product_id, row.user_id, row.quantity)
    }
}

/// Body of a cart insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCartItem {
    pub user_id: String,
    pub product_id: String,
    pub quantity: i64,
}

// =============================================================================
// Catalog
// =============================================================================

/// A row of the `categories` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = ValidationError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let slug = row.slug.unwrap_or_else(|| row.name.to_lowercase());
        Category::new(row.id, row.name, slug)
    }
}

/// A row of the `articles` table, used as the featured product feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleRow {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl TryFrom<ArticleRow> for Product {
    type Error = ValidationError;

    fn try_from(row: ArticleRow) -> Result<Self, Self::Error> {
        let attrs = feed_attributes(&row.id);

        Ok(Product::new(row.id, row.title, attrs.price)?
            .with_original_price(attrs.original_price)?
            .with_rating(attrs.rating)?
            .with_stock(attrs.stock)
            .with_image(row.image_url.unwrap_or_default())
            .with_description(row.excerpt.unwrap_or_default()))
    }
}

// =============================================================================
// Auth Payloads
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// The user object returned by the credential service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUserRow {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Option<UserMetadata>,
}

impl TryFrom<AuthUserRow> for User {
    type Error = ValidationError;

    fn try_from(row: AuthUserRow) -> Result<Self, Self::Error> {
        let metadata = row.user_metadata.unwrap_or_default();

        Ok(User::new(row.id, row.email.unwrap_or_default())?
            .with_full_name(metadata.full_name)
            .with_avatar_url(metadata.avatar_url))
    }
}

/// Token grant returned by sign-in, refresh and (when confirmation is off)
/// sign-up.
#[derive(Clone, Deserialize)]
pub struct SessionRow {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<AuthUserRow>,
}

impl std::fmt::Debug for SessionRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRow")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish()
    }
}

/// Sign-up answers with a full session when the account is usable right
/// away, or with the bare user while email confirmation is pending.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUpResponse {
    Session(SessionRow),
    User(AuthUserRow),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cart_item_row_accepts_numeric_ids() {
        let row: CartItemRow = serde_json::from_value(json!({
            "id": 17,
            "product_id": "p1",
            "user_id": "u1",
            "quantity": 2,
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(row.id, "17");
        let item = CartItem::try_from(row).unwrap();
        assert_eq!(item.quantity(), 2);
    }

    #[test]
    fn test_cart_item_row_with_zero_quantity_is_rejected() {
        let row = CartItemRow {
            id: "c1".into(),
            product_id: "p1".into(),
            user_id: "u1".into(),
            quantity: 0,
        };
        assert!(matches!(
            CartItem::try_from(row),
            Err(ValidationError::MustBePositive { .. })
        ));
    }

    #[test]
    fn test_category_row_gets_icon() {
        let row: CategoryRow =
            serde_json::from_value(json!({"id": 1, "name": "Books", "slug": "books"})).unwrap();
        let category = Category::try_from(row).unwrap();
        assert_eq!(category.id, "1");
        assert_eq!(category.icon, "📚");
    }

    #[test]
    fn test_article_row_to_product() {
        let row: ArticleRow = serde_json::from_value(json!({
            "id": "a1",
            "title": "Noise Cancelling Headphones",
            "excerpt": null,
            "image_url": null,
            "featured": true
        }))
        .unwrap();

        let product = Product::try_from(row).unwrap();
        assert_eq!(product.name(), "Noise Cancelling Headphones");
        assert_eq!(product.image(), storefront_core::PLACEHOLDER_IMAGE);
        assert_eq!(product.description(), Some(""));
        assert_eq!(product.price(), feed_attributes("a1").price);
        assert!(product.stock().is_some());
    }

    #[test]
    fn test_auth_user_row_flattens_metadata() {
        let row: AuthUserRow = serde_json::from_value(json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "email": null,
            "user_metadata": {"full_name": "Ada Lovelace"}
        }))
        .unwrap();

        let user = User::try_from(row).unwrap();
        assert_eq!(user.email, "");
        assert_eq!(user.full_name.as_deref(), Some("Ada Lovelace"));
        assert!(user.avatar_url.is_none());
    }

    #[test]
    fn test_sign_up_response_shapes() {
        let session: SignUpResponse = serde_json::from_value(json!({
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "user": {"id": "u1", "email": "a@b.co"}
        }))
        .unwrap();
        assert!(matches!(session, SignUpResponse::Session(_)));

        let pending: SignUpResponse =
            serde_json::from_value(json!({"id": "u1", "email": "a@b.co"})).unwrap();
        assert!(matches!(pending, SignUpResponse::User(_)));
    }

    #[test]
    fn test_session_row_debug_redacts_tokens() {
        let row: SessionRow = serde_json::from_value(json!({
            "access_token": "secret-access",
            "refresh_token": "secret-refresh"
        }))
        .unwrap();
        let debug = format!("{row:?}");
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
    }
}
