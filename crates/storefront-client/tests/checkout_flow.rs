//! End-to-end walk through a shopping session against the in-memory store:
//! startup, sign-in, browse, cart edits, promo, summary, sign-out.

use std::sync::Arc;

use storefront_client::{
    AuthError, CartLedger, CatalogService, MemoryBackend, SessionManager, SessionState,
};
use storefront_core::catalog::ProductQuery;
use storefront_core::pricing::price_index;
use storefront_core::Money;

fn seeded_backend() -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::new());
    backend.add_account("ada@example.com", "secret123", Some("Ada Lovelace"));
    backend.add_category("1", "Electronics", "electronics");
    backend.add_category("2", "Books", "books");
    backend.add_article("a1", "Wireless Headphones", true);
    backend.add_article("a2", "Smart Watch", true);
    backend.add_article("a3", "Archived Post", false);
    backend
}

#[tokio::test]
async fn test_full_checkout_flow() {
    let backend = seeded_backend();
    let session = SessionManager::new(backend.clone());
    let catalog = CatalogService::new(backend.clone());
    let mut cart = CartLedger::new(backend.clone());

    // Startup: no stored session
    assert!(session.is_loading());
    session.initialize().await;
    assert_eq!(session.state(), SessionState::Anonymous);

    // Wrong password surfaces the service message and changes nothing
    let err = session.sign_in("ada@example.com", "nope").await.unwrap_err();
    assert_eq!(err, AuthError::Rejected("Invalid login credentials".into()));
    assert!(session.current_user().is_none());

    let user = session
        .sign_in("ada@example.com", "secret123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.display_name(), "Ada Lovelace");

    // Browse
    let categories = catalog.categories().await;
    assert_eq!(categories.len(), 2);
    let featured = catalog.featured_products().await;
    assert_eq!(featured.len(), 2);
    let headphones = catalog.search(&ProductQuery::new("headphones")).await;
    assert_eq!(headphones.len(), 1);

    // Cart
    assert!(cart.load(&user.id).await.is_empty());
    assert!(cart.add_item(&user.id, "a1", 1).await);
    assert!(cart.add_item(&user.id, "a1", 1).await);
    assert!(cart.add_item(&user.id, "a2", 3).await);
    assert_eq!(backend.cart_rows().len(), 2);

    cart.set_prices(price_index(&featured));
    cart.load(&user.id).await;
    assert_eq!(cart.item_count(), 2);
    assert_eq!(cart.total_quantity(), 5);

    let a1 = featured.iter().find(|p| p.id() == "a1").unwrap().price();
    let a2 = featured.iter().find(|p| p.id() == "a2").unwrap().price();
    let expected_subtotal = a1 * 2 + a2 * 3;

    let summary = cart.summary();
    assert_eq!(summary.subtotal, expected_subtotal);
    assert_eq!(summary.total, expected_subtotal + Money::from_cents(599));

    // Promo code, then a decrement that the ledger refuses
    let promo = cart.apply_promo("save10");
    assert!(promo.accepted);
    assert_eq!(promo.discount, expected_subtotal.percentage(1000));

    let a2_line = cart
        .items()
        .iter()
        .find(|item| item.product_id() == "a2")
        .unwrap()
        .id()
        .to_string();
    assert!(!cart.set_quantity(&a2_line, 0).await);
    assert_eq!(cart.total_quantity(), 5);

    // Remove a line; the discount follows the new subtotal
    assert!(cart.remove_item(&a2_line).await);
    let summary = cart.summary();
    assert_eq!(summary.subtotal, a1 * 2);
    assert_eq!(summary.discount, (a1 * 2).percentage(1000));
    assert_eq!(
        summary.total,
        summary.subtotal - summary.discount + summary.delivery_fee
    );

    // Sign-out with a failing remote still clears the user
    backend.set_fail_sign_out(true);
    session.sign_out().await;
    cart.reset();
    assert!(session.current_user().is_none());
    assert!(cart.is_empty());

    // The stored cart survives for the next session
    assert_eq!(backend.cart_rows().len(), 1);
}

#[tokio::test]
async fn test_resumed_session_loads_saved_cart() {
    let backend = seeded_backend();
    assert!(backend.restore_session("ada@example.com"));
    let user_id = backend.session_user_id().unwrap();
    backend.add_cart_row(&user_id, "a1", 2);

    let session = SessionManager::new(backend.clone());
    let user = session.initialize().await.unwrap();
    assert_eq!(user.id, user_id);

    let mut cart = CartLedger::new(backend);
    assert_eq!(cart.load(&user.id).await.len(), 1);
}
