//! Demo store for `--offline`.
//!
//! Seeds a signed-in demo account with a small cart, a few categories and a
//! featured feed, so every command can be tried without a backend. Changes
//! last for one invocation only.

use storefront_client::MemoryBackend;

pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_PASSWORD: &str = "demo1234";

const CATEGORIES: &[(&str, &str, &str)] = &[
    ("1", "Electronics", "electronics"),
    ("2", "Fashion", "fashion"),
    ("3", "Home", "home"),
    ("4", "Books", "books"),
    ("5", "Garden", "garden"),
];

const ARTICLES: &[(&str, &str, bool)] = &[
    ("101", "Wireless Headphones", true),
    ("102", "Smart Watch", true),
    ("103", "Bluetooth Speaker", true),
    ("104", "Running Shoes", true),
    ("105", "Desk Lamp", true),
    ("106", "Phone Case", true),
    ("107", "Travel Mug", true),
    ("108", "Notebook Set", false),
];

/// Builds the seeded in-memory backend.
pub fn backend() -> MemoryBackend {
    let backend = MemoryBackend::new();

    for (id, name, slug) in CATEGORIES {
        backend.add_category(id, name, slug);
    }
    for (id, title, featured) in ARTICLES {
        backend.add_article(id, title, *featured);
    }

    let user = backend.add_account(DEMO_EMAIL, DEMO_PASSWORD, Some("Demo Shopper"));
    backend.restore_session(DEMO_EMAIL);
    backend.add_cart_row(&user.id, "101", 1);
    backend.add_cart_row(&user.id, "104", 2);

    backend
}
