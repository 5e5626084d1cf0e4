//! CLI command implementations

pub mod auth;
pub mod cart;
pub mod catalog;

use anyhow::{anyhow, Result};
use storefront_core::User;

use crate::context::AppContext;

/// The signed-in user, or an error telling how to sign in.
pub fn require_user(ctx: &AppContext) -> Result<User> {
    ctx.session
        .current_user()
        .ok_or_else(|| anyhow!("Not signed in. Run `storefront sign-in <email>` first"))
}
