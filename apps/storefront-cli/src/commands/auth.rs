//! Session commands - whoami, sign-in, sign-up, sign-out

use anyhow::{anyhow, Result};
use serde_json::json;
use storefront_core::validation::{validate_email, validate_full_name};

use crate::context::AppContext;
use crate::output;

pub fn whoami(ctx: &AppContext, json: bool) -> Result<()> {
    let state = ctx.session.state();

    if json {
        return output::json(&state);
    }

    match state.user() {
        Some(user) => println!("Signed in as {} <{}>", user.display_name(), user.email),
        None => println!("Not signed in."),
    }
    Ok(())
}

pub async fn sign_in(ctx: &AppContext, email: &str, password: &str, json: bool) -> Result<()> {
    validate_email(email)?;

    let user = ctx
        .session
        .sign_in(email, password)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;
    let token = ctx.access_token().await;

    if json {
        return output::json(&json!({ "user": user, "accessToken": token }));
    }

    match user {
        Some(user) => println!("Welcome back, {}!", user.display_name()),
        None => println!("Sign-in accepted."),
    }
    if let Some(token) = token {
        println!();
        println!("export STOREFRONT_ACCESS_TOKEN={token}");
    }
    Ok(())
}

pub async fn sign_up(
    ctx: &AppContext,
    email: &str,
    password: &str,
    full_name: &str,
    json: bool,
) -> Result<()> {
    if validate_full_name(full_name).is_err() {
        return Err(anyhow!("Please enter your full name"));
    }
    validate_email(email)?;

    let user = ctx
        .session
        .sign_up(email, password, full_name)
        .await
        .map_err(|e| anyhow!(e.user_message()))?;

    if json {
        return output::json(&json!({ "user": user }));
    }

    match user {
        Some(user) => println!("Account created for {}.", user.display_name()),
        None => println!("Check your email to confirm the account."),
    }
    Ok(())
}

pub async fn sign_out(ctx: &mut AppContext, json: bool) -> Result<()> {
    ctx.session.sign_out().await;
    ctx.cart.reset();

    if json {
        return output::json(&ctx.session.state());
    }

    println!("Signed out.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::{DEMO_EMAIL, DEMO_PASSWORD};

    #[tokio::test]
    async fn test_sign_up_checks_form_before_calling_the_service() {
        let ctx = AppContext::offline();

        let err = sign_up(&ctx, "new@example.com", "secret123", "  ", true)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter your full name");

        let err = sign_up(&ctx, "not-an-email", "secret123", "Ada", true)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("email has invalid format"));
    }

    #[tokio::test]
    async fn test_sign_in_rejects_malformed_email() {
        let ctx = AppContext::offline();
        ctx.session.initialize().await;
        ctx.session.sign_out().await;

        let err = sign_in(&ctx, "demo", DEMO_PASSWORD, true).await.unwrap_err();
        assert!(err.to_string().starts_with("email has invalid format"));
        assert!(ctx.session.current_user().is_none());

        sign_in(&ctx, DEMO_EMAIL, DEMO_PASSWORD, true).await.unwrap();
        assert_eq!(ctx.session.current_user().unwrap().email, DEMO_EMAIL);
    }
}
