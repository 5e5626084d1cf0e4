//! Storefront CLI - browse, sign in and manage a cart from the terminal
//!
//! ## Session Handling
//! Every invocation is a fresh process. After `sign-in` the access token is
//! printed; export it as `STOREFRONT_ACCESS_TOKEN` so later commands resume
//! the session during startup resolution.

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use storefront_core::catalog::SortOrder;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod demo;
mod output;

use commands::{auth, cart, catalog};
use context::AppContext;

/// Storefront - shop from your terminal
#[derive(Parser)]
#[command(name = "storefront", version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Use an in-process demo store instead of the remote service
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show who is signed in
    Whoami,

    /// Sign in with email and password
    SignIn {
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    SignUp {
        email: String,
        #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
        password: String,
        /// Display name for the new account
        #[arg(long, default_value = "")]
        full_name: String,
    },

    /// End the current session
    SignOut,

    /// List product categories
    Categories,

    /// List featured products
    Featured,

    /// Search products by name
    Search {
        text: String,
        /// Lowest price, in dollars
        #[arg(long)]
        min_price: Option<rust_decimal::Decimal>,
        /// Highest price, in dollars
        #[arg(long)]
        max_price: Option<rust_decimal::Decimal>,
        /// Minimum star rating (0 disables)
        #[arg(long, default_value_t = 0.0)]
        min_rating: f32,
        /// relevance, price_low_high, price_high_low or rating
        #[arg(long, default_value_t = SortOrder::Relevance)]
        sort: SortOrder,
    },

    /// Show the cart and its price summary
    Cart {
        /// Promo code to apply
        #[arg(long)]
        promo: Option<String>,
    },

    /// Add a product to the cart
    Add {
        product_id: String,
        #[arg(long, default_value_t = 1)]
        quantity: i64,
    },

    /// Change the quantity of a cart line
    SetQuantity {
        item_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a cart line
    Remove { item_id: String },
}

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - ERROR: store failures swallowed into fallbacks
/// - WARN: rejected credentials, skipped rows
/// - INFO: session and cart changes
/// - DEBUG: request detail
///
/// Override with `RUST_LOG`. Logs go to stderr so `--json` output stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    log_subscriber(filter).init();
}

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,storefront=debug";

fn log_subscriber(filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish()
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    let mut ctx = if cli.offline {
        AppContext::offline()
    } else {
        AppContext::from_env()?
    };

    ctx.session.initialize().await;

    match cli.command {
        Commands::Whoami => auth::whoami(&ctx, json),
        Commands::SignIn { email, password } => auth::sign_in(&ctx, &email, &password, json).await,
        Commands::SignUp {
            email,
            password,
            full_name,
        } => auth::sign_up(&ctx, &email, &password, &full_name, json).await,
        Commands::SignOut => auth::sign_out(&mut ctx, json).await,
        Commands::Categories => catalog::categories(&ctx, json).await,
        Commands::Featured => catalog::featured(&ctx, json).await,
        Commands::Search {
            text,
            min_price,
            max_price,
            min_rating,
            sort,
        } => {
            let query = catalog::build_query(text, min_price, max_price, min_rating, sort)?;
            catalog::search(&ctx, &query, json).await
        }
        Commands::Cart { promo } => cart::show(&mut ctx, promo.as_deref(), json).await,
        Commands::Add {
            product_id,
            quantity,
        } => cart::add(&mut ctx, &product_id, quantity, json).await,
        Commands::SetQuantity { item_id, quantity } => {
            cart::set_quantity(&mut ctx, &item_id, quantity, json).await
        }
        Commands::Remove { item_id } => cart::remove(&mut ctx, &item_id, json).await,
    }
}
