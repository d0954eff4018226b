//! WindLoadCalc command line
//!
//! Drives the storefront cart against a local directory, starts hosted
//! checkouts and looks up design wind speeds.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "windload")]
#[command(about = "WindLoadCalc cart, checkout and wind speed lookup")]
struct Cli {
    /// Directory holding the cart
    #[arg(long, env = "WINDLOAD_CART_DIR", default_value = ".windload")]
    cart_dir: PathBuf,

    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List products and prices
    Catalog,

    /// Show the cart with its price breakdown
    Show,

    /// Add a product
    Add {
        product_code: String,

        /// Bill monthly instead of annually
        #[arg(long)]
        monthly: bool,
    },

    /// Remove a product
    Remove { product_code: String },

    /// Empty the cart
    Clear,

    /// Show the bundle offer for a shop page
    Offer {
        /// calculator or platform
        #[arg(default_value = "calculator")]
        page: String,
    },

    /// Create a hosted checkout session for the cart
    Checkout,

    /// Design wind speed for a ZIP code or place
    Lookup { input: String },

    /// Show the account and platform access behind a login token
    Whoami {
        #[arg(long, env = "WINDLOAD_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Page to return to after logging in
        #[arg(long, default_value = DEFAULT_RETURN_URL)]
        return_url: String,
    },
}

const DEFAULT_RETURN_URL: &str = "https://windloadcalc.com/platform";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!(cart_dir = %cli.cart_dir.display(), "Opening cart");
    let mut ctx = commands::Context::open(&cli.cart_dir, cli.json)?;

    match cli.command {
        Command::Catalog => ctx.catalog(),
        Command::Show => ctx.show(),
        Command::Add { product_code, monthly } => ctx.add(&product_code, monthly),
        Command::Remove { product_code } => ctx.remove(&product_code),
        Command::Clear => ctx.clear(),
        Command::Offer { page } => ctx.offer(&page),
        Command::Checkout => ctx.checkout().await,
        Command::Lookup { input } => commands::lookup(&input, cli.json).await,
        Command::Whoami { token, return_url } => {
            commands::whoami(token.as_deref(), &return_url, cli.json).await
        }
    }
}
