//! GoMarketplace CLI - Terminal front-end for the catalog and cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the catalog with in-cart quantities and the cart summary
//! gomarket catalog
//!
//! # Press "add" on a product (adds it, or increments it if already in the cart)
//! gomarket add p1
//!
//! # Adjust quantities of products already in the cart
//! gomarket increment p1
//! gomarket decrement p1
//!
//! # Show or empty the cart
//! gomarket cart
//! gomarket clear
//! ```
//!
//! # Environment Variables
//!
//! See `go_marketplace_storefront::config` for the full list;
//! `MARKETPLACE_API_URL` is required.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use go_marketplace_core::ProductId;
use go_marketplace_storefront::config::StorefrontConfig;
use go_marketplace_storefront::{AppError, Session, telemetry};

mod commands;

#[derive(Parser)]
#[command(name = "gomarket")]
#[command(author, version, about = "GoMarketplace catalog and cart")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the product catalog
    Catalog,
    /// Press the add control of a catalog product
    Add {
        /// Product identifier
        id: String,
    },
    /// Add one unit of a product already in the cart
    Increment {
        /// Product identifier
        id: String,
    },
    /// Remove one unit of a product in the cart
    Decrement {
        /// Product identifier
        id: String,
    },
    /// Show the cart
    Cart,
    /// Remove every product from the cart
    Clear,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            telemetry::init_tracing(telemetry::DEFAULT_LOG_FILTER, cli.json_logs);
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = telemetry::init_sentry(&config);
    telemetry::init_tracing(telemetry::DEFAULT_LOG_FILTER, cli.json_logs);

    let code = match run(cli.command, config).await {
        Ok(()) => 0,
        Err(e) => {
            e.report();
            tracing::error!("Command failed: {e}");
            1
        }
    };

    // Flush pending Sentry events before exiting.
    drop(sentry_guard);
    std::process::exit(code);
}

async fn run(command: Commands, config: StorefrontConfig) -> Result<(), AppError> {
    let session = Session::start(config).await?;

    match command {
        Commands::Catalog => commands::catalog::show(&session).await,
        Commands::Add { id } => commands::catalog::add(&session, &ProductId::new(id)).await?,
        Commands::Increment { id } => {
            commands::cart::increment(&session, &ProductId::new(id)).await?;
        }
        Commands::Decrement { id } => {
            commands::cart::decrement(&session, &ProductId::new(id)).await?;
        }
        Commands::Cart => commands::cart::show(&session),
        Commands::Clear => commands::cart::clear(&session).await?,
    }
    Ok(())
}
