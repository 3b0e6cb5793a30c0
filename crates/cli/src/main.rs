//! Bazaar CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! bazaar migrate
//!
//! # Load categories and products from YAML
//! bazaar seed --file crates/cli/seed/catalog.yaml
//!
//! # Replace the whole catalog (orders are removed too)
//! bazaar seed --file crates/cli/seed/catalog.yaml --clear
//!
//! # Create an admin user
//! bazaar user create-admin -e admin@example.com -n "Admin Name" -p "long password"
//! ```
//!
//! All commands read `BAZAAR_DATABASE_URL` (or `DATABASE_URL`), loading
//! `.env` when present.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog from a YAML file
    Seed {
        /// Path to the YAML catalog file
        #[arg(short, long)]
        file: String,

        /// Delete every order, product, and category first
        #[arg(long)]
        clear: bool,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new admin user
    CreateAdmin {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin display name
        #[arg(short, long)]
        name: String,

        /// Admin password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, clear } => {
            commands::seed::catalog(&file, clear).await?;
        }
        Commands::User { action } => match action {
            UserAction::CreateAdmin {
                email,
                name,
                password,
            } => {
                commands::admin::create_admin(&email, &name, &password).await?;
            }
        },
    }
    Ok(())
}
