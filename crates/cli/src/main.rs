//! StorePulse CLI - Database migrations and tenant management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! storepulse migrate
//!
//! # Create a tenant account
//! storepulse tenant create -e merchant@example.com -p s3cretpass -s my-store
//!
//! # List active tenants
//! storepulse tenant list
//!
//! # Run a sync for one tenant, or for every active tenant
//! storepulse sync --email merchant@example.com
//! storepulse sync --all
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "storepulse")]
#[command(author, version, about = "StorePulse CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage tenant accounts
    Tenant {
        #[command(subcommand)]
        action: TenantAction,
    },
    /// Run a store sync outside the scheduler
    Sync {
        /// Email of the tenant to sync
        #[arg(long, conflicts_with = "all", required_unless_present = "all")]
        email: Option<String>,

        /// Sync every active tenant
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum TenantAction {
    /// Create a new tenant account
    Create {
        /// Tenant email address
        #[arg(short, long)]
        email: String,

        /// Account password (min 8 characters)
        #[arg(short, long)]
        password: String,

        /// Store name; the store URL is derived from it
        #[arg(short, long)]
        store_name: String,

        /// Admin API access token, required before the tenant can sync
        #[arg(short = 't', long)]
        access_token: Option<String>,
    },
    /// List active tenants
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Tenant { action } => match action {
            TenantAction::Create {
                email,
                password,
                store_name,
                access_token,
            } => {
                commands::tenant::create(&email, &password, &store_name, access_token.as_deref())
                    .await?;
            }
            TenantAction::List => commands::tenant::list().await?,
        },
        Commands::Sync { email, all } => {
            if all {
                commands::sync::sync_all().await?;
            } else if let Some(email) = email {
                commands::sync::sync_one(&email).await?;
            }
        }
    }
    Ok(())
}
