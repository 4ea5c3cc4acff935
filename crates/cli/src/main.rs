//! Berkasman CLI - database migrations and user bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Apply the admin schema
//! berkasman-cli migrate
//!
//! # Create the first Super Admin (password from BERKASMAN_INITIAL_PASSWORD or stdin)
//! berkasman-cli user create -e admin@example.com -n "Admin Name" -r "Super Admin"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create a user account without going through the portal

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "berkasman-cli")]
#[command(author, version, about = "Berkasman CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address used to sign in
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role label (`Super Admin`, `Admin Dokumen`, `Admin Buku`, `Reviewer`)
        #[arg(short, long, default_value = "Super Admin")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::User { action } => match action {
            UserAction::Create { email, name, role } => {
                commands::user::create(email, name, role).await?;
            }
        },
    }
    Ok(())
}
