use anyhow::Context;
use clap::{Parser, Subcommand};
use gistshare_config::load as load_config;
use gistshare_runtime::{telemetry, Services};
use tracing::info;

mod commands;
mod password;

#[derive(Parser)]
#[command(name = "gistshare-admin")]
#[command(about = "Manage gistshare user accounts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// List users, ten per page
    ListUsers {
        /// Zero-based page number
        #[arg(long, default_value_t = 0)]
        page: u32,
    },
    /// Create a user account
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Grant admin rights to a user
    SetAdmin { username: String },
    /// Delete a user together with their gists, keys and likes
    DeleteUser { username: String },
    /// Check whether a user liked a gist
    HasLiked { username: String, gist_id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config().context("failed to load configuration")?;
    telemetry::init_tracing(&config.log).context("failed to initialise tracing")?;

    let services = Services::initialise(&config)
        .await
        .context("failed to initialise services")?;

    let output = match cli.command {
        Commands::Migrate => {
            info!("database migrations are up to date");
            Ok(vec!["migrations applied".to_string()])
        }
        Commands::ListUsers { page } => commands::list_users(&services, page).await,
        Commands::CreateUser {
            username,
            password,
            email,
        } => commands::create_user(&services, username, &password, email).await,
        Commands::SetAdmin { username } => commands::set_admin(&services, &username).await,
        Commands::DeleteUser { username } => commands::delete_user(&services, &username).await,
        Commands::HasLiked { username, gist_id } => {
            commands::has_liked(&services, &username, gist_id).await
        }
    };

    services.close().await;

    for line in output? {
        println!("{line}");
    }
    Ok(())
}
