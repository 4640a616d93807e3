pub mod commands;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::{AppConfig, StoreKind};
use crate::database::{CredentialStore, MemoryStore, PgStore};

#[derive(Parser)]
#[command(name = "forumhub")]
#[command(about = "ForumHub - forum REST API with bearer-token authentication")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Use the in-process store instead of PostgreSQL")]
        memory: bool,
    },

    #[command(about = "Apply the PostgreSQL schema")]
    Migrate,

    #[command(about = "Account management directly against the store")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },
}

pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { port: None, memory: false }) {
        Commands::Serve { port, memory } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if memory {
                config.store = StoreKind::Memory;
            }
            commands::serve::handle(config).await
        }
        Commands::Migrate => commands::migrate::handle(config).await,
        Commands::User { cmd } => commands::user::handle(cmd, config).await,
    }
}

/// Open the store the configuration selects. PostgreSQL stores are migrated first.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn CredentialStore>> {
    match config.store {
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreKind::Postgres => Ok(Arc::new(connect_postgres(config).await?)),
    }
}

pub(crate) async fn connect_postgres(config: &AppConfig) -> anyhow::Result<PgStore> {
    let url = config
        .database
        .url
        .as_deref()
        .context("DATABASE_URL is required for the PostgreSQL store")?;

    let store = PgStore::connect(url, &config.database)
        .await
        .context("failed to connect to PostgreSQL")?;
    store.migrate().await.context("failed to apply schema")?;
    Ok(store)
}
