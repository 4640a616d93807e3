use anyhow::{bail, Context};
use clap::Subcommand;

use crate::auth::hash_password;
use crate::cli::connect_postgres;
use crate::config::AppConfig;
use crate::database::models::NewUser;
use crate::database::CredentialStore;
use crate::handlers::validate::{validate_email_format, MIN_PASSWORD_LENGTH};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an account")]
    Add {
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "Password (min 8 characters)")]
        password: String,
    },

    #[command(about = "Remove an account that authors no topics or replies")]
    Remove {
        #[arg(long, help = "Login email")]
        email: String,
    },
}

pub async fn handle(cmd: UserCommands, config: AppConfig) -> anyhow::Result<()> {
    let store = connect_postgres(&config).await?;

    let result = match cmd {
        UserCommands::Add { name, email, password } => add(&store, name, email, password).await,
        UserCommands::Remove { email } => remove(&store, &email).await,
    };

    store.close().await;
    result
}

async fn add(
    store: &dyn CredentialStore,
    name: String,
    email: String,
    password: String,
) -> anyhow::Result<()> {
    validate_email_format(&email).map_err(anyhow::Error::msg)?;
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        bail!("password must be at least {} characters", MIN_PASSWORD_LENGTH);
    }

    let password_hash = hash_password(&password).await?;
    let user = store
        .create_user(NewUser { name, email, password_hash })
        .await
        .context("failed to create user")?;

    println!("Created user {} <{}>", user.id, user.email);
    Ok(())
}

async fn remove(store: &dyn CredentialStore, email: &str) -> anyhow::Result<()> {
    let Some(user) = store.find_user_by_email(email).await? else {
        bail!("no user with email '{}'", email);
    };

    store
        .delete_user(user.id)
        .await
        .context("failed to remove user")?;

    println!("Removed user {} <{}>", user.id, user.email);
    Ok(())
}
