use anyhow::Result;
use clap::Parser;
use tracing::info;

use account_connect::cli::{Cli, Commands};
use account_connect::{AppState, Config, ConnectError, NewConnection};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "account_connect=debug"
    } else {
        "account_connect=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let config = Config::from_env()?;
    info!("account-connect v{}", env!("CARGO_PKG_VERSION"));

    let state = AppState::from_config(config).await?;
    let provider = state.connections.for_provider(cli.provider);

    match cli.command {
        Commands::Migrate => {
            state.db.migrate().await?;
            info!("Database migrated ✓ ({})", state.config.database_url);
        }
        Commands::Connect {
            account_id,
            provider_account_id,
            access_token,
            secret,
            profile_url,
        } => {
            let mut conn = NewConnection::new(provider_account_id, access_token);
            conn.secret = secret;
            conn.profile_url = profile_url;
            provider.connect(account_id, &conn).await?;
            println!("account {account_id} connected to {}", cli.provider);
        }
        Commands::Status { account_id } => {
            match provider.get_provider_account_id(account_id).await? {
                Some(id) => println!("account {account_id}: connected to {} as {id}", cli.provider),
                None => println!("account {account_id}: not connected to {}", cli.provider),
            }
        }
        Commands::Lookup {
            provider_account_id,
        } => match provider.find_account_by_connection(&provider_account_id).await {
            Ok(account) => println!("{}", serde_json::to_string_pretty(&account)?),
            Err(ConnectError::NoSuchAccountConnection(id)) => {
                println!("no account connected to {} as {id}", cli.provider)
            }
            Err(e) => return Err(e.into()),
        },
        Commands::Friends {
            provider_account_ids,
        } => {
            let accounts = provider
                .find_accounts_with_provider_account_ids(&provider_account_ids)
                .await?;
            println!("{}", serde_json::to_string_pretty(&accounts)?);
        }
        Commands::Connections { account_id } => {
            let conns = state.connections.list_connections(account_id).await?;
            println!("{}", serde_json::to_string_pretty(&conns)?);
        }
        Commands::Disconnect { account_id } => {
            provider.disconnect(account_id).await?;
            println!("account {account_id} disconnected from {}", cli.provider);
        }
    }

    Ok(())
}
