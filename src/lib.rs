pub mod account;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod error;
pub mod providers;
pub mod store;

pub use account::{Account, AccountMapper};
pub use config::Config;
pub use error::{ConnectError, ConnectResult};
pub use providers::{ProviderClient, ProviderKind};
pub use store::{AccountConnections, ConnectionStore, Database, NewConnection};

use std::sync::Arc;

use account::UrlPictureStorage;
use crypto::CryptoEngine;

/// Wired-up components shared by the binary's commands.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub connections: ConnectionStore,
}

impl AppState {
    /// Open the database and build the connection store from configuration.
    pub async fn from_config(config: Config) -> ConnectResult<Self> {
        let crypto = CryptoEngine::new(&config.master_key)?;
        let db = Database::new(&config.database_url, config.max_connections).await?;

        let mapper = AccountMapper::new(
            Arc::new(UrlPictureStorage::new(config.picture_base_url.clone())),
            config.profile_url_template.clone(),
        );
        let connections = ConnectionStore::new(&db, Arc::new(crypto), Arc::new(mapper));

        Ok(Self {
            config,
            db,
            connections,
        })
    }
}
