//! Provider connections for member accounts.
//!
//! A connection ties one member to one external identity per provider and
//! keeps the provider's access token encrypted at rest. Connection state is
//! scoped per provider: [`ConnectionStore::for_provider`] hands out an
//! [`AccountConnections`] bound to a single [`ProviderKind`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, info, warn};

use super::db::Database;
use crate::account::{Account, AccountMapper, ACCOUNT_COLUMNS};
use crate::crypto::StringEncryptor;
use crate::error::{ConnectError, ConnectResult};
use crate::providers::{ProviderClient, ProviderKind};

/// SQLite caps bound variables per statement; friend lookups are split below it.
const LOOKUP_CHUNK_SIZE: usize = 500;

/// Shared handle over the connection table and its collaborators.
#[derive(Clone)]
pub struct ConnectionStore {
    pool: SqlitePool,
    encryptor: Arc<dyn StringEncryptor>,
    mapper: Arc<AccountMapper>,
}

impl ConnectionStore {
    pub fn new(
        db: &Database,
        encryptor: Arc<dyn StringEncryptor>,
        mapper: Arc<AccountMapper>,
    ) -> Self {
        Self {
            pool: db.pool().clone(),
            encryptor,
            mapper,
        }
    }

    /// Connection operations for one provider.
    pub fn for_provider(&self, kind: ProviderKind) -> AccountConnections {
        AccountConnections {
            store: self.clone(),
            kind,
        }
    }

    /// List an account's connections across all providers (metadata only, no tokens).
    pub async fn list_connections(&self, account_id: i64) -> ConnectResult<Vec<ConnectionInfo>> {
        let rows = sqlx::query(
            r#"
            SELECT provider, provider_account_id, profile_url, created_at
            FROM account_connection
            WHERE member = ?
            ORDER BY provider
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;

        let mut conns = Vec::with_capacity(rows.len());
        for row in &rows {
            let provider: String = row.try_get("provider")?;
            let provider = match ProviderKind::from_id(&provider) {
                Some(kind) => kind,
                None => {
                    warn!("Skipping account {account_id} connection to unknown provider {provider}");
                    continue;
                }
            };

            conns.push(ConnectionInfo {
                provider,
                provider_account_id: row.try_get("provider_account_id")?,
                profile_url: row.try_get("profile_url")?,
                created_at: row.try_get("created_at")?,
            });
        }

        Ok(conns)
    }
}

/// Connection operations scoped to a single provider.
#[derive(Clone)]
pub struct AccountConnections {
    store: ConnectionStore,
    kind: ProviderKind,
}

impl AccountConnections {
    pub fn provider(&self) -> ProviderKind {
        self.kind
    }

    fn pool(&self) -> &SqlitePool {
        &self.store.pool
    }

    pub async fn is_connected(&self, account_id: i64) -> ConnectResult<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM account_connection WHERE member = ? AND provider = ?",
        )
        .bind(account_id)
        .bind(self.kind.id())
        .fetch_one(self.pool())
        .await?;

        Ok(count > 0)
    }

    /// Connect an account with just an access token and external id.
    pub async fn add_connection(
        &self,
        account_id: i64,
        access_token: &str,
        provider_account_id: &str,
    ) -> ConnectResult<()> {
        self.connect(
            account_id,
            &NewConnection::new(provider_account_id, access_token),
        )
        .await
    }

    /// Store a new connection, encrypting the token and secret.
    ///
    /// Fails with [`ConnectError::DuplicateConnection`] when the account is
    /// already connected to this provider.
    pub async fn connect(&self, account_id: i64, conn: &NewConnection) -> ConnectResult<()> {
        let enc_access = self.store.encryptor.encrypt(&conn.access_token)?;
        let enc_secret = conn
            .secret
            .as_deref()
            .map(|secret| self.store.encryptor.encrypt(secret))
            .transpose()?;

        let result = sqlx::query(
            r#"
            INSERT INTO account_connection
                (member, provider, access_token, secret, provider_account_id, profile_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account_id)
        .bind(self.kind.id())
        .bind(enc_access)
        .bind(enc_secret)
        .bind(&conn.provider_account_id)
        .bind(&conn.profile_url)
        .bind(Utc::now())
        .execute(self.pool())
        .await;

        if let Err(e) = result {
            // The unique constraints also cover (provider, provider_account_id);
            // only a clash on (member, provider) is a duplicate connection.
            if is_unique_violation(&e) && self.is_connected(account_id).await? {
                warn!("Account {account_id} is already connected to {}", self.kind);
                return Err(ConnectError::DuplicateConnection {
                    account_id,
                    provider: self.kind.id().to_string(),
                });
            }
            return Err(e.into());
        }

        info!(
            "Connected account {account_id} to {} as {}",
            self.kind, conn.provider_account_id
        );
        Ok(())
    }

    /// Build an API client for the account.
    ///
    /// Unconnected accounts get a client limited to public calls.
    pub async fn get_api(&self, account_id: i64) -> ConnectResult<ProviderClient> {
        let enc_access: Option<String> = sqlx::query_scalar(
            "SELECT access_token FROM account_connection WHERE member = ? AND provider = ?",
        )
        .bind(account_id)
        .bind(self.kind.id())
        .fetch_optional(self.pool())
        .await?;

        let enc_access = match enc_access {
            Some(token) => token,
            None => {
                debug!("Account {account_id} not on {}, using public client", self.kind);
                return Ok(ProviderClient::unauthenticated(self.kind));
            }
        };

        let access_token = self.store.encryptor.decrypt(&enc_access)?;
        Ok(ProviderClient::authorized(self.kind, access_token))
    }

    pub async fn get_provider_account_id(
        &self,
        account_id: i64,
    ) -> ConnectResult<Option<String>> {
        let id: Option<String> = sqlx::query_scalar(
            "SELECT provider_account_id FROM account_connection WHERE member = ? AND provider = ?",
        )
        .bind(account_id)
        .bind(self.kind.id())
        .fetch_optional(self.pool())
        .await?;

        Ok(id)
    }

    /// Provider-side profile link captured at connect time.
    pub async fn get_profile_url(&self, account_id: i64) -> ConnectResult<Option<String>> {
        let url: Option<Option<String>> = sqlx::query_scalar(
            "SELECT profile_url FROM account_connection WHERE member = ? AND provider = ?",
        )
        .bind(account_id)
        .bind(self.kind.id())
        .fetch_optional(self.pool())
        .await?;

        Ok(url.flatten())
    }

    pub async fn update_provider_account_id(
        &self,
        account_id: i64,
        provider_account_id: &str,
    ) -> ConnectResult<()> {
        let affected = sqlx::query(
            "UPDATE account_connection SET provider_account_id = ? WHERE member = ? AND provider = ?",
        )
        .bind(provider_account_id)
        .bind(account_id)
        .bind(self.kind.id())
        .execute(self.pool())
        .await?
        .rows_affected();

        if affected == 0 {
            return Err(ConnectError::NotConnected {
                account_id,
                provider: self.kind.id().to_string(),
            });
        }

        info!("Account {account_id} now {provider_account_id} on {}", self.kind);
        Ok(())
    }

    /// Resolve the local account behind an external identity.
    pub async fn find_account_by_connection(
        &self,
        provider_account_id: &str,
    ) -> ConnectResult<Account> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM member m \
             INNER JOIN account_connection c ON c.member = m.id \
             WHERE c.provider = ? AND c.provider_account_id = ?"
        );

        let row = sqlx::query(&sql)
            .bind(self.kind.id())
            .bind(provider_account_id)
            .fetch_optional(self.pool())
            .await?;

        match row {
            Some(row) => Ok(self.store.mapper.map_row(&row)?),
            None => Err(ConnectError::NoSuchAccountConnection(
                provider_account_id.to_string(),
            )),
        }
    }

    /// Resolve the subset of external ids that belong to local accounts.
    ///
    /// Unknown ids are dropped. Accounts come back in the order of their first
    /// matching id, each at most once.
    pub async fn find_accounts_with_provider_account_ids<S: AsRef<str>>(
        &self,
        provider_account_ids: &[S],
    ) -> ConnectResult<Vec<Account>> {
        if provider_account_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut unique = HashSet::new();
        let distinct: Vec<&str> = provider_account_ids
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| unique.insert(*id))
            .collect();

        let mut by_provider_id = HashMap::new();
        for chunk in distinct.chunks(LOOKUP_CHUNK_SIZE) {
            let mut query = QueryBuilder::<Sqlite>::new(format!(
                "SELECT {ACCOUNT_COLUMNS}, c.provider_account_id FROM member m \
                 INNER JOIN account_connection c ON c.member = m.id \
                 WHERE c.provider = "
            ));
            query.push_bind(self.kind.id());
            query.push(" AND c.provider_account_id IN (");
            let mut ids = query.separated(", ");
            for id in chunk {
                ids.push_bind(*id);
            }
            ids.push_unseparated(")");

            let rows = query.build().fetch_all(self.pool()).await?;
            for row in &rows {
                let provider_account_id: String = row.try_get("provider_account_id")?;
                by_provider_id.insert(provider_account_id, self.store.mapper.map_row(row)?);
            }
        }
        debug!(
            "Resolved {} of {} {} ids",
            by_provider_id.len(),
            distinct.len(),
            self.kind
        );

        let mut seen = HashSet::new();
        let accounts = provider_account_ids
            .iter()
            .filter_map(|id| by_provider_id.get(id.as_ref()))
            .filter(|account| seen.insert(account.id))
            .cloned()
            .collect();

        Ok(accounts)
    }

    /// Remove the account's connection. No-op when there is none.
    pub async fn disconnect(&self, account_id: i64) -> ConnectResult<()> {
        let affected =
            sqlx::query("DELETE FROM account_connection WHERE member = ? AND provider = ?")
                .bind(account_id)
                .bind(self.kind.id())
                .execute(self.pool())
                .await?
                .rows_affected();

        if affected > 0 {
            info!("Disconnected account {account_id} from {}", self.kind);
        } else {
            debug!("Account {account_id} had no {} connection to remove", self.kind);
        }

        Ok(())
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

// ── Types ────────────────────────────────────────────────────────────────────

/// Input for [`AccountConnections::connect`].
#[derive(Debug, Clone)]
pub struct NewConnection {
    pub provider_account_id: String,
    pub access_token: String,
    /// OAuth 1.0a token secret. Kept encrypted for signing-capable callers;
    /// [`ProviderClient`] itself authenticates with the bearer token only.
    pub secret: Option<String>,
    pub profile_url: Option<String>,
}

impl NewConnection {
    pub fn new(provider_account_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            provider_account_id: provider_account_id.into(),
            access_token: access_token.into(),
            secret: None,
            profile_url: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_profile_url(mut self, url: impl Into<String>) -> Self {
        self.profile_url = Some(url.into());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ConnectionInfo {
    #[serde(serialize_with = "serialize_provider")]
    pub provider: ProviderKind,
    pub provider_account_id: String,
    pub profile_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

fn serialize_provider<S: serde::Serializer>(
    kind: &ProviderKind,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.id())
}
