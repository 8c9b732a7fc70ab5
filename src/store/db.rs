//! SQLite database handle and schema for members and their provider connections.
//!
//! Tables:
//! - `member`: local accounts (seeded by the account subsystem)
//! - `account_connection`: encrypted provider tokens per (member, provider)

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::ConnectError;

/// Connection pool over the relational store.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str, max_connections: u32) -> Result<Self, ConnectError> {
        let options = SqliteConnectOptions::from_str(db_url)?
            .foreign_keys(true)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Private in-memory database, used as the embedded test fixture.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to one connection that is never recycled.
    pub async fn in_memory() -> Result<Self, ConnectError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Run schema migrations.
    pub async fn migrate(&self) -> Result<(), ConnectError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS member (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name  TEXT NOT NULL,
                last_name   TEXT NOT NULL,
                email       TEXT NOT NULL UNIQUE,
                username    TEXT UNIQUE,
                gender      TEXT NOT NULL DEFAULT 'M',
                picture_set BOOLEAN NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS account_connection (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                member              INTEGER NOT NULL REFERENCES member(id) ON DELETE CASCADE,
                provider            TEXT NOT NULL,
                access_token        TEXT NOT NULL,
                secret              TEXT,
                provider_account_id TEXT NOT NULL,
                profile_url         TEXT,
                created_at          TEXT NOT NULL,
                UNIQUE(member, provider),
                UNIQUE(provider, provider_account_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrate_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db.migrate().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('member', 'account_connection') ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();
        assert_eq!(tables, vec!["account_connection", "member"]);
    }

    #[tokio::test]
    async fn in_memory_pool_keeps_its_data() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();

        sqlx::query("INSERT INTO member (first_name, last_name, email) VALUES ('Keith', 'Donald', 'keith@example.com')")
            .execute(db.pool())
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM member")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
