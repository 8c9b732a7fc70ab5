use anyhow::{Context, Result};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://account-connect.db?mode=rwc";
pub const DEFAULT_PROFILE_URL_TEMPLATE: &str = "http://localhost:8080/members/{profileKey}";
pub const DEFAULT_PICTURE_BASE_URL: &str = "http://localhost:8080/resources";

/// Application configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // ── Database ────────────────────────────────────────────────────────
    pub database_url: String,
    pub max_connections: u32,

    // ── Crypto ──────────────────────────────────────────────────────────
    /// 32-byte base64-encoded master key for AES-256-GCM token encryption.
    pub master_key: String,

    // ── Account mapping ─────────────────────────────────────────────────
    /// Member profile link, `{profileKey}` is substituted per account.
    pub profile_url_template: String,
    pub picture_base_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.into()),
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".into())
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS")?,

            master_key: std::env::var("MASTER_KEY")
                .context("MASTER_KEY is required (32 bytes, base64)")?,

            profile_url_template: std::env::var("PROFILE_URL_TEMPLATE")
                .unwrap_or_else(|_| DEFAULT_PROFILE_URL_TEMPLATE.into()),
            picture_base_url: std::env::var("PICTURE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_PICTURE_BASE_URL.into()),
        })
    }
}
