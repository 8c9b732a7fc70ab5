use std::sync::Arc;

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::{Account, Gender};

/// Column list every account query selects, aliased from `member m`.
pub(crate) const ACCOUNT_COLUMNS: &str =
    "m.id, m.first_name, m.last_name, m.email, m.username, m.gender, m.picture_set";

/// Resolves stored file keys to public URLs.
pub trait PictureStorage: Send + Sync {
    fn url(&self, key: &str) -> String;
}

/// Serves pictures from a fixed base URL.
#[derive(Debug, Clone)]
pub struct UrlPictureStorage {
    base_url: String,
}

impl UrlPictureStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl PictureStorage for UrlPictureStorage {
    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

/// Maps `member` rows to [`Account`]s, filling in profile and picture links.
pub struct AccountMapper {
    storage: Arc<dyn PictureStorage>,
    profile_url_template: String,
}

impl AccountMapper {
    pub fn new(storage: Arc<dyn PictureStorage>, profile_url_template: impl Into<String>) -> Self {
        Self {
            storage,
            profile_url_template: profile_url_template.into(),
        }
    }

    pub fn map_row(&self, row: &SqliteRow) -> Result<Account, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let username: Option<String> = row.try_get("username")?;
        let gender = Gender::from_code(&row.try_get::<String, _>("gender")?);
        let picture_set: bool = row.try_get("picture_set")?;

        let profile_key = username.clone().unwrap_or_else(|| id.to_string());

        Ok(Account {
            id,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            username,
            gender,
            profile_url: self.profile_url(&profile_key),
            picture_url: self.picture_url(id, gender, picture_set),
            profile_key,
        })
    }

    pub fn profile_url(&self, profile_key: &str) -> String {
        self.profile_url_template.replace("{profileKey}", profile_key)
    }

    pub fn picture_url(&self, id: i64, gender: Gender, picture_set: bool) -> String {
        if picture_set {
            self.storage.url(&format!("profile-pics/{id}/normal.jpg"))
        } else {
            self.storage
                .url(&format!("profile-pics/{}/normal.jpg", gender.picture_dir()))
        }
    }
}
