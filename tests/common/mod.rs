//! Embedded database fixture shared by the integration tests.

use std::sync::Arc;

use account_connect::account::{PictureStorage, UrlPictureStorage};
use account_connect::crypto::CryptoEngine;
use account_connect::{AccountMapper, ConnectionStore, Database};
use base64::Engine as _;

pub const PROFILE_URL_TEMPLATE: &str = "http://localhost:8080/members/{profileKey}";

pub struct Fixture {
    pub db: Database,
    pub crypto: Arc<CryptoEngine>,
    pub store: ConnectionStore,
}

pub fn crypto() -> Arc<CryptoEngine> {
    let key = base64::engine::general_purpose::STANDARD.encode([0x5bu8; 32]);
    Arc::new(CryptoEngine::new(&key).unwrap())
}

/// Three members; 1 and 3 are on Twitter as `habuma` and `rclarkson`,
/// 2 is only on Facebook.
pub async fn setup() -> Fixture {
    let db = Database::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    seed_members(&db).await;

    let crypto = crypto();
    let storage: Arc<dyn PictureStorage> =
        Arc::new(UrlPictureStorage::new("http://localhost:8080/resources"));
    let mapper = AccountMapper::new(storage, PROFILE_URL_TEMPLATE);
    let store = ConnectionStore::new(&db, crypto.clone(), Arc::new(mapper));

    let twitter = store.for_provider(account_connect::ProviderKind::Twitter);
    twitter.add_connection(1, "habuma-token", "habuma").await.unwrap();
    twitter
        .add_connection(3, "rclarkson-token", "rclarkson")
        .await
        .unwrap();

    let facebook = store.for_provider(account_connect::ProviderKind::Facebook);
    facebook
        .add_connection(2, "facebook-token", "345678901")
        .await
        .unwrap();

    Fixture { db, crypto, store }
}

async fn seed_members(db: &Database) {
    let members = [
        (1, "Craig", "Walls", "craig@example.com", Some("habuma"), "M", true),
        (2, "Keith", "Donald", "keith@example.com", Some("kdonald"), "M", false),
        (3, "Roy", "Clarkson", "roy@example.com", None, "M", false),
    ];

    for (id, first, last, email, username, gender, picture_set) in members {
        sqlx::query(
            "INSERT INTO member (id, first_name, last_name, email, username, gender, picture_set) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(first)
        .bind(last)
        .bind(email)
        .bind(username)
        .bind(gender)
        .bind(picture_set)
        .execute(db.pool())
        .await
        .unwrap();
    }
}
