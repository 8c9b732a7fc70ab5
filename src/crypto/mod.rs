//! String encryption for tokens stored at rest.

mod engine;

pub use engine::CryptoEngine;

use crate::error::ConnectError;

/// Two-way encryption of opaque strings.
///
/// The connection store only ever sees ciphertext in the database; the
/// plaintext token is recovered solely when building an API client.
pub trait StringEncryptor: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<String, ConnectError>;

    fn decrypt(&self, ciphertext: &str) -> Result<String, ConnectError>;
}
