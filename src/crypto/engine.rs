use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use base64::Engine as _;
use rand::RngCore;

use super::StringEncryptor;
use crate::error::ConnectError;

/// Leading byte of every stored token, also authenticated as associated data.
const ENVELOPE_V1: u8 = 1;
const NONCE_LEN: usize = 12;
const HEADER_LEN: usize = 1 + NONCE_LEN;

/// AES-256-GCM encryption for provider tokens.
///
/// Stored form: base64(version || nonce || ciphertext+tag).
pub struct CryptoEngine {
    cipher: Aes256Gcm,
}

impl CryptoEngine {
    /// Create a new CryptoEngine from a base64-encoded 32-byte key.
    pub fn new(master_key_b64: &str) -> Result<Self, ConnectError> {
        let master_key = base64::engine::general_purpose::STANDARD
            .decode(master_key_b64)
            .map_err(|e| ConnectError::Crypto(format!("Invalid MASTER_KEY base64: {e}")))?;

        if master_key.len() != 32 {
            return Err(ConnectError::Crypto(format!(
                "MASTER_KEY must be 32 bytes, got {}",
                master_key.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(&master_key)
            .map_err(|e| ConnectError::Crypto(format!("Failed to init AES cipher: {e}")))?;

        Ok(Self { cipher })
    }

    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, ConnectError> {
        let mut envelope = Vec::with_capacity(HEADER_LEN + plaintext.len() + 16);
        envelope.push(ENVELOPE_V1);

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        envelope.extend_from_slice(&nonce);

        let sealed = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: &[ENVELOPE_V1],
                },
            )
            .map_err(|e| ConnectError::Crypto(format!("Encryption failed: {e}")))?;
        envelope.extend_from_slice(&sealed);

        Ok(envelope)
    }

    fn open(&self, envelope: &[u8]) -> Result<Vec<u8>, ConnectError> {
        let (&version, rest) = envelope
            .split_first()
            .ok_or_else(|| ConnectError::Crypto("Empty ciphertext".into()))?;

        if version != ENVELOPE_V1 {
            return Err(ConnectError::Crypto(format!(
                "Unsupported ciphertext version {version}"
            )));
        }
        if rest.len() < NONCE_LEN {
            return Err(ConnectError::Crypto("Ciphertext too short".into()));
        }

        let (nonce, sealed) = rest.split_at(NONCE_LEN);
        self.cipher
            .decrypt(
                Nonce::from_slice(nonce),
                Payload {
                    msg: sealed,
                    aad: &[version],
                },
            )
            .map_err(|e| ConnectError::Crypto(format!("Decryption failed: {e}")))
    }
}

impl StringEncryptor for CryptoEngine {
    fn encrypt(&self, plaintext: &str) -> Result<String, ConnectError> {
        let envelope = self.seal(plaintext.as_bytes())?;
        Ok(base64::engine::general_purpose::STANDARD.encode(envelope))
    }

    fn decrypt(&self, encrypted_b64: &str) -> Result<String, ConnectError> {
        let envelope = base64::engine::general_purpose::STANDARD
            .decode(encrypted_b64)
            .map_err(|e| ConnectError::Crypto(format!("Invalid base64: {e}")))?;

        String::from_utf8(self.open(&envelope)?)
            .map_err(|e| ConnectError::Crypto(format!("Invalid UTF-8 after decrypt: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_engine() -> CryptoEngine {
        let key = base64::engine::general_purpose::STANDARD.encode([0x42u8; 32]);
        CryptoEngine::new(&key).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let engine = test_engine();
        let plaintext = "twitter-access-token-12345";
        let encrypted = engine.encrypt(plaintext).unwrap();
        assert_ne!(encrypted, plaintext);
        assert_eq!(engine.decrypt(&encrypted).unwrap(), plaintext);
    }

    #[test]
    fn test_encrypt_produces_different_ciphertexts() {
        let engine = test_engine();
        let a = engine.encrypt("same-input").unwrap();
        let b = engine.encrypt("same-input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_short_key() {
        let key = base64::engine::general_purpose::STANDARD.encode([0x42u8; 16]);
        assert!(matches!(
            CryptoEngine::new(&key),
            Err(ConnectError::Crypto(_))
        ));
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let engine = test_engine();
        let encrypted = engine.encrypt("secret").unwrap();

        let other_key = base64::engine::general_purpose::STANDARD.encode([0x07u8; 32]);
        let other = CryptoEngine::new(&other_key).unwrap();
        assert!(other.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_envelope_carries_version_byte() {
        let engine = test_engine();
        let encrypted = engine.encrypt("token").unwrap();
        let raw = base64::engine::general_purpose::STANDARD
            .decode(&encrypted)
            .unwrap();
        assert_eq!(raw[0], ENVELOPE_V1);
        // version + nonce + plaintext + 16-byte GCM tag
        assert_eq!(raw.len(), HEADER_LEN + "token".len() + 16);
    }

    #[test]
    fn test_decrypt_rejects_unknown_version() {
        let engine = test_engine();
        let encrypted = engine.encrypt("token").unwrap();
        let mut raw = base64::engine::general_purpose::STANDARD
            .decode(&encrypted)
            .unwrap();
        raw[0] = 2;
        let tampered = base64::engine::general_purpose::STANDARD.encode(&raw);

        match engine.decrypt(&tampered) {
            Err(ConnectError::Crypto(message)) => assert!(message.contains("version 2")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_decrypt_rejects_truncated_input() {
        let engine = test_engine();
        let short = base64::engine::general_purpose::STANDARD.encode([1u8; 4]);
        assert!(engine.decrypt(&short).is_err());
    }
}
