//! Encrypted local tokens
//!
//! Wire format: `sb.local.` + base64url(no padding) of
//! `nonce (24 bytes) || ciphertext || tag (16 bytes)`. The payload is JSON,
//! sealed with XChaCha20-Poly1305 under the server key; the header is bound
//! as associated data so a token cannot be replayed under another prefix.
//!
//! The format is private to this service. It is not PASETO and other
//! token libraries will not read it.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng, Payload as Sealed};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use chrono::{DateTime, Duration, Utc};

use super::{Payload, TokenError, TokenMaker};
use crate::core_types::Role;

const HEADER: &str = "sb.local.";
const KEY_SIZE: usize = 32;
const NONCE_SIZE: usize = 24;
const TAG_SIZE: usize = 16;

pub struct LocalTokenMaker {
    cipher: XChaCha20Poly1305,
    leeway: Duration,
}

impl LocalTokenMaker {
    /// `symmetric_key` must be exactly 32 bytes
    pub fn new(symmetric_key: &[u8]) -> Result<Self, TokenError> {
        if symmetric_key.len() != KEY_SIZE {
            return Err(TokenError::InvalidKeySize {
                expected: "exactly 32",
                actual: symmetric_key.len(),
            });
        }
        let cipher = XChaCha20Poly1305::new_from_slice(symmetric_key).map_err(|_| {
            TokenError::InvalidKeySize {
                expected: "exactly 32",
                actual: symmetric_key.len(),
            }
        })?;

        Ok(Self {
            cipher,
            leeway: Duration::zero(),
        })
    }

    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    fn open(&self, token: &str) -> Result<Payload, TokenError> {
        let body = token.strip_prefix(HEADER).ok_or(TokenError::Malformed)?;
        let raw = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| TokenError::Malformed)?;
        if raw.len() < NONCE_SIZE + TAG_SIZE {
            return Err(TokenError::Malformed);
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(
                XNonce::from_slice(nonce),
                Sealed {
                    msg: ciphertext,
                    aad: HEADER.as_bytes(),
                },
            )
            .map_err(|_| TokenError::Malformed)?;

        serde_json::from_slice(&plaintext).map_err(|_| TokenError::Malformed)
    }
}

impl TokenMaker for LocalTokenMaker {
    fn create_token(
        &self,
        username: &str,
        role: Role,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(username, role, duration)?;
        let plaintext =
            serde_json::to_vec(&payload).map_err(|e| TokenError::Creation(e.to_string()))?;

        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Sealed {
                    msg: &plaintext,
                    aad: HEADER.as_bytes(),
                },
            )
            .map_err(|e| TokenError::Creation(e.to_string()))?;

        let mut raw = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&ciphertext);

        Ok((format!("{}{}", HEADER, URL_SAFE_NO_PAD.encode(raw)), payload))
    }

    fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Payload, TokenError> {
        let payload = self.open(token)?;
        payload.check_expiry(now, self.leeway)?;
        Ok(payload)
    }
}
