//! HS256 JWT tokens
//!
//! Signed, not encrypted: the payload is readable by anyone holding the
//! token. `exp` validation inside `jsonwebtoken` is disabled; expiry goes
//! through [`Payload::check_expiry`] so both codecs classify it the same.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::{Payload, TokenError, TokenMaker};
use crate::core_types::Role;

const MIN_SECRET_KEY_SIZE: usize = 32;

pub struct JwtMaker {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    leeway: Duration,
}

impl JwtMaker {
    /// `secret_key` must be at least 32 bytes
    pub fn new(secret_key: &[u8]) -> Result<Self, TokenError> {
        if secret_key.len() < MIN_SECRET_KEY_SIZE {
            return Err(TokenError::InvalidKeySize {
                expected: "at least 32",
                actual: secret_key.len(),
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret_key),
            decoding_key: DecodingKey::from_secret(secret_key),
            validation,
            leeway: Duration::zero(),
        })
    }

    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }
}

impl TokenMaker for JwtMaker {
    fn create_token(
        &self,
        username: &str,
        role: Role,
        duration: Duration,
    ) -> Result<(String, Payload), TokenError> {
        let payload = Payload::new(username, role, duration)?;
        let token = encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)
            .map_err(|e| TokenError::Creation(e.to_string()))?;
        Ok((token, payload))
    }

    fn verify_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<Payload, TokenError> {
        let data = decode::<Payload>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::Malformed)?;
        data.claims.check_expiry(now, self.leeway)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"a-jwt-secret-that-is-long-enough-for-hs256";

    #[test]
    fn test_round_trip() {
        let maker = JwtMaker::new(SECRET).unwrap();
        let (token, issued) = maker
            .create_token("bob", Role::Banker, Duration::minutes(5))
            .unwrap();

        let payload = maker.verify_token(&token).unwrap();
        assert_eq!(payload, issued);
        assert_eq!(payload.role, Role::Banker);
    }

    #[test]
    fn test_expired_and_invalid_are_distinct() {
        let maker = JwtMaker::new(SECRET).unwrap();
        let (token, payload) = maker
            .create_token("bob", Role::Depositor, Duration::minutes(1))
            .unwrap();

        let after = payload.expired_at + Duration::minutes(1);
        assert_eq!(maker.verify_token_at(&token, after), Err(TokenError::Expired));

        let other = JwtMaker::new(b"another-secret-of-sufficient-length!!").unwrap();
        assert_eq!(other.verify_token(&token), Err(TokenError::Malformed));
        assert_eq!(maker.verify_token("not.a.jwt"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(matches!(
            JwtMaker::new(b"too-short"),
            Err(TokenError::InvalidKeySize { actual: 9, .. })
        ));
    }
}
