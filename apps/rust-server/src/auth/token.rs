// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token issuance and validation.
//!
//! Tokens are HS256 JWTs carrying `sub` (username), `iat` and `exp`. The
//! HMAC key is the SHA-256 digest of the configured secret, so secrets of
//! any length map onto a fixed 32-byte key. Tokens are never stored and
//! cannot be revoked before they expire.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::AuthError;

/// Default token lifetime (24 hours).
pub const DEFAULT_TOKEN_LIFETIME_MS: i64 = 86_400_000;

/// Claims embedded in every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// Stateless token service.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl TokenService {
    /// Create a token service from a shared secret and a token lifetime.
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        let key = Sha256::digest(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(key.as_slice()),
            decoding_key: DecodingKey::from_secret(key.as_slice()),
            validation,
            lifetime,
        }
    }

    /// Issue a token for `subject`, valid from now for the configured lifetime.
    pub fn issue(&self, subject: &str) -> Result<String, AuthError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`.
    pub(crate) fn issue_at(
        &self,
        subject: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let expires_at = issued_at.checked_add_signed(self.lifetime).ok_or_else(|| {
            AuthError::InternalError(format!(
                "Token lifetime of {} ms overflows the expiry time",
                self.lifetime.num_milliseconds()
            ))
        })?;
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(format!("Failed to sign token: {e}")))
    }

    /// Verify the signature and expiry and return the claims.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let data = decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::MalformedToken,
            },
        )?;

        // `exp` equal to now is still accepted by the decoder.
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(data.claims)
    }

    /// Extract the subject of a token whose signature and expiry check out.
    pub fn extract_subject(&self, token: &str) -> Result<String, AuthError> {
        self.decode(token).map(|claims| claims.sub)
    }

    /// Whether `token` is authentic, unexpired and issued to `expected_subject`.
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        match self.decode(token) {
            Ok(claims) => claims.sub == expected_subject,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::hours(24))
    }

    #[test]
    fn token_validates_for_its_subject_only() {
        let tokens = service();
        let token = tokens.issue("alice").unwrap();

        assert!(tokens.validate(&token, "alice"));
        assert!(!tokens.validate(&token, "bob"));
        assert_eq!(tokens.extract_subject(&token).unwrap(), "alice");
    }

    #[test]
    fn claims_carry_lifetime() {
        let tokens = service();
        let token = tokens.issue("alice").unwrap();
        let claims = tokens.decode(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn expired_token_never_validates() {
        let tokens = service();
        let token = tokens
            .issue_at("alice", Utc::now() - Duration::hours(25))
            .unwrap();

        assert!(!tokens.validate(&token, "alice"));
        assert!(!tokens.validate(&token, "bob"));
        assert!(matches!(
            tokens.extract_subject(&token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = TokenService::new("other-secret", Duration::hours(1))
            .issue("alice")
            .unwrap();

        let tokens = service();
        assert!(!tokens.validate(&token, "alice"));
        assert!(matches!(
            tokens.decode(&token),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let tokens = service();
        let token = tokens.issue("alice").unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let forged_claims = format!(
            r#"{{"sub":"bob","iat":{},"exp":{}}}"#,
            Utc::now().timestamp(),
            Utc::now().timestamp() + 3600
        );
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(forged_claims.as_bytes()),
            parts[2]
        );

        assert!(!tokens.validate(&forged, "bob"));
        assert!(matches!(
            tokens.decode(&forged),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn garbage_is_malformed_not_a_panic() {
        let tokens = service();
        assert!(!tokens.validate("not-a-token", "alice"));
        assert!(matches!(
            tokens.decode("not-a-token"),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn long_secrets_are_accepted() {
        let tokens = TokenService::new(&"s".repeat(500), Duration::minutes(5));
        let token = tokens.issue("alice").unwrap();
        assert!(tokens.validate(&token, "alice"));
    }

    #[test]
    fn unrepresentable_expiry_is_an_error_not_a_panic() {
        let tokens = TokenService::new("test-secret", Duration::MAX);
        assert!(matches!(
            tokens.issue("alice"),
            Err(AuthError::InternalError(_))
        ));
    }
}
