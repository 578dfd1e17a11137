/**
 * Session Tokens
 *
 * Signed bearer-token issuance and verification. Tokens are HS256 JWTs
 * carrying the account id, username, and role, valid for a fixed TTL from
 * issuance.
 *
 * The issuer is constructed from an injected secret and TTL rather than
 * reading ambient globals, so tests can run it against a throwaway secret.
 * Verification checks the signature before any claim is trusted, and uses
 * zero leeway so expiry is exact.
 */

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::users::Role;

/// Default token lifetime: one hour.
pub const TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Claims embedded in issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    /// Username
    pub username: String,
    /// Account role
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Why a token was rejected. Each reason is distinct and reported to
/// callers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("token malformed")]
    Malformed,

    #[error("token signature invalid")]
    InvalidSignature,

    /// Signing failed while issuing; never produced by `verify`
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Issues and verifies signed bearer tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer from a shared secret and token lifetime.
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::default();
        // Exact expiry: a token is invalid the second it expires.
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Sign a token for the given identity, expiring `ttl` from now.
    pub fn issue(
        &self,
        account_id: Uuid,
        username: &str,
        role: Role,
    ) -> Result<String, TokenError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let claims = Claims {
            sub: account_id.to_string(),
            username: username.to_string(),
            role,
            exp: now + self.ttl.as_secs(),
            iat: now,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_) => TokenError::Malformed,
                _ => TokenError::InvalidSignature,
            })?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", TOKEN_TTL)
    }

    #[test]
    fn test_issue_and_verify() {
        let account_id = Uuid::new_v4();
        let token = issuer().issue(account_id, "alice", Role::User).unwrap();

        let claims = issuer().verify(&token).unwrap();
        assert_eq!(claims.sub, account_id.to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_rejected_with_expiry_reason() {
        // Encode claims whose expiry is already in the past with the same
        // secret; only the expiry check can fail.
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            username: "alice".to_string(),
            role: Role::User,
            exp: now - 10,
            iat: now - 3700,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert_eq!(issuer().verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenIssuer::new("other-secret", TOKEN_TTL)
            .issue(Uuid::new_v4(), "alice", Role::User)
            .unwrap();

        assert_eq!(
            issuer().verify(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        assert_eq!(
            issuer().verify("not.a.token").unwrap_err(),
            TokenError::Malformed
        );
        assert_eq!(issuer().verify("").unwrap_err(), TokenError::Malformed);
    }

    #[test]
    fn test_roles_survive_round_trip() {
        for role in Role::ALL {
            let token = issuer().issue(Uuid::new_v4(), "u", *role).unwrap();
            assert_eq!(issuer().verify(&token).unwrap().role, *role);
        }
    }
}
