pub mod middleware;
pub mod policy;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::user::UserId;

const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingHeader,
    #[error("authorization header is not a bearer token")]
    NotBearer,
    #[error("token rejected: {0}")]
    Rejected(String),
    #[error("token signing failed: {0}")]
    Signing(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    id: UserId,
    iat: i64,
    exp: i64,
}

/// Signs and verifies the HS256 bearer tokens the mobile client carries.
///
/// The secret comes from configuration; handlers never see it. Verification
/// returns the user id baked into the claims, nothing more.
#[derive(Clone)]
pub struct AuthCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl AuthCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, user_id: UserId) -> Result<String, AuthError> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    fn issue_at(&self, user_id: UserId, issued_at: i64) -> Result<String, AuthError> {
        let claims = Claims {
            id: user_id,
            iat: issued_at,
            exp: issued_at + Duration::days(TOKEN_TTL_DAYS).num_seconds(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.id)
            .map_err(|e| AuthError::Rejected(e.to_string()))
    }
}

/// Pulls the raw token out of an `Authorization: Bearer ...` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
    let value = value.to_str().map_err(|_| AuthError::NotBearer)?;
    value.strip_prefix("Bearer ").ok_or(AuthError::NotBearer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn codec() -> AuthCodec {
        AuthCodec::new(b"test-secret")
    }

    #[test]
    fn issued_token_verifies_to_same_user() {
        let codec = codec();
        let token = codec.issue(42).unwrap();
        assert_eq!(codec.verify(&token), Ok(42));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = AuthCodec::new(b"other-secret").issue(42).unwrap();
        assert!(matches!(codec().verify(&token), Err(AuthError::Rejected(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let eight_days_ago = Utc::now().timestamp() - Duration::days(8).num_seconds();
        let token = codec.issue_at(42, eight_days_ago).unwrap();
        assert!(matches!(codec.verify(&token), Err(AuthError::Rejected(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            codec().verify("not-a-token"),
            Err(AuthError::Rejected(_))
        ));
    }

    #[test]
    fn bearer_token_requires_the_header() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), Err(AuthError::MissingHeader));
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), Err(AuthError::NotBearer));
    }

    #[test]
    fn bearer_token_strips_the_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Ok("abc.def.ghi"));
    }
}
