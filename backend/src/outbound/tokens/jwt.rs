//! HS256 implementation of the `TokenService` port.
//!
//! Claims are `{"user_id": <u64>, "exp": <unix secs>, "iat": <unix secs>}`.
//! Expiry is checked against the caller's `now` rather than the system clock,
//! with no leeway: a token is rejected from the second it expires.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{SessionToken, UserId, session_token_ttl};

use super::signing_key::SigningKey;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Claims {
    user_id: u64,
    exp: i64,
    iat: i64,
}

/// Issues and validates HS256 session tokens with a process-wide key.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtTokenService {
    pub fn new(key: &SigningKey) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is enforced against the injected clock in `validate`.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: UserId, now: DateTime<Utc>) -> Result<SessionToken, TokenError> {
        let subject = u64::try_from(user_id.as_i64())
            .map_err(|err| TokenError::signing(format!("user id out of range: {err}")))?;
        let exp = (now + session_token_ttl()).timestamp();
        let claims = Claims {
            user_id: subject,
            exp,
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))?;
        let expires_at = DateTime::<Utc>::from_timestamp(exp, 0)
            .ok_or_else(|| TokenError::signing("expiry out of range"))?;
        Ok(SessionToken::new(token, user_id, expires_at))
    }

    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| TokenError::invalid(err.to_string()))?;
        let claims = data.claims;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::invalid("token expired"));
        }

        let raw = i64::try_from(claims.user_id)
            .map_err(|_| TokenError::invalid("user_id out of range"))?;
        UserId::new(raw).map_err(|err| TokenError::invalid(err.to_string()))
    }
}
