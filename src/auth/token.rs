use std::time::Duration;

use axum::extract::FromRef;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{error::ApiError, state::AppState};

/// JWT payload carried by every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,         // user ID
    pub authorized: bool, // always true on issued tokens
    pub exp: usize,       // expires at (unix timestamp)
}

/// HS256 signing and verification keys, built once from config.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for TokenKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self::from_secret(&jwt.secret, Duration::from_secs((jwt.ttl_hours as u64) * 3600))
    }
}

impl TokenKeys {
    pub fn from_secret(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Sign a token for `user_id`, expiring `ttl` from now.
    pub fn issue(&self, user_id: i64) -> anyhow::Result<String> {
        let exp = OffsetDateTime::now_utc() + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            authorized: true,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    fn decode(&self, token: &str) -> Result<Claims, ApiError> {
        // HS256 only: a header claiming any other algorithm family is
        // rejected before the secret is ever used against it.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|_| ApiError::Unauthenticated)?;
        Ok(data.claims)
    }

    /// Validate structure, signature, and expiry. Every failure collapses to
    /// the same generic error.
    pub fn verify(&self, token: &str) -> Result<(), ApiError> {
        self.decode(token).map(|_| ())
    }

    /// Same validation as [`verify`](Self::verify), plus decoding the subject
    /// claim. Fails if the claim is absent or non-numeric.
    pub fn subject(&self, token: &str) -> Result<i64, ApiError> {
        Ok(self.decode(token)?.sub)
    }
}

/// Pull the bearer credential out of the `Authorization` header.
///
/// Quirk, kept on purpose: the value must be exactly two
/// space-separated parts ("Bearer <token>" shape), but the scheme literal is
/// not checked. Anything else yields the empty string, which then fails
/// signature parsing downstream rather than producing a distinct error.
pub fn bearer_token(headers: &HeaderMap) -> String {
    let raw = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let parts: Vec<&str> = raw.split(' ').collect();
    if parts.len() == 2 {
        parts[1].to_string()
    } else {
        String::new()
    }
}
