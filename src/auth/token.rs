// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuance and verification.
//!
//! Tokens are compact JWS values (`header.payload.signature`, base64url)
//! signed with HMAC-SHA256. The edge filters, the service filter and the
//! authenticator all share one [`TokenCodec`] built from the same key, so the
//! verification logic cannot drift between call sites.
//!
//! ## Verification order
//!
//! 1. Structure: three segments, decodable HS256 header, decodable claims
//! 2. Signature: HMAC over `header.payload` with the shared key
//! 3. Expiry: `now > exp` is expired (no leeway)
//!
//! The first failing step decides the reported [`VerifyError`].

use std::collections::HashSet;
use std::time::Duration;

use base64ct::{Base64, Encoding};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};

use super::claims::{TokenClaims, VerifiedClaims};
use super::error::VerifyError;

/// Minimum HMAC key length (256 bits).
pub const MIN_KEY_BYTES: usize = 32;

/// Default token lifetime (30 minutes).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Errors building a codec or issuing a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("signing key must be at least {MIN_KEY_BYTES} bytes, got {0}")]
    KeyTooShort(usize),
    #[error("signing key is not valid base64")]
    KeyEncoding,
    #[error("token subject and role must not be empty")]
    EmptyClaim,
    #[error("token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
}

/// Issues and verifies session tokens with a process-wide HMAC key.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenCodec {
    /// Create a codec from raw key bytes.
    pub fn new(key: &[u8], ttl: Duration) -> Result<Self, TokenError> {
        if key.len() < MIN_KEY_BYTES {
            return Err(TokenError::KeyTooShort(key.len()));
        }

        // Expiry is checked against the caller's clock, not the system clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::new();

        Ok(Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            ttl,
        })
    }

    /// Create a codec from a base64 (standard alphabet) encoded key.
    pub fn from_base64(encoded: &str, ttl: Duration) -> Result<Self, TokenError> {
        let key = Base64::decode_vec(encoded.trim()).map_err(|_| TokenError::KeyEncoding)?;
        Self::new(&key, ttl)
    }

    /// Configured token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` with `role`, valid from `now` for the TTL.
    ///
    /// `now` is in seconds since the Unix epoch.
    pub fn issue(&self, subject: &str, role: &str, now: i64) -> Result<String, TokenError> {
        if subject.is_empty() || role.is_empty() {
            return Err(TokenError::EmptyClaim);
        }

        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = TokenClaims {
            sub: subject.to_string(),
            role: role.to_string(),
            iat: now,
            exp: now.saturating_add(ttl),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Issue a token stamped with the current wall-clock time.
    pub fn issue_now(&self, subject: &str, role: &str) -> Result<String, TokenError> {
        self.issue(subject, role, chrono::Utc::now().timestamp())
    }

    /// Verify `token` at time `now` (seconds since epoch).
    pub fn verify(&self, token: &str, now: i64) -> Result<VerifiedClaims, VerifyError> {
        let claims = parse_structure(token)?;

        decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => VerifyError::BadSignature,
                _ => VerifyError::Malformed,
            }
        })?;

        if now > claims.exp {
            return Err(VerifyError::Expired);
        }

        Ok(claims.into())
    }

    /// Verify `token` against the current wall-clock time.
    pub fn verify_now(&self, token: &str) -> Result<VerifiedClaims, VerifyError> {
        self.verify(token, chrono::Utc::now().timestamp())
    }
}

/// Structural checks that need no key.
fn parse_structure(token: &str) -> Result<TokenClaims, VerifyError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
        return Err(VerifyError::Malformed);
    }

    let header = decode_header(token).map_err(|_| VerifyError::Malformed)?;
    if header.alg != Algorithm::HS256 {
        return Err(VerifyError::Malformed);
    }

    let claims = jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)
        .map_err(|_| VerifyError::Malformed)?
        .claims;

    if claims.sub.is_empty() || claims.role.is_empty() {
        return Err(VerifyError::Malformed);
    }

    Ok(claims)
}
