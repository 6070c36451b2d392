//! Signed, time-bounded identity tokens (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{TokenClaims, TokenValidationError, validate_claims};

/// Default token lifetime: 72 hours.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 72 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

impl From<TokenValidationError> for TokenError {
    fn from(err: TokenValidationError) -> Self {
        match err {
            TokenValidationError::Expired => TokenError::Expired,
            other => TokenError::Malformed(other.to_string()),
        }
    }
}

/// A freshly issued token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Creates and verifies identity tokens.
///
/// Implementations are pure: output depends only on the inputs, the signing
/// secret and the supplied `now`.
pub trait TokenCodec: Send + Sync {
    fn issue(&self, subject: &str, role: &str, now: DateTime<Utc>) -> Result<IssuedToken, TokenError>;

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError>;
}

/// HMAC-SHA256 token codec keyed by a shared secret.
///
/// Rotating the secret invalidates every previously issued token.
#[derive(Clone)]
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, Duration::seconds(DEFAULT_TOKEN_TTL_SECS))
    }

    fn validation() -> Validation {
        // Expiry is checked against the caller's clock in `validate_claims`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation
    }
}

impl core::fmt::Debug for Hs256TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn issue(&self, subject: &str, role: &str, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let claims = TokenClaims::new(subject, role, now, self.ttl)
            .ok_or_else(|| TokenError::Signing(format!("expiry out of range for ttl {}", self.ttl)))?;
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        Ok(IssuedToken { token, claims })
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        // MAC first, so a flipped byte anywhere in header or payload reads as
        // tampering rather than as a decode failure.
        let (signing_input, signature) = token
            .rsplit_once('.')
            .ok_or_else(|| TokenError::Malformed("expected three segments".to_string()))?;
        match signing_input.split_once('.') {
            Some((header, payload))
                if !header.is_empty() && !payload.is_empty() && !payload.contains('.') && !signature.is_empty() => {}
            _ => return Err(TokenError::Malformed("expected three segments".to_string())),
        }
        let authentic = jsonwebtoken::crypto::verify(signature, signing_input.as_bytes(), &self.decoding, Algorithm::HS256)
            .map_err(|e| TokenError::Malformed(e.to_string()))?;
        if !authentic {
            return Err(TokenError::InvalidSignature);
        }

        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &Self::validation())?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}
