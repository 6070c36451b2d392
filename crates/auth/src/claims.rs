use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identity token claims.
///
/// Timestamps travel as unix seconds (`iat`/`exp`) so the encoded token is a
/// standard JWT any broker can inspect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the account id in decimal form.
    pub sub: String,

    /// Role recorded at issuance. Informational only; authorization always
    /// re-derives roles from the policy engine.
    pub role: String,

    /// Issued-at timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub iat: DateTime<Utc>,

    /// Expiration timestamp.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub exp: DateTime<Utc>,
}

impl TokenClaims {
    /// Build claims valid from `now` (truncated to whole seconds) for `ttl`.
    ///
    /// `None` when the expiry falls outside the representable time range.
    pub fn new(sub: impl Into<String>, role: impl Into<String>, now: DateTime<Utc>, ttl: Duration) -> Option<Self> {
        let iat = DateTime::<Utc>::from_timestamp(now.timestamp(), 0).unwrap_or(now);
        let exp = iat.checked_add_signed(ttl)?;
        Some(Self {
            sub: sub.into(),
            role: role.into(),
            iat,
            exp,
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("token subject is empty")]
    EmptySubject,
}

/// Deterministically validate decoded claims against `now`.
///
/// Signature verification happens before this, in the token codec.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.sub.trim().is_empty() {
        return Err(TokenValidationError::EmptySubject);
    }
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn new_truncates_issued_at_to_seconds() {
        let now = DateTime::<Utc>::from_timestamp(1_000, 750_000_000).unwrap();
        let claims = TokenClaims::new("1", "user", now, Duration::hours(1)).unwrap();
        assert_eq!(claims.iat, at(1_000));
        assert_eq!(claims.exp, at(1_000 + 3_600));
    }

    #[test]
    fn new_refuses_unrepresentable_expiry() {
        assert_eq!(TokenClaims::new("1", "user", at(100), Duration::seconds(100_000_000_000_000)), None);
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let claims = TokenClaims::new("1", "user", at(100), Duration::seconds(10)).unwrap();
        assert_eq!(validate_claims(&claims, at(109)), Ok(()));
        assert_eq!(validate_claims(&claims, at(110)), Err(TokenValidationError::Expired));
    }

    #[test]
    fn rejects_future_and_inverted_windows() {
        let claims = TokenClaims::new("1", "user", at(100), Duration::seconds(10)).unwrap();
        assert_eq!(validate_claims(&claims, at(99)), Err(TokenValidationError::NotYetValid));

        let inverted = TokenClaims { exp: at(50), ..claims };
        assert_eq!(
            validate_claims(&inverted, at(60)),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn serializes_timestamps_as_unix_seconds() {
        let claims = TokenClaims::new("7", "editor", at(1_700_000_000), Duration::seconds(60)).unwrap();
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["iat"], 1_700_000_000);
        assert_eq!(json["exp"], 1_700_000_060);
        assert_eq!(json["sub"], "7");
    }
}
