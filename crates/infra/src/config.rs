//! Configuration loading and representation.
//!
//! Everything is read from environment variables once at startup; the
//! resulting [`GatewayConfig`] is passed down explicitly.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use chrono::Duration;
use thiserror::Error;
use tracing::warn;

use relaygate_auth::DEFAULT_TOKEN_TTL_SECS;

const DEV_JWT_SECRET: &str = "dev-secret";

/// Longest accepted token lifetime: one year.
const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Where the gateway looks for the bearer token on broker callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenSource {
    /// `Authorization: Bearer <token>` header only.
    Header,
    /// `token` field of the callback body only.
    Body,
    /// Header first, then the body field.
    #[default]
    Either,
}

impl FromStr for TokenSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "header" => Ok(TokenSource::Header),
            "body" => Ok(TokenSource::Body),
            "either" | "any" => Ok(TokenSource::Either),
            other => Err(format!("expected header, body or either, got {other:?}")),
        }
    }
}

/// Where policy rules are loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicySource {
    File(PathBuf),
    Postgres,
    /// No rules at all: every request is denied.
    Empty,
}

#[derive(Clone)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub token_source: TokenSource,
    pub check_subscribe: bool,
    pub check_publish: bool,
    pub subscribe_path: String,
    pub publish_path: String,
    pub default_role: String,
    /// `None` disables periodic policy refresh.
    pub policy_refresh: Option<StdDuration>,
    pub database_url: Option<String>,
    pub policy_file: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 9080)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            token_source: TokenSource::Either,
            check_subscribe: true,
            check_publish: true,
            subscribe_path: "/centrifugo/subscribe".to_string(),
            publish_path: "/centrifugo/publish".to_string(),
            default_role: "user".to_string(),
            policy_refresh: Some(StdDuration::from_secs(30)),
            database_url: None,
            policy_file: None,
        }
    }
}

impl core::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"***")
            .field("token_ttl", &self.token_ttl)
            .field("token_source", &self.token_source)
            .field("check_subscribe", &self.check_subscribe)
            .field("check_publish", &self.check_publish)
            .field("subscribe_path", &self.subscribe_path)
            .field("publish_path", &self.publish_path)
            .field("default_role", &self.default_role)
            .field("policy_refresh", &self.policy_refresh)
            .field("database_url", &self.database_url.as_ref().map(|_| "***"))
            .field("policy_file", &self.policy_file)
            .finish()
    }
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("RELAYGATE_BIND_ADDR") {
            config.bind_addr = v
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("RELAYGATE_BIND_ADDR", &v, format!("{e}")))?;
        }

        match get("RELAYGATE_JWT_SECRET") {
            Some(secret) => config.jwt_secret = secret,
            None => warn!("RELAYGATE_JWT_SECRET not set; using insecure dev default"),
        }

        if let Some(v) = get("RELAYGATE_TOKEN_TTL_SECS") {
            let secs: i64 = v
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid("RELAYGATE_TOKEN_TTL_SECS", &v, format!("{e}")))?;
            if secs <= 0 {
                return Err(ConfigError::invalid("RELAYGATE_TOKEN_TTL_SECS", &v, "must be positive"));
            }
            if secs > MAX_TOKEN_TTL_SECS {
                return Err(ConfigError::invalid(
                    "RELAYGATE_TOKEN_TTL_SECS",
                    &v,
                    format!("must not exceed {MAX_TOKEN_TTL_SECS}"),
                ));
            }
            config.token_ttl = Duration::try_seconds(secs)
                .ok_or_else(|| ConfigError::invalid("RELAYGATE_TOKEN_TTL_SECS", &v, "out of range"))?;
        }

        if let Some(v) = get("RELAYGATE_TOKEN_SOURCE") {
            config.token_source = v
                .parse()
                .map_err(|e: String| ConfigError::invalid("RELAYGATE_TOKEN_SOURCE", &v, e))?;
        }

        if let Some(v) = get("RELAYGATE_CHECK_SUBSCRIBE") {
            config.check_subscribe = parse_bool("RELAYGATE_CHECK_SUBSCRIBE", &v)?;
        }
        if let Some(v) = get("RELAYGATE_CHECK_PUBLISH") {
            config.check_publish = parse_bool("RELAYGATE_CHECK_PUBLISH", &v)?;
        }

        if let Some(v) = get("RELAYGATE_SUBSCRIBE_PATH") {
            config.subscribe_path = parse_route_path("RELAYGATE_SUBSCRIBE_PATH", &v)?;
        }
        if let Some(v) = get("RELAYGATE_PUBLISH_PATH") {
            config.publish_path = parse_route_path("RELAYGATE_PUBLISH_PATH", &v)?;
        }

        if let Some(v) = get("RELAYGATE_DEFAULT_ROLE") {
            config.default_role = v.trim().to_string();
        }

        if let Some(v) = get("RELAYGATE_POLICY_REFRESH_SECS") {
            let secs: u64 = v.trim().parse().map_err(|e| {
                ConfigError::invalid("RELAYGATE_POLICY_REFRESH_SECS", &v, format!("{e}"))
            })?;
            config.policy_refresh = (secs > 0).then(|| StdDuration::from_secs(secs));
        }

        if config.subscribe_path == config.publish_path {
            return Err(ConfigError::invalid(
                "RELAYGATE_PUBLISH_PATH",
                &config.publish_path,
                "must differ from RELAYGATE_SUBSCRIBE_PATH",
            ));
        }

        config.database_url = get("DATABASE_URL");
        config.policy_file = get("RELAYGATE_POLICY_FILE").map(PathBuf::from);

        Ok(config)
    }

    /// Policy file wins over the database; with neither, nothing is permitted.
    pub fn policy_source(&self) -> PolicySource {
        match (&self.policy_file, &self.database_url) {
            (Some(path), _) => PolicySource::File(path.clone()),
            (None, Some(_)) => PolicySource::Postgres,
            (None, None) => PolicySource::Empty,
        }
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, value, "expected a boolean")),
    }
}

/// Paths already taken by the account and health endpoints.
const RESERVED_PATHS: [&str; 3] = ["/health", "/signup", "/signin"];

fn parse_route_path(key: &'static str, value: &str) -> Result<String, ConfigError> {
    let path = value.trim();
    if !path.starts_with('/') || path.len() < 2 {
        return Err(ConfigError::invalid(key, value, "must be an absolute path like /centrifugo/subscribe"));
    }
    if RESERVED_PATHS.contains(&path) {
        return Err(ConfigError::invalid(key, value, "path is reserved"));
    }
    Ok(path.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        GatewayConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr.port(), 9080);
        assert_eq!(config.token_ttl, Duration::hours(72));
        assert_eq!(config.token_source, TokenSource::Either);
        assert!(config.check_subscribe);
        assert_eq!(config.subscribe_path, "/centrifugo/subscribe");
        assert_eq!(config.policy_refresh, Some(StdDuration::from_secs(30)));
        assert_eq!(config.policy_source(), PolicySource::Empty);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("RELAYGATE_BIND_ADDR", "127.0.0.1:7000"),
            ("RELAYGATE_JWT_SECRET", "s3cret"),
            ("RELAYGATE_TOKEN_TTL_SECS", "3600"),
            ("RELAYGATE_TOKEN_SOURCE", "body"),
            ("RELAYGATE_CHECK_SUBSCRIBE", "off"),
            ("RELAYGATE_SUBSCRIBE_PATH", "/proxy/sub"),
            ("RELAYGATE_POLICY_REFRESH_SECS", "0"),
            ("RELAYGATE_POLICY_FILE", "/etc/relaygate/policy.csv"),
            ("DATABASE_URL", "postgres://localhost/auth"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr.port(), 7000);
        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.token_ttl, Duration::hours(1));
        assert_eq!(config.token_source, TokenSource::Body);
        assert!(!config.check_subscribe);
        assert_eq!(config.subscribe_path, "/proxy/sub");
        assert_eq!(config.policy_refresh, None);
        assert_eq!(
            config.policy_source(),
            PolicySource::File(PathBuf::from("/etc/relaygate/policy.csv"))
        );
    }

    #[test]
    fn invalid_values_are_reported_with_their_key() {
        let err = config_from(&[("RELAYGATE_TOKEN_TTL_SECS", "-5")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RELAYGATE_TOKEN_TTL_SECS", .. }));

        let err = config_from(&[("RELAYGATE_TOKEN_SOURCE", "cookie")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RELAYGATE_TOKEN_SOURCE", .. }));

        let err = config_from(&[("RELAYGATE_PUBLISH_PATH", "publish")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RELAYGATE_PUBLISH_PATH", .. }));

        let err = config_from(&[("RELAYGATE_SUBSCRIBE_PATH", "/signin")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RELAYGATE_SUBSCRIBE_PATH", .. }));

        let err = config_from(&[("RELAYGATE_PUBLISH_PATH", "/centrifugo/subscribe")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "RELAYGATE_PUBLISH_PATH", .. }));
    }

    #[test]
    fn token_ttl_is_capped_at_one_year() {
        for too_long in ["9223372036854775807", "100000000000000", "31536001"] {
            let err = config_from(&[("RELAYGATE_TOKEN_TTL_SECS", too_long)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "RELAYGATE_TOKEN_TTL_SECS", .. }), "{too_long}");
        }

        let config = config_from(&[("RELAYGATE_TOKEN_TTL_SECS", "31536000")]).unwrap();
        assert_eq!(config.token_ttl, Duration::seconds(MAX_TOKEN_TTL_SECS));
    }

    #[test]
    fn database_url_selects_postgres_policy() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/auth")]).unwrap();
        assert_eq!(config.policy_source(), PolicySource::Postgres);
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = config_from(&[
            ("RELAYGATE_JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "postgres://user:pw@localhost/auth"),
        ])
        .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("user:pw"));
    }
}
