//! Broker callback authorization.
//!
//! The broker calls the gateway once per subscription (or publication)
//! attempt and proceeds only on a `result` reply. Every outcome, including a
//! missing or broken token, is rendered in the broker's envelope with HTTP
//! 200; the broker relays the embedded code to its client.

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use relaygate_auth::{
    Action, Decision, DenialCode, PolicyEngine, Principal, Role, Subject, TokenCodec, authorize,
};
use relaygate_infra::{GatewayConfig, TokenSource};

use crate::app::dto::{PublishRequest, SubscribeRequest};
use crate::middleware::extract_bearer;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Missing, malformed, tampered or expired token.
    #[error("unauthorized")]
    Unauthorized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewaySettings {
    pub token_source: TokenSource,
    pub check_subscribe: bool,
    pub check_publish: bool,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            token_source: TokenSource::Either,
            check_subscribe: true,
            check_publish: true,
        }
    }
}

impl From<&GatewayConfig> for GatewaySettings {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            token_source: config.token_source,
            check_subscribe: config.check_subscribe,
            check_publish: config.check_publish,
        }
    }
}

/// Empty `result` object; serializes as `{}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyResult {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyError {
    pub code: u16,
    pub message: &'static str,
}

/// Reply envelope understood by the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyReply {
    Result(ProxyResult),
    Error(ProxyError),
}

impl ProxyReply {
    pub fn permit() -> Self {
        ProxyReply::Result(ProxyResult {})
    }

    pub fn deny(code: DenialCode) -> Self {
        ProxyReply::Error(ProxyError {
            code: code.status(),
            message: code.message(),
        })
    }

    pub fn is_permit(&self) -> bool {
        matches!(self, ProxyReply::Result(_))
    }
}

impl From<Decision> for ProxyReply {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Permit => ProxyReply::permit(),
            Decision::Deny { code } => ProxyReply::deny(code),
        }
    }
}

impl IntoResponse for ProxyReply {
    fn into_response(self) -> Response {
        axum::Json(self).into_response()
    }
}

pub struct AuthorizationGateway {
    tokens: Arc<dyn TokenCodec>,
    policy: Arc<PolicyEngine>,
    settings: GatewaySettings,
}

impl AuthorizationGateway {
    pub fn new(tokens: Arc<dyn TokenCodec>, policy: Arc<PolicyEngine>, settings: GatewaySettings) -> Self {
        Self {
            tokens,
            policy,
            settings,
        }
    }

    /// Resolve the caller from the bearer token.
    ///
    /// Only the token subject is trusted. Roles are every role reachable from
    /// the subject in the current policy snapshot.
    pub fn authenticate(&self, headers: &HeaderMap, body_token: Option<&str>) -> Result<Principal, AuthError> {
        let token = self.select_token(headers, body_token).ok_or_else(|| {
            debug!(source = ?self.settings.token_source, "no bearer token presented");
            AuthError::Unauthorized
        })?;

        let claims = self.tokens.verify(token, Utc::now()).map_err(|e| {
            info!(error = %e, "token rejected");
            AuthError::Unauthorized
        })?;

        let roles = self.policy.implicit_roles_for(&claims.sub);
        Ok(Principal {
            subject: Subject::new(claims.sub),
            roles,
            claimed_role: Role::new(claims.role),
        })
    }

    pub fn authorize(&self, principal: &Principal, channel: &str, action: &Action) -> Decision {
        authorize(&self.policy, principal, channel, action)
    }

    pub fn handle_subscription(&self, headers: &HeaderMap, request: &SubscribeRequest) -> ProxyReply {
        self.handle(headers, request, &Action::SUBSCRIBE, self.settings.check_subscribe)
    }

    pub fn handle_publication(&self, headers: &HeaderMap, request: &PublishRequest) -> ProxyReply {
        self.handle(headers, &request.meta, &Action::PUBLISH, self.settings.check_publish)
    }

    fn handle(&self, headers: &HeaderMap, request: &SubscribeRequest, action: &Action, check: bool) -> ProxyReply {
        let principal = match self.authenticate(headers, request.token.as_deref()) {
            Ok(principal) => principal,
            Err(AuthError::Unauthorized) => {
                info!(
                    channel = %request.channel,
                    action = %action,
                    client = request.client.as_deref().unwrap_or(""),
                    "proxy request unauthenticated"
                );
                return ProxyReply::deny(DenialCode::Unauthorized);
            }
        };

        if !check {
            debug!(subject = %principal.subject, channel = %request.channel, action = %action, "policy check disabled");
            return ProxyReply::permit();
        }

        let decision = self.authorize(&principal, &request.channel, action);
        if decision.is_permit() {
            debug!(subject = %principal.subject, channel = %request.channel, action = %action, "proxy request permitted");
        } else {
            info!(
                subject = %principal.subject,
                roles = ?principal.roles,
                claimed_role = %principal.claimed_role,
                channel = %request.channel,
                action = %action,
                client = request.client.as_deref().unwrap_or(""),
                transport = request.transport.as_deref().unwrap_or(""),
                "proxy request denied"
            );
        }
        decision.into()
    }

    fn select_token<'a>(&self, headers: &'a HeaderMap, body_token: Option<&'a str>) -> Option<&'a str> {
        let from_body = body_token.map(str::trim).filter(|t| !t.is_empty());
        match self.settings.token_source {
            TokenSource::Header => extract_bearer(headers),
            TokenSource::Body => from_body,
            TokenSource::Either => extract_bearer(headers).or(from_body),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header::AUTHORIZATION};
    use chrono::Duration;
    use relaygate_auth::{Hs256TokenCodec, PolicyRule, PolicySet, RoleAssignment};
    use relaygate_infra::InMemoryPolicyStore;

    use super::*;

    const SECRET: &[u8] = b"gateway-tests";

    async fn gateway(settings: GatewaySettings) -> (AuthorizationGateway, Arc<InMemoryPolicyStore>) {
        let store = Arc::new(InMemoryPolicyStore::new(PolicySet {
            rules: vec![
                PolicyRule::new("moderator", "news:*", "subscribe"),
                PolicyRule::new("7", "chat", "publish"),
            ],
            assignments: vec![RoleAssignment::new("42", "moderator")],
        }));
        let engine = Arc::new(PolicyEngine::new(store.clone()).await.unwrap());
        let tokens = Arc::new(Hs256TokenCodec::with_default_ttl(SECRET));
        (AuthorizationGateway::new(tokens, engine, settings), store)
    }

    fn token_for(sub: &str, role: &str) -> String {
        Hs256TokenCodec::with_default_ttl(SECRET)
            .issue(sub, role, Utc::now())
            .unwrap()
            .token
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}")).unwrap());
        headers
    }

    fn subscribe(channel: &str, token: Option<String>) -> SubscribeRequest {
        SubscribeRequest {
            channel: channel.to_string(),
            token,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn permitted_through_role_assignment() {
        let (gw, _) = gateway(GatewaySettings::default()).await;
        let headers = bearer(&token_for("42", "user"));

        let reply = gw.handle_subscription(&headers, &subscribe("news:sport", None));
        assert_eq!(reply, ProxyReply::permit());
    }

    #[tokio::test]
    async fn no_matching_rule_is_forbidden() {
        let (gw, _) = gateway(GatewaySettings::default()).await;
        let headers = bearer(&token_for("42", "user"));

        let reply = gw.handle_subscription(&headers, &subscribe("weather", None));
        assert_eq!(reply, ProxyReply::deny(DenialCode::Forbidden));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({"error": {"code": 403, "message": "permission denied"}})
        );
    }

    #[tokio::test]
    async fn role_claim_in_token_grants_nothing() {
        let (gw, _) = gateway(GatewaySettings::default()).await;
        let headers = bearer(&token_for("99", "moderator"));

        let principal = gw.authenticate(&headers, None).unwrap();
        assert!(principal.roles.is_empty());
        assert_eq!(principal.claimed_role, Role::new("moderator"));

        let reply = gw.handle_subscription(&headers, &subscribe("news:sport", None));
        assert_eq!(reply, ProxyReply::deny(DenialCode::Forbidden));
    }

    #[tokio::test]
    async fn principal_roles_include_inherited_roles() {
        let store = Arc::new(InMemoryPolicyStore::new(PolicySet {
            rules: vec![PolicyRule::new("staff", "ops:*", "subscribe")],
            assignments: vec![
                RoleAssignment::new("42", "moderator"),
                RoleAssignment::new("moderator", "staff"),
            ],
        }));
        let engine = Arc::new(PolicyEngine::new(store).await.unwrap());
        let gw = AuthorizationGateway::new(
            Arc::new(Hs256TokenCodec::with_default_ttl(SECRET)),
            engine,
            GatewaySettings::default(),
        );
        let headers = bearer(&token_for("42", "user"));

        let principal = gw.authenticate(&headers, None).unwrap();
        assert!(principal.roles.contains(&Role::new("moderator")));
        assert!(principal.roles.contains(&Role::new("staff")));
        assert!(gw.handle_subscription(&headers, &subscribe("ops:alerts", None)).is_permit());
    }

    #[tokio::test]
    async fn missing_or_broken_tokens_are_unauthorized() {
        let (gw, _) = gateway(GatewaySettings::default()).await;
        let unauthorized = ProxyReply::deny(DenialCode::Unauthorized);

        assert_eq!(gw.handle_subscription(&HeaderMap::new(), &subscribe("news:a", None)), unauthorized);
        assert_eq!(gw.handle_subscription(&bearer("not-a-jwt"), &subscribe("news:a", None)), unauthorized);

        let foreign = Hs256TokenCodec::with_default_ttl(b"other-secret")
            .issue("42", "user", Utc::now())
            .unwrap()
            .token;
        assert_eq!(gw.handle_subscription(&bearer(&foreign), &subscribe("news:a", None)), unauthorized);

        let expired = Hs256TokenCodec::new(SECRET, Duration::hours(1))
            .issue("42", "user", Utc::now() - Duration::hours(2))
            .unwrap()
            .token;
        assert_eq!(gw.handle_subscription(&bearer(&expired), &subscribe("news:a", None)), unauthorized);
        assert_eq!(
            serde_json::to_value(&unauthorized).unwrap(),
            serde_json::json!({"error": {"code": 401, "message": "unauthorized"}})
        );
    }

    #[tokio::test]
    async fn token_source_controls_where_the_token_is_read() {
        let token = token_for("42", "user");

        let (header_only, _) = gateway(GatewaySettings {
            token_source: TokenSource::Header,
            ..Default::default()
        })
        .await;
        assert!(!header_only.handle_subscription(&HeaderMap::new(), &subscribe("news:a", Some(token.clone()))).is_permit());
        assert!(header_only.handle_subscription(&bearer(&token), &subscribe("news:a", None)).is_permit());

        let (body_only, _) = gateway(GatewaySettings {
            token_source: TokenSource::Body,
            ..Default::default()
        })
        .await;
        assert!(!body_only.handle_subscription(&bearer(&token), &subscribe("news:a", None)).is_permit());
        assert!(body_only.handle_subscription(&HeaderMap::new(), &subscribe("news:a", Some(token.clone()))).is_permit());

        let (either, _) = gateway(GatewaySettings::default()).await;
        assert!(either.handle_subscription(&HeaderMap::new(), &subscribe("news:a", Some(token.clone()))).is_permit());
        // Header wins when both are present.
        assert!(!either.handle_subscription(&bearer("garbage"), &subscribe("news:a", Some(token))).is_permit());
    }

    #[tokio::test]
    async fn publication_uses_publish_action() {
        let (gw, _) = gateway(GatewaySettings::default()).await;
        let headers = bearer(&token_for("7", "user"));
        let publish = |channel: &str| PublishRequest {
            meta: subscribe(channel, None),
            data: Some(serde_json::json!({"text": "hi"})),
        };

        assert!(gw.handle_publication(&headers, &publish("chat")).is_permit());
        assert!(!gw.handle_subscription(&headers, &subscribe("chat", None)).is_permit());
    }

    #[tokio::test]
    async fn disabled_checks_still_require_authentication() {
        let (gw, _) = gateway(GatewaySettings {
            check_subscribe: false,
            ..Default::default()
        })
        .await;

        let headers = bearer(&token_for("1000", "user"));
        assert!(gw.handle_subscription(&headers, &subscribe("anything", None)).is_permit());
        assert_eq!(
            gw.handle_subscription(&HeaderMap::new(), &subscribe("anything", None)),
            ProxyReply::deny(DenialCode::Unauthorized)
        );
        assert!(!gw.handle_publication(&headers, &PublishRequest {
            meta: subscribe("anything", None),
            data: None,
        })
        .is_permit());
    }

    #[tokio::test]
    async fn policy_reload_applies_without_token_reissue() {
        let (gw, store) = gateway(GatewaySettings::default()).await;
        let headers = bearer(&token_for("42", "user"));
        assert!(gw.handle_subscription(&headers, &subscribe("news:a", None)).is_permit());

        store.replace(PolicySet::default());
        gw.policy.load().await.unwrap();

        assert!(!gw.handle_subscription(&headers, &subscribe("news:a", None)).is_permit());
    }

    #[test]
    fn permit_envelope_is_empty_result() {
        assert_eq!(
            serde_json::to_value(ProxyReply::permit()).unwrap(),
            serde_json::json!({"result": {}})
        );
    }
}
