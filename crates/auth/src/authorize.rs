//! Access decisions for (subject, channel, action) requests.

use serde::Serialize;
use tracing::debug;

use crate::{Action, PolicyEngine, Principal};

/// Why a request was refused. Codes follow HTTP semantics because the broker
/// proxy protocol echoes them to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialCode {
    /// No valid credential was presented.
    Unauthorized,
    /// Authenticated, but no policy rule grants the request.
    Forbidden,
}

impl DenialCode {
    pub fn status(&self) -> u16 {
        match self {
            DenialCode::Unauthorized => 401,
            DenialCode::Forbidden => 403,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DenialCode::Unauthorized => "unauthorized",
            DenialCode::Forbidden => "permission denied",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    Permit,
    Deny { code: DenialCode },
}

impl Decision {
    pub fn is_permit(&self) -> bool {
        matches!(self, Decision::Permit)
    }
}

/// Decide whether `principal` may perform `action` on `channel`.
///
/// - No IO
/// - No panics
/// - Absence of a matching rule is a denial, never an error
pub fn authorize(engine: &PolicyEngine, principal: &Principal, channel: &str, action: &Action) -> Decision {
    let snapshot = engine.snapshot();
    match snapshot.explain(principal.subject.as_str(), channel, action.as_str()) {
        Some(rule) => {
            debug!(
                subject = %principal.subject,
                channel,
                action = %action,
                rule_subject = %rule.subject,
                rule_resource = %rule.resource,
                rule_action = %rule.action,
                "permitted by policy rule"
            );
            Decision::Permit
        }
        None => Decision::Deny { code: DenialCode::Forbidden },
    }
}
