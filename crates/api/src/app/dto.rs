use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SigninResponse {
    pub token: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

/// Subscription callback body sent by the broker.
///
/// Only `channel` is required. The connection metadata fields are accepted so
/// the broker's full payload deserializes, and are echoed into logs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscribeRequest {
    #[serde(default)]
    pub client: Option<String>,
    pub channel: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub transport: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
}

/// Publication callback body: the subscription shape plus the payload being
/// published, which is never inspected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishRequest {
    #[serde(flatten)]
    pub meta: SubscribeRequest,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub policy_loaded_at: chrono::DateTime<chrono::Utc>,
    pub rules: usize,
    pub assignments: usize,
}
