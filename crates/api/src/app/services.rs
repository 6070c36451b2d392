//! Service wiring: stores, policy engine, codec and the services built on
//! them.

use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use relaygate_auth::{
    Argon2Verifier, CredentialVerifier, Hs256TokenCodec, PolicyEngine, PolicySet, PolicyStore, Role,
    TokenCodec,
};
use relaygate_infra::{
    CredentialStore, FilePolicyStore, GatewayConfig, InMemoryCredentialStore, InMemoryPolicyStore,
    PolicySource, PostgresCredentialStore, PostgresPolicyStore,
};

use crate::accounts::AccountService;
use crate::gateway::{AuthorizationGateway, GatewaySettings};

/// Where the broker callbacks are mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRoutes {
    pub subscribe: String,
    pub publish: String,
}

impl Default for ProxyRoutes {
    fn default() -> Self {
        Self {
            subscribe: "/centrifugo/subscribe".to_string(),
            publish: "/centrifugo/publish".to_string(),
        }
    }
}

pub struct AppServices {
    pub accounts: AccountService,
    pub gateway: AuthorizationGateway,
    pub policy: Arc<PolicyEngine>,
    pub routes: ProxyRoutes,
}

/// Hand-assembled collaborators, mostly for tests and embedding.
pub struct ServiceParts {
    pub credentials: Arc<dyn CredentialStore>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub tokens: Arc<dyn TokenCodec>,
    pub policy: Arc<PolicyEngine>,
    pub settings: GatewaySettings,
    pub default_role: Role,
    pub routes: ProxyRoutes,
}

impl AppServices {
    pub fn from_parts(parts: ServiceParts) -> Self {
        Self {
            accounts: AccountService::new(parts.credentials, parts.verifier, parts.tokens.clone(), parts.default_role),
            gateway: AuthorizationGateway::new(parts.tokens, parts.policy.clone(), parts.settings),
            policy: parts.policy,
            routes: parts.routes,
        }
    }

}

/// Build services from configuration.
///
/// Fails if the first policy load fails: the process must not serve
/// authorization decisions without a policy.
pub async fn build_services(config: &GatewayConfig) -> anyhow::Result<AppServices> {
    let pool = match &config.database_url {
        Some(url) => Some(
            PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("failed to connect to Postgres")?,
        ),
        None => None,
    };

    let credentials: Arc<dyn CredentialStore> = match &pool {
        Some(pool) => {
            let store = PostgresCredentialStore::new(pool.clone());
            store.ensure_schema().await.context("failed to prepare users table")?;
            info!("using Postgres credential store");
            Arc::new(store)
        }
        None => {
            warn!("DATABASE_URL not set; accounts are kept in memory and lost on restart");
            Arc::new(InMemoryCredentialStore::new())
        }
    };

    let policy_store: Arc<dyn PolicyStore> = match (config.policy_source(), &pool) {
        (PolicySource::File(path), _) => Arc::new(FilePolicyStore::new(path)),
        (PolicySource::Postgres, Some(pool)) => {
            let store = PostgresPolicyStore::new(pool.clone());
            store.ensure_schema().await.context("failed to prepare casbin_rule table")?;
            Arc::new(store)
        }
        (PolicySource::Postgres, None) | (PolicySource::Empty, _) => {
            warn!("no policy source configured; every channel request will be denied");
            Arc::new(InMemoryPolicyStore::new(PolicySet::default()))
        }
    };
    info!(store = policy_store.name(), "loading policy");

    let policy = Arc::new(
        PolicyEngine::new(policy_store)
            .await
            .context("initial policy load failed; refusing to start")?,
    );

    Ok(AppServices::from_parts(ServiceParts {
        credentials,
        verifier: Arc::new(Argon2Verifier::new()),
        tokens: Arc::new(Hs256TokenCodec::new(config.jwt_secret.as_bytes(), config.token_ttl)),
        policy,
        settings: GatewaySettings::from(config),
        default_role: Role::new(config.default_role.clone()),
        routes: ProxyRoutes {
            subscribe: config.subscribe_path.clone(),
            publish: config.publish_path.clone(),
        },
    }))
}
