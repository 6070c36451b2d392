//! Infrastructure layer: storage adapters, configuration and background
//! policy refresh.

pub mod config;
pub mod credentials;
pub mod policy_store;
pub mod refresher;

pub use config::{ConfigError, GatewayConfig, PolicySource, TokenSource};
pub use credentials::{CredentialStore, InMemoryCredentialStore, PostgresCredentialStore, StoreError};
pub use policy_store::{FilePolicyStore, InMemoryPolicyStore, PostgresPolicyStore};
pub use refresher::{PolicyRefresher, PolicyRefresherHandle, RefreshStats};
