use async_trait::async_trait;
use thiserror::Error;

use crate::policy::PolicySet;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The backing store could not be read.
    #[error("policy store unavailable: {0}")]
    Store(String),

    /// The store returned a rule or assignment that cannot be evaluated.
    #[error("invalid policy rule: {0}")]
    InvalidRule(String),
}

/// Source of policy rules and role assignments.
///
/// `load` returns the complete set every time; the engine never merges
/// partial results.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    async fn load(&self) -> Result<PolicySet, PolicyError>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}
