//! Policy store adapters feeding the policy engine.
//!
//! File and Postgres stores share the casbin record layout: `p` records are
//! permission rules `(subject, resource, action)` and `g` records are role
//! assignments `(subject, role)`.

pub mod casbin;
pub mod file;
pub mod in_memory;
pub mod postgres;

pub use casbin::{PolicyRecord, parse_policy_csv};
pub use file::FilePolicyStore;
pub use in_memory::InMemoryPolicyStore;
pub use postgres::PostgresPolicyStore;
