//! Channel access policy: rules, role assignments and the in-memory engine.
//!
//! A rule `(subject_or_role, resource, action)` grants `action` on every
//! channel matching `resource`. A role assignment `(subject, role)` lets the
//! subject inherit every rule naming the role. Evaluation is "permit if any
//! rule matches"; there is no explicit deny and no precedence between
//! specific and broad rules.

pub mod engine;
pub mod model;
pub mod snapshot;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{LoadReport, PolicyEngine};
pub use model::{PolicyRule, PolicySet, RoleAssignment, pattern_matches};
pub use snapshot::{MAX_ROLE_DEPTH, PolicySnapshot};
pub use store::{PolicyError, PolicyStore};
