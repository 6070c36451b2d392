//! Account credential storage boundary.
//!
//! The authentication flow needs exactly two operations from storage:
//! create an account and look one up by username.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryCredentialStore;
pub use postgres::PostgresCredentialStore;
pub use r#trait::{CredentialStore, StoreError};
