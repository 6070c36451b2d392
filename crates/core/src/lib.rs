//! `relaygate-core`: identifiers, value objects and the domain error model
//! shared by every other relaygate crate.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::AccountId;
pub use value_object::{PlainPassword, Username};
