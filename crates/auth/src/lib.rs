//! `relaygate-auth`: token codec, credential verification and the channel
//! policy engine.
//!
//! This crate is intentionally decoupled from HTTP. Storage is reached only
//! through the [`PolicyStore`] trait.

pub mod account;
pub mod action;
pub mod authorize;
pub mod claims;
pub mod password;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod token;

pub use account::{Account, NewAccount};
pub use action::Action;
pub use authorize::{authorize, Decision, DenialCode};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use password::{Argon2Verifier, CredentialError, CredentialVerifier};
pub use policy::{
    LoadReport, PolicyEngine, PolicyError, PolicyRule, PolicySet, PolicySnapshot, PolicyStore,
    RoleAssignment,
};
pub use principal::{Principal, Subject};
pub use roles::Role;
pub use token::{DEFAULT_TOKEN_TTL_SECS, Hs256TokenCodec, IssuedToken, TokenCodec, TokenError};
