//! `fellowship-auth`: identity context and the policy engine.
//!
//! This crate is intentionally decoupled from HTTP and storage: every
//! decision takes the principal as an explicit argument.

pub mod claims;
pub mod jwt;
pub mod navigation;
pub mod policy;
pub mod principal;
pub mod resource;
pub mod roles;
pub mod user;

pub use claims::{IdentityError, JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtValidator, TokenError, issue_hs256};
pub use navigation::{PageArea, PageOutcome, guard_page};
pub use policy::{
    AuthzError, Decision, DenyReason, PolicyExplanation, PolicyMatrix, ResourceFacts, Rule,
    authorize, decide, decide_with, explain,
};
pub use principal::Principal;
pub use resource::{Action, ResourceClass};
pub use roles::{Role, UnknownRole};
pub use user::{User, UserChange, UserCommand};
