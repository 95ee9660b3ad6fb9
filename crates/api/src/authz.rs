//! API-side authorization guard.
//!
//! Every admin handler calls one of these **before** it touches storage, so
//! a denial never depends on whether the target exists.

use fellowship_auth::{Action, Principal, ResourceClass, ResourceFacts, authorize};

use crate::app::errors::ApiResult;
use crate::context::PrincipalContext;

/// Class-level check for the current request.
pub fn require(ctx: &PrincipalContext, class: ResourceClass, action: Action) -> ApiResult<Principal> {
    require_with(ctx, class, action, ResourceFacts::none())
}

/// Check with instance facts read from the target record.
pub fn require_with(
    ctx: &PrincipalContext,
    class: ResourceClass,
    action: Action,
    facts: ResourceFacts,
) -> ApiResult<Principal> {
    let principal = authorize(ctx.principal(), class, action, facts)?;
    Ok(*principal)
}
