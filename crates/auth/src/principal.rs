use serde::{Deserialize, Serialize};

use fellowship_core::UserId;

use crate::Role;

/// The authenticated actor behind a request.
///
/// Built once per request from verified claims and passed explicitly to every
/// policy and lifecycle call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
}

impl Principal {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}
