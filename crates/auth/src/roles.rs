use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role granted to a system user.
///
/// The set is closed: any other value coming from the identity provider is a
/// configuration error, not something the policy engine decides on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    Leader,
    Member,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    /// All roles, most privileged first.
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::Admin, Role::Leader, Role::Member];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Leader => "LEADER",
            Role::Member => "MEMBER",
        }
    }

    /// Whether this role can see the admin area at all.
    pub fn has_admin_surface(&self) -> bool {
        !matches!(self, Role::Member)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Full access, including system users and settings",
            Role::Admin => "All church records except system users and settings",
            Role::Leader => "Pastoral records: members, follow-ups, events, ministries, groups",
            Role::Member => "No admin access",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}
