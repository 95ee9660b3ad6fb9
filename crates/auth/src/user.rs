//! System user aggregate (accounts that can sign in to the admin area).
//!
//! Managing users is a SUPER_ADMIN-only concern at the policy layer; this
//! module owns the account-level invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fellowship_core::{Aggregate, AggregateRoot, Change, DomainError, UserId, Violations};

use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// User Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// System user.
///
/// # Invariants
/// - Email is stored trimmed and lowercased (uniqueness is enforced by storage).
/// - A user cannot change their own role or delete their own account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
}

impl User {
    pub fn empty(id: UserId) -> Self {
        let epoch = DateTime::<Utc>::default();
        Self {
            id,
            email: String::new(),
            display_name: String::new(),
            role: Role::Member,
            created_at: epoch,
            updated_at: epoch,
            version: 0,
            created: false,
        }
    }

    pub fn is_created(&self) -> bool {
        self.created
    }
}

impl AggregateRoot for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRole {
    pub role: Role,
    /// The principal performing the change.
    pub actor: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteUser {
    pub actor: UserId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UserCommand {
    Create(CreateUser),
    UpdateProfile(UpdateProfile),
    ChangeRole(ChangeRole),
    Delete(DeleteUser),
}

// ─────────────────────────────────────────────────────────────────────────────
// Changes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserChange {
    Created {
        email: String,
        display_name: String,
        role: Role,
        occurred_at: DateTime<Utc>,
    },
    ProfileUpdated {
        email: String,
        display_name: String,
        occurred_at: DateTime<Utc>,
    },
    RoleChanged {
        from: Role,
        to: Role,
        occurred_at: DateTime<Utc>,
    },
    /// Terminal: storage removes the account.
    Deleted { occurred_at: DateTime<Utc> },
}

impl Change for UserChange {
    fn change_type(&self) -> &'static str {
        match self {
            UserChange::Created { .. } => "auth.user.created",
            UserChange::ProfileUpdated { .. } => "auth.user.profile_updated",
            UserChange::RoleChanged { .. } => "auth.user.role_changed",
            UserChange::Deleted { .. } => "auth.user.deleted",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            UserChange::Created { occurred_at, .. }
            | UserChange::ProfileUpdated { occurred_at, .. }
            | UserChange::RoleChanged { occurred_at, .. }
            | UserChange::Deleted { occurred_at } => *occurred_at,
        }
    }

    fn removes_record(&self) -> bool {
        matches!(self, UserChange::Deleted { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregate Implementation
// ─────────────────────────────────────────────────────────────────────────────

impl Aggregate for User {
    type Command = UserCommand;
    type Change = UserChange;
    type Error = DomainError;

    fn apply(&mut self, change: &Self::Change) {
        match change {
            UserChange::Created {
                email,
                display_name,
                role,
                occurred_at,
            } => {
                self.email = email.clone();
                self.display_name = display_name.clone();
                self.role = *role;
                self.created_at = *occurred_at;
                self.updated_at = *occurred_at;
                self.created = true;
            }
            UserChange::ProfileUpdated {
                email,
                display_name,
                occurred_at,
            } => {
                self.email = email.clone();
                self.display_name = display_name.clone();
                self.updated_at = *occurred_at;
            }
            UserChange::RoleChanged { to, occurred_at, .. } => {
                self.role = *to;
                self.updated_at = *occurred_at;
            }
            UserChange::Deleted { occurred_at } => {
                self.updated_at = *occurred_at;
                self.created = false;
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Change>, Self::Error> {
        match command {
            UserCommand::Create(cmd) => self.handle_create(cmd),
            UserCommand::UpdateProfile(cmd) => self.handle_update_profile(cmd),
            UserCommand::ChangeRole(cmd) => self.handle_change_role(cmd),
            UserCommand::Delete(cmd) => self.handle_delete(cmd),
        }
    }
}

impl User {
    fn handle_create(&self, cmd: &CreateUser) -> Result<Vec<UserChange>, DomainError> {
        if self.created {
            return Err(DomainError::invariant("user already exists"));
        }

        let mut v = Violations::new();
        v.require_email("email", &cmd.email);
        v.require_text("displayName", &cmd.display_name);
        v.finish()?;

        Ok(vec![UserChange::Created {
            email: cmd.email.trim().to_lowercase(),
            display_name: cmd.display_name.trim().to_string(),
            role: cmd.role,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_update_profile(&self, cmd: &UpdateProfile) -> Result<Vec<UserChange>, DomainError> {
        if !self.created {
            return Err(DomainError::NotFound);
        }

        let mut v = Violations::new();
        if let Some(email) = &cmd.email {
            v.require_email("email", email);
        }
        if let Some(name) = &cmd.display_name {
            v.require_text("displayName", name);
        }
        v.finish()?;

        Ok(vec![UserChange::ProfileUpdated {
            email: cmd
                .email
                .as_deref()
                .map(|e| e.trim().to_lowercase())
                .unwrap_or_else(|| self.email.clone()),
            display_name: cmd
                .display_name
                .as_deref()
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| self.display_name.clone()),
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_change_role(&self, cmd: &ChangeRole) -> Result<Vec<UserChange>, DomainError> {
        if !self.created {
            return Err(DomainError::NotFound);
        }
        if cmd.actor == self.id {
            return Err(DomainError::invariant("cannot change your own role"));
        }
        if cmd.role == self.role {
            return Ok(Vec::new());
        }

        Ok(vec![UserChange::RoleChanged {
            from: self.role,
            to: cmd.role,
            occurred_at: cmd.occurred_at,
        }])
    }

    fn handle_delete(&self, cmd: &DeleteUser) -> Result<Vec<UserChange>, DomainError> {
        if !self.created {
            return Err(DomainError::NotFound);
        }
        if cmd.actor == self.id {
            return Err(DomainError::invariant("cannot delete your own account"));
        }

        Ok(vec![UserChange::Deleted {
            occurred_at: cmd.occurred_at,
        }])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
