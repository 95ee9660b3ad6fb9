//! Policy engine: (role, resource class, action, facts) → allow/deny.
//!
//! - No IO
//! - No panics
//! - Total over every input combination
//!
//! Roles are evaluated most-privileged first. There is no instance-level
//! ownership override: a leader's allowlist is class-level only.

use serde::Serialize;
use thiserror::Error;

use crate::{Action, Principal, ResourceClass, Role};

/// Classes a LEADER may read and update.
const LEADER_ALLOWLIST: &[ResourceClass] = &[
    ResourceClass::Member,
    ResourceClass::FollowUp,
    ResourceClass::Event,
    ResourceClass::Ministry,
    ResourceClass::Group,
];

/// Classes only a SUPER_ADMIN may touch, whatever the action.
const SUPER_ADMIN_ONLY: &[ResourceClass] = &[ResourceClass::User, ResourceClass::Settings];

/// Instance facts the engine may need beyond the class.
///
/// Only prayer-request sharing is consulted today. `None` means the decision
/// is made at collection level (e.g. a listing the caller filters afterwards).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResourceFacts {
    pub shared_with_leaders: Option<bool>,
}

impl ResourceFacts {
    pub fn none() -> Self {
        Self::default()
    }

    /// Facts for a single prayer request (`shareWithLeaders || shareWithPastors`).
    pub fn prayer_sharing(shared: bool) -> Self {
        Self {
            shared_with_leaders: Some(shared),
        }
    }
}

/// Why a request was denied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The role has no admin surface at all.
    NoAdminSurface,
    /// User management and settings belong to SUPER_ADMIN.
    SuperAdminOnly,
    /// Outside the leader's class/action allowlist.
    OutsideLeaderAllowlist,
    /// The prayer request is not shared with leaders or pastors.
    NotSharedWithLeaders,
}

impl core::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            DenyReason::NoAdminSurface => "role has no access to the admin area",
            DenyReason::SuperAdminOnly => "restricted to super administrators",
            DenyReason::OutsideLeaderAllowlist => "not permitted for leaders",
            DenyReason::NotSharedWithLeaders => "prayer request is not shared with leaders",
        };
        f.write_str(msg)
    }
}

/// Outcome of a policy evaluation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// The table row that produced a decision (for audit output).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    SuperAdminBypass,
    AdminGeneral,
    AdminExcludedClass,
    LeaderAllowlist,
    LeaderSharedPrayer,
    LeaderDefaultDeny,
    MemberNoAdminSurface,
}

/// Authorization failure as seen by request handlers.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: {0}")]
    Forbidden(DenyReason),
}

fn evaluate(role: Role, class: ResourceClass, action: Action, facts: ResourceFacts) -> (Decision, Rule) {
    match role {
        Role::SuperAdmin => (Decision::Allow, Rule::SuperAdminBypass),
        Role::Admin if SUPER_ADMIN_ONLY.contains(&class) => (
            Decision::Deny(DenyReason::SuperAdminOnly),
            Rule::AdminExcludedClass,
        ),
        Role::Admin => (Decision::Allow, Rule::AdminGeneral),
        Role::Leader => {
            if LEADER_ALLOWLIST.contains(&class) && matches!(action, Action::Read | Action::Update) {
                return (Decision::Allow, Rule::LeaderAllowlist);
            }
            if class == ResourceClass::PrayerRequest && action == Action::Read {
                let decision = match facts.shared_with_leaders {
                    Some(false) => Decision::Deny(DenyReason::NotSharedWithLeaders),
                    Some(true) | None => Decision::Allow,
                };
                return (decision, Rule::LeaderSharedPrayer);
            }
            (
                Decision::Deny(DenyReason::OutsideLeaderAllowlist),
                Rule::LeaderDefaultDeny,
            )
        }
        Role::Member => (
            Decision::Deny(DenyReason::NoAdminSurface),
            Rule::MemberNoAdminSurface,
        ),
    }
}

/// Decide at class level (no instance facts).
pub fn decide(principal: &Principal, class: ResourceClass, action: Action) -> Decision {
    decide_with(principal, class, action, ResourceFacts::none())
}

/// Decide with instance facts.
pub fn decide_with(
    principal: &Principal,
    class: ResourceClass,
    action: Action,
    facts: ResourceFacts,
) -> Decision {
    evaluate(principal.role, class, action, facts).0
}

/// Authorize an optional principal, returning it on success.
///
/// A missing principal is `Unauthenticated`; a denial is `Forbidden`. Callers
/// must look the target resource up only after this succeeds.
pub fn authorize<'a>(
    principal: Option<&'a Principal>,
    class: ResourceClass,
    action: Action,
    facts: ResourceFacts,
) -> Result<&'a Principal, AuthzError> {
    let principal = principal.ok_or(AuthzError::Unauthenticated)?;
    match decide_with(principal, class, action, facts) {
        Decision::Allow => Ok(principal),
        Decision::Deny(reason) => {
            tracing::debug!(
                role = %principal.role,
                class = %class,
                action = %action,
                reason = ?reason,
                "policy denied request"
            );
            Err(AuthzError::Forbidden(reason))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Explanation (audit trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Serializable account of one decision: `{ allowed, reason? }` plus the rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyExplanation {
    pub role: Role,
    pub class: ResourceClass,
    pub action: Action,
    pub allowed: bool,
    pub rule: Rule,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub fn explain(role: Role, class: ResourceClass, action: Action, facts: ResourceFacts) -> PolicyExplanation {
    let (decision, rule) = evaluate(role, class, action, facts);
    let reason = match decision {
        Decision::Allow => None,
        Decision::Deny(r) => Some(r.to_string()),
    };
    PolicyExplanation {
        role,
        class,
        action,
        allowed: decision.is_allowed(),
        rule,
        reason,
    }
}

/// One cell of the role × class × action table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixEntry {
    pub role: Role,
    pub class: ResourceClass,
    pub action: Action,
    pub allowed: bool,
    /// Allowed only for instances whose facts permit it.
    pub conditional: bool,
}

/// The full policy table, evaluated at collection level.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyMatrix {
    pub entries: Vec<MatrixEntry>,
}

impl PolicyMatrix {
    pub fn build() -> Self {
        let mut entries = Vec::with_capacity(Role::ALL.len() * ResourceClass::ALL.len() * Action::ALL.len());
        for role in Role::ALL {
            for class in ResourceClass::ALL {
                for action in Action::ALL {
                    let (decision, rule) = evaluate(role, class, action, ResourceFacts::none());
                    entries.push(MatrixEntry {
                        role,
                        class,
                        action,
                        allowed: decision.is_allowed(),
                        conditional: rule == Rule::LeaderSharedPrayer,
                    });
                }
            }
        }
        Self { entries }
    }

    pub fn for_role(&self, role: Role) -> impl Iterator<Item = &MatrixEntry> {
        self.entries.iter().filter(move |e| e.role == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fellowship_core::UserId;
    use proptest::prelude::*;

    fn principal(role: Role) -> Principal {
        Principal::new(UserId::new(), role)
    }

    fn admin_classes() -> impl Iterator<Item = ResourceClass> {
        ResourceClass::ALL.into_iter()
    }

    #[test]
    fn super_admin_is_allowed_everything() {
        let p = principal(Role::SuperAdmin);
        for class in admin_classes() {
            for action in Action::ALL {
                assert_eq!(decide(&p, class, action), Decision::Allow, "{class} {action}");
            }
        }
    }

    #[test]
    fn admin_cannot_manage_users_or_settings() {
        let p = principal(Role::Admin);
        for action in [Action::Create, Action::Update, Action::Delete, Action::Read] {
            assert_eq!(
                decide(&p, ResourceClass::User, action),
                Decision::Deny(DenyReason::SuperAdminOnly)
            );
            assert!(!decide(&p, ResourceClass::Settings, action).is_allowed());
        }
    }

    #[test]
    fn admin_is_allowed_every_other_class() {
        let p = principal(Role::Admin);
        for class in admin_classes().filter(|c| !SUPER_ADMIN_ONLY.contains(c)) {
            for action in Action::ALL {
                assert!(decide(&p, class, action).is_allowed(), "{class} {action}");
            }
        }
    }

    #[test]
    fn leader_allowlist() {
        let p = principal(Role::Leader);
        assert!(decide(&p, ResourceClass::Member, Action::Read).is_allowed());
        assert!(decide(&p, ResourceClass::FollowUp, Action::Update).is_allowed());
        assert!(!decide(&p, ResourceClass::Member, Action::Delete).is_allowed());
        assert!(!decide(&p, ResourceClass::Member, Action::Approve).is_allowed());
        assert!(!decide(&p, ResourceClass::ContactMessage, Action::Read).is_allowed());
        assert!(!decide(&p, ResourceClass::Notice, Action::Read).is_allowed());
        for action in Action::ALL {
            assert!(!decide(&p, ResourceClass::User, action).is_allowed());
        }
    }

    #[test]
    fn leader_prayer_reads_depend_on_sharing() {
        let p = principal(Role::Leader);
        let class = ResourceClass::PrayerRequest;
        assert!(decide(&p, class, Action::Read).is_allowed());
        assert!(decide_with(&p, class, Action::Read, ResourceFacts::prayer_sharing(true)).is_allowed());
        assert_eq!(
            decide_with(&p, class, Action::Read, ResourceFacts::prayer_sharing(false)),
            Decision::Deny(DenyReason::NotSharedWithLeaders)
        );
        assert!(!decide(&p, class, Action::MarkPrayed).is_allowed());
        assert!(!decide(&p, class, Action::Update).is_allowed());
    }

    #[test]
    fn member_is_denied_every_admin_class() {
        let p = principal(Role::Member);
        for class in admin_classes() {
            for action in Action::ALL {
                assert_eq!(
                    decide(&p, class, action),
                    Decision::Deny(DenyReason::NoAdminSurface)
                );
            }
        }
    }

    #[test]
    fn authorize_distinguishes_missing_principal_from_denial() {
        assert_eq!(
            authorize(None, ResourceClass::Member, Action::Read, ResourceFacts::none()),
            Err(AuthzError::Unauthenticated)
        );

        let p = principal(Role::Leader);
        assert_eq!(
            authorize(Some(&p), ResourceClass::ContactMessage, Action::Read, ResourceFacts::none()),
            Err(AuthzError::Forbidden(DenyReason::OutsideLeaderAllowlist))
        );
        assert_eq!(
            authorize(Some(&p), ResourceClass::Member, Action::Read, ResourceFacts::none()),
            Ok(&p)
        );
    }

    #[test]
    fn explanation_names_rule_and_reason() {
        let e = explain(Role::Admin, ResourceClass::User, Action::Delete, ResourceFacts::none());
        assert!(!e.allowed);
        assert_eq!(e.rule, Rule::AdminExcludedClass);
        assert_eq!(e.reason.as_deref(), Some("restricted to super administrators"));

        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["role"], "ADMIN");
        assert_eq!(json["class"], "USER");
        assert_eq!(json["action"], "delete");
    }

    #[test]
    fn matrix_covers_every_combination_and_flags_conditional_cells() {
        let m = PolicyMatrix::build();
        assert_eq!(m.entries.len(), 4 * 12 * 8);
        let conditional: Vec<_> = m.entries.iter().filter(|e| e.conditional).collect();
        assert_eq!(conditional.len(), 1);
        assert_eq!(conditional[0].role, Role::Leader);
        assert_eq!(conditional[0].class, ResourceClass::PrayerRequest);
        assert_eq!(m.for_role(Role::Member).filter(|e| e.allowed).count(), 0);
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::ALL.to_vec())
    }

    fn any_class() -> impl Strategy<Value = ResourceClass> {
        prop::sample::select(ResourceClass::ALL.to_vec())
    }

    fn any_action() -> impl Strategy<Value = Action> {
        prop::sample::select(Action::ALL.to_vec())
    }

    fn any_facts() -> impl Strategy<Value = ResourceFacts> {
        prop::option::of(any::<bool>()).prop_map(|shared_with_leaders| ResourceFacts { shared_with_leaders })
    }

    proptest! {
        /// Property: decisions are a pure function of their inputs.
        #[test]
        fn decide_is_deterministic(role in any_role(), class in any_class(), action in any_action(), facts in any_facts()) {
            let p = principal(role);
            let q = principal(role);
            prop_assert_eq!(decide_with(&p, class, action, facts), decide_with(&q, class, action, facts));
        }

        /// Property: instance facts never widen access beyond the class-level decision.
        #[test]
        fn facts_never_widen_access(role in any_role(), class in any_class(), action in any_action(), facts in any_facts()) {
            let p = principal(role);
            if decide_with(&p, class, action, facts).is_allowed() {
                prop_assert!(decide(&p, class, action).is_allowed());
            }
        }
    }
}
