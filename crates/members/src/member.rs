use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use fellowship_core::{
    Aggregate, AggregateRoot, Change, DomainError, QueueRank, RecordId, Violations, record_id,
    sort_queue,
};

record_id!(
    /// Member identifier.
    MemberId
);

/// Registration status.
///
/// A rejected registration has no status: rejection deletes the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    Pending,
    Active,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Pending => "PENDING",
            MemberStatus::Active => "ACTIVE",
        }
    }

    /// Transition table: current status × action → next state.
    ///
    /// | from    | approve | reject  |
    /// |---------|---------|---------|
    /// | PENDING | ACTIVE  | removed |
    /// | ACTIVE  | error   | error   |
    pub fn transition(self, action: MemberAction) -> Result<MemberTransition, DomainError> {
        match (self, action) {
            (MemberStatus::Pending, MemberAction::Approve) => Ok(MemberTransition::To(MemberStatus::Active)),
            (MemberStatus::Pending, MemberAction::Reject) => Ok(MemberTransition::Remove),
            (from, action) => Err(DomainError::invalid_transition("member", from, action.as_str())),
        }
    }
}

impl core::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl QueueRank for MemberStatus {
    fn queue_rank(&self) -> u8 {
        match self {
            MemberStatus::Pending => 0,
            MemberStatus::Active => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAction {
    Approve,
    Reject,
}

impl MemberAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberAction::Approve => "approve",
            MemberAction::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberTransition {
    To(MemberStatus),
    /// Irreversible: the record is deleted.
    Remove,
}

/// How the member record came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationSource {
    /// Public self-registration; starts PENDING.
    SelfRegistration,
    /// Entered by staff; starts ACTIVE.
    Staff,
}

impl RegistrationSource {
    fn initial_status(self) -> MemberStatus {
        match self {
            RegistrationSource::SelfRegistration => MemberStatus::Pending,
            RegistrationSource::Staff => MemberStatus::Active,
        }
    }
}

/// Personal details captured at registration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub ministry_ids: Vec<RecordId>,
    #[serde(default)]
    pub group_ids: Vec<RecordId>,
}

impl MemberDetails {
    fn validate(&self, today: NaiveDate) -> Violations {
        let mut v = Violations::new();
        v.require_text("firstName", &self.first_name);
        v.require_text("lastName", &self.last_name);
        v.require_email("email", &self.email);
        if let Some(dob) = self.date_of_birth {
            v.check(dob <= today, "dateOfBirth", "must not be in the future");
        }
        v
    }

    fn normalized(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.phone = self.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
        self.address = self.address.map(|a| a.trim().to_string()).filter(|a| !a.is_empty());
        self.ministry_ids.sort();
        self.ministry_ids.dedup();
        self.group_ids.sort();
        self.group_ids.dedup();
        self
    }
}

/// Partial update of member details; `None` leaves a field unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDetailsPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub ministry_ids: Option<Vec<RecordId>>,
    pub group_ids: Option<Vec<RecordId>>,
}

impl MemberDetailsPatch {
    fn merge_into(&self, base: &MemberDetails) -> MemberDetails {
        MemberDetails {
            first_name: self.first_name.clone().unwrap_or_else(|| base.first_name.clone()),
            last_name: self.last_name.clone().unwrap_or_else(|| base.last_name.clone()),
            email: self.email.clone().unwrap_or_else(|| base.email.clone()),
            phone: self.phone.clone().or_else(|| base.phone.clone()),
            address: self.address.clone().or_else(|| base.address.clone()),
            date_of_birth: self.date_of_birth.or(base.date_of_birth),
            ministry_ids: self.ministry_ids.clone().unwrap_or_else(|| base.ministry_ids.clone()),
            group_ids: self.group_ids.clone().unwrap_or_else(|| base.group_ids.clone()),
        }
    }
}

/// Aggregate root: Member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    id: MemberId,
    #[serde(flatten)]
    details: MemberDetails,
    status: MemberStatus,
    source: RegistrationSource,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
}

impl Member {
    /// Create an empty, not-yet-registered instance.
    pub fn empty(id: MemberId) -> Self {
        Self {
            id,
            details: MemberDetails::default(),
            status: MemberStatus::Pending,
            source: RegistrationSource::SelfRegistration,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> MemberId {
        self.id
    }

    pub fn details(&self) -> &MemberDetails {
        &self.details
    }

    pub fn email(&self) -> &str {
        &self.details.email
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.details.first_name, self.details.last_name)
    }

    pub fn status(&self) -> MemberStatus {
        self.status
    }

    pub fn source(&self) -> RegistrationSource {
        self.source
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_registered(&self) -> bool {
        self.created
    }
}

impl AggregateRoot for Member {
    type Id = MemberId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Pending registrations, newest first.
pub fn pending_queue(members: impl IntoIterator<Item = Member>) -> Vec<Member> {
    let mut queue: Vec<Member> = members
        .into_iter()
        .filter(|m| m.status == MemberStatus::Pending)
        .collect();
    sort_queue(&mut queue, |m| m.status, |m| m.created_at);
    queue
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberCommand {
    Register {
        details: MemberDetails,
        source: RegistrationSource,
        occurred_at: DateTime<Utc>,
    },
    UpdateDetails {
        patch: MemberDetailsPatch,
        occurred_at: DateTime<Utc>,
    },
    Approve {
        occurred_at: DateTime<Utc>,
    },
    Reject {
        occurred_at: DateTime<Utc>,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Changes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberChange {
    Registered {
        details: MemberDetails,
        source: RegistrationSource,
        status: MemberStatus,
        occurred_at: DateTime<Utc>,
    },
    DetailsUpdated {
        details: MemberDetails,
        occurred_at: DateTime<Utc>,
    },
    Approved {
        occurred_at: DateTime<Utc>,
    },
    /// Terminal: storage must delete the record.
    Rejected {
        occurred_at: DateTime<Utc>,
    },
}

impl Change for MemberChange {
    fn change_type(&self) -> &'static str {
        match self {
            MemberChange::Registered { .. } => "members.member.registered",
            MemberChange::DetailsUpdated { .. } => "members.member.details_updated",
            MemberChange::Approved { .. } => "members.member.approved",
            MemberChange::Rejected { .. } => "members.member.rejected",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            MemberChange::Registered { occurred_at, .. }
            | MemberChange::DetailsUpdated { occurred_at, .. }
            | MemberChange::Approved { occurred_at }
            | MemberChange::Rejected { occurred_at } => *occurred_at,
        }
    }

    fn removes_record(&self) -> bool {
        matches!(self, MemberChange::Rejected { .. })
    }
}

impl Aggregate for Member {
    type Command = MemberCommand;
    type Change = MemberChange;
    type Error = DomainError;

    fn apply(&mut self, change: &Self::Change) {
        match change {
            MemberChange::Registered {
                details,
                source,
                status,
                occurred_at,
            } => {
                self.details = details.clone();
                self.source = *source;
                self.status = *status;
                self.created_at = *occurred_at;
                self.updated_at = *occurred_at;
                self.created = true;
            }
            MemberChange::DetailsUpdated { details, occurred_at } => {
                self.details = details.clone();
                self.updated_at = *occurred_at;
            }
            MemberChange::Approved { occurred_at } => {
                self.status = MemberStatus::Active;
                self.updated_at = *occurred_at;
            }
            MemberChange::Rejected { occurred_at } => {
                self.updated_at = *occurred_at;
                self.created = false;
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Change>, Self::Error> {
        match command {
            MemberCommand::Register {
                details,
                source,
                occurred_at,
            } => {
                if self.created {
                    return Err(DomainError::invariant("member already registered"));
                }
                details.validate(occurred_at.date_naive()).finish()?;
                Ok(vec![MemberChange::Registered {
                    details: details.clone().normalized(),
                    source: *source,
                    status: source.initial_status(),
                    occurred_at: *occurred_at,
                }])
            }
            MemberCommand::UpdateDetails { patch, occurred_at } => {
                self.ensure_registered()?;
                let merged = patch.merge_into(&self.details);
                merged.validate(occurred_at.date_naive()).finish()?;
                Ok(vec![MemberChange::DetailsUpdated {
                    details: merged.normalized(),
                    occurred_at: *occurred_at,
                }])
            }
            MemberCommand::Approve { occurred_at } => {
                self.ensure_registered()?;
                match self.status.transition(MemberAction::Approve)? {
                    MemberTransition::To(_) => Ok(vec![MemberChange::Approved {
                        occurred_at: *occurred_at,
                    }]),
                    MemberTransition::Remove => Err(DomainError::invariant("approve cannot remove")),
                }
            }
            MemberCommand::Reject { occurred_at } => {
                self.ensure_registered()?;
                match self.status.transition(MemberAction::Reject)? {
                    MemberTransition::Remove => Ok(vec![MemberChange::Rejected {
                        occurred_at: *occurred_at,
                    }]),
                    MemberTransition::To(_) => Err(DomainError::invariant("reject must remove")),
                }
            }
        }
    }
}

impl Member {
    fn ensure_registered(&self) -> Result<(), DomainError> {
        if self.created {
            Ok(())
        } else {
            Err(DomainError::NotFound)
        }
    }
}
