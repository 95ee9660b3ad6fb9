use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use fellowship_core::{
    Aggregate, AggregateRoot, Change, DomainError, QueueRank, UserId, Violations, record_id,
    sort_queue,
};
use fellowship_members::MemberId;

record_id!(
    /// Follow-up identifier.
    FollowUpId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FollowUpStatus {
    Open,
    Assigned,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpAction {
    Assign,
    Complete,
}

impl FollowUpAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowUpAction::Assign => "assign",
            FollowUpAction::Complete => "complete",
        }
    }
}

impl FollowUpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowUpStatus::Open => "OPEN",
            FollowUpStatus::Assigned => "ASSIGNED",
            FollowUpStatus::Completed => "COMPLETED",
        }
    }

    /// | from      | assign   | complete  |
    /// |-----------|----------|-----------|
    /// | OPEN      | ASSIGNED | COMPLETED |
    /// | ASSIGNED  | ASSIGNED | COMPLETED |
    /// | COMPLETED | error    | error     |
    pub fn transition(self, action: FollowUpAction) -> Result<FollowUpStatus, DomainError> {
        match (self, action) {
            (FollowUpStatus::Completed, action) => Err(DomainError::invalid_transition(
                "follow-up",
                self,
                action.as_str(),
            )),
            (_, FollowUpAction::Assign) => Ok(FollowUpStatus::Assigned),
            (_, FollowUpAction::Complete) => Ok(FollowUpStatus::Completed),
        }
    }
}

impl core::fmt::Display for FollowUpStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl QueueRank for FollowUpStatus {
    fn queue_rank(&self) -> u8 {
        match self {
            FollowUpStatus::Open => 0,
            FollowUpStatus::Assigned => 1,
            FollowUpStatus::Completed => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FollowUpKind {
    Visit,
    #[default]
    Call,
    Welcome,
    Prayer,
    Counseling,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpDraft {
    pub member_id: MemberId,
    #[serde(default)]
    pub kind: FollowUpKind,
    pub notes: String,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<UserId>,
}

/// Recorded when a follow-up is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub outcome: String,
    #[serde(default)]
    pub requires_follow_up: bool,
    pub next_follow_up_date: Option<NaiveDate>,
}

impl Completion {
    fn validate(&self) -> Violations {
        let mut v = Violations::new();
        v.require_text("outcome", &self.outcome);
        v.check(
            !self.requires_follow_up || self.next_follow_up_date.is_some(),
            "nextFollowUpDate",
            "required when requiresFollowUp is set",
        );
        v
    }
}

/// Aggregate root: FollowUp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    id: FollowUpId,
    member_id: MemberId,
    kind: FollowUpKind,
    notes: String,
    due_date: Option<NaiveDate>,
    assigned_to: Option<UserId>,
    status: FollowUpStatus,
    completion: Option<Completion>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
}

impl FollowUp {
    pub fn empty(id: FollowUpId) -> Self {
        let epoch = DateTime::<Utc>::default();
        Self {
            id,
            member_id: MemberId::default(),
            kind: FollowUpKind::default(),
            notes: String::new(),
            due_date: None,
            assigned_to: None,
            status: FollowUpStatus::Open,
            completion: None,
            completed_at: None,
            created_at: epoch,
            updated_at: epoch,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> FollowUpId {
        self.id
    }

    pub fn member_id(&self) -> MemberId {
        self.member_id
    }

    pub fn status(&self) -> FollowUpStatus {
        self.status
    }

    pub fn assigned_to(&self) -> Option<UserId> {
        self.assigned_to
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    /// Date a successor follow-up should surface, if one was asked for.
    ///
    /// Only a hint for listings; nothing schedules work from it.
    pub fn scheduling_hint(&self) -> Option<NaiveDate> {
        match (&self.status, &self.completion) {
            (FollowUpStatus::Completed, Some(c)) if c.requires_follow_up => c.next_follow_up_date,
            _ => None,
        }
    }
}

/// Open work first, then by creation time descending.
pub fn work_queue(items: impl IntoIterator<Item = FollowUp>) -> Vec<FollowUp> {
    let mut queue: Vec<_> = items.into_iter().collect();
    sort_queue(&mut queue, |f| f.status, |f| f.created_at);
    queue
}

impl AggregateRoot for FollowUp {
    type Id = FollowUpId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowUpCommand {
    Open {
        draft: FollowUpDraft,
        occurred_at: DateTime<Utc>,
    },
    Assign {
        assignee: UserId,
        occurred_at: DateTime<Utc>,
    },
    Complete {
        completion: Completion,
        occurred_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FollowUpChange {
    Opened {
        draft: FollowUpDraft,
        occurred_at: DateTime<Utc>,
    },
    Assigned {
        assignee: UserId,
        occurred_at: DateTime<Utc>,
    },
    Completed {
        completion: Completion,
        occurred_at: DateTime<Utc>,
    },
}

impl Change for FollowUpChange {
    fn change_type(&self) -> &'static str {
        match self {
            FollowUpChange::Opened { .. } => "followups.follow_up.opened",
            FollowUpChange::Assigned { .. } => "followups.follow_up.assigned",
            FollowUpChange::Completed { .. } => "followups.follow_up.completed",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            FollowUpChange::Opened { occurred_at, .. }
            | FollowUpChange::Assigned { occurred_at, .. }
            | FollowUpChange::Completed { occurred_at, .. } => *occurred_at,
        }
    }
}

impl Aggregate for FollowUp {
    type Command = FollowUpCommand;
    type Change = FollowUpChange;
    type Error = DomainError;

    fn apply(&mut self, change: &Self::Change) {
        match change {
            FollowUpChange::Opened { draft, occurred_at } => {
                self.member_id = draft.member_id;
                self.kind = draft.kind;
                self.notes = draft.notes.trim().to_string();
                self.due_date = draft.due_date;
                self.assigned_to = draft.assigned_to;
                self.status = if draft.assigned_to.is_some() {
                    FollowUpStatus::Assigned
                } else {
                    FollowUpStatus::Open
                };
                self.created_at = *occurred_at;
                self.updated_at = *occurred_at;
                self.created = true;
            }
            FollowUpChange::Assigned { assignee, occurred_at } => {
                self.assigned_to = Some(*assignee);
                self.status = FollowUpStatus::Assigned;
                self.updated_at = *occurred_at;
            }
            FollowUpChange::Completed { completion, occurred_at } => {
                self.completion = Some(completion.clone());
                self.status = FollowUpStatus::Completed;
                self.completed_at = Some(*occurred_at);
                self.updated_at = *occurred_at;
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Change>, Self::Error> {
        match command {
            FollowUpCommand::Open { draft, occurred_at } => {
                if self.created {
                    return Err(DomainError::invariant("follow-up already exists"));
                }
                let mut v = Violations::new();
                v.require_text("notes", &draft.notes);
                v.finish()?;
                Ok(vec![FollowUpChange::Opened {
                    draft: draft.clone(),
                    occurred_at: *occurred_at,
                }])
            }
            FollowUpCommand::Assign { assignee, occurred_at } => {
                if !self.created {
                    return Err(DomainError::NotFound);
                }
                self.status.transition(FollowUpAction::Assign)?;
                if self.assigned_to == Some(*assignee) {
                    return Ok(Vec::new());
                }
                Ok(vec![FollowUpChange::Assigned {
                    assignee: *assignee,
                    occurred_at: *occurred_at,
                }])
            }
            FollowUpCommand::Complete { completion, occurred_at } => {
                if !self.created {
                    return Err(DomainError::NotFound);
                }
                self.status.transition(FollowUpAction::Complete)?;
                completion.validate().finish()?;
                Ok(vec![FollowUpChange::Completed {
                    completion: Completion {
                        outcome: completion.outcome.trim().to_string(),
                        ..completion.clone()
                    },
                    occurred_at: *occurred_at,
                }])
            }
        }
    }
}
