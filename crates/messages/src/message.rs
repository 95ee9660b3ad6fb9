use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fellowship_core::{Aggregate, AggregateRoot, Change, DomainError, QueueRank, Violations, record_id, sort_queue};

record_id!(
    /// Contact message identifier.
    ContactMessageId
);

/// Triage status of a contact message.
///
/// Operators may set any status directly; the only automatic move is to
/// `Responded` when a response is recorded without an explicit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactStatus {
    New,
    InProgress,
    Responded,
    Closed,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "NEW",
            ContactStatus::InProgress => "IN_PROGRESS",
            ContactStatus::Responded => "RESPONDED",
            ContactStatus::Closed => "CLOSED",
        }
    }
}

impl core::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl QueueRank for ContactStatus {
    fn queue_rank(&self) -> u8 {
        match self {
            ContactStatus::New => 0,
            ContactStatus::InProgress => 1,
            ContactStatus::Responded => 2,
            ContactStatus::Closed => 3,
        }
    }
}

/// Public contact form payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: String,
    pub message: String,
}

impl ContactSubmission {
    fn validate(&self) -> Violations {
        let mut v = Violations::new();
        v.require_text("name", &self.name);
        v.require_email("email", &self.email);
        v.require_text("subject", &self.subject);
        v.require_text("message", &self.message);
        v
    }
}

/// Aggregate root: ContactMessage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    id: ContactMessageId,
    name: String,
    email: String,
    phone: Option<String>,
    subject: String,
    message: String,
    status: ContactStatus,
    response: Option<String>,
    responded_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
}

impl ContactMessage {
    pub fn empty(id: ContactMessageId) -> Self {
        Self {
            id,
            name: String::new(),
            email: String::new(),
            phone: None,
            subject: String::new(),
            message: String::new(),
            status: ContactStatus::New,
            response: None,
            responded_at: None,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ContactMessageId {
        self.id
    }

    pub fn status(&self) -> ContactStatus {
        self.status
    }

    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    pub fn responded_at(&self) -> Option<DateTime<Utc>> {
        self.responded_at
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl AggregateRoot for ContactMessage {
    type Id = ContactMessageId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Unresolved messages first, newest first within a status.
pub fn triage_queue(messages: impl IntoIterator<Item = ContactMessage>) -> Vec<ContactMessage> {
    let mut queue: Vec<_> = messages.into_iter().collect();
    sort_queue(&mut queue, |m| m.status, |m| m.created_at);
    queue
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactCommand {
    Submit {
        submission: ContactSubmission,
        occurred_at: DateTime<Utc>,
    },
    /// Operator update. `response: Some("")` clears the stored response.
    Update {
        status: Option<ContactStatus>,
        response: Option<String>,
        occurred_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactChange {
    Submitted {
        submission: ContactSubmission,
        occurred_at: DateTime<Utc>,
    },
    ResponseRecorded {
        response: String,
        occurred_at: DateTime<Utc>,
    },
    /// Response text removed; `responded_at` is kept.
    ResponseCleared {
        occurred_at: DateTime<Utc>,
    },
    StatusChanged {
        from: ContactStatus,
        to: ContactStatus,
        occurred_at: DateTime<Utc>,
    },
}

impl Change for ContactChange {
    fn change_type(&self) -> &'static str {
        match self {
            ContactChange::Submitted { .. } => "messages.contact.submitted",
            ContactChange::ResponseRecorded { .. } => "messages.contact.response_recorded",
            ContactChange::ResponseCleared { .. } => "messages.contact.response_cleared",
            ContactChange::StatusChanged { .. } => "messages.contact.status_changed",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ContactChange::Submitted { occurred_at, .. }
            | ContactChange::ResponseRecorded { occurred_at, .. }
            | ContactChange::ResponseCleared { occurred_at }
            | ContactChange::StatusChanged { occurred_at, .. } => *occurred_at,
        }
    }
}

impl Aggregate for ContactMessage {
    type Command = ContactCommand;
    type Change = ContactChange;
    type Error = DomainError;

    fn apply(&mut self, change: &Self::Change) {
        match change {
            ContactChange::Submitted { submission, occurred_at } => {
                self.name = submission.name.trim().to_string();
                self.email = submission.email.trim().to_lowercase();
                self.phone = submission
                    .phone
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string);
                self.subject = submission.subject.trim().to_string();
                self.message = submission.message.trim().to_string();
                self.status = ContactStatus::New;
                self.created_at = *occurred_at;
                self.updated_at = *occurred_at;
                self.created = true;
            }
            ContactChange::ResponseRecorded { response, occurred_at } => {
                self.response = Some(response.clone());
                self.responded_at = Some(*occurred_at);
                self.updated_at = *occurred_at;
            }
            ContactChange::ResponseCleared { occurred_at } => {
                self.response = None;
                self.updated_at = *occurred_at;
            }
            ContactChange::StatusChanged { to, occurred_at, .. } => {
                self.status = *to;
                self.updated_at = *occurred_at;
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Change>, Self::Error> {
        match command {
            ContactCommand::Submit { submission, occurred_at } => {
                if self.created {
                    return Err(DomainError::invariant("message already submitted"));
                }
                submission.validate().finish()?;
                Ok(vec![ContactChange::Submitted {
                    submission: submission.clone(),
                    occurred_at: *occurred_at,
                }])
            }
            ContactCommand::Update {
                status,
                response,
                occurred_at,
            } => {
                if !self.created {
                    return Err(DomainError::NotFound);
                }
                Ok(self.plan_update(*status, response.as_deref(), *occurred_at))
            }
        }
    }
}

impl ContactMessage {
    fn plan_update(
        &self,
        status: Option<ContactStatus>,
        response: Option<&str>,
        now: DateTime<Utc>,
    ) -> Vec<ContactChange> {
        let mut changes = Vec::new();
        let mut answered = false;

        match response.map(str::trim) {
            Some(text) if !text.is_empty() => {
                answered = true;
                changes.push(ContactChange::ResponseRecorded {
                    response: text.to_string(),
                    occurred_at: now,
                });
            }
            Some(_) if self.response.is_some() => {
                changes.push(ContactChange::ResponseCleared { occurred_at: now });
            }
            Some(_) | None => {}
        }

        // Explicit status wins over the automatic move to RESPONDED.
        let target = match status {
            Some(explicit) => Some(explicit),
            None if answered => Some(ContactStatus::Responded),
            None => None,
        };
        if let Some(to) = target {
            if to != self.status {
                changes.push(ContactChange::StatusChanged {
                    from: self.status,
                    to,
                    occurred_at: now,
                });
            }
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn submitted_at(at: DateTime<Utc>) -> ContactMessage {
        ContactMessage::empty(ContactMessageId::new())
            .execute(&ContactCommand::Submit {
                submission: ContactSubmission {
                    name: "Ruth".to_string(),
                    email: "ruth@example.org".to_string(),
                    phone: None,
                    subject: "Visiting".to_string(),
                    message: "What time is service?".to_string(),
                },
                occurred_at: at,
            })
            .unwrap()
            .0
    }

    fn update(msg: &ContactMessage, status: Option<ContactStatus>, response: Option<&str>) -> ContactMessage {
        msg.execute(&ContactCommand::Update {
            status,
            response: response.map(str::to_string),
            occurred_at: Utc::now(),
        })
        .unwrap()
        .0
    }

    #[test]
    fn response_without_status_auto_advances_to_responded() {
        let msg = submitted_at(Utc::now());
        let before = Utc::now();

        let msg = update(&msg, None, Some("Thanks!"));

        assert_eq!(msg.status(), ContactStatus::Responded);
        assert_eq!(msg.response(), Some("Thanks!"));
        assert!(msg.responded_at().unwrap() >= before);
    }

    #[test]
    fn explicit_status_wins_over_automatic_rule() {
        let msg = submitted_at(Utc::now());
        let msg = update(&msg, Some(ContactStatus::Closed), Some("Thanks!"));
        assert_eq!(msg.status(), ContactStatus::Closed);
        assert_eq!(msg.response(), Some("Thanks!"));
    }

    #[test]
    fn clearing_response_keeps_timestamp_and_status() {
        let msg = submitted_at(Utc::now());
        let msg = update(&msg, None, Some("Thanks!"));
        let stamped = msg.responded_at();

        let msg = update(&msg, None, Some("   "));
        assert_eq!(msg.response(), None);
        assert_eq!(msg.responded_at(), stamped);
        assert_eq!(msg.status(), ContactStatus::Responded);
    }

    #[test]
    fn empty_response_on_fresh_message_changes_nothing() {
        let msg = submitted_at(Utc::now());
        let changes = msg
            .handle(&ContactCommand::Update {
                status: None,
                response: Some(String::new()),
                occurred_at: Utc::now(),
            })
            .unwrap();
        assert!(changes.is_empty());
        assert_eq!(msg.responded_at(), None);
    }

    #[test]
    fn operator_may_set_any_status_directly() {
        let msg = submitted_at(Utc::now());
        let msg = update(&msg, Some(ContactStatus::Closed), None);
        let msg = update(&msg, Some(ContactStatus::InProgress), None);
        assert_eq!(msg.status(), ContactStatus::InProgress);
    }

    #[test]
    fn submission_reports_every_missing_field() {
        let err = ContactMessage::empty(ContactMessageId::new())
            .handle(&ContactCommand::Submit {
                submission: ContactSubmission::default(),
                occurred_at: Utc::now(),
            })
            .unwrap_err();
        let DomainError::Validation(v) = err else {
            panic!("expected validation error");
        };
        assert_eq!(v.fields().len(), 4);
    }

    #[test]
    fn triage_queue_puts_new_first_then_newest() {
        let t0 = Utc::now();
        let old_new = submitted_at(t0);
        let fresh_new = submitted_at(t0 + Duration::minutes(1));
        let closed = update(&submitted_at(t0 + Duration::minutes(2)), Some(ContactStatus::Closed), None);
        let in_progress = update(&submitted_at(t0 + Duration::minutes(3)), Some(ContactStatus::InProgress), None);

        let queue = triage_queue(vec![closed.clone(), old_new.clone(), in_progress.clone(), fresh_new.clone()]);
        assert_eq!(queue, vec![fresh_new, old_new, in_progress, closed]);
    }
}
