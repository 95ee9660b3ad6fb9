use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fellowship_core::{
    Aggregate, AggregateRoot, Change, DomainError, QueueRank, UserId, Violations, record_id,
    sort_queue,
};

record_id!(
    /// Prayer request identifier.
    PrayerRequestId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrayerStatus {
    Submitted,
    Praying,
    Answered,
    Closed,
}

impl PrayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerStatus::Submitted => "SUBMITTED",
            PrayerStatus::Praying => "PRAYING",
            PrayerStatus::Answered => "ANSWERED",
            PrayerStatus::Closed => "CLOSED",
        }
    }
}

impl core::fmt::Display for PrayerStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl QueueRank for PrayerStatus {
    fn queue_rank(&self) -> u8 {
        match self {
            PrayerStatus::Submitted => 0,
            PrayerStatus::Praying => 1,
            PrayerStatus::Answered => 2,
            PrayerStatus::Closed => 3,
        }
    }
}

/// Who may see a request besides administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharingSettings {
    pub is_public: bool,
    pub share_with_leaders: bool,
    pub share_with_pastors: bool,
}

/// Public prayer form payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub title: String,
    pub request: String,
    pub category: Option<String>,
    pub is_anonymous: bool,
    #[serde(flatten)]
    pub sharing: SharingSettings,
}

fn clean(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty()).map(str::to_string)
}

impl PrayerSubmission {
    fn validate(&self) -> Violations {
        let mut v = Violations::new();
        v.require_text("title", &self.title);
        v.require_text("request", &self.request);
        if !self.is_anonymous {
            if let Some(email) = clean(self.email.as_ref()) {
                v.require_email("email", &email);
            }
        }
        v
    }

    /// Trimmed copy with contact fields dropped for anonymous requests.
    fn sanitized(&self) -> Self {
        let (name, email, phone) = if self.is_anonymous {
            (None, None, None)
        } else {
            (
                clean(self.name.as_ref()),
                clean(self.email.as_ref()).map(|e| e.to_lowercase()),
                clean(self.phone.as_ref()),
            )
        };
        Self {
            name,
            email,
            phone,
            title: self.title.trim().to_string(),
            request: self.request.trim().to_string(),
            category: clean(self.category.as_ref()),
            is_anonymous: self.is_anonymous,
            sharing: self.sharing,
        }
    }
}

/// Aggregate root: PrayerRequest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrayerRequest {
    id: PrayerRequestId,
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    title: String,
    request: String,
    category: Option<String>,
    is_anonymous: bool,
    #[serde(flatten)]
    sharing: SharingSettings,
    status: PrayerStatus,
    prayer_count: u32,
    prayed_by: BTreeSet<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
}

/// What anonymous visitors see on the public prayer wall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPrayerView {
    pub id: PrayerRequestId,
    pub name: Option<String>,
    pub title: String,
    pub request: String,
    pub category: Option<String>,
    pub status: PrayerStatus,
    pub prayer_count: u32,
    pub created_at: DateTime<Utc>,
}

impl PrayerRequest {
    pub fn empty(id: PrayerRequestId) -> Self {
        Self {
            id,
            name: None,
            email: None,
            phone: None,
            title: String::new(),
            request: String::new(),
            category: None,
            is_anonymous: false,
            sharing: SharingSettings::default(),
            status: PrayerStatus::Submitted,
            prayer_count: 0,
            prayed_by: BTreeSet::new(),
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> PrayerRequestId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn status(&self) -> PrayerStatus {
        self.status
    }

    pub fn prayer_count(&self) -> u32 {
        self.prayer_count
    }

    pub fn prayed_by(&self) -> &BTreeSet<UserId> {
        &self.prayed_by
    }

    pub fn sharing(&self) -> SharingSettings {
        self.sharing
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Listed on the public prayer wall.
    pub fn is_publicly_listed(&self) -> bool {
        self.sharing.is_public && self.status != PrayerStatus::Closed
    }

    /// Visible to leaders (`shareWithLeaders || shareWithPastors`).
    pub fn is_shared_with_leaders(&self) -> bool {
        self.sharing.share_with_leaders || self.sharing.share_with_pastors
    }

    pub fn public_view(&self) -> PublicPrayerView {
        PublicPrayerView {
            id: self.id,
            name: self.name.clone(),
            title: self.title.clone(),
            request: self.request.clone(),
            category: self.category.clone(),
            status: self.status,
            prayer_count: self.prayer_count,
            created_at: self.created_at,
        }
    }
}

/// Admin prayer queue: open requests first, newest first within a status.
pub fn prayer_queue(requests: impl IntoIterator<Item = PrayerRequest>) -> Vec<PrayerRequest> {
    let mut queue: Vec<_> = requests.into_iter().collect();
    sort_queue(&mut queue, |r| r.status, |r| r.created_at);
    queue
}

/// Public prayer wall, newest first.
pub fn public_wall(requests: impl IntoIterator<Item = PrayerRequest>) -> Vec<PublicPrayerView> {
    let mut listed: Vec<_> = requests.into_iter().filter(PrayerRequest::is_publicly_listed).collect();
    listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    listed.iter().map(PrayerRequest::public_view).collect()
}

impl AggregateRoot for PrayerRequest {
    type Id = PrayerRequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrayerCommand {
    Submit {
        submission: PrayerSubmission,
        occurred_at: DateTime<Utc>,
    },
    /// Requires an authenticated principal; anonymous callers have no id to pass.
    MarkPrayed {
        by: UserId,
        occurred_at: DateTime<Utc>,
    },
    UpdateStatus {
        status: PrayerStatus,
        occurred_at: DateTime<Utc>,
    },
    UpdateSharing {
        sharing: SharingSettings,
        occurred_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrayerChange {
    Submitted {
        submission: PrayerSubmission,
        occurred_at: DateTime<Utc>,
    },
    Prayed {
        by: UserId,
        occurred_at: DateTime<Utc>,
    },
    StatusChanged {
        from: PrayerStatus,
        to: PrayerStatus,
        occurred_at: DateTime<Utc>,
    },
    SharingChanged {
        sharing: SharingSettings,
        occurred_at: DateTime<Utc>,
    },
}

impl Change for PrayerChange {
    fn change_type(&self) -> &'static str {
        match self {
            PrayerChange::Submitted { .. } => "prayer.request.submitted",
            PrayerChange::Prayed { .. } => "prayer.request.prayed",
            PrayerChange::StatusChanged { .. } => "prayer.request.status_changed",
            PrayerChange::SharingChanged { .. } => "prayer.request.sharing_changed",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PrayerChange::Submitted { occurred_at, .. }
            | PrayerChange::Prayed { occurred_at, .. }
            | PrayerChange::StatusChanged { occurred_at, .. }
            | PrayerChange::SharingChanged { occurred_at, .. } => *occurred_at,
        }
    }
}

impl Aggregate for PrayerRequest {
    type Command = PrayerCommand;
    type Change = PrayerChange;
    type Error = DomainError;

    fn apply(&mut self, change: &Self::Change) {
        match change {
            PrayerChange::Submitted { submission, occurred_at } => {
                self.name = submission.name.clone();
                self.email = submission.email.clone();
                self.phone = submission.phone.clone();
                self.title = submission.title.clone();
                self.request = submission.request.clone();
                self.category = submission.category.clone();
                self.is_anonymous = submission.is_anonymous;
                self.sharing = submission.sharing;
                self.status = PrayerStatus::Submitted;
                self.created_at = *occurred_at;
                self.updated_at = *occurred_at;
                self.created = true;
            }
            PrayerChange::Prayed { by, occurred_at } => {
                if self.prayed_by.insert(*by) {
                    self.prayer_count += 1;
                }
                self.updated_at = *occurred_at;
            }
            PrayerChange::StatusChanged { to, occurred_at, .. } => {
                self.status = *to;
                self.updated_at = *occurred_at;
            }
            PrayerChange::SharingChanged { sharing, occurred_at } => {
                self.sharing = *sharing;
                self.updated_at = *occurred_at;
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Change>, Self::Error> {
        if let PrayerCommand::Submit { submission, occurred_at } = command {
            if self.created {
                return Err(DomainError::invariant("prayer request already submitted"));
            }
            submission.validate().finish()?;
            return Ok(vec![PrayerChange::Submitted {
                submission: submission.sanitized(),
                occurred_at: *occurred_at,
            }]);
        }

        if !self.created {
            return Err(DomainError::NotFound);
        }

        match command {
            PrayerCommand::MarkPrayed { by, occurred_at } => {
                if self.prayed_by.contains(by) {
                    return Ok(Vec::new());
                }
                Ok(vec![PrayerChange::Prayed {
                    by: *by,
                    occurred_at: *occurred_at,
                }])
            }
            PrayerCommand::UpdateStatus { status, occurred_at } => {
                if *status == self.status {
                    return Ok(Vec::new());
                }
                Ok(vec![PrayerChange::StatusChanged {
                    from: self.status,
                    to: *status,
                    occurred_at: *occurred_at,
                }])
            }
            PrayerCommand::UpdateSharing { sharing, occurred_at } => {
                if *sharing == self.sharing {
                    return Ok(Vec::new());
                }
                Ok(vec![PrayerChange::SharingChanged {
                    sharing: *sharing,
                    occurred_at: *occurred_at,
                }])
            }
            PrayerCommand::Submit { .. } => Err(DomainError::invariant("prayer request already submitted")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn submission(is_anonymous: bool, sharing: SharingSettings) -> PrayerSubmission {
        PrayerSubmission {
            name: Some("Jane".to_string()),
            email: Some("j@x.com".to_string()),
            phone: Some("555-0101".to_string()),
            title: "Healing".to_string(),
            request: "Please pray for my mother".to_string(),
            category: None,
            is_anonymous,
            sharing,
        }
    }

    fn submitted(is_anonymous: bool, sharing: SharingSettings) -> PrayerRequest {
        PrayerRequest::empty(PrayerRequestId::new())
            .execute(&PrayerCommand::Submit {
                submission: submission(is_anonymous, sharing),
                occurred_at: Utc::now(),
            })
            .unwrap()
            .0
    }

    fn pray(req: &PrayerRequest, by: UserId) -> PrayerRequest {
        req.execute(&PrayerCommand::MarkPrayed { by, occurred_at: Utc::now() })
            .unwrap()
            .0
    }

    #[test]
    fn anonymous_submission_discards_contact_fields() {
        let req = submitted(true, SharingSettings::default());
        assert_eq!(req.name(), None);
        assert_eq!(req.email(), None);
        assert_eq!(req.phone(), None);
    }

    #[test]
    fn named_submission_keeps_contact_fields() {
        let req = submitted(false, SharingSettings::default());
        assert_eq!(req.name(), Some("Jane"));
        assert_eq!(req.email(), Some("j@x.com"));
    }

    #[test]
    fn marking_twice_counts_once() {
        let req = submitted(false, SharingSettings::default());
        let who = UserId::new();

        let req = pray(&req, who);
        let req = pray(&req, who);

        assert_eq!(req.prayer_count(), 1);
        assert_eq!(req.prayed_by().iter().filter(|u| **u == who).count(), 1);
        assert_eq!(req.status(), PrayerStatus::Submitted);
    }

    #[test]
    fn public_listing_requires_public_and_not_closed() {
        let public = SharingSettings { is_public: true, ..SharingSettings::default() };
        let req = submitted(false, public);
        assert!(req.is_publicly_listed());

        let (closed, _) = req
            .execute(&PrayerCommand::UpdateStatus {
                status: PrayerStatus::Closed,
                occurred_at: Utc::now(),
            })
            .unwrap();
        assert!(!closed.is_publicly_listed());

        assert!(!submitted(false, SharingSettings::default()).is_publicly_listed());
    }

    #[test]
    fn either_sharing_flag_reaches_leaders() {
        let pastors = SharingSettings { share_with_pastors: true, ..SharingSettings::default() };
        let leaders = SharingSettings { share_with_leaders: true, ..SharingSettings::default() };
        assert!(submitted(false, pastors).is_shared_with_leaders());
        assert!(submitted(false, leaders).is_shared_with_leaders());
        assert!(!submitted(false, SharingSettings::default()).is_shared_with_leaders());
    }

    #[test]
    fn public_view_hides_contact_details() {
        let req = submitted(false, SharingSettings { is_public: true, ..SharingSettings::default() });
        let json = serde_json::to_value(req.public_view()).unwrap();
        assert!(json.get("email").is_none());
        assert!(json.get("phone").is_none());
        assert_eq!(json["name"], "Jane");
    }

    #[test]
    fn public_wall_skips_private_and_closed() {
        let public = SharingSettings { is_public: true, ..SharingSettings::default() };
        let open = submitted(false, public);
        let (closed, _) = submitted(false, public)
            .execute(&PrayerCommand::UpdateStatus {
                status: PrayerStatus::Closed,
                occurred_at: Utc::now(),
            })
            .unwrap();
        let private = submitted(false, SharingSettings::default());

        let wall = public_wall(vec![open.clone(), closed, private]);
        assert_eq!(wall.len(), 1);
        assert_eq!(wall[0].id, open.id_typed());
    }

    #[test]
    fn queue_puts_submitted_before_answered() {
        let (answered, _) = submitted(false, SharingSettings::default())
            .execute(&PrayerCommand::UpdateStatus {
                status: PrayerStatus::Answered,
                occurred_at: Utc::now(),
            })
            .unwrap();
        let fresh = submitted(false, SharingSettings::default());

        let queue = prayer_queue(vec![answered, fresh.clone()]);
        assert_eq!(queue[0].id_typed(), fresh.id_typed());
    }

    proptest! {
        /// Property: prayer_count always equals the number of distinct principals.
        #[test]
        fn count_matches_distinct_principals(picks in prop::collection::vec(0usize..5, 0..40)) {
            let people: Vec<UserId> = (0..5).map(|_| UserId::new()).collect();
            let mut req = submitted(false, SharingSettings::default());
            for i in &picks {
                req = pray(&req, people[*i]);
            }
            let distinct: BTreeSet<_> = picks.iter().collect();
            prop_assert_eq!(req.prayer_count() as usize, distinct.len());
            prop_assert_eq!(req.prayed_by().len(), distinct.len());
        }
    }
}
