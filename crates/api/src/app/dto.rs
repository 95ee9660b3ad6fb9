use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use fellowship_auth::{Action, Role, User};
use fellowship_core::{RecordId, UserId};
use fellowship_followups::{Completion, FollowUp, FollowUpDraft, FollowUpKind};
use fellowship_members::{MemberDetails, MemberDetailsPatch, MemberId};
use fellowship_messages::{ContactStatus, ContactSubmission};
use fellowship_notices::{NoticeDraft, NoticePatch, Priority, PublicationWindow};
use fellowship_prayer::{PrayerStatus, PrayerSubmission, SharingSettings};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMemberRequest {
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub last_name: String,
    #[validate(email)]
    #[serde(default)]
    pub email: String,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub ministry_ids: Vec<RecordId>,
    #[serde(default)]
    pub group_ids: Vec<RecordId>,
}

impl From<RegisterMemberRequest> for MemberDetails {
    fn from(body: RegisterMemberRequest) -> Self {
        MemberDetails {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            phone: body.phone,
            address: body.address,
            date_of_birth: body.date_of_birth,
            ministry_ids: body.ministry_ids,
            group_ids: body.group_ids,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(max = 300))]
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub ministry_ids: Option<Vec<RecordId>>,
    pub group_ids: Option<Vec<RecordId>>,
}

impl From<UpdateMemberRequest> for MemberDetailsPatch {
    fn from(body: UpdateMemberRequest) -> Self {
        MemberDetailsPatch {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            phone: body.phone,
            address: body.address,
            date_of_birth: body.date_of_birth,
            ministry_ids: body.ministry_ids,
            group_ids: body.group_ids,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub name: String,
    #[validate(email)]
    #[serde(default)]
    pub email: String,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    pub subject: String,
    #[validate(length(min = 1, max = 5000))]
    #[serde(default)]
    pub message: String,
}

impl From<ContactRequest> for ContactSubmission {
    fn from(body: ContactRequest) -> Self {
        ContactSubmission {
            name: body.name,
            email: body.email,
            phone: body.phone,
            subject: body.subject,
            message: body.message,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMessageRequest {
    pub status: Option<ContactStatus>,
    #[validate(length(max = 5000))]
    pub response: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PrayerRequestBody {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 254))]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    #[serde(default)]
    pub request: String,
    #[validate(length(max = 60))]
    pub category: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub share_with_leaders: bool,
    #[serde(default)]
    pub share_with_pastors: bool,
}

impl From<PrayerRequestBody> for PrayerSubmission {
    fn from(body: PrayerRequestBody) -> Self {
        PrayerSubmission {
            name: body.name,
            email: body.email,
            phone: body.phone,
            title: body.title,
            request: body.request,
            category: body.category,
            is_anonymous: body.is_anonymous,
            sharing: SharingSettings {
                is_public: body.is_public,
                share_with_leaders: body.share_with_leaders,
                share_with_pastors: body.share_with_pastors,
            },
        }
    }
}

/// Operator update of a prayer request; both parts are optional.
#[derive(Debug, Deserialize)]
pub struct UpdatePrayerRequest {
    pub status: Option<PrayerStatus>,
    pub sharing: Option<SharingSettings>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoticeRequest {
    #[validate(length(min = 1, max = 200))]
    #[serde(default)]
    pub title: String,
    #[validate(length(min = 1, max = 10000))]
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub priority: Priority,
    /// Defaults to now.
    pub publish_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl CreateNoticeRequest {
    pub fn into_draft(self, now: DateTime<Utc>) -> NoticeDraft {
        NoticeDraft {
            title: self.title,
            content: self.content,
            priority: self.priority,
            window: PublicationWindow::new(self.publish_date.unwrap_or(now), self.expiry_date, self.is_active),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoticeRequest {
    #[serde(flatten)]
    pub patch: NoticePatch,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFollowUpRequest {
    pub member_id: MemberId,
    #[serde(default)]
    pub kind: FollowUpKind,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub notes: String,
    pub due_date: Option<NaiveDate>,
    pub assigned_to: Option<UserId>,
}

impl From<CreateFollowUpRequest> for FollowUpDraft {
    fn from(body: CreateFollowUpRequest) -> Self {
        FollowUpDraft {
            member_id: body.member_id,
            kind: body.kind,
            notes: body.notes,
            due_date: body.due_date,
            assigned_to: body.assigned_to,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignFollowUpRequest {
    pub assignee: UserId,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompleteFollowUpRequest {
    #[validate(length(min = 1, max = 5000))]
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub requires_follow_up: bool,
    pub next_follow_up_date: Option<NaiveDate>,
}

impl From<CompleteFollowUpRequest> for Completion {
    fn from(body: CompleteFollowUpRequest) -> Self {
        Completion {
            outcome: body.outcome,
            requires_follow_up: body.requires_follow_up,
            next_follow_up_date: body.next_follow_up_date,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email)]
    #[serde(default)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    #[serde(default)]
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

/// `GET /api/rbac/explain?class=<slug>&action=<action>`
#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub class: String,
    pub action: Action,
    /// Prayer sharing fact; omitted means a collection-level question.
    pub shared: Option<bool>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> From<Vec<T>> for Items<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpView<'a> {
    #[serde(flatten)]
    pub follow_up: &'a FollowUp,
    pub scheduling_hint: Option<NaiveDate>,
}

impl<'a> From<&'a FollowUp> for FollowUpView<'a> {
    fn from(follow_up: &'a FollowUp) -> Self {
        Self {
            follow_up,
            scheduling_hint: follow_up.scheduling_hint(),
        }
    }
}
