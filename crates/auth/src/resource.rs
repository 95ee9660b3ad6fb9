use serde::{Deserialize, Serialize};

/// Kind of entity a policy decision applies to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceClass {
    User,
    Member,
    Event,
    Ministry,
    Group,
    Notice,
    Book,
    Sermon,
    ContactMessage,
    PrayerRequest,
    FollowUp,
    Settings,
}

impl ResourceClass {
    pub const ALL: [ResourceClass; 12] = [
        ResourceClass::User,
        ResourceClass::Member,
        ResourceClass::Event,
        ResourceClass::Ministry,
        ResourceClass::Group,
        ResourceClass::Notice,
        ResourceClass::Book,
        ResourceClass::Sermon,
        ResourceClass::ContactMessage,
        ResourceClass::PrayerRequest,
        ResourceClass::FollowUp,
        ResourceClass::Settings,
    ];

    /// URL segment of the admin section for this class.
    pub fn slug(&self) -> &'static str {
        match self {
            ResourceClass::User => "users",
            ResourceClass::Member => "members",
            ResourceClass::Event => "events",
            ResourceClass::Ministry => "ministries",
            ResourceClass::Group => "groups",
            ResourceClass::Notice => "notices",
            ResourceClass::Book => "books",
            ResourceClass::Sermon => "sermons",
            ResourceClass::ContactMessage => "messages",
            ResourceClass::PrayerRequest => "prayer-requests",
            ResourceClass::FollowUp => "follow-ups",
            ResourceClass::Settings => "settings",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }
}

impl core::fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.slug())
    }
}

/// Operation requested on a resource class.
///
/// `Approve`/`Reject` only exist for members, `Respond` for contact messages
/// and `MarkPrayed` for prayer requests; the lifecycle crates own that pairing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    Approve,
    Reject,
    Respond,
    MarkPrayed,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Approve,
        Action::Reject,
        Action::Respond,
        Action::MarkPrayed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Approve => "approve",
            Action::Reject => "reject",
            Action::Respond => "respond",
            Action::MarkPrayed => "markPrayed",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
