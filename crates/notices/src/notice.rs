use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fellowship_core::{Aggregate, AggregateRoot, Change, DomainError, Violations, record_id};

use crate::PublicationWindow;

record_id!(
    /// Notice identifier.
    NoticeId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// Fields an operator supplies when creating a notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(flatten)]
    pub window: PublicationWindow,
}

impl NoticeDraft {
    fn validate(&self) -> Violations {
        let mut v = Violations::new();
        v.require_text("title", &self.title);
        v.require_text("content", &self.content);
        self.window.check(&mut v);
        v
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub priority: Option<Priority>,
    pub publish_date: Option<DateTime<Utc>>,
    /// `Some(None)` clears the expiry.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "::serde_with::rust::double_option")]
    pub expiry_date: Option<Option<DateTime<Utc>>>,
}

/// Aggregate root: Notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    id: NoticeId,
    title: String,
    content: String,
    priority: Priority,
    #[serde(flatten)]
    window: PublicationWindow,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip)]
    version: u64,
    #[serde(skip)]
    created: bool,
}

impl Notice {
    pub fn empty(id: NoticeId) -> Self {
        let epoch = DateTime::<Utc>::default();
        Self {
            id,
            title: String::new(),
            content: String::new(),
            priority: Priority::Normal,
            window: PublicationWindow::new(epoch, None, false),
            created_at: epoch,
            updated_at: epoch,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> NoticeId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn window(&self) -> PublicationWindow {
        self.window
    }

    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.created && self.window.is_visible_at(now)
    }
}

/// Notices visible at `now`, highest priority first, then most recently published.
pub fn public_listing(notices: impl IntoIterator<Item = Notice>, now: DateTime<Utc>) -> Vec<Notice> {
    let mut visible: Vec<Notice> = notices.into_iter().filter(|n| n.is_visible_at(now)).collect();
    visible.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.window.publish_date.cmp(&a.window.publish_date))
    });
    visible
}

impl AggregateRoot for Notice {
    type Id = NoticeId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeCommand {
    Create {
        draft: NoticeDraft,
        occurred_at: DateTime<Utc>,
    },
    Update {
        patch: NoticePatch,
        occurred_at: DateTime<Utc>,
    },
    SetActive {
        is_active: bool,
        occurred_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeChange {
    Created {
        draft: NoticeDraft,
        occurred_at: DateTime<Utc>,
    },
    Revised {
        title: String,
        content: String,
        priority: Priority,
        window: PublicationWindow,
        occurred_at: DateTime<Utc>,
    },
    ActiveToggled {
        is_active: bool,
        occurred_at: DateTime<Utc>,
    },
}

impl Change for NoticeChange {
    fn change_type(&self) -> &'static str {
        match self {
            NoticeChange::Created { .. } => "notices.notice.created",
            NoticeChange::Revised { .. } => "notices.notice.revised",
            NoticeChange::ActiveToggled { .. } => "notices.notice.active_toggled",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            NoticeChange::Created { occurred_at, .. }
            | NoticeChange::Revised { occurred_at, .. }
            | NoticeChange::ActiveToggled { occurred_at, .. } => *occurred_at,
        }
    }
}

impl Aggregate for Notice {
    type Command = NoticeCommand;
    type Change = NoticeChange;
    type Error = DomainError;

    fn apply(&mut self, change: &Self::Change) {
        match change {
            NoticeChange::Created { draft, occurred_at } => {
                self.title = draft.title.trim().to_string();
                self.content = draft.content.trim().to_string();
                self.priority = draft.priority;
                self.window = draft.window;
                self.created_at = *occurred_at;
                self.updated_at = *occurred_at;
                self.created = true;
            }
            NoticeChange::Revised {
                title,
                content,
                priority,
                window,
                occurred_at,
            } => {
                self.title = title.clone();
                self.content = content.clone();
                self.priority = *priority;
                self.window = *window;
                self.updated_at = *occurred_at;
            }
            NoticeChange::ActiveToggled { is_active, occurred_at } => {
                self.window = self.window.with_active(*is_active);
                self.updated_at = *occurred_at;
            }
        }
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Change>, Self::Error> {
        match command {
            NoticeCommand::Create { draft, occurred_at } => {
                if self.created {
                    return Err(DomainError::invariant("notice already exists"));
                }
                draft.validate().finish()?;
                Ok(vec![NoticeChange::Created {
                    draft: draft.clone(),
                    occurred_at: *occurred_at,
                }])
            }
            NoticeCommand::Update { patch, occurred_at } => {
                if !self.created {
                    return Err(DomainError::NotFound);
                }
                let revised = NoticeDraft {
                    title: patch.title.clone().unwrap_or_else(|| self.title.clone()),
                    content: patch.content.clone().unwrap_or_else(|| self.content.clone()),
                    priority: patch.priority.unwrap_or(self.priority),
                    window: PublicationWindow::new(
                        patch.publish_date.unwrap_or(self.window.publish_date),
                        patch.expiry_date.unwrap_or(self.window.expiry_date),
                        self.window.is_active,
                    ),
                };
                revised.validate().finish()?;
                Ok(vec![NoticeChange::Revised {
                    title: revised.title.trim().to_string(),
                    content: revised.content.trim().to_string(),
                    priority: revised.priority,
                    window: revised.window,
                    occurred_at: *occurred_at,
                }])
            }
            NoticeCommand::SetActive { is_active, occurred_at } => {
                if !self.created {
                    return Err(DomainError::NotFound);
                }
                if *is_active == self.window.is_active {
                    return Ok(Vec::new());
                }
                Ok(vec![NoticeChange::ActiveToggled {
                    is_active: *is_active,
                    occurred_at: *occurred_at,
                }])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft(priority: Priority, publish: DateTime<Utc>, expiry: Option<DateTime<Utc>>) -> NoticeDraft {
        NoticeDraft {
            title: "Choir practice".to_string(),
            content: "Moved to Thursday".to_string(),
            priority,
            window: PublicationWindow::new(publish, expiry, true),
        }
    }

    fn create(d: NoticeDraft) -> Notice {
        Notice::empty(NoticeId::new())
            .execute(&NoticeCommand::Create {
                draft: d,
                occurred_at: Utc::now(),
            })
            .unwrap()
            .0
    }

    #[test]
    fn expiry_before_publish_is_rejected() {
        let now = Utc::now();
        let err = Notice::empty(NoticeId::new())
            .handle(&NoticeCommand::Create {
                draft: draft(Priority::Normal, now, Some(now - Duration::days(1))),
                occurred_at: now,
            })
            .unwrap_err();
        let DomainError::Validation(v) = err else {
            panic!("expected validation error");
        };
        assert_eq!(v.fields()[0].field, "expiryDate");
    }

    #[test]
    fn update_revalidates_the_merged_window() {
        let now = Utc::now();
        let notice = create(draft(Priority::Normal, now, Some(now + Duration::days(7))));
        let err = notice
            .handle(&NoticeCommand::Update {
                patch: NoticePatch {
                    publish_date: Some(now + Duration::days(10)),
                    ..NoticePatch::default()
                },
                occurred_at: now,
            })
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let (cleared, _) = notice
            .execute(&NoticeCommand::Update {
                patch: NoticePatch {
                    expiry_date: Some(None),
                    ..NoticePatch::default()
                },
                occurred_at: now,
            })
            .unwrap();
        assert_eq!(cleared.window().expiry_date, None);
    }

    #[test]
    fn patch_tells_absent_expiry_from_null() {
        let absent: NoticePatch = serde_json::from_str(r#"{"title":"New"}"#).unwrap();
        assert_eq!(absent.expiry_date, None);

        let cleared: NoticePatch = serde_json::from_str(r#"{"expiryDate":null}"#).unwrap();
        assert_eq!(cleared.expiry_date, Some(None));

        let set: NoticePatch = serde_json::from_str(r#"{"expiryDate":"2030-01-01T00:00:00Z"}"#).unwrap();
        assert!(matches!(set.expiry_date, Some(Some(_))));

        let json = serde_json::to_value(&absent).unwrap();
        assert!(json.get("expiryDate").is_none());
    }

    #[test]
    fn deactivating_hides_the_notice() {
        let now = Utc::now();
        let notice = create(draft(Priority::High, now - Duration::days(1), None));
        assert!(notice.is_visible_at(now));

        let (hidden, changes) = notice
            .execute(&NoticeCommand::SetActive {
                is_active: false,
                occurred_at: now,
            })
            .unwrap();
        assert_eq!(changes.len(), 1);
        assert!(!hidden.is_visible_at(now));

        let again = hidden
            .handle(&NoticeCommand::SetActive {
                is_active: false,
                occurred_at: now,
            })
            .unwrap();
        assert!(again.is_empty());
    }

    #[test]
    fn public_listing_orders_by_priority_then_publish_date() {
        let now = Utc::now();
        let old_urgent = create(draft(Priority::Urgent, now - Duration::days(5), None));
        let new_normal = create(draft(Priority::Normal, now - Duration::days(1), None));
        let newer_normal = create(draft(Priority::Normal, now - Duration::hours(1), None));
        let expired = create(draft(Priority::Urgent, now - Duration::days(9), Some(now - Duration::days(1))));

        let listing = public_listing(
            vec![new_normal.clone(), expired, old_urgent.clone(), newer_normal.clone()],
            now,
        );
        let ids: Vec<_> = listing.iter().map(Notice::id_typed).collect();
        assert_eq!(
            ids,
            vec![old_urgent.id_typed(), newer_normal.id_typed(), new_normal.id_typed()]
        );
    }

    #[test]
    fn serializes_window_inline() {
        let now = Utc::now();
        let json = serde_json::to_value(create(draft(Priority::Low, now, None))).unwrap();
        assert_eq!(json["priority"], "LOW");
        assert_eq!(json["isActive"], true);
        assert!(json["expiryDate"].is_null());
    }
}
