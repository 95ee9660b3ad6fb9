//! Storage wiring shared by every handler.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};

use fellowship_auth::{Role, User, UserCommand, user::CreateUser};
use fellowship_content::{
    CatalogEntry, CatalogEntryId, CatalogInput, CatalogKind, ChurchEvent, EventId, EventInput, SiteSettings,
    SiteSettingsPatch,
};
use fellowship_core::UserId;
use fellowship_followups::{FollowUp, FollowUpId};
use fellowship_infra::{InMemoryRepository, Repository, StoreError, StoreResult, create};
use fellowship_members::{Member, MemberCommand, MemberDetails, MemberId, RegistrationSource};
use fellowship_messages::{ContactMessage, ContactMessageId};
use fellowship_notices::{Notice, NoticeCommand, NoticeDraft, NoticeId, Priority, PublicationWindow};
use fellowship_prayer::{PrayerRequest, PrayerRequestId};

pub type Store<K, V> = Arc<dyn Repository<K, V>>;

/// Shared state handed to handlers through an `Extension`.
pub struct AppServices {
    pub members: Store<MemberId, Member>,
    pub messages: Store<ContactMessageId, ContactMessage>,
    pub prayer_requests: Store<PrayerRequestId, PrayerRequest>,
    pub notices: Store<NoticeId, Notice>,
    pub follow_ups: Store<FollowUpId, FollowUp>,
    pub events: Store<EventId, ChurchEvent>,
    pub catalog: Store<CatalogEntryId, CatalogEntry>,
    pub users: Store<UserId, User>,
    settings: RwLock<SiteSettings>,
}

impl AppServices {
    /// Everything in process memory. Member and user emails are unique.
    pub fn in_memory() -> Self {
        Self {
            members: store(InMemoryRepository::new().with_unique("email", |m: &Member| m.email().to_string())),
            messages: store(InMemoryRepository::new()),
            prayer_requests: store(InMemoryRepository::new()),
            notices: store(InMemoryRepository::new()),
            follow_ups: store(InMemoryRepository::new()),
            events: store(InMemoryRepository::new()),
            catalog: store(InMemoryRepository::new()),
            users: store(InMemoryRepository::new().with_unique("email", |u: &User| u.email.clone())),
            settings: RwLock::new(SiteSettings::default()),
        }
    }

    pub fn settings(&self) -> StoreResult<SiteSettings> {
        let settings = self.settings.read().map_err(|_| poisoned())?;
        Ok(settings.clone())
    }

    pub fn update_settings(&self, patch: SiteSettingsPatch, now: DateTime<Utc>) -> StoreResult<SiteSettings> {
        let mut settings = self.settings.write().map_err(|_| poisoned())?;
        let next = settings.apply(patch, now)?;
        *settings = next.clone();
        Ok(next)
    }

    /// Catalog entries of one kind, in storage order.
    pub async fn catalog_of(&self, kind: CatalogKind) -> StoreResult<Vec<CatalogEntry>> {
        let entries = self.catalog.list().await?;
        Ok(entries.into_iter().filter(|e| e.kind == kind).collect())
    }

    /// Load a small demo dataset: one super admin, content for the public
    /// pages and a pending registration.
    pub async fn seed_demo(&self, now: DateTime<Utc>) -> StoreResult<()> {
        create(
            self.users.as_ref(),
            User::empty(UserId::new()),
            UserCommand::Create(CreateUser {
                email: "admin@fellowship.local".to_string(),
                display_name: "Demo Administrator".to_string(),
                role: Role::SuperAdmin,
                occurred_at: now,
            }),
        )
        .await?;

        let event_id = EventId::new();
        let event = ChurchEvent::create(
            event_id,
            EventInput {
                title: "Sunday Service".to_string(),
                description: "Weekly worship".to_string(),
                location: Some("Main hall".to_string()),
                starts_at: now + Duration::days(3),
                ends_at: Some(now + Duration::days(3) + Duration::hours(2)),
                is_published: true,
            },
            now,
        )?;
        self.events.insert(event_id, event).await?;

        for (kind, title) in [(CatalogKind::Ministry, "Worship Team"), (CatalogKind::Group, "Young Adults")] {
            let id = CatalogEntryId::new();
            let entry = CatalogEntry::create(
                id,
                kind,
                CatalogInput {
                    title: title.to_string(),
                    description: String::new(),
                    attributes: Default::default(),
                    is_published: true,
                },
                now,
            )?;
            self.catalog.insert(id, entry).await?;
        }

        create(
            self.notices.as_ref(),
            Notice::empty(NoticeId::new()),
            NoticeCommand::Create {
                draft: NoticeDraft {
                    title: "Welcome".to_string(),
                    content: "New here? Say hello after the service.".to_string(),
                    priority: Priority::High,
                    window: PublicationWindow::new(now, None, true),
                },
                occurred_at: now,
            },
        )
        .await?;

        create(
            self.members.as_ref(),
            Member::empty(MemberId::new()),
            MemberCommand::Register {
                details: MemberDetails {
                    first_name: "Sam".to_string(),
                    last_name: "Visitor".to_string(),
                    email: "sam@example.org".to_string(),
                    ..MemberDetails::default()
                },
                source: RegistrationSource::SelfRegistration,
                occurred_at: now,
            },
        )
        .await?;

        tracing::info!("demo data seeded");
        Ok(())
    }
}

fn store<K, V>(repo: InMemoryRepository<K, V>) -> Store<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Arc::new(repo)
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("settings lock poisoned".to_string())
}
