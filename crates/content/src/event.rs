use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fellowship_core::{DomainResult, Entity, Violations, record_id};

record_id!(
    /// Church event identifier.
    EventId
);

/// Operator input for creating or replacing an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_published: bool,
}

impl EventInput {
    fn validate(&self) -> DomainResult<()> {
        let mut v = Violations::new();
        v.require_text("title", &self.title);
        if let Some(ends_at) = self.ends_at {
            v.check(ends_at >= self.starts_at, "endsAt", "must not be before startsAt");
        }
        v.finish()
    }
}

/// A scheduled gathering shown on the public calendar once published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurchEvent {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for ChurchEvent {
    type Id = EventId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl ChurchEvent {
    pub fn create(id: EventId, input: EventInput, now: DateTime<Utc>) -> DomainResult<Self> {
        input.validate()?;
        Ok(Self {
            id,
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            location: input.location.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            is_published: input.is_published,
            created_at: now,
            updated_at: now,
        })
    }

    /// Full replacement; identity and creation time are kept.
    pub fn replace(&self, input: EventInput, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut next = Self::create(self.id, input, now)?;
        next.created_at = self.created_at;
        Ok(next)
    }

    /// Still running or yet to start at `now`.
    pub fn is_upcoming_at(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.unwrap_or(self.starts_at) >= now
    }
}

/// Public calendar: published events that have not finished, soonest first.
pub fn upcoming_public(events: impl IntoIterator<Item = ChurchEvent>, now: DateTime<Utc>) -> Vec<ChurchEvent> {
    let mut upcoming: Vec<_> = events
        .into_iter()
        .filter(|e| e.is_published && e.is_upcoming_at(now))
        .collect();
    upcoming.sort_by_key(|e| e.starts_at);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use fellowship_core::DomainError;

    fn input(offset_days: i64, published: bool) -> EventInput {
        let starts_at = Utc::now() + Duration::days(offset_days);
        EventInput {
            title: "Harvest supper".to_string(),
            description: String::new(),
            location: Some("  Fellowship hall ".to_string()),
            starts_at,
            ends_at: Some(starts_at + Duration::hours(2)),
            is_published: published,
        }
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut bad = input(1, true);
        bad.ends_at = Some(bad.starts_at - Duration::hours(1));
        let err = ChurchEvent::create(EventId::new(), bad, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn replace_keeps_created_at() {
        let t0 = Utc::now();
        let event = ChurchEvent::create(EventId::new(), input(1, false), t0).unwrap();
        assert_eq!(event.location.as_deref(), Some("Fellowship hall"));

        let later = t0 + Duration::minutes(5);
        let next = event.replace(input(2, true), later).unwrap();
        assert_eq!(next.created_at, t0);
        assert_eq!(next.updated_at, later);
        assert_eq!(next.id, event.id);
    }

    #[test]
    fn public_calendar_hides_drafts_and_past_events() {
        let now = Utc::now();
        let soon = ChurchEvent::create(EventId::new(), input(1, true), now).unwrap();
        let later = ChurchEvent::create(EventId::new(), input(5, true), now).unwrap();
        let draft = ChurchEvent::create(EventId::new(), input(2, false), now).unwrap();
        let past = ChurchEvent::create(EventId::new(), input(-3, true), now).unwrap();

        let listed = upcoming_public(vec![later.clone(), past, draft, soon.clone()], now);
        let ids: Vec<_> = listed.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![soon.id, later.id]);
    }
}
