use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fellowship_core::{ValueObject, Violations};

/// When a notice may be shown.
///
/// A notice is visible at `now` iff it is active, `now >= publish_date` and
/// either there is no expiry or `now <= expiry_date`. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationWindow {
    pub publish_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl ValueObject for PublicationWindow {}

impl PublicationWindow {
    pub fn new(publish_date: DateTime<Utc>, expiry_date: Option<DateTime<Utc>>, is_active: bool) -> Self {
        Self {
            publish_date,
            expiry_date,
            is_active,
        }
    }

    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && now >= self.publish_date && self.expiry_date.is_none_or(|expiry| now <= expiry)
    }

    pub fn with_active(self, is_active: bool) -> Self {
        Self { is_active, ..self }
    }

    pub(crate) fn check(&self, v: &mut Violations) {
        if let Some(expiry) = self.expiry_date {
            v.check(
                expiry >= self.publish_date,
                "expiryDate",
                "must not be before publishDate",
            );
        }
    }
}
