use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fellowship_core::{DomainResult, Violations};

/// Site-wide settings edited from the settings area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub church_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub service_times: Vec<String>,
    /// Whether `/public/register` accepts self-registrations.
    pub registration_open: bool,
    pub updated_at: DateTime<Utc>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            church_name: "Fellowship".to_string(),
            contact_email: None,
            contact_phone: None,
            address: None,
            service_times: Vec::new(),
            registration_open: true,
            updated_at: DateTime::<Utc>::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettingsPatch {
    pub church_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub service_times: Option<Vec<String>>,
    pub registration_open: Option<bool>,
}

impl SiteSettings {
    pub fn apply(&self, patch: SiteSettingsPatch, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut v = Violations::new();
        if let Some(name) = &patch.church_name {
            v.require_text("churchName", name);
        }
        if let Some(email) = &patch.contact_email {
            v.require_email("contactEmail", email);
        }
        v.finish()?;

        Ok(Self {
            church_name: patch
                .church_name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| self.church_name.clone()),
            contact_email: patch
                .contact_email
                .map(|e| e.trim().to_lowercase())
                .or_else(|| self.contact_email.clone()),
            contact_phone: patch.contact_phone.or_else(|| self.contact_phone.clone()),
            address: patch.address.or_else(|| self.address.clone()),
            service_times: patch.service_times.unwrap_or_else(|| self.service_times.clone()),
            registration_open: patch.registration_open.unwrap_or(self.registration_open),
            updated_at: now,
        })
    }
}
