use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use fellowship_core::{DomainResult, Entity, Violations, record_id};

record_id!(
    /// Catalog entry identifier.
    CatalogEntryId
);

/// The catalog resource classes that share one record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CatalogKind {
    Ministry,
    Group,
    Book,
    Sermon,
}

impl CatalogKind {
    pub const ALL: [CatalogKind; 4] = [
        CatalogKind::Ministry,
        CatalogKind::Group,
        CatalogKind::Book,
        CatalogKind::Sermon,
    ];

    /// Attribute keys an entry of this kind must carry.
    pub fn required_attributes(&self) -> &'static [&'static str] {
        match self {
            CatalogKind::Ministry | CatalogKind::Group => &[],
            CatalogKind::Book => &["author"],
            CatalogKind::Sermon => &["speaker", "preachedOn"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default)]
    pub is_published: bool,
}

impl CatalogInput {
    fn validate(&self, kind: CatalogKind) -> DomainResult<()> {
        let mut v = Violations::new();
        v.require_text("title", &self.title);
        for key in kind.required_attributes() {
            let present = self
                .attributes
                .get(*key)
                .is_some_and(|value| !value.is_null() && value.as_str().is_none_or(|s| !s.trim().is_empty()));
            if !present {
                v.push(format!("attributes.{key}"), "is required");
            }
        }
        v.finish()
    }
}

/// Ministry, group, book or sermon.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: CatalogEntryId,
    pub kind: CatalogKind,
    pub title: String,
    pub description: String,
    pub attributes: BTreeMap<String, Value>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for CatalogEntry {
    type Id = CatalogEntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl CatalogEntry {
    pub fn create(
        id: CatalogEntryId,
        kind: CatalogKind,
        input: CatalogInput,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        input.validate(kind)?;
        Ok(Self {
            id,
            kind,
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            attributes: input.attributes,
            is_published: input.is_published,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn replace(&self, input: CatalogInput, now: DateTime<Utc>) -> DomainResult<Self> {
        let mut next = Self::create(self.id, self.kind, input, now)?;
        next.created_at = self.created_at;
        Ok(next)
    }
}
