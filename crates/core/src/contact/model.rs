//! Contact model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Owned;
use crate::serde_util::{clearable_id, clearable_string, empty_string_as_none, optional_id};
use crate::store::Record;

/// A person tracked in the CRM. Every contact has exactly one owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub created_by: Uuid,
    pub last_modified_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        owner_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: None,
            organization_id: None,
            owner_id,
            created_by: owner_id,
            last_modified_by: owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn summary(&self) -> ContactRef {
        ContactRef {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

impl Record for Contact {
    const COLLECTION: &'static str = "contacts";

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Owned for Contact {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// Display summary of a referenced contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRef {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
}

/// Display summary of a referenced record that only has a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

/// A contact with its references resolved to display names.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactView {
    #[serde(flatten)]
    pub contact: Contact,
    pub organization: Option<NamedRef>,
    pub created_by_user: Option<NamedRef>,
    pub last_modified_by_user: Option<NamedRef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDraft {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub email: Option<String>,
    /// `Some(None)` clears the phone on update.
    #[serde(default, deserialize_with = "clearable_string")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable_id")]
    pub organization_id: Option<Option<Uuid>>,
}

/// Partial update; absent fields are left untouched, blank optional fields
/// are cleared.
pub type ContactPatch = ContactDraft;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactFilter {
    #[serde(default, deserialize_with = "optional_id")]
    pub organization: Option<Uuid>,
}
