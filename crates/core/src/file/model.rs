use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Owned;
use crate::media::{MediaAsset, ResourceKind, Upload};
use crate::store::Record;

/// Metadata for an attachment stored in the media store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: Uuid,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub url: String,
    pub public_id: String,
    /// Uploader.
    pub user_id: Uuid,
    #[serde(default)]
    pub contact_id: Option<Uuid>,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(upload: &Upload, asset: MediaAsset, parent: FileParent, user_id: Uuid) -> Self {
        let now = Utc::now();
        let (contact_id, organization_id) = match parent {
            FileParent::Contact(id) => (Some(id), None),
            FileParent::Organization(id) => (None, Some(id)),
        };
        Self {
            id: Uuid::new_v4(),
            original_name: upload.file_name.clone(),
            mime_type: upload.mime_type.clone(),
            size: upload.size(),
            url: asset.url,
            public_id: asset.public_id,
            user_id,
            contact_id,
            organization_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Storage class the bytes were uploaded under.
    pub fn resource_kind(&self) -> ResourceKind {
        ResourceKind::for_mime(&self.mime_type)
    }

    pub fn belongs_to(&self, parent: FileParent) -> bool {
        match parent {
            FileParent::Contact(id) => self.contact_id == Some(id),
            FileParent::Organization(id) => self.organization_id == Some(id),
        }
    }
}

impl Record for FileRecord {
    const COLLECTION: &'static str = "files";

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

impl Owned for FileRecord {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

/// The record an attachment hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileParent {
    Contact(Uuid),
    Organization(Uuid),
}

impl FileParent {
    pub fn media_folder(self) -> String {
        match self {
            Self::Contact(id) => format!("crm/contacts/{}/attachments", id),
            Self::Organization(id) => format!("crm/organizations/{}/attachments", id),
        }
    }
}
