use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::contact::NamedRef;
use crate::media::MediaAsset;
use crate::serde_util::{clearable_string, empty_string_as_none};
use crate::store::Record;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub logo: Option<MediaAsset>,
    #[serde(default)]
    pub pictures: Vec<MediaAsset>,
    #[serde(default)]
    pub videos: Vec<MediaAsset>,
    pub created_by: Uuid,
    pub last_modified_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(name: impl Into<String>, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            website: None,
            industry: None,
            size: None,
            biography: None,
            services: Vec::new(),
            logo: None,
            pictures: Vec::new(),
            videos: Vec::new(),
            created_by,
            last_modified_by: created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn media_folder(&self, section: &str) -> String {
        format!("crm/organizations/{}/{}", self.id, section)
    }
}

impl Record for Organization {
    const COLLECTION: &'static str = "organizations";

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

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationView {
    #[serde(flatten)]
    pub organization: Organization,
    pub created_by_user: Option<NamedRef>,
    pub last_modified_by_user: Option<NamedRef>,
}

/// Services arrive either as a list or as one comma-separated string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ServicesInput {
    List(Vec<String>),
    Text(String),
}

impl ServicesInput {
    pub fn into_list(self) -> Vec<String> {
        let raw = match self {
            Self::List(items) => items,
            Self::Text(text) => text.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Accept `50`, `"50"` or `""` for the headcount.
fn lenient_size<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Raw::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid size '{}'", text))),
    }
}

fn clearable_size<'de, D>(deserializer: D) -> Result<Option<Option<u32>>, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_size(deserializer).map(Some)
}

/// Create and update payload; absent fields are left untouched on update,
/// `null` or blank optional fields are cleared.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDraft {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "clearable_string")]
    pub website: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable_string")]
    pub industry: Option<Option<String>>,
    #[serde(default, deserialize_with = "clearable_size")]
    pub size: Option<Option<u32>>,
    #[serde(default, deserialize_with = "clearable_string")]
    pub biography: Option<Option<String>>,
    #[serde(default)]
    pub services: Option<ServicesInput>,
}
