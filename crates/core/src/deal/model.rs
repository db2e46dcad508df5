//! Deal model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::access::Owned;
use crate::contact::{ContactRef, NamedRef};
use crate::serde_util::{clearable_datetime, empty_string_as_none, optional_id, optional_number};
use crate::store::Record;
use crate::Error;

/// Pipeline stage. Any stage may move to any other stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DealStage {
    #[default]
    Lead,
    Qualification,
    Proposal,
    Won,
    Lost,
}

impl DealStage {
    /// Board column order.
    pub const ALL: [DealStage; 5] = [
        Self::Lead,
        Self::Qualification,
        Self::Proposal,
        Self::Won,
        Self::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lead => "Lead",
            Self::Qualification => "Qualification",
            Self::Proposal => "Proposal",
            Self::Won => "Won",
            Self::Lost => "Lost",
        }
    }
}

impl fmt::Display for DealStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DealStage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::validation(format!("Invalid deal stage '{}'", s)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: Uuid,
    pub title: String,
    pub value: f64,
    #[serde(default)]
    pub stage: DealStage,
    pub contact_id: Uuid,
    pub organization_id: Uuid,
    pub owner_id: Uuid,
    #[serde(default)]
    pub close_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deal {
    pub fn new(
        title: impl Into<String>,
        value: f64,
        contact_id: Uuid,
        organization_id: Uuid,
        owner_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            value,
            stage: DealStage::default(),
            contact_id,
            organization_id,
            owner_id,
            close_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_stage(mut self, stage: DealStage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_close_date(mut self, close_date: Option<DateTime<Utc>>) -> Self {
        self.close_date = close_date;
        self
    }
}

impl Record for Deal {
    const COLLECTION: &'static str = "deals";

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

impl Owned for Deal {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

/// A deal with its contact and organization resolved for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DealView {
    #[serde(flatten)]
    pub deal: Deal,
    pub contact: Option<ContactRef>,
    pub organization: Option<NamedRef>,
}

/// Create payload, also used for partial updates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealDraft {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "optional_number")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub contact_id: Option<Uuid>,
    #[serde(default, deserialize_with = "optional_id")]
    pub organization_id: Option<Uuid>,
    /// `Some(None)` clears the close date on update.
    #[serde(default, deserialize_with = "clearable_datetime")]
    pub close_date: Option<Option<DateTime<Utc>>>,
}

pub type DealPatch = DealDraft;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealFilter {
    #[serde(default, deserialize_with = "optional_id")]
    pub organization: Option<Uuid>,
}

/// One column of the pipeline board.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageColumn {
    pub stage: DealStage,
    pub count: usize,
    pub total_value: f64,
    pub deals: Vec<DealView>,
}
