use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Owned;
use crate::contact::ContactRef;
use crate::serde_util::{empty_string_as_none, optional_datetime, optional_id};
use crate::store::Record;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    Call,
    Meeting,
    Task,
    Email,
}

impl ActivityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Call => "Call",
            Self::Meeting => "Meeting",
            Self::Task => "Task",
            Self::Email => "Email",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Call, Self::Meeting, Self::Task, Self::Email]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation(format!("Invalid activity kind '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(Error::validation(format!("Invalid task status '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub kind: ActivityKind,
    pub subject: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub assigned_to: Option<Uuid>,
    /// Creator; the ownership anchor.
    pub user_id: Uuid,
    #[serde(default)]
    pub contact_id: Option<Uuid>,
    #[serde(default)]
    pub deal_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(kind: ActivityKind, subject: impl Into<String>, user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            kind,
            subject: subject.into(),
            body: None,
            scheduled_at: None,
            due_date: None,
            status: TaskStatus::default(),
            assigned_to: None,
            user_id,
            contact_id: None,
            deal_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Due date when set, otherwise the scheduled time.
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        self.due_date.or(self.scheduled_at)
    }
}

impl Record for Activity {
    const COLLECTION: &'static str = "activities";

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

impl Owned for Activity {
    fn owner_id(&self) -> Uuid {
        self.user_id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDraft {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "optional_datetime")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_datetime")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "optional_id")]
    pub deal_id: Option<Uuid>,
    #[serde(default, deserialize_with = "optional_id")]
    pub assigned_to: Option<Uuid>,
}

/// A task with its contact resolved for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    #[serde(flatten)]
    pub activity: Activity,
    pub contact: Option<ContactRef>,
    pub effective_date: Option<DateTime<Utc>>,
}
