use std::path::{Path, PathBuf};

use super::FileCollection;
use crate::activity::Activity;
use crate::contact::Contact;
use crate::deal::Deal;
use crate::file::FileRecord;
use crate::note::Note;
use crate::notification::Notification;
use crate::organization::Organization;
use crate::user::User;
use crate::Result;

/// The eight document collections backing the CRM.
pub struct Database {
    data_dir: PathBuf,
    pub users: FileCollection<User>,
    pub organizations: FileCollection<Organization>,
    pub contacts: FileCollection<Contact>,
    pub deals: FileCollection<Deal>,
    pub activities: FileCollection<Activity>,
    pub notes: FileCollection<Note>,
    pub notifications: FileCollection<Notification>,
    pub files: FileCollection<FileRecord>,
}

impl Database {
    /// Open every collection under `data_dir`, creating the directory if needed.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;

        Ok(Self {
            users: FileCollection::open_in(&data_dir).await?,
            organizations: FileCollection::open_in(&data_dir).await?,
            contacts: FileCollection::open_in(&data_dir).await?,
            deals: FileCollection::open_in(&data_dir).await?,
            activities: FileCollection::open_in(&data_dir).await?,
            notes: FileCollection::open_in(&data_dir).await?,
            notifications: FileCollection::open_in(&data_dir).await?,
            files: FileCollection::open_in(&data_dir).await?,
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
