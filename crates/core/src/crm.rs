//! Shared service handle.

use std::path::PathBuf;
use std::sync::Arc;

use crate::email::Mailer;
use crate::media::MediaStore;
use crate::store::Database;
use crate::Result;

/// Entry point for every business operation. Cheap to clone; all clones
/// share the same collections and collaborators.
#[derive(Clone)]
pub struct Crm {
    inner: Arc<CrmInner>,
}

struct CrmInner {
    db: Database,
    media: Arc<dyn MediaStore>,
    mailer: Arc<dyn Mailer>,
}

impl Crm {
    /// Open the collections under `data_dir`.
    pub async fn open(
        data_dir: impl Into<PathBuf>,
        media: Arc<dyn MediaStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self> {
        let db = Database::open(data_dir).await?;
        Ok(Self {
            inner: Arc::new(CrmInner { db, media, mailer }),
        })
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub(crate) fn media(&self) -> &dyn MediaStore {
        self.inner.media.as_ref()
    }

    pub(crate) fn mailer(&self) -> &dyn Mailer {
        self.inner.mailer.as_ref()
    }
}
