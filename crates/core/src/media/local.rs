//! Filesystem-backed media store. Objects are laid out as
//! `<root>/<kind>/<public id>` and served under `<base url>/<kind>/<public id>`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use super::{MediaAsset, MediaStore, ResourceKind, Upload};
use crate::{Error, Result};

pub struct LocalMediaStore {
    root: PathBuf,
    base_url: String,
}

impl LocalMediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, public_id: &str, kind: ResourceKind) -> PathBuf {
        let mut path = self.root.join(kind.as_str());
        for segment in public_id.split('/') {
            path.push(segment);
        }
        path
    }

    fn object_url(&self, public_id: &str, kind: ResourceKind) -> String {
        let encoded = public_id
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("{}/{}/{}", self.base_url, kind.as_str(), encoded)
    }
}

fn check_relative(value: &str, what: &str) -> Result<()> {
    let invalid = value.is_empty()
        || value.contains('\\')
        || value
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        return Err(Error::validation(format!("Invalid {} '{}'", what, value)));
    }
    Ok(())
}

fn extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext)
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload(&self, upload: &Upload, folder: &str, kind: ResourceKind) -> Result<MediaAsset> {
        check_relative(folder, "folder")?;

        let public_id = match extension(&upload.file_name) {
            Some(ext) => format!("{}/{}.{}", folder, Uuid::new_v4(), ext),
            None => format!("{}/{}", folder, Uuid::new_v4()),
        };
        let path = self.object_path(&public_id, kind);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| Error::Media(format!("Failed to create media folder: {}", err)))?;
        }
        tokio::fs::write(&path, &upload.bytes)
            .await
            .map_err(|err| Error::Media(format!("Failed to store {}: {}", upload.file_name, err)))?;

        tracing::debug!(public_id = %public_id, kind = kind.as_str(), bytes = upload.bytes.len(), "media stored");

        Ok(MediaAsset {
            url: self.object_url(&public_id, kind),
            public_id,
        })
    }

    async fn destroy(&self, public_id: &str, kind: ResourceKind) -> Result<()> {
        check_relative(public_id, "public id")?;
        match tokio::fs::remove_file(self.object_path(public_id, kind)).await {
            Ok(()) => {
                tracing::debug!(public_id, kind = kind.as_str(), "media destroyed");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(Error::Media(format!("Failed to delete {}: {}", public_id, err))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (LocalMediaStore, TempDir) {
        let temp = TempDir::new().unwrap();
        (LocalMediaStore::new(temp.path(), "/uploads/"), temp)
    }

    #[tokio::test]
    async fn upload_writes_under_kind_and_folder() {
        let (store, _temp) = store();
        let upload = Upload::new("Quarterly Report.PDF", "application/pdf", b"%PDF".to_vec());

        let asset = store
            .upload(&upload, "crm/contacts/abc/attachments", ResourceKind::Raw)
            .await
            .unwrap();

        assert!(asset.public_id.starts_with("crm/contacts/abc/attachments/"));
        assert!(asset.public_id.ends_with(".pdf"));
        assert!(asset.url.starts_with("/uploads/raw/crm/contacts/abc/attachments/"));
        let on_disk = store.object_path(&asset.public_id, ResourceKind::Raw);
        assert_eq!(tokio::fs::read(on_disk).await.unwrap(), b"%PDF");
    }

    #[tokio::test]
    async fn destroy_uses_the_kind_it_was_stored_with() {
        let (store, _temp) = store();
        let upload = Upload::new("clip.mp4", "video/mp4", b"....".to_vec());
        let asset = store.upload(&upload, "crm/videos", ResourceKind::Video).await.unwrap();
        let path = store.object_path(&asset.public_id, ResourceKind::Video);

        store.destroy(&asset.public_id, ResourceKind::Raw).await.unwrap();
        assert!(path.exists());

        store.destroy(&asset.public_id, ResourceKind::Video).await.unwrap();
        assert!(!path.exists());

        // Second destroy is a no-op.
        store.destroy(&asset.public_id, ResourceKind::Video).await.unwrap();
    }

    #[tokio::test]
    async fn traversal_is_rejected() {
        let (store, _temp) = store();
        for bad in ["../etc/passwd", "a//b", "", "a/./b", "a\\b"] {
            let err = store.destroy(bad, ResourceKind::Raw).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{bad}");
        }
    }
}
