//! Binary media storage.
//!
//! Uploaded bytes live in an external object store behind [`MediaStore`];
//! records only keep the returned URL and public id.

mod local;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

pub use local::LocalMediaStore;

use crate::Result;

/// Storage class an object is kept under. Destroying an object must use the
/// same kind it was uploaded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Video,
    Raw,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Raw => "raw",
        }
    }

    /// Mapping used for attachments, whose kind is never stored explicitly.
    pub fn for_mime(mime_type: &str) -> Self {
        let mime = mime_type.trim().to_ascii_lowercase();
        if mime.starts_with("video/") {
            Self::Video
        } else if mime.starts_with("image/") {
            Self::Image
        } else {
            Self::Raw
        }
    }
}

/// A stored object reference: opaque URL plus external identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub url: String,
    pub public_id: String,
}

/// An in-memory upload received from a client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `upload` under `folder`.
    async fn upload(&self, upload: &Upload, folder: &str, kind: ResourceKind) -> Result<MediaAsset>;

    /// Remove an object. Unknown ids are not an error.
    async fn destroy(&self, public_id: &str, kind: ResourceKind) -> Result<()>;
}
