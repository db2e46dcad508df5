//! Multipart upload limits and file-type rules.

use std::path::Path;

use axum::extract::{DefaultBodyLimit, Multipart};
use bytes::BytesMut;

use crm_core::media::Upload;

use crate::routes::error::{bad_request, RouteError};

const MB: usize = 1_000_000;
const IMAGE_TYPES: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];
const VIDEO_TYPES: &[&str] = &["mp4", "mov", "avi", "wmv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accept {
    Any,
    Images,
    Videos,
    Csv,
}

#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    pub field: &'static str,
    pub max_bytes: usize,
    pub max_files: usize,
    accept: Accept,
    missing: &'static str,
}

pub const LOGO: UploadPolicy = UploadPolicy {
    field: "logo",
    max_bytes: 2 * MB,
    max_files: 1,
    accept: Accept::Images,
    missing: "Please upload an image file.",
};

pub const PICTURES: UploadPolicy = UploadPolicy {
    field: "pictures",
    max_bytes: 10 * MB,
    max_files: 10,
    accept: Accept::Images,
    missing: "Please upload picture files.",
};

pub const VIDEOS: UploadPolicy = UploadPolicy {
    field: "videos",
    max_bytes: 50 * MB,
    max_files: 5,
    accept: Accept::Videos,
    missing: "Please upload video files.",
};

pub const ATTACHMENT: UploadPolicy = UploadPolicy {
    field: "file",
    max_bytes: 20 * MB,
    max_files: 1,
    accept: Accept::Any,
    missing: "Please upload a file",
};

pub const CSV_IMPORT: UploadPolicy = UploadPolicy {
    field: "file",
    max_bytes: 5 * MB,
    max_files: 1,
    accept: Accept::Csv,
    missing: "Please upload a CSV file.",
};

fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

impl UploadPolicy {
    /// Request body ceiling for a route using this policy.
    pub fn body_limit(&self) -> DefaultBodyLimit {
        DefaultBodyLimit::max(self.max_bytes * self.max_files + 64 * 1024)
    }

    fn accepts(&self, file_name: &str, mime_type: &str) -> bool {
        let ext = extension(file_name);
        let mime = mime_type.to_ascii_lowercase();
        match self.accept {
            Accept::Any => true,
            Accept::Images => {
                IMAGE_TYPES.contains(&ext.as_str())
                    && mime
                        .strip_prefix("image/")
                        .is_some_and(|subtype| IMAGE_TYPES.contains(&subtype))
            }
            Accept::Videos => VIDEO_TYPES.contains(&ext.as_str()) && mime.starts_with("video/"),
            Accept::Csv => {
                ext == "csv" && matches!(mime.as_str(), "text/csv" | "application/vnd.ms-excel")
            }
        }
    }

    fn rejection(&self) -> &'static str {
        match self.accept {
            Accept::Csv => "Please upload a CSV file.",
            _ => "Invalid file type!",
        }
    }

    /// Read every file in `multipart` under this policy. Text fields are
    /// ignored; files under any other field name are rejected.
    pub async fn read(&self, mut multipart: Multipart) -> Result<Vec<Upload>, RouteError> {
        let mut uploads = Vec::new();

        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|err| bad_request(err.body_text()))?
        {
            let Some(file_name) = field.file_name().map(str::to_string) else {
                continue;
            };
            let name = field.name().unwrap_or_default().to_string();
            if name != self.field {
                return Err(bad_request(format!("Unexpected field '{}'", name)));
            }
            if uploads.len() == self.max_files {
                return Err(bad_request(format!(
                    "Too many files, at most {} allowed",
                    self.max_files
                )));
            }

            let mime_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            if !self.accepts(&file_name, &mime_type) {
                return Err(bad_request(self.rejection()));
            }

            let mut bytes = BytesMut::new();
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|err| bad_request(err.body_text()))?
            {
                if bytes.len() + chunk.len() > self.max_bytes {
                    return Err(bad_request(format!("File too large: {}", file_name)));
                }
                bytes.extend_from_slice(&chunk);
            }

            uploads.push(Upload::new(file_name, mime_type, bytes.freeze()));
        }

        if uploads.is_empty() {
            return Err(bad_request(self.missing));
        }
        Ok(uploads)
    }

    /// Like [`read`](Self::read) for single-file policies.
    pub async fn read_one(&self, multipart: Multipart) -> Result<Upload, RouteError> {
        self.read(multipart)
            .await?
            .pop()
            .ok_or_else(|| bad_request(self.missing))
    }
}
