use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

/// 5 MB
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

const ALLOWED_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];

/// Public sub-directory that always receives a copy of every upload.
const LEGACY_DIR: &str = "uploads";

/// Where an upload ended up, relative to the public root.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub filename: String,
    /// Public URL, e.g. `/users/<id>/<uuid>.png`.
    pub url: String,
    pub directory: String,
    pub legacy_url: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// File extension for an accepted image MIME type.
#[must_use]
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Strip everything but ASCII letters, digits, `_` and `-` from a path segment.
#[must_use]
pub fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Check an upload before it touches the disk.
///
/// # Errors
///
/// `BadRequest` for empty files, files over 5 MB and types other than JPEG, PNG, WebP and GIF.
pub fn validate_image(content_type: &str, size: usize) -> Result<&'static str, AppError> {
    if size == 0 {
        return Err(AppError::BadRequest("File is empty".to_string()));
    }
    if size > MAX_IMAGE_SIZE {
        return Err(AppError::BadRequest(
            "File exceeds maximum size of 5MB".to_string(),
        ));
    }
    if !ALLOWED_TYPES.contains(&content_type) {
        return Err(AppError::BadRequest(format!(
            "Unsupported file type: {content_type}"
        )));
    }
    extension_for(content_type)
        .ok_or_else(|| AppError::BadRequest("Unsupported file type".to_string()))
}

/// Whether `value` is usable as an image reference: an absolute URL or a site path.
#[must_use]
pub fn is_image_reference(value: &str) -> bool {
    value.starts_with('/') || reqwest::Url::parse(value).is_ok()
}

/// Last non-empty path segment of an image URL or path.
#[must_use]
pub fn filename_from_url(value: &str) -> Option<String> {
    let path = reqwest::Url::parse(value)
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| value.to_string());
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .map(String::from)
}

/// Public directory segments an upload is written to.
fn target_segments(owner: Option<Uuid>) -> Vec<String> {
    owner
        .map(|id| sanitize_segment(&id.to_string()))
        .filter(|id| !id.is_empty())
        .map_or_else(
            || vec![LEGACY_DIR.to_string()],
            |id| vec!["users".to_string(), id],
        )
}

/// Write an image under `root`, into `users/<owner>/` for profile images or `uploads/`
/// otherwise, and keep a copy in `uploads/` so older links resolve.
///
/// # Errors
///
/// `BadRequest` if the image fails validation, `Internal` if the write fails.
pub async fn save_image(
    root: &Path,
    bytes: &[u8],
    content_type: &str,
    owner: Option<Uuid>,
) -> Result<StoredImage, AppError> {
    let extension = validate_image(content_type, bytes.len())?;

    let segments = target_segments(owner);
    let directory: PathBuf = segments.iter().fold(root.to_path_buf(), |p, s| p.join(s));
    tokio::fs::create_dir_all(&directory).await?;

    let filename = format!("{}.{extension}", Uuid::new_v4());
    tokio::fs::write(directory.join(&filename), bytes).await?;

    if owner.is_some() {
        let legacy = root.join(LEGACY_DIR);
        tokio::fs::create_dir_all(&legacy).await?;
        tokio::fs::write(legacy.join(&filename), bytes).await?;
    }

    let public_dir = format!("/{}", segments.join("/"));
    tracing::info!(file = %filename, directory = %public_dir, size = bytes.len(), "Image stored");

    Ok(StoredImage {
        url: format!("{public_dir}/{filename}"),
        legacy_url: format!("/{LEGACY_DIR}/{filename}"),
        directory: public_dir,
        size: bytes.len(),
        content_type: content_type.to_string(),
        filename,
    })
}
