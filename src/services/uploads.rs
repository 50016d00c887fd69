use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Image types the rich-text editor is allowed to embed.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Error)]
pub enum UploadError {
    /// Caller-correctable problem with the submitted file; renders as 400.
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub url: String,
}

/// Validates the payload is a real image and writes it to `upload_dir` under
/// a collision-free name of the form `{unix_timestamp}_{uuid}.{extension}`.
/// Returns the stored filename plus the public URL path it is served from.
pub fn store_upload(
    upload_dir: &Path,
    original_name: &str,
    data: &[u8],
    max_size: usize,
    now: DateTime<Utc>,
) -> Result<Upload, UploadError> {
    if data.is_empty() {
        return Err(UploadError::Rejected("File is empty".into()));
    }
    if data.len() > max_size {
        return Err(UploadError::Rejected(format!(
            "File too large: {} bytes (max {} bytes)",
            data.len(),
            max_size
        )));
    }

    // Sniff the actual content; the client-supplied name is only trusted for
    // its extension, and only when it agrees with the bytes.
    let kind = infer::get(data)
        .ok_or_else(|| UploadError::Rejected("Unrecognized file type".into()))?;
    if !kind.mime_type().starts_with("image/") {
        return Err(UploadError::Rejected(format!(
            "Not an image: {}",
            kind.mime_type()
        )));
    }

    let client_ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let extension = match client_ext {
        Some(ref e) if ALLOWED_EXTENSIONS.contains(&e.as_str()) => e.clone(),
        _ => kind.extension().to_string(),
    };
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(UploadError::Rejected(format!(
            "Image type not allowed: {}",
            extension
        )));
    }

    let filename = format!("{}_{}.{}", now.timestamp(), Uuid::new_v4().simple(), extension);

    std::fs::create_dir_all(upload_dir).map_err(anyhow::Error::new)?;
    let file_path = upload_dir.join(&filename);
    std::fs::write(&file_path, data).map_err(anyhow::Error::new)?;

    tracing::info!(
        filename = %filename,
        size = data.len(),
        "stored uploaded image"
    );

    Ok(Upload {
        url: format!("/uploads/{}", filename),
        filename,
    })
}
