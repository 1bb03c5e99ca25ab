use actix_multipart::Multipart;
use futures_util::StreamExt;
use tracing::{debug, warn};

use crate::domain::error::{AppError, Result};

pub const FILE_FIELD: &str = "file";

pub const ALLOWED_MIME_TYPES: [&str; 2] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
];

#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub fn is_excel_mime(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
}

/// Pulls the first `field_name` file out of a multipart body.
///
/// Returns `Ok(None)` when the body has no such field or is not multipart at
/// all. The MIME type is checked before any file bytes are read.
pub async fn read_excel_upload(
    mut payload: Multipart,
    field_name: &str,
    max_bytes: u64,
) -> Result<Option<UploadedFile>> {
    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                warn!(error = %e, "Unreadable multipart body");
                return Ok(None);
            }
        };

        let disposition = field.content_disposition();
        let name = disposition.get_name().unwrap_or_default().to_string();
        let file_name = disposition.get_filename().unwrap_or("upload").to_string();

        if name != field_name {
            debug!(field = %name, "Skipping multipart field");
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| {
                    AppError::ValidationError(format!("Malformed multipart field: {}", e))
                })?;
            }
            continue;
        }

        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        if !is_excel_mime(&content_type) {
            return Err(AppError::UnsupportedMediaType(format!(
                "{} has type '{}'",
                file_name, content_type
            )));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::ValidationError(format!("Malformed multipart field: {}", e))
            })?;
            if (bytes.len() + chunk.len()) as u64 > max_bytes {
                return Err(AppError::PayloadTooLarge(format!(
                    "{} exceeds {} bytes",
                    file_name, max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            bytes,
        }));
    }

    Ok(None)
}
