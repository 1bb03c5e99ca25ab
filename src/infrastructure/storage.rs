use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::domain::error::{AppError, Result};

static UNSAFE_FILENAME_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").unwrap());

pub fn ensure_upload_dir(upload_dir: &Path) -> std::io::Result<PathBuf> {
    ensure_dir(upload_dir)?;
    Ok(upload_dir.to_path_buf())
}

/// Keeps only the last path component and replaces anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();
    let cleaned = UNSAFE_FILENAME_CHARS.replace_all(base, "_").to_string();
    let cleaned = cleaned.trim_start_matches('.').to_string();

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// `{unix_millis}-{uuid}-{name}`; the uuid keeps same-millisecond uploads apart.
pub fn stored_file_name(original: &str) -> String {
    format!(
        "{}-{}-{}",
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple(),
        sanitize_file_name(original)
    )
}

/// Writes into a new file only; an existing path is never overwritten.
pub async fn write_upload(upload_dir: &Path, original: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = upload_dir.join(stored_file_name(original));
    let io_error = |e: std::io::Error| {
        AppError::IoError(format!("Failed to write upload {}: {}", path.display(), e))
    };

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(io_error)?;
    file.write_all(bytes).await.map_err(io_error)?;
    file.flush().await.map_err(io_error)?;

    Ok(path)
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}
