use std::error::Error;
use std::sync::Arc;

use tracing::{error, info};

use crate::application::UploadUseCase;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::sqlite::SqliteSpreadsheetRepository;
use crate::infrastructure::db::SpreadsheetStore;
use crate::infrastructure::storage::ensure_upload_dir;
use crate::interfaces::http::HttpState;

pub async fn setup(config: &AppConfig) -> Result<HttpState, Box<dyn Error>> {
    let upload_dir = ensure_upload_dir(&config.upload_path()).map_err(|err| {
        error!(
            error = %err,
            upload_dir = %config.upload_dir,
            "Failed to create upload dir"
        );
        err
    })?;

    let repository = SqliteSpreadsheetRepository::init(&config.database_url)
        .await
        .map_err(|err| {
            error!(error = %err, "Failed to initialize database");
            err
        })?;

    let records = repository.count().await.map_err(|err| {
        error!(error = %err, "Failed to count stored spreadsheets");
        err
    })?;

    info!(
        database_url = %config.database_url,
        upload_dir = %upload_dir.display(),
        records,
        "Storage ready"
    );

    Ok(HttpState {
        upload_use_case: Arc::new(UploadUseCase::new(Arc::new(repository))),
        upload_dir,
        max_upload_bytes: config.max_upload_bytes,
    })
}
