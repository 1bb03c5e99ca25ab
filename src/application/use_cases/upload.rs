use crate::domain::error::{AppError, Result};
use crate::domain::spreadsheet::SpreadsheetRecord;
use crate::infrastructure::db::SpreadsheetStore;
use crate::infrastructure::parser::parse_first_worksheet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub struct UploadUseCase {
    store: Arc<dyn SpreadsheetStore + Send + Sync>,
}

impl UploadUseCase {
    pub fn new(store: Arc<dyn SpreadsheetStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// Parses the stored upload and persists its rows as a new record.
    pub async fn process_and_store(&self, file_path: PathBuf) -> Result<SpreadsheetRecord> {
        let parse_path = file_path.clone();
        let data = tokio::task::spawn_blocking(move || parse_first_worksheet(&parse_path))
            .await
            .map_err(|e| AppError::Internal(format!("Parser task failed: {}", e)))??;

        info!(path = %file_path.display(), rows = data.len(), "Parsed Excel data");

        let record = self.store.insert(data).await?;

        info!(id = %record.id, rows = record.row_count(), "Stored spreadsheet");

        Ok(record)
    }
}
