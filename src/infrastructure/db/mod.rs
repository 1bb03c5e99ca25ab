pub mod sqlite;

use crate::domain::error::Result;
use crate::domain::spreadsheet::{Row, SpreadsheetRecord};
use async_trait::async_trait;

/// Persistence for parsed spreadsheets. Records are insert-only.
#[async_trait]
pub trait SpreadsheetStore {
    async fn insert(&self, data: Vec<Row>) -> Result<SpreadsheetRecord>;
    /// Looks a record up by id; `AppError::NotFound` when absent.
    async fn get(&self, id: &str) -> Result<SpreadsheetRecord>;
    /// Number of stored records, reported at startup.
    async fn count(&self) -> Result<i64>;
}
