use crate::domain::error::{AppError, Result};
use crate::domain::spreadsheet::{Row, SpreadsheetRecord};
use crate::infrastructure::db::SpreadsheetStore;
use async_trait::async_trait;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::str::FromStr;

pub struct SqliteSpreadsheetRepository {
    pool: Pool<Sqlite>,
}

impl SqliteSpreadsheetRepository {
    pub async fn init(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to parse connection string: {}", e))
            })?
            .create_if_missing(true);

        // Every connection to an in-memory database is a separate database.
        let pool_options = if is_in_memory(database_url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {}", e)))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS excel_data (
                id TEXT PRIMARY KEY,
                data_json TEXT NOT NULL,
                uploaded_at DATETIME NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create table: {}", e)))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SpreadsheetStore for SqliteSpreadsheetRepository {
    async fn insert(&self, data: Vec<Row>) -> Result<SpreadsheetRecord> {
        let record = SpreadsheetRecord::new(data);
        let data_json = serde_json::to_string(&record.data).map_err(|e| {
            AppError::Internal(format!("Failed to serialize spreadsheet rows: {}", e))
        })?;

        sqlx::query("INSERT INTO excel_data (id, data_json, uploaded_at) VALUES (?, ?, ?)")
            .bind(&record.id)
            .bind(&data_json)
            .bind(record.uploaded_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to save spreadsheet: {}", e))
            })?;

        Ok(record)
    }

    async fn get(&self, id: &str) -> Result<SpreadsheetRecord> {
        let entity = sqlx::query_as::<_, SpreadsheetEntity>(
            "SELECT id, data_json, uploaded_at FROM excel_data WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch spreadsheet: {}", e)))?
        .ok_or_else(|| AppError::NotFound(format!("Spreadsheet {} not found", id)))?;

        entity.try_into()
    }

    async fn count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM excel_data")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count spreadsheets: {}", e)))
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

// Internal entity for database mapping
#[derive(sqlx::FromRow)]
struct SpreadsheetEntity {
    id: String,
    data_json: String,
    uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<SpreadsheetEntity> for SpreadsheetRecord {
    type Error = AppError;

    fn try_from(e: SpreadsheetEntity) -> Result<Self> {
        let data = serde_json::from_str(&e.data_json).map_err(|err| {
            AppError::DatabaseError(format!("Corrupt spreadsheet document {}: {}", e.id, err))
        })?;

        Ok(Self {
            id: e.id,
            data,
            uploaded_at: e.uploaded_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::spreadsheet::CellValue;

    async fn memory_repo() -> SqliteSpreadsheetRepository {
        SqliteSpreadsheetRepository::init("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_then_get() {
        let repo = memory_repo().await;
        let rows = vec![
            vec![
                CellValue::Text("name".to_string()),
                CellValue::Text("age".to_string()),
            ],
            vec![
                CellValue::Text("Alice".to_string()),
                CellValue::Int(30),
                CellValue::Null,
                CellValue::Float(0.5),
            ],
        ];

        let saved = repo.insert(rows.clone()).await.unwrap();
        let loaded = repo.get(&saved.id).await.unwrap();

        assert_eq!(loaded.id, saved.id);
        assert_eq!(loaded.data, rows);
        assert_eq!(loaded.uploaded_at, saved.uploaded_at);
    }

    #[tokio::test]
    async fn test_empty_sheet_is_stored() {
        let repo = memory_repo().await;
        let saved = repo.insert(Vec::new()).await.unwrap();

        assert!(repo.get(&saved.id).await.unwrap().data.is_empty());
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_count_and_missing_record() {
        let repo = memory_repo().await;
        assert_eq!(repo.count().await.unwrap(), 0);

        repo.insert(Vec::new()).await.unwrap();
        repo.insert(Vec::new()).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);

        assert!(matches!(
            repo.get("missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("sheets.db").display());

        let repo = SqliteSpreadsheetRepository::init(&url).await.unwrap();
        repo.insert(Vec::new()).await.unwrap();

        assert!(dir.path().join("sheets.db").exists());
    }

    #[tokio::test]
    async fn test_unreachable_database() {
        let result =
            SqliteSpreadsheetRepository::init("sqlite:///nonexistent-dir/sheetdrop/test.db").await;
        assert!(matches!(result, Err(AppError::DatabaseError(_))));
    }

    #[test]
    fn test_is_in_memory() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:db?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://sheetdrop.db"));
    }
}
