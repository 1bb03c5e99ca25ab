use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A single cell as returned to clients.
///
/// Serialises to the plain JSON scalar so the frontend can render it without
/// knowing about spreadsheet types. Dates go out as ISO-8601 strings and read
/// back as `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(String),
    Error { error: String },
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

pub type Row = Vec<CellValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetRecord {
    #[serde(skip)]
    pub id: String,
    pub data: Vec<Row>,
    pub uploaded_at: DateTime<Utc>,
}

impl SpreadsheetRecord {
    pub fn new(data: Vec<Row>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            data,
            // Truncated to milliseconds so the stored and returned uploadedAt match
            uploaded_at: Utc::now().trunc_subsecs(3),
        }
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }
}
