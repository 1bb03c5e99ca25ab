mod app;
mod application;
mod domain;
mod infrastructure;
mod interfaces;

pub use app::run;
pub use domain::error::{AppError, Result};
pub use domain::spreadsheet::{CellValue, Row, SpreadsheetRecord};
pub use infrastructure::config::AppConfig;
