pub mod error;
pub mod spreadsheet;
