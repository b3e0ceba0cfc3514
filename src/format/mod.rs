//! Display formatting for incidents and aggregates

pub mod table;

pub use table::{render, TableRow, COLUMN_PADDING, MAX_COLUMN_LENGTH};
