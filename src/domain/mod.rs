pub mod board;
pub mod card;
pub mod column_kind;
pub mod error;
pub mod validation;

pub use board::{next_column, Board, BoardColumn};
pub use card::{Block, Card, OperationMetric};
pub use column_kind::ColumnKind;
pub use error::KanbanError;

/// Current time as stored in the database: RFC 3339, UTC, millisecond
/// precision, so lexical order matches chronological order.
pub fn now_timestamp() -> String {
    format_timestamp(chrono::Utc::now())
}

pub fn format_timestamp(at: chrono::DateTime<chrono::Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Case-folded form of searchable text, stored next to the original so
/// substring search ignores case beyond ASCII.
pub fn search_key(value: &str) -> String {
    value.to_lowercase()
}
