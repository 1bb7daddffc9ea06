use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::domain::ColumnKind;

#[derive(Debug, Clone, Deserialize)]
pub struct NewCard {
    pub title: String,
    pub description: String,
}

/// A card joined with its column and its open block, if any.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CardDetails {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub board_id: i64,
    pub column_id: i64,
    pub column_name: String,
    pub column_kind: ColumnKind,
    pub column_position: i64,
    pub blocked: bool,
    pub blocked_at: Option<String>,
    pub block_reason: Option<String>,
    pub blocks_amount: i64,
}

/// Row returned by card search.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CardSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub board_id: i64,
    pub column_id: i64,
    pub column_name: String,
    pub column_kind: ColumnKind,
    pub blocked: bool,
    pub block_reason: Option<String>,
}
