use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Card {
    pub id: i64,
    pub board_column_id: i64,
    pub title: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Block {
    pub id: i64,
    pub card_id: i64,
    pub block_reason: String,
    pub blocked_at: String,
    pub unblock_reason: Option<String>,
    pub unblocked_at: Option<String>,
}

impl Block {
    pub fn is_open(&self) -> bool {
        self.unblocked_at.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OperationMetric {
    pub id: i64,
    pub operation: String,
    pub duration_ms: i64,
    pub succeeded: bool,
    pub details: String,
    pub recorded_at: String,
}
