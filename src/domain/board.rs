use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::ColumnKind;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Board {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct BoardColumn {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub kind: ColumnKind,
    pub position: i64,
}

impl BoardColumn {
    /// Whether a card sitting in `self` may move to `target`.
    ///
    /// Cards only move forward one column at a time, never out of a terminal
    /// column, and only reach the cancel column through cancellation.
    pub fn can_transition_to(&self, target: &BoardColumn) -> bool {
        if self.board_id != target.board_id || self.id == target.id {
            return false;
        }
        if self.kind.is_terminal() {
            return false;
        }
        match target.kind {
            ColumnKind::Cancel => true,
            ColumnKind::Initial => false,
            ColumnKind::Pending | ColumnKind::Final => target.position == self.position + 1,
        }
    }

    pub fn transition_error(&self, target: &BoardColumn) -> String {
        if self.board_id != target.board_id {
            return format!(
                "Column '{}' belongs to board {}, not to board {}",
                target.name, target.board_id, self.board_id
            );
        }
        if self.kind.is_terminal() {
            return format!(
                "Cards in the {} column '{}' cannot be moved",
                self.kind, self.name
            );
        }
        format!(
            "Invalid move: '{}' → '{}'. Cards in '{}' may only advance to the next column or be cancelled",
            self.name, target.name, self.name
        )
    }
}

/// The column that follows `current` in normal flow, skipping the cancel
/// column. `columns` must all belong to the same board.
pub fn next_column<'a>(columns: &'a [BoardColumn], current: &BoardColumn) -> Option<&'a BoardColumn> {
    columns
        .iter()
        .filter(|c| c.kind != ColumnKind::Cancel && c.position > current.position)
        .min_by_key(|c| c.position)
}
