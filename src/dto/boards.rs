use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::domain::{Board, BoardColumn, ColumnKind};

pub const DEFAULT_INITIAL_COLUMN: &str = "To do";
pub const DEFAULT_FINAL_COLUMN: &str = "Done";
pub const DEFAULT_CANCEL_COLUMN: &str = "Cancelled";

#[derive(Debug, Clone, Deserialize)]
pub struct NewBoard {
    pub name: String,
    #[serde(default = "default_initial_column")]
    pub initial_column: String,
    #[serde(default)]
    pub pending_columns: Vec<String>,
    #[serde(default = "default_final_column")]
    pub final_column: String,
    #[serde(default = "default_cancel_column")]
    pub cancel_column: String,
}

fn default_initial_column() -> String {
    DEFAULT_INITIAL_COLUMN.into()
}

fn default_final_column() -> String {
    DEFAULT_FINAL_COLUMN.into()
}

fn default_cancel_column() -> String {
    DEFAULT_CANCEL_COLUMN.into()
}

impl NewBoard {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial_column: default_initial_column(),
            pending_columns: vec![],
            final_column: default_final_column(),
            cancel_column: default_cancel_column(),
        }
    }

    pub fn with_pending<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending_columns = names.into_iter().map(Into::into).collect();
        self
    }

    /// Columns in board order; the index is the column position.
    pub fn column_layout(&self) -> Vec<(String, ColumnKind)> {
        let mut columns = Vec::with_capacity(self.pending_columns.len() + 3);
        columns.push((self.initial_column.clone(), ColumnKind::Initial));
        columns.extend(
            self.pending_columns
                .iter()
                .map(|name| (name.clone(), ColumnKind::Pending)),
        );
        columns.push((self.final_column.clone(), ColumnKind::Final));
        columns.push((self.cancel_column.clone(), ColumnKind::Cancel));
        columns
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BoardSummary {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub column_count: i64,
    pub card_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ColumnSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub column: BoardColumn,
    pub card_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardDetails {
    #[serde(flatten)]
    pub board: Board,
    pub columns: Vec<ColumnSummary>,
}

impl BoardDetails {
    pub fn total_cards(&self) -> i64 {
        self.columns.iter().map(|c| c.card_count).sum()
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ColumnCard {
    pub id: i64,
    pub title: String,
    pub blocked: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnDetails {
    #[serde(flatten)]
    pub column: BoardColumn,
    pub cards: Vec<ColumnCard>,
}
