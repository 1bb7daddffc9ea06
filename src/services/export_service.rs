use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::domain::{Block, Board, BoardColumn, Card, KanbanError};
use crate::services::BoardService;

pub const EXPORT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct ExportedCard {
    #[serde(flatten)]
    pub card: Card,
    pub blocks: Vec<Block>,
}

/// Snapshot of a board with everything on it.
#[derive(Debug, Clone, Serialize)]
pub struct BoardExport {
    pub format_version: u32,
    pub exported_at: DateTime<Utc>,
    pub board: Board,
    pub columns: Vec<BoardColumn>,
    pub cards: Vec<ExportedCard>,
}

pub struct ExportService;

impl ExportService {
    pub async fn export_board(pool: &SqlitePool, board_id: i64) -> Result<BoardExport, KanbanError> {
        let board = BoardService::find_board(pool, board_id).await?;
        let columns = BoardService::columns(pool, board_id).await?;

        let cards: Vec<Card> = sqlx::query_as(
            r#"
            SELECT c.id, c.board_column_id, c.title, c.description, c.created_at
            FROM cards c
            INNER JOIN boards_columns bc ON bc.id = c.board_column_id
            WHERE bc.board_id = ?
            ORDER BY c.id ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        let blocks: Vec<Block> = sqlx::query_as(
            r#"
            SELECT b.id, b.card_id, b.block_reason, b.blocked_at, b.unblock_reason, b.unblocked_at
            FROM blocks b
            INNER JOIN cards c ON c.id = b.card_id
            INNER JOIN boards_columns bc ON bc.id = c.board_column_id
            WHERE bc.board_id = ?
            ORDER BY b.blocked_at ASC, b.id ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        let cards: Vec<ExportedCard> = cards
            .into_iter()
            .map(|card| {
                let blocks = blocks
                    .iter()
                    .filter(|b| b.card_id == card.id)
                    .cloned()
                    .collect();
                ExportedCard { card, blocks }
            })
            .collect();

        tracing::info!(board_id, cards = cards.len(), "Board exported");

        Ok(BoardExport {
            format_version: EXPORT_FORMAT_VERSION,
            exported_at: Utc::now(),
            board,
            columns,
            cards,
        })
    }

    pub fn to_json(export: &BoardExport) -> Result<String, KanbanError> {
        Ok(serde_json::to_string_pretty(export)?)
    }

    /// Writes the export to `path`, replacing any existing file.
    pub async fn write_to_file(export: &BoardExport, path: &Path) -> Result<(), KanbanError> {
        let json = Self::to_json(export)?;
        tokio::fs::write(path, json).await?;

        tracing::info!(path = %path.display(), "Export written");
        Ok(())
    }
}
