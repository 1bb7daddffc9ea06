use sqlx::SqlitePool;

use crate::domain::{now_timestamp, validation, Board, BoardColumn, KanbanError};
use crate::dto::{BoardDetails, BoardSummary, ColumnCard, ColumnDetails, ColumnSummary, NewBoard};

pub struct BoardService;

impl BoardService {
    /// Creates a board and its full column set in one transaction.
    pub async fn create_board(pool: &SqlitePool, req: NewBoard) -> Result<BoardDetails, KanbanError> {
        let name = validation::board_name(&req.name)?;

        let mut layout = Vec::new();
        for (column_name, kind) in req.column_layout() {
            layout.push((validation::column_name(&column_name)?, kind));
        }
        validation::column_layout(&layout)?;

        let now = now_timestamp();
        let mut tx = pool.begin().await?;

        let board: Board = sqlx::query_as(
            "INSERT INTO boards (name, created_at) VALUES (?, ?) RETURNING id, name, created_at",
        )
        .bind(&name)
        .bind(&now)
        .fetch_one(&mut *tx)
        .await?;

        for (position, (column_name, kind)) in layout.iter().enumerate() {
            sqlx::query(
                "INSERT INTO boards_columns (board_id, name, kind, position) VALUES (?, ?, ?, ?)",
            )
            .bind(board.id)
            .bind(column_name)
            .bind(kind)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(board_id = board.id, columns = layout.len(), "Board created: {}", board.name);

        Self::board_details(pool, board.id).await
    }

    pub async fn list_boards(pool: &SqlitePool) -> Result<Vec<BoardSummary>, KanbanError> {
        let boards: Vec<BoardSummary> = sqlx::query_as(
            r#"
            SELECT
                b.id, b.name, b.created_at,
                (SELECT COUNT(*) FROM boards_columns bc WHERE bc.board_id = b.id) AS column_count,
                (SELECT COUNT(*) FROM cards c
                    JOIN boards_columns bc ON bc.id = c.board_column_id
                    WHERE bc.board_id = b.id) AS card_count
            FROM boards b
            ORDER BY b.id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        tracing::debug!("Found {} boards", boards.len());
        Ok(boards)
    }

    pub async fn find_board(pool: &SqlitePool, id: i64) -> Result<Board, KanbanError> {
        let board: Board = sqlx::query_as("SELECT id, name, created_at FROM boards WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| KanbanError::NotFound(format!("Board not found: {}", id)))?;

        Ok(board)
    }

    pub async fn board_details(pool: &SqlitePool, id: i64) -> Result<BoardDetails, KanbanError> {
        let board = Self::find_board(pool, id).await?;

        let columns: Vec<ColumnSummary> = sqlx::query_as(
            r#"
            SELECT
                bc.id, bc.board_id, bc.name, bc.kind, bc.position,
                (SELECT COUNT(*) FROM cards c WHERE c.board_column_id = bc.id) AS card_count
            FROM boards_columns bc
            WHERE bc.board_id = ?
            ORDER BY bc.position ASC
            "#,
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(BoardDetails { board, columns })
    }

    /// Columns of a board ordered by position.
    pub async fn columns(pool: &SqlitePool, board_id: i64) -> Result<Vec<BoardColumn>, KanbanError> {
        let columns: Vec<BoardColumn> = sqlx::query_as(
            "SELECT id, board_id, name, kind, position FROM boards_columns WHERE board_id = ? ORDER BY position ASC",
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(columns)
    }

    pub async fn find_column(pool: &SqlitePool, column_id: i64) -> Result<BoardColumn, KanbanError> {
        let column: BoardColumn = sqlx::query_as(
            "SELECT id, board_id, name, kind, position FROM boards_columns WHERE id = ?",
        )
        .bind(column_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| KanbanError::NotFound(format!("Column not found: {}", column_id)))?;

        Ok(column)
    }

    pub async fn column_details(pool: &SqlitePool, column_id: i64) -> Result<ColumnDetails, KanbanError> {
        let column = Self::find_column(pool, column_id).await?;

        let cards: Vec<ColumnCard> = sqlx::query_as(
            r#"
            SELECT
                c.id, c.title, c.created_at,
                EXISTS (SELECT 1 FROM blocks b WHERE b.card_id = c.id AND b.unblocked_at IS NULL) AS blocked
            FROM cards c
            WHERE c.board_column_id = ?
            ORDER BY c.id ASC
            "#,
        )
        .bind(column_id)
        .fetch_all(pool)
        .await?;

        Ok(ColumnDetails { column, cards })
    }

    pub async fn delete_board(pool: &SqlitePool, id: i64) -> Result<(), KanbanError> {
        let result = sqlx::query("DELETE FROM boards WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(KanbanError::NotFound(format!("Board not found: {}", id)));
        }

        tracing::info!(board_id = id, "Board deleted");
        Ok(())
    }
}
