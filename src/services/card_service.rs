use sqlx::{SqliteConnection, SqlitePool};

use crate::domain::{
    next_column, now_timestamp, search_key, validation, Block, BoardColumn, Card, ColumnKind,
    KanbanError,
};
use crate::dto::{CardDetails, NewCard};
use crate::services::BoardService;

const CARD_DETAILS_QUERY: &str = r#"
    SELECT
        c.id, c.title, c.description, c.created_at,
        bc.board_id,
        bc.id AS column_id,
        bc.name AS column_name,
        bc.kind AS column_kind,
        bc.position AS column_position,
        (b.id IS NOT NULL) AS blocked,
        b.blocked_at,
        b.block_reason,
        (SELECT COUNT(*) FROM blocks sb WHERE sb.card_id = c.id) AS blocks_amount
    FROM cards c
    INNER JOIN boards_columns bc ON bc.id = c.board_column_id
    LEFT JOIN blocks b ON b.card_id = c.id AND b.unblocked_at IS NULL
    WHERE c.id = ?
"#;

/// A card with the column it sits in and whether it is blocked, read inside
/// the transaction that is about to change it.
struct CardState {
    card: Card,
    column: BoardColumn,
    blocked: bool,
}

pub struct CardService;

impl CardService {
    // ── Card CRUD ──────────────────────────────────────────────

    /// New cards always start in the board's initial column.
    pub async fn create_card(
        pool: &SqlitePool,
        board_id: i64,
        req: NewCard,
    ) -> Result<CardDetails, KanbanError> {
        let title = validation::card_title(&req.title)?;
        let description = validation::card_description(&req.description)?;

        BoardService::find_board(pool, board_id).await?;

        let initial: BoardColumn = sqlx::query_as(
            "SELECT id, board_id, name, kind, position FROM boards_columns WHERE board_id = ? AND kind = ?",
        )
        .bind(board_id)
        .bind(ColumnKind::Initial)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            KanbanError::NotFound(format!("Board {} has no initial column", board_id))
        })?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO cards (board_column_id, title, description, created_at, title_folded, description_folded) VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(initial.id)
        .bind(&title)
        .bind(&description)
        .bind(now_timestamp())
        .bind(search_key(&title))
        .bind(search_key(&description))
        .fetch_one(pool)
        .await?;

        tracing::info!(card_id = id, board_id, column = initial.name.as_str(), "Card created");

        Self::card_details(pool, id).await
    }

    pub async fn card_details(pool: &SqlitePool, id: i64) -> Result<CardDetails, KanbanError> {
        let card: CardDetails = sqlx::query_as(CARD_DETAILS_QUERY)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| KanbanError::NotFound(format!("Card not found: {}", id)))?;

        Ok(card)
    }

    pub async fn delete_card(pool: &SqlitePool, id: i64) -> Result<(), KanbanError> {
        let result = sqlx::query("DELETE FROM cards WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(KanbanError::NotFound(format!("Card not found: {}", id)));
        }

        tracing::info!(card_id = id, "Card deleted");
        Ok(())
    }

    // ── Movement ───────────────────────────────────────────────

    /// Advances the card to the next column of its board's normal flow.
    pub async fn move_to_next_column(pool: &SqlitePool, id: i64) -> Result<CardDetails, KanbanError> {
        let mut tx = pool.begin().await?;
        let state = Self::load_state(&mut tx, id).await?;
        Self::ensure_movable(&state)?;

        let columns = Self::board_columns(&mut tx, state.column.board_id).await?;
        let target = next_column(&columns, &state.column).ok_or_else(|| {
            KanbanError::InvalidTransition(format!(
                "Card {} has no column after '{}'",
                id, state.column.name
            ))
        })?;

        Self::apply_move(&mut tx, &state, target).await?;
        tx.commit().await?;

        Self::card_details(pool, id).await
    }

    /// Moves the card to an explicit column, subject to the transition rules.
    pub async fn move_card(
        pool: &SqlitePool,
        id: i64,
        target_column_id: i64,
    ) -> Result<CardDetails, KanbanError> {
        let mut tx = pool.begin().await?;
        let state = Self::load_state(&mut tx, id).await?;
        Self::ensure_movable(&state)?;

        let target: BoardColumn = sqlx::query_as(
            "SELECT id, board_id, name, kind, position FROM boards_columns WHERE id = ?",
        )
        .bind(target_column_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| KanbanError::NotFound(format!("Column not found: {}", target_column_id)))?;

        Self::apply_move(&mut tx, &state, &target).await?;
        tx.commit().await?;

        Self::card_details(pool, id).await
    }

    /// Sends the card to its board's cancel column.
    pub async fn cancel_card(pool: &SqlitePool, id: i64) -> Result<CardDetails, KanbanError> {
        let mut tx = pool.begin().await?;
        let state = Self::load_state(&mut tx, id).await?;
        Self::ensure_movable(&state)?;

        let columns = Self::board_columns(&mut tx, state.column.board_id).await?;
        let cancel = columns
            .iter()
            .find(|c| c.kind == ColumnKind::Cancel)
            .ok_or_else(|| {
                KanbanError::NotFound(format!(
                    "Board {} has no cancel column",
                    state.column.board_id
                ))
            })?;

        Self::apply_move(&mut tx, &state, cancel).await?;
        tx.commit().await?;

        Self::card_details(pool, id).await
    }

    // ── Blocking ───────────────────────────────────────────────

    pub async fn block_card(pool: &SqlitePool, id: i64, reason: &str) -> Result<CardDetails, KanbanError> {
        let reason = validation::reason(reason, "Block reason")?;

        let mut tx = pool.begin().await?;
        let state = Self::load_state(&mut tx, id).await?;

        if state.blocked {
            return Err(KanbanError::Validation(format!("Card {} is already blocked", id)));
        }
        if !state.column.kind.can_block() {
            return Err(KanbanError::InvalidTransition(format!(
                "Card {} is in the {} column '{}' and cannot be blocked",
                id, state.column.kind, state.column.name
            )));
        }

        sqlx::query(
            "INSERT INTO blocks (card_id, block_reason, blocked_at, block_reason_folded) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&reason)
        .bind(now_timestamp())
        .bind(search_key(&reason))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(card_id = id, reason = reason.as_str(), "Card blocked");
        Self::card_details(pool, id).await
    }

    pub async fn unblock_card(pool: &SqlitePool, id: i64, reason: &str) -> Result<CardDetails, KanbanError> {
        let reason = validation::reason(reason, "Unblock reason")?;

        let mut tx = pool.begin().await?;
        let state = Self::load_state(&mut tx, id).await?;

        if !state.blocked {
            return Err(KanbanError::Validation(format!("Card {} is not blocked", id)));
        }

        sqlx::query(
            "UPDATE blocks SET unblock_reason = ?, unblocked_at = ? WHERE card_id = ? AND unblocked_at IS NULL",
        )
        .bind(&reason)
        .bind(now_timestamp())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(card_id = id, reason = reason.as_str(), "Card unblocked");
        Self::card_details(pool, id).await
    }

    /// All blocks ever placed on the card, oldest first.
    pub async fn block_history(pool: &SqlitePool, id: i64) -> Result<Vec<Block>, KanbanError> {
        // Distinguish a missing card from a card that was never blocked.
        Self::card_details(pool, id).await?;

        let blocks: Vec<Block> = sqlx::query_as(
            "SELECT id, card_id, block_reason, blocked_at, unblock_reason, unblocked_at FROM blocks WHERE card_id = ? ORDER BY blocked_at ASC, id ASC",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        Ok(blocks)
    }

    // ── Helpers ────────────────────────────────────────────────

    async fn load_state(conn: &mut SqliteConnection, id: i64) -> Result<CardState, KanbanError> {
        let card: Card = sqlx::query_as(
            "SELECT id, board_column_id, title, description, created_at FROM cards WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| KanbanError::NotFound(format!("Card not found: {}", id)))?;

        let column: BoardColumn = sqlx::query_as(
            "SELECT id, board_id, name, kind, position FROM boards_columns WHERE id = ?",
        )
        .bind(card.board_column_id)
        .fetch_one(&mut *conn)
        .await?;

        let blocked: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM blocks WHERE card_id = ? AND unblocked_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(CardState {
            card,
            column,
            blocked,
        })
    }

    async fn board_columns(
        conn: &mut SqliteConnection,
        board_id: i64,
    ) -> Result<Vec<BoardColumn>, KanbanError> {
        let columns: Vec<BoardColumn> = sqlx::query_as(
            "SELECT id, board_id, name, kind, position FROM boards_columns WHERE board_id = ? ORDER BY position ASC",
        )
        .bind(board_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(columns)
    }

    fn ensure_movable(state: &CardState) -> Result<(), KanbanError> {
        if state.blocked {
            return Err(KanbanError::Blocked(format!(
                "card {} must be unblocked before it can move",
                state.card.id
            )));
        }

        match state.column.kind {
            ColumnKind::Final => Err(KanbanError::InvalidTransition(format!(
                "Card {} is already finished in '{}'",
                state.card.id, state.column.name
            ))),
            ColumnKind::Cancel => Err(KanbanError::InvalidTransition(format!(
                "Card {} is already cancelled in '{}'",
                state.card.id, state.column.name
            ))),
            ColumnKind::Initial | ColumnKind::Pending => Ok(()),
        }
    }

    async fn apply_move(
        conn: &mut SqliteConnection,
        state: &CardState,
        target: &BoardColumn,
    ) -> Result<(), KanbanError> {
        if !state.column.can_transition_to(target) {
            tracing::warn!(
                card_id = state.card.id,
                from = state.column.id,
                to = target.id,
                "Rejected card move"
            );
            return Err(KanbanError::InvalidTransition(
                state.column.transition_error(target),
            ));
        }

        sqlx::query("UPDATE cards SET board_column_id = ? WHERE id = ?")
            .bind(target.id)
            .bind(state.card.id)
            .execute(&mut *conn)
            .await?;

        tracing::info!(
            card_id = state.card.id,
            from_column = state.column.name.as_str(),
            to_column = target.name.as_str(),
            "Card moved"
        );

        Ok(())
    }
}
