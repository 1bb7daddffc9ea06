use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::domain::{validation, ColumnKind, KanbanError};
use crate::dto::CardSummary;
use crate::services::search::{CardSearchCriteria, CardSearchService};
use crate::services::BoardService;

pub const STALE_REPORT_LIMIT: i64 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct ColumnCount {
    pub column_id: i64,
    pub name: String,
    pub kind: ColumnKind,
    pub cards: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductivityReport {
    pub board_id: i64,
    pub board_name: String,
    pub total_cards: i64,
    pub blocked_cards: i64,
    pub cards_by_column: Vec<ColumnCount>,
    pub generated_at: DateTime<Utc>,
}

fn percentage(part: i64, total: i64) -> Option<f64> {
    (total > 0).then(|| part as f64 / total as f64 * 100.0)
}

impl ProductivityReport {
    /// `None` when the board has no cards.
    pub fn blocked_percentage(&self) -> Option<f64> {
        percentage(self.blocked_cards, self.total_cards)
    }

    pub fn column_percentage(&self, column: &ColumnCount) -> Option<f64> {
        percentage(column.cards, self.total_cards)
    }

    /// Cards that reached the final column.
    pub fn finished_cards(&self) -> i64 {
        self.cards_by_column
            .iter()
            .filter(|c| c.kind == ColumnKind::Final)
            .map(|c| c.cards)
            .sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StaleCardsReport {
    pub days_threshold: i64,
    pub threshold: DateTime<Utc>,
    pub cards: Vec<CardSummary>,
    pub generated_at: DateTime<Utc>,
}

pub struct ReportService;

impl ReportService {
    pub async fn board_productivity(
        pool: &SqlitePool,
        board_id: i64,
    ) -> Result<ProductivityReport, KanbanError> {
        tracing::info!(board_id, "Generating productivity report");

        let details = BoardService::board_details(pool, board_id).await?;

        let cards_by_column = details
            .columns
            .iter()
            .map(|c| ColumnCount {
                column_id: c.column.id,
                name: c.column.name.clone(),
                kind: c.column.kind,
                cards: c.card_count,
            })
            .collect();

        let blocked = CardSearchCriteria::default().board(board_id).blocked(true);
        let blocked_cards = CardSearchService::count(pool, &blocked).await?;

        Ok(ProductivityReport {
            board_id,
            board_name: details.board.name.clone(),
            total_cards: details.total_cards(),
            blocked_cards,
            cards_by_column,
            generated_at: Utc::now(),
        })
    }

    /// Cards created strictly before `now - days`, newest first, capped at
    /// [`STALE_REPORT_LIMIT`].
    pub async fn stale_cards(pool: &SqlitePool, days: i64) -> Result<StaleCardsReport, KanbanError> {
        let days = validation::require_range(days, validation::STALE_DAYS, "Days")?;
        tracing::info!(days, "Generating stale cards report");

        let now = Utc::now();
        let threshold = now - Duration::days(days);

        let criteria = CardSearchCriteria::default()
            .older_than(threshold)
            .page(STALE_REPORT_LIMIT, 0);
        let cards = CardSearchService::find(pool, &criteria).await?;

        Ok(StaleCardsReport {
            days_threshold: days,
            threshold,
            cards,
            generated_at: now,
        })
    }
}
