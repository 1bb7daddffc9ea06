#![allow(dead_code)]

use sqlx::SqlitePool;
use tempfile::TempDir;

use task_board::dto::{BoardDetails, CardDetails, NewBoard, NewCard};
use task_board::infrastructure::db;
use task_board::services::{BoardService, CardService};

/// A migrated database in a temporary directory. Keep the struct alive for
/// as long as the pool is used.
pub struct TestDb {
    pub pool: SqlitePool,
    pub url: String,
    _dir: TempDir,
}

pub async fn setup_test_db() -> TestDb {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let url = format!("sqlite://{}", dir.path().join("board.db").display());
    let pool = db::init_db(&url, 5)
        .await
        .expect("Failed to create test database");

    TestDb {
        pool,
        url,
        _dir: dir,
    }
}

/// Board with columns: To do(0) → Doing(1) → Review(2) → Done(3), Cancelled(4).
pub async fn create_board(pool: &SqlitePool, name: &str) -> BoardDetails {
    BoardService::create_board(pool, NewBoard::new(name).with_pending(["Doing", "Review"]))
        .await
        .expect("Failed to create board")
}

pub async fn create_card(pool: &SqlitePool, board_id: i64, title: &str) -> CardDetails {
    CardService::create_card(
        pool,
        board_id,
        NewCard {
            title: title.to_string(),
            description: format!("Description of {}", title),
        },
    )
    .await
    .expect("Failed to create card")
}

/// Column id by name on a board created with [`create_board`].
pub fn column_id(board: &BoardDetails, name: &str) -> i64 {
    board
        .columns
        .iter()
        .find(|c| c.column.name == name)
        .map(|c| c.column.id)
        .unwrap_or_else(|| panic!("no column named {}", name))
}

/// Backdates a card so date filters and the stale report can see it.
pub async fn set_created_at(pool: &SqlitePool, card_id: i64, created_at: &str) {
    sqlx::query("UPDATE cards SET created_at = ? WHERE id = ?")
        .bind(created_at)
        .bind(card_id)
        .execute(pool)
        .await
        .expect("Failed to backdate card");
}
