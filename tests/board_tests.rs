mod common;

use task_board::domain::{ColumnKind, KanbanError};
use task_board::dto::NewBoard;
use task_board::services::{BoardService, CardService, ExportService};

#[tokio::test]
async fn test_create_board_lays_out_columns() {
    let db = common::setup_test_db().await;
    let board = common::create_board(&db.pool, "Release 1.0").await;

    assert_eq!(board.board.name, "Release 1.0");
    let layout: Vec<(&str, ColumnKind, i64)> = board
        .columns
        .iter()
        .map(|c| (c.column.name.as_str(), c.column.kind, c.column.position))
        .collect();
    assert_eq!(
        layout,
        vec![
            ("To do", ColumnKind::Initial, 0),
            ("Doing", ColumnKind::Pending, 1),
            ("Review", ColumnKind::Pending, 2),
            ("Done", ColumnKind::Final, 3),
            ("Cancelled", ColumnKind::Cancel, 4),
        ]
    );
    assert_eq!(board.total_cards(), 0);
}

#[tokio::test]
async fn test_create_board_without_pending_columns() {
    let db = common::setup_test_db().await;
    let board = BoardService::create_board(&db.pool, NewBoard::new("Chores"))
        .await
        .unwrap();

    let positions: Vec<i64> = board.columns.iter().map(|c| c.column.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
    assert_eq!(board.columns[1].column.kind, ColumnKind::Final);
}

#[tokio::test]
async fn test_create_board_rejects_invalid_input() {
    let db = common::setup_test_db().await;

    let short_name = BoardService::create_board(&db.pool, NewBoard::new("x")).await;
    assert!(matches!(short_name, Err(KanbanError::Validation(_))));

    let duplicate = BoardService::create_board(
        &db.pool,
        NewBoard::new("Duplicates").with_pending(["Doing", "done"]),
    )
    .await;
    assert!(matches!(duplicate, Err(KanbanError::Validation(_))));

    let too_many = BoardService::create_board(
        &db.pool,
        NewBoard::new("Huge").with_pending((1..=11).map(|i| format!("Step {}", i))),
    )
    .await;
    assert!(matches!(too_many, Err(KanbanError::Validation(_))));

    // Nothing is persisted when validation fails.
    assert!(BoardService::list_boards(&db.pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_boards_counts_columns_and_cards() {
    let db = common::setup_test_db().await;
    let first = common::create_board(&db.pool, "First").await;
    common::create_board(&db.pool, "Second").await;
    common::create_card(&db.pool, first.board.id, "Write docs").await;
    common::create_card(&db.pool, first.board.id, "Fix login").await;

    let boards = BoardService::list_boards(&db.pool).await.unwrap();
    assert_eq!(boards.len(), 2);
    assert_eq!(boards[0].name, "First");
    assert_eq!(boards[0].column_count, 5);
    assert_eq!(boards[0].card_count, 2);
    assert_eq!(boards[1].card_count, 0);
}

#[tokio::test]
async fn test_unknown_board_and_column_are_not_found() {
    let db = common::setup_test_db().await;

    assert!(matches!(
        BoardService::board_details(&db.pool, 42).await,
        Err(KanbanError::NotFound(_))
    ));
    assert!(matches!(
        BoardService::column_details(&db.pool, 42).await,
        Err(KanbanError::NotFound(_))
    ));
    assert!(matches!(
        BoardService::delete_board(&db.pool, 42).await,
        Err(KanbanError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_column_details_lists_cards_with_block_state() {
    let db = common::setup_test_db().await;
    let board = common::create_board(&db.pool, "Team").await;
    let a = common::create_card(&db.pool, board.board.id, "Card A").await;
    common::create_card(&db.pool, board.board.id, "Card B").await;
    CardService::block_card(&db.pool, a.id, "waiting on vendor")
        .await
        .unwrap();

    let column = BoardService::column_details(&db.pool, common::column_id(&board, "To do"))
        .await
        .unwrap();
    assert_eq!(column.cards.len(), 2);
    assert!(column.cards[0].blocked);
    assert!(!column.cards[1].blocked);
}

#[tokio::test]
async fn test_delete_board_cascades() {
    let db = common::setup_test_db().await;
    let board = common::create_board(&db.pool, "Doomed").await;
    let card = common::create_card(&db.pool, board.board.id, "Orphan?").await;
    CardService::block_card(&db.pool, card.id, "about to be deleted")
        .await
        .unwrap();

    BoardService::delete_board(&db.pool, board.board.id).await.unwrap();

    for table in ["boards", "boards_columns", "cards", "blocks"] {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 0, "{} should be empty", table);
    }
}

#[tokio::test]
async fn test_export_includes_cards_and_block_history() {
    let db = common::setup_test_db().await;
    let board = common::create_board(&db.pool, "Exported").await;
    let card = common::create_card(&db.pool, board.board.id, "Blocked once").await;
    common::create_card(&db.pool, board.board.id, "Never blocked").await;
    CardService::block_card(&db.pool, card.id, "waiting on design")
        .await
        .unwrap();
    CardService::unblock_card(&db.pool, card.id, "design delivered")
        .await
        .unwrap();

    let export = ExportService::export_board(&db.pool, board.board.id)
        .await
        .unwrap();
    assert_eq!(export.format_version, 1);
    assert_eq!(export.columns.len(), 5);
    assert_eq!(export.cards.len(), 2);
    assert_eq!(export.cards[0].blocks.len(), 1);
    assert_eq!(
        export.cards[0].blocks[0].unblock_reason.as_deref(),
        Some("design delivered")
    );
    assert!(export.cards[1].blocks.is_empty());

    let json: serde_json::Value =
        serde_json::from_str(&ExportService::to_json(&export).unwrap()).unwrap();
    assert_eq!(json["board"]["name"], "Exported");
    assert_eq!(json["cards"][0]["title"], "Blocked once");
    assert_eq!(json["columns"][0]["kind"], "initial");
}

#[tokio::test]
async fn test_export_writes_file() {
    let db = common::setup_test_db().await;
    let board = common::create_board(&db.pool, "To file").await;
    let export = ExportService::export_board(&db.pool, board.board.id)
        .await
        .unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("board.json");
    ExportService::write_to_file(&export, &path).await.unwrap();

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["board"]["id"], board.board.id);
}
