mod common;

use chrono::{Duration, TimeZone, Utc};

use task_board::domain::KanbanError;
use task_board::services::{CardSearchCriteria, CardSearchService, CardService, ReportService};

struct Fixture {
    db: common::TestDb,
    board_a: i64,
    board_b: i64,
    doing_a: i64,
}

/// Board A: "Fix login bug" (blocked, in Doing), "Write release notes", "Login page copy"
/// Board B: "Fix 50% discount" (description mentions login)
async fn fixture() -> Fixture {
    let db = common::setup_test_db().await;
    let a = common::create_board(&db.pool, "Board A").await;
    let b = common::create_board(&db.pool, "Board B").await;

    let bug = common::create_card(&db.pool, a.board.id, "Fix login bug").await;
    CardService::move_to_next_column(&db.pool, bug.id).await.unwrap();
    CardService::block_card(&db.pool, bug.id, "waiting on vendor fix")
        .await
        .unwrap();
    common::create_card(&db.pool, a.board.id, "Write release notes").await;
    common::create_card(&db.pool, a.board.id, "Login page copy").await;

    CardService::create_card(
        &db.pool,
        b.board.id,
        task_board::dto::NewCard {
            title: "Fix 50% discount".into(),
            description: "Applies twice after login".into(),
        },
    )
    .await
    .unwrap();

    Fixture {
        board_a: a.board.id,
        board_b: b.board.id,
        doing_a: common::column_id(&a, "Doing"),
        db,
    }
}

fn titles(cards: &[task_board::dto::CardSummary]) -> Vec<&str> {
    cards.iter().map(|c| c.title.as_str()).collect()
}

#[tokio::test]
async fn test_search_without_filters_returns_newest_first() {
    let f = fixture().await;
    let result = CardSearchService::search(&f.db.pool, &CardSearchCriteria::default())
        .await
        .unwrap();

    assert_eq!(result.total_count, 4);
    assert_eq!(
        titles(&result.items),
        vec!["Fix 50% discount", "Login page copy", "Write release notes", "Fix login bug"]
    );
    assert!(!result.has_next);
    assert!(!result.has_previous);
}

#[tokio::test]
async fn test_title_filter_is_case_insensitive_substring() {
    let f = fixture().await;
    let criteria = CardSearchCriteria::default().title_contains("LOGIN");
    let result = CardSearchService::search(&f.db.pool, &criteria).await.unwrap();

    assert_eq!(titles(&result.items), vec!["Login page copy", "Fix login bug"]);
}

#[tokio::test]
async fn test_text_filter_matches_title_or_description() {
    let f = fixture().await;
    let criteria = CardSearchCriteria::default().text("login");
    let result = CardSearchService::search(&f.db.pool, &criteria).await.unwrap();

    assert_eq!(result.total_count, 3);
    assert!(titles(&result.items).contains(&"Fix 50% discount"));
}

#[tokio::test]
async fn test_like_wildcards_are_literal() {
    let f = fixture().await;
    let criteria = CardSearchCriteria::default().title_contains("50%");
    let result = CardSearchService::search(&f.db.pool, &criteria).await.unwrap();
    assert_eq!(titles(&result.items), vec!["Fix 50% discount"]);

    let underscore = CardSearchCriteria::default().title_contains("_");
    assert_eq!(CardSearchService::count(&f.db.pool, &underscore).await.unwrap(), 0);
}

#[tokio::test]
async fn test_board_column_and_block_filters_combine() {
    let f = fixture().await;

    let on_b = CardSearchCriteria::default().board(f.board_b);
    assert_eq!(CardSearchService::count(&f.db.pool, &on_b).await.unwrap(), 1);

    let both = CardSearchCriteria::default().board(f.board_a).board(f.board_b);
    assert_eq!(CardSearchService::count(&f.db.pool, &both).await.unwrap(), 4);

    let in_doing = CardSearchCriteria::default().column(f.doing_a);
    let result = CardSearchService::search(&f.db.pool, &in_doing).await.unwrap();
    assert_eq!(titles(&result.items), vec!["Fix login bug"]);

    let blocked = CardSearchCriteria::default().blocked(true);
    let result = CardSearchService::search(&f.db.pool, &blocked).await.unwrap();
    assert_eq!(titles(&result.items), vec!["Fix login bug"]);
    assert!(result.items[0].blocked);
    assert_eq!(result.items[0].block_reason.as_deref(), Some("waiting on vendor fix"));

    let unblocked_on_a = CardSearchCriteria::default().board(f.board_a).blocked(false);
    assert_eq!(CardSearchService::count(&f.db.pool, &unblocked_on_a).await.unwrap(), 2);

    let by_reason = CardSearchCriteria::default().block_reason_contains("vendor");
    assert_eq!(CardSearchService::count(&f.db.pool, &by_reason).await.unwrap(), 1);

    let nothing = CardSearchCriteria::default().board(f.board_b).blocked(true);
    let result = CardSearchService::search(&f.db.pool, &nothing).await.unwrap();
    assert!(result.is_empty());
    assert_eq!(result.total_count, 0);
}

#[tokio::test]
async fn test_pagination() {
    let f = fixture().await;

    let first = CardSearchService::search(&f.db.pool, &CardSearchCriteria::default().page(3, 0))
        .await
        .unwrap();
    assert_eq!(first.items.len(), 3);
    assert_eq!(first.total_count, 4);
    assert!(first.has_next);
    assert!(!first.has_previous);
    assert_eq!(first.total_pages(), 2);

    let second = CardSearchService::search(&f.db.pool, &CardSearchCriteria::default().page(3, 3))
        .await
        .unwrap();
    assert_eq!(titles(&second.items), vec!["Fix login bug"]);
    assert_eq!(second.current_page, 1);
    assert!(!second.has_next);
    assert!(second.has_previous);

    let beyond = CardSearchService::search(&f.db.pool, &CardSearchCriteria::default().page(3, 30))
        .await
        .unwrap();
    assert!(beyond.is_empty());
    assert_eq!(beyond.total_count, 4);
}

#[tokio::test]
async fn test_invalid_criteria_are_rejected() {
    let f = fixture().await;
    let result =
        CardSearchService::search(&f.db.pool, &CardSearchCriteria::default().page(501, 0)).await;
    assert!(matches!(result, Err(KanbanError::Validation(_))));
}

#[tokio::test]
async fn test_date_filters_and_stale_report() {
    let f = fixture().await;
    let old = common::create_card(&f.db.pool, f.board_a, "Ancient card").await;
    common::set_created_at(&f.db.pool, old.id, "2020-01-15T09:30:00.000Z").await;

    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2020, 1, 31, 23, 59, 59).unwrap();

    let in_january = CardSearchCriteria::default()
        .created_after(start)
        .created_before(end);
    let result = CardSearchService::search(&f.db.pool, &in_january).await.unwrap();
    assert_eq!(titles(&result.items), vec!["Ancient card"]);

    let recent = CardSearchCriteria::default().created_after(Utc::now() - Duration::days(1));
    assert_eq!(CardSearchService::count(&f.db.pool, &recent).await.unwrap(), 4);

    let stale = ReportService::stale_cards(&f.db.pool, 30).await.unwrap();
    assert_eq!(stale.days_threshold, 30);
    assert_eq!(titles(&stale.cards), vec!["Ancient card"]);

    assert!(matches!(
        ReportService::stale_cards(&f.db.pool, -1).await,
        Err(KanbanError::Validation(_))
    ));
}

#[tokio::test]
async fn test_productivity_report() {
    let f = fixture().await;
    let report = ReportService::board_productivity(&f.db.pool, f.board_a)
        .await
        .unwrap();

    assert_eq!(report.board_name, "Board A");
    assert_eq!(report.total_cards, 3);
    assert_eq!(report.blocked_cards, 1);
    let counts: Vec<(&str, i64)> = report
        .cards_by_column
        .iter()
        .map(|c| (c.name.as_str(), c.cards))
        .collect();
    assert_eq!(
        counts,
        vec![("To do", 2), ("Doing", 1), ("Review", 0), ("Done", 0), ("Cancelled", 0)]
    );
    assert_eq!(report.finished_cards(), 0);
    let share = report.blocked_percentage().unwrap();
    assert!((share - 100.0 / 3.0).abs() < 1e-9);

    assert!(matches!(
        ReportService::board_productivity(&f.db.pool, 999).await,
        Err(KanbanError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_offset_at_the_end_of_the_range_returns_an_empty_page() {
    let f = fixture().await;
    let criteria = CardSearchCriteria::default().page(50, i64::MAX);
    let result = CardSearchService::search(&f.db.pool, &criteria).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.total_count, 4);
    assert!(!result.has_next);
    assert!(result.has_previous);
}

#[tokio::test]
async fn test_text_filters_ignore_case_beyond_ascii() {
    let f = fixture().await;
    let card = CardService::create_card(
        &f.db.pool,
        f.board_a,
        task_board::dto::NewCard {
            title: "Revisão técnica".into(),
            description: "Conferir a DOCUMENTAÇÃO da API".into(),
        },
    )
    .await
    .unwrap();
    CardService::block_card(&f.db.pool, card.id, "Aguardando APROVAÇÃO")
        .await
        .unwrap();

    for needle in ["revisão", "REVISÃO", "Revisão Técnica"] {
        let criteria = CardSearchCriteria::default().title_contains(needle);
        assert_eq!(
            CardSearchService::count(&f.db.pool, &criteria).await.unwrap(),
            1,
            "title_contains({})",
            needle
        );
    }

    let description = CardSearchCriteria::default().description_contains("documentação");
    assert_eq!(CardSearchService::count(&f.db.pool, &description).await.unwrap(), 1);

    let text = CardSearchCriteria::default().text("TÉCNICA");
    let result = CardSearchService::search(&f.db.pool, &text).await.unwrap();
    assert_eq!(titles(&result.items), vec!["Revisão técnica"]);

    let reason = CardSearchCriteria::default().block_reason_contains("aprovação");
    assert_eq!(CardSearchService::count(&f.db.pool, &reason).await.unwrap(), 1);
}

#[tokio::test]
async fn test_older_than_excludes_cards_created_at_the_bound() {
    let f = fixture().await;
    let card = common::create_card(&f.db.pool, f.board_a, "On the boundary").await;
    common::set_created_at(&f.db.pool, card.id, "2021-06-01T12:00:00.000Z").await;
    let bound = Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap();

    let inclusive = CardSearchCriteria::default().created_before(bound);
    let result = CardSearchService::search(&f.db.pool, &inclusive).await.unwrap();
    assert_eq!(titles(&result.items), vec!["On the boundary"]);

    let exclusive = CardSearchCriteria::default().older_than(bound);
    assert_eq!(CardSearchService::count(&f.db.pool, &exclusive).await.unwrap(), 0);

    let later = CardSearchCriteria::default().older_than(bound + Duration::milliseconds(1));
    assert_eq!(CardSearchService::count(&f.db.pool, &later).await.unwrap(), 1);
}
