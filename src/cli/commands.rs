use sqlx::SqlitePool;

use crate::cli::{
    render, BoardCommand, CardCommand, ColumnCommand, Commands, DbCommand, ReportCommand,
    SearchArgs,
};
use crate::domain::KanbanError;
use crate::dto::{NewBoard, NewCard};
use crate::infrastructure::db;
use crate::services::{
    BoardService, CardSearchCriteria, CardSearchService, CardService, ExportService,
    MetricsCollector, ReportService,
};

/// Runs one command against the database and prints its result to stdout.
pub async fn run(command: Commands, pool: &SqlitePool) -> Result<(), KanbanError> {
    let metrics = MetricsCollector::new(pool.clone());

    match command {
        Commands::Board { command } => run_board(command, pool, &metrics).await,
        Commands::Column { command } => run_column(command, pool, &metrics).await,
        Commands::Card { command } => run_card(command, pool, &metrics).await,
        Commands::Search(args) => run_search(args, pool, &metrics).await,
        Commands::Report { command } => run_report(command, pool, &metrics).await,
        Commands::Metrics { clear, json } => {
            if clear {
                let removed = metrics.clear().await?;
                println!("Cleared {} recorded operation(s).", removed);
                return Ok(());
            }
            render::metrics_report(&metrics.report().await?, json)
        }
        Commands::Db { command } => match command {
            DbCommand::Status { json } => render::database_status(&db::status(pool).await?, json),
        },
    }
}

async fn run_board(
    command: BoardCommand,
    pool: &SqlitePool,
    metrics: &MetricsCollector,
) -> Result<(), KanbanError> {
    match command {
        BoardCommand::Create {
            name,
            initial,
            pending,
            final_column,
            cancel,
        } => {
            let mut req = NewBoard::new(name).with_pending(pending);
            if let Some(initial) = initial {
                req.initial_column = initial;
            }
            if let Some(final_column) = final_column {
                req.final_column = final_column;
            }
            if let Some(cancel) = cancel {
                req.cancel_column = cancel;
            }

            let board = metrics
                .measure("board create", BoardService::create_board(pool, req))
                .await?;
            println!("Created board {} ({}).", board.board.id, board.board.name);
            render::board_details(&board, false)
        }
        BoardCommand::List { json } => {
            let boards = metrics
                .measure("board list", BoardService::list_boards(pool))
                .await?;
            render::board_list(&boards, json)
        }
        BoardCommand::Show { board_id, json } => {
            let board = metrics
                .measure("board show", BoardService::board_details(pool, board_id))
                .await?;
            render::board_details(&board, json)
        }
        BoardCommand::Delete { board_id, yes } => {
            if !yes {
                return Err(KanbanError::Validation(format!(
                    "refusing to delete board {} without --yes",
                    board_id
                )));
            }
            metrics
                .measure("board delete", BoardService::delete_board(pool, board_id))
                .await?;
            println!("Deleted board {}.", board_id);
            Ok(())
        }
        BoardCommand::Export { board_id, output } => {
            let export = metrics
                .measure("board export", ExportService::export_board(pool, board_id))
                .await?;
            match output {
                Some(path) => {
                    ExportService::write_to_file(&export, &path).await?;
                    println!(
                        "Exported board {} with {} card(s) to {}.",
                        board_id,
                        export.cards.len(),
                        path.display()
                    );
                }
                None => println!("{}", ExportService::to_json(&export)?),
            }
            Ok(())
        }
    }
}

async fn run_column(
    command: ColumnCommand,
    pool: &SqlitePool,
    metrics: &MetricsCollector,
) -> Result<(), KanbanError> {
    match command {
        ColumnCommand::Show { column_id, json } => {
            let column = metrics
                .measure("column show", BoardService::column_details(pool, column_id))
                .await?;
            render::column_details(&column, json)
        }
    }
}

async fn run_card(
    command: CardCommand,
    pool: &SqlitePool,
    metrics: &MetricsCollector,
) -> Result<(), KanbanError> {
    match command {
        CardCommand::Create {
            board_id,
            title,
            description,
        } => {
            let req = NewCard { title, description };
            let card = metrics
                .measure("card create", CardService::create_card(pool, board_id, req))
                .await?;
            println!("Created card {} in '{}'.", card.id, card.column_name);
            Ok(())
        }
        CardCommand::Show { card_id, json } => {
            let card = metrics
                .measure("card show", CardService::card_details(pool, card_id))
                .await?;
            render::card_details(&card, json)
        }
        CardCommand::Move { card_id, to } => {
            let card = match to {
                Some(column_id) => {
                    metrics
                        .measure("card move", CardService::move_card(pool, card_id, column_id))
                        .await?
                }
                None => {
                    metrics
                        .measure("card move", CardService::move_to_next_column(pool, card_id))
                        .await?
                }
            };
            println!("Moved card {} to '{}'.", card.id, card.column_name);
            Ok(())
        }
        CardCommand::Cancel { card_id } => {
            let card = metrics
                .measure("card cancel", CardService::cancel_card(pool, card_id))
                .await?;
            println!("Cancelled card {} ('{}').", card.id, card.column_name);
            Ok(())
        }
        CardCommand::Block { card_id, reason } => {
            let card = metrics
                .measure("card block", CardService::block_card(pool, card_id, &reason))
                .await?;
            println!("Blocked card {}.", card.id);
            Ok(())
        }
        CardCommand::Unblock { card_id, reason } => {
            let card = metrics
                .measure("card unblock", CardService::unblock_card(pool, card_id, &reason))
                .await?;
            println!("Unblocked card {}.", card.id);
            Ok(())
        }
        CardCommand::History { card_id, json } => {
            let blocks = metrics
                .measure("card history", CardService::block_history(pool, card_id))
                .await?;
            render::block_history(card_id, &blocks, json)
        }
        CardCommand::Delete { card_id } => {
            metrics
                .measure("card delete", CardService::delete_card(pool, card_id))
                .await?;
            println!("Deleted card {}.", card_id);
            Ok(())
        }
    }
}

/// Maps command-line search flags onto search criteria.
pub fn search_criteria(args: &SearchArgs) -> CardSearchCriteria {
    let mut criteria = CardSearchCriteria {
        title_contains: args.title.clone(),
        description_contains: args.description.clone(),
        text: args.text.clone(),
        board_ids: args.boards.clone(),
        column_ids: args.columns.clone(),
        created_after: args.created_after,
        created_before: args.created_before,
        block_reason_contains: args.block_reason.clone(),
        ..CardSearchCriteria::default()
    }
    .page(args.limit, args.offset);

    if args.blocked {
        criteria = criteria.blocked(true);
    } else if args.unblocked {
        criteria = criteria.blocked(false);
    }
    criteria
}

async fn run_search(
    args: SearchArgs,
    pool: &SqlitePool,
    metrics: &MetricsCollector,
) -> Result<(), KanbanError> {
    let criteria = search_criteria(&args);
    let result = metrics
        .measure("card search", CardSearchService::search(pool, &criteria))
        .await?;
    render::search_result(&result, args.json)
}

async fn run_report(
    command: ReportCommand,
    pool: &SqlitePool,
    metrics: &MetricsCollector,
) -> Result<(), KanbanError> {
    match command {
        ReportCommand::Productivity { board_id, json } => {
            let report = metrics
                .measure(
                    "report productivity",
                    ReportService::board_productivity(pool, board_id),
                )
                .await?;
            render::productivity_report(&report, json)
        }
        ReportCommand::Stale { days, json } => {
            let report = metrics
                .measure("report stale", ReportService::stale_cards(pool, days))
                .await?;
            render::stale_cards_report(&report, json)
        }
    }
}
