//! Console output for command results. Tables go to stdout; `--json`
//! prints the value as pretty JSON instead.

use comfy_table::{presets::UTF8_FULL, Row, Table};
use serde::Serialize;

use crate::domain::{Block, KanbanError};
use crate::dto::{BoardDetails, BoardSummary, CardDetails, CardSummary, ColumnDetails};
use crate::infrastructure::db::DatabaseStatus;
use crate::services::{MetricsReport, ProductivityReport, SearchResult, StaleCardsReport};

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), KanbanError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn table(header: impl Into<Row>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(header);
    table
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".into(), |p| format!("{:.1}%", p))
}

pub fn board_list(boards: &[BoardSummary], json: bool) -> Result<(), KanbanError> {
    if json {
        return print_json(boards);
    }

    if boards.is_empty() {
        println!("No boards yet. Create one with `task-board board create --name <NAME>`.");
        return Ok(());
    }

    let mut t = table(["Id", "Name", "Columns", "Cards", "Created"]);
    for board in boards {
        t.add_row(vec![
            board.id.to_string(),
            board.name.clone(),
            board.column_count.to_string(),
            board.card_count.to_string(),
            board.created_at.clone(),
        ]);
    }
    println!("{t}");
    println!("\n{} board(s).", boards.len());
    Ok(())
}

pub fn board_details(board: &BoardDetails, json: bool) -> Result<(), KanbanError> {
    if json {
        return print_json(board);
    }

    println!("Board {}: {}", board.board.id, board.board.name);
    println!("Created: {}", board.board.created_at);
    println!();

    let mut t = table(["Position", "Id", "Column", "Kind", "Cards"]);
    for c in &board.columns {
        t.add_row(vec![
            c.column.position.to_string(),
            c.column.id.to_string(),
            c.column.name.clone(),
            c.column.kind.to_string(),
            c.card_count.to_string(),
        ]);
    }
    println!("{t}");
    println!("\n{} card(s) in total.", board.total_cards());
    Ok(())
}

pub fn column_details(column: &ColumnDetails, json: bool) -> Result<(), KanbanError> {
    if json {
        return print_json(column);
    }

    println!(
        "Column {}: {} ({}, position {}, board {})",
        column.column.id,
        column.column.name,
        column.column.kind,
        column.column.position,
        column.column.board_id
    );

    if column.cards.is_empty() {
        println!("No cards.");
        return Ok(());
    }

    let mut t = table(["Id", "Title", "Blocked", "Created"]);
    for card in &column.cards {
        t.add_row(vec![
            card.id.to_string(),
            card.title.clone(),
            yes_no(card.blocked).to_string(),
            card.created_at.clone(),
        ]);
    }
    println!("{t}");
    Ok(())
}

pub fn card_details(card: &CardDetails, json: bool) -> Result<(), KanbanError> {
    if json {
        return print_json(card);
    }

    println!("Card {}: {}", card.id, card.title);
    println!("Description: {}", card.description);
    println!("Created:     {}", card.created_at);
    println!(
        "Column:      {} ({}, id {}, board {})",
        card.column_name, card.column_kind, card.column_id, card.board_id
    );
    match (&card.blocked_at, &card.block_reason) {
        (Some(at), Some(reason)) if card.blocked => {
            println!("Blocked:     since {}: {}", at, reason)
        }
        _ => println!("Blocked:     no"),
    }
    println!("Times blocked: {}", card.blocks_amount);
    Ok(())
}

pub fn block_history(card_id: i64, blocks: &[Block], json: bool) -> Result<(), KanbanError> {
    if json {
        return print_json(blocks);
    }

    if blocks.is_empty() {
        println!("Card {} has never been blocked.", card_id);
        return Ok(());
    }

    let mut t = table(["Blocked at", "Reason", "Unblocked at", "Unblock reason"]);
    for block in blocks {
        t.add_row(vec![
            block.blocked_at.clone(),
            block.block_reason.clone(),
            block.unblocked_at.clone().unwrap_or_else(|| "(open)".into()),
            block.unblock_reason.clone().unwrap_or_default(),
        ]);
    }
    println!("{t}");
    Ok(())
}

fn card_table(cards: &[CardSummary]) -> Table {
    let mut t = table(["Id", "Title", "Board", "Column", "Kind", "Blocked", "Created"]);
    for card in cards {
        t.add_row(vec![
            card.id.to_string(),
            card.title.clone(),
            card.board_id.to_string(),
            card.column_name.clone(),
            card.column_kind.to_string(),
            card.block_reason
                .clone()
                .filter(|_| card.blocked)
                .unwrap_or_else(|| "no".into()),
            card.created_at.clone(),
        ]);
    }
    t
}

pub fn search_result(result: &SearchResult<CardSummary>, json: bool) -> Result<(), KanbanError> {
    if json {
        return print_json(result);
    }

    if result.is_empty() {
        println!("No cards match ({} in total).", result.total_count);
        return Ok(());
    }

    println!("{}", card_table(&result.items));
    println!(
        "\nPage {} of {} ({} card(s) in total){}{}",
        result.current_page + 1,
        result.total_pages(),
        result.total_count,
        if result.has_previous { ", previous page available" } else { "" },
        if result.has_next { ", next page available" } else { "" },
    );
    Ok(())
}

pub fn productivity_report(report: &ProductivityReport, json: bool) -> Result<(), KanbanError> {
    if json {
        return print_json(report);
    }

    println!("Productivity report for board {}: {}", report.board_id, report.board_name);
    println!("Generated: {}", report.generated_at.to_rfc3339());
    println!();
    println!("Total cards:    {}", report.total_cards);
    println!(
        "Blocked cards:  {} ({})",
        report.blocked_cards,
        percent(report.blocked_percentage())
    );
    println!("Finished cards: {}", report.finished_cards());
    println!();

    let mut t = table(["Column", "Kind", "Cards", "Share"]);
    for column in &report.cards_by_column {
        t.add_row(vec![
            column.name.clone(),
            column.kind.to_string(),
            column.cards.to_string(),
            percent(report.column_percentage(column)),
        ]);
    }
    println!("{t}");
    Ok(())
}

pub fn stale_cards_report(report: &StaleCardsReport, json: bool) -> Result<(), KanbanError> {
    if json {
        return print_json(report);
    }

    println!(
        "Cards created more than {} day(s) ago (before {})",
        report.days_threshold,
        report.threshold.to_rfc3339()
    );

    if report.cards.is_empty() {
        println!("None.");
        return Ok(());
    }

    println!("{}", card_table(&report.cards));
    println!("\n{} card(s).", report.cards.len());
    Ok(())
}

pub fn metrics_report(report: &MetricsReport, json: bool) -> Result<(), KanbanError> {
    if json {
        return print_json(report);
    }

    if report.total_operations == 0 {
        println!("No operations recorded.");
        return Ok(());
    }

    println!("Operations: {} ({} failed)", report.total_operations, report.failed_operations);
    println!(
        "Duration:   avg {:.1}ms, min {}ms, max {}ms",
        report.average_ms, report.min_ms, report.max_ms
    );
    println!();

    let mut t = table(["Operation", "Count", "Avg (ms)", "Min (ms)", "Max (ms)"]);
    for op in &report.operations {
        t.add_row(vec![
            op.operation.clone(),
            op.count.to_string(),
            format!("{:.1}", op.average_ms),
            op.min_ms.to_string(),
            op.max_ms.to_string(),
        ]);
    }
    println!("{t}");

    println!("\nSlowest operations:");
    let mut t = table(["Operation", "Duration (ms)", "Recorded", "Details"]);
    for metric in &report.slowest {
        t.add_row(vec![
            metric.operation.clone(),
            metric.duration_ms.to_string(),
            metric.recorded_at.clone(),
            metric.details.clone(),
        ]);
    }
    println!("{t}");
    Ok(())
}

pub fn database_status(status: &DatabaseStatus, json: bool) -> Result<(), KanbanError> {
    if json {
        return print_json(status);
    }

    println!("Journal mode: {}", status.journal_mode);
    println!("Tables:       {}", status.tables.join(", "));
    println!();

    let mut t = table(["Version", "Description", "Installed", "Success"]);
    for m in &status.migrations {
        t.add_row(vec![
            m.version.to_string(),
            m.description.clone(),
            m.installed_on.clone(),
            yes_no(m.success).to_string(),
        ]);
    }
    println!("{t}");

    if !status.pending_migrations.is_empty() {
        let pending: Vec<String> = status.pending_migrations.iter().map(i64::to_string).collect();
        println!("\nPending migrations: {}", pending.join(", "));
    }
    Ok(())
}
