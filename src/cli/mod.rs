//! Command-line interface for the task board.
//!
//! Every subcommand maps onto one service operation; `commands` runs them
//! and `render` prints the results.

pub mod commands;
pub mod render;

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};

pub use commands::run;

/// Task board - Kanban boards, columns and cards on a local SQLite database.
#[derive(Parser, Debug)]
#[command(name = "task-board")]
#[command(version)]
#[command(about = "Kanban boards, columns and cards on a local SQLite database")]
#[command(
    long_about = "Manage Kanban boards from the command line.\n\n\
    Each board has an initial column, optional pending columns, a final column \
    and a cancel column. Cards start in the initial column and move forward one \
    column at a time; blocked cards cannot move.\n\n\
    Environment variables:\n  \
    BOARD_DATABASE_URL            Database URL (default sqlite:board.db)\n  \
    BOARD_DATABASE_POOL_MAX       Connection pool size (default 5)\n  \
    BOARD_DATABASE_QUERY_LOGGING  Log SQL statements (default false)\n  \
    BOARD_LOGGING_LEVEL           Log level when RUST_LOG is unset (default warn)"
)]
pub struct Cli {
    /// Enable debug output to stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Database URL, overriding BOARD_DATABASE_URL
    #[arg(long, global = true, value_name = "URL")]
    pub database: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, list, inspect, delete and export boards
    Board {
        #[command(subcommand)]
        command: BoardCommand,
    },

    /// Inspect board columns
    Column {
        #[command(subcommand)]
        command: ColumnCommand,
    },

    /// Create, move, block and delete cards
    Card {
        #[command(subcommand)]
        command: CardCommand,
    },

    /// Search cards across boards
    Search(SearchArgs),

    /// Board reports
    Report {
        #[command(subcommand)]
        command: ReportCommand,
    },

    /// Show recorded operation timings
    Metrics {
        /// Delete all recorded metrics
        #[arg(long)]
        clear: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum BoardCommand {
    /// Create a board with its columns
    ///
    /// Columns are laid out as: initial, pending (in the order given), final,
    /// cancel.
    Create {
        /// Board name
        #[arg(long)]
        name: String,
        /// Name of the initial column
        #[arg(long, value_name = "NAME")]
        initial: Option<String>,
        /// Name of a pending column; repeat for several
        #[arg(long = "pending", value_name = "NAME")]
        pending: Vec<String>,
        /// Name of the final column
        #[arg(long = "final", value_name = "NAME")]
        final_column: Option<String>,
        /// Name of the cancel column
        #[arg(long, value_name = "NAME")]
        cancel: Option<String>,
    },

    /// List all boards
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a board and its columns
    Show {
        board_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a board with all its columns and cards
    Delete {
        board_id: i64,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Export a board as JSON
    Export {
        board_id: i64,
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ColumnCommand {
    /// Show a column and the cards in it
    Show {
        column_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum CardCommand {
    /// Create a card in the board's initial column
    Create {
        board_id: i64,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
    },

    /// Show a card
    Show {
        card_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move a card to the next column, or to a given column
    Move {
        card_id: i64,
        /// Target column id
        #[arg(long = "to", value_name = "COLUMN_ID")]
        to: Option<i64>,
    },

    /// Move a card to the cancel column
    Cancel { card_id: i64 },

    /// Block a card
    Block {
        card_id: i64,
        #[arg(long)]
        reason: String,
    },

    /// Unblock a card
    Unblock {
        card_id: i64,
        #[arg(long)]
        reason: String,
    },

    /// Show every block placed on a card
    History {
        card_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a card
    Delete { card_id: i64 },
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Title contains
    #[arg(long)]
    pub title: Option<String>,
    /// Description contains
    #[arg(long)]
    pub description: Option<String>,
    /// Title or description contains
    #[arg(long)]
    pub text: Option<String>,
    /// Restrict to a board; repeat for several
    #[arg(long = "board", value_name = "BOARD_ID")]
    pub boards: Vec<i64>,
    /// Restrict to a column; repeat for several
    #[arg(long = "column", value_name = "COLUMN_ID")]
    pub columns: Vec<i64>,
    /// Only blocked cards
    #[arg(long, conflicts_with = "unblocked")]
    pub blocked: bool,
    /// Only cards that are not blocked
    #[arg(long)]
    pub unblocked: bool,
    /// Open block reason contains
    #[arg(long, value_name = "TEXT")]
    pub block_reason: Option<String>,
    /// Created at or after (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_name = "DATE", value_parser = parse_start_of_day)]
    pub created_after: Option<DateTime<Utc>>,
    /// Created at or before (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_name = "DATE", value_parser = parse_end_of_day)]
    pub created_before: Option<DateTime<Utc>>,
    /// Page size
    #[arg(long, default_value_t = crate::services::search::DEFAULT_SEARCH_LIMIT)]
    pub limit: i64,
    /// Cards to skip
    #[arg(long, default_value_t = 0)]
    pub offset: i64,
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Cards per column and blocked share for a board
    Productivity {
        board_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cards older than the given number of days
    Stale {
        #[arg(long)]
        days: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Show journal mode, tables and applied migrations
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_date(value: &str, time: NaiveTime) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(time).and_utc())
        .map_err(|_| format!("invalid date '{}', expected YYYY-MM-DD or RFC 3339", value))
}

/// Date-only values start at midnight UTC.
fn parse_start_of_day(value: &str) -> Result<DateTime<Utc>, String> {
    parse_date(value, NaiveTime::MIN)
}

/// Last millisecond of a day, the precision timestamps are stored with.
const END_OF_DAY: NaiveTime = match NaiveTime::from_hms_milli_opt(23, 59, 59, 999) {
    Some(time) => time,
    None => panic!("23:59:59.999 is a valid time"),
};

/// Date-only values cover the whole day.
fn parse_end_of_day(value: &str) -> Result<DateTime<Utc>, String> {
    parse_date(value, END_OF_DAY)
}
