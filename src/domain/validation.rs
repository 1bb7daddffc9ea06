//! Field rules for boards, columns, cards and blocks.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use super::{ColumnKind, KanbanError};

pub const BOARD_NAME_LEN: RangeInclusive<usize> = 2..=100;
pub const COLUMN_NAME_LEN: RangeInclusive<usize> = 2..=50;
pub const CARD_TITLE_LEN: RangeInclusive<usize> = 3..=100;
pub const CARD_DESCRIPTION_LEN: RangeInclusive<usize> = 5..=500;
pub const REASON_LEN: RangeInclusive<usize> = 5..=200;
pub const MAX_PENDING_COLUMNS: usize = 10;
pub const SEARCH_LIMIT: RangeInclusive<i64> = 1..=500;
pub const STALE_DAYS: RangeInclusive<i64> = 0..=3650;

pub fn require_non_blank(value: &str, field: &str) -> Result<String, KanbanError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(KanbanError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

/// Trims `value` and checks its length in characters.
pub fn require_length(
    value: &str,
    range: RangeInclusive<usize>,
    field: &str,
) -> Result<String, KanbanError> {
    let trimmed = require_non_blank(value, field)?;
    let len = trimmed.chars().count();
    if len < *range.start() {
        return Err(KanbanError::Validation(format!(
            "{} must have at least {} characters",
            field,
            range.start()
        )));
    }
    if len > *range.end() {
        return Err(KanbanError::Validation(format!(
            "{} must have at most {} characters",
            field,
            range.end()
        )));
    }
    Ok(trimmed)
}

pub fn require_range(value: i64, range: RangeInclusive<i64>, field: &str) -> Result<i64, KanbanError> {
    if !range.contains(&value) {
        return Err(KanbanError::Validation(format!(
            "{} must be between {} and {}",
            field,
            range.start(),
            range.end()
        )));
    }
    Ok(value)
}

pub fn board_name(name: &str) -> Result<String, KanbanError> {
    require_length(name, BOARD_NAME_LEN, "Board name")
}

pub fn column_name(name: &str) -> Result<String, KanbanError> {
    require_length(name, COLUMN_NAME_LEN, "Column name")
}

pub fn card_title(title: &str) -> Result<String, KanbanError> {
    require_length(title, CARD_TITLE_LEN, "Card title")
}

pub fn card_description(description: &str) -> Result<String, KanbanError> {
    require_length(description, CARD_DESCRIPTION_LEN, "Card description")
}

pub fn reason(reason: &str, field: &str) -> Result<String, KanbanError> {
    require_length(reason, REASON_LEN, field)
}

/// Checks a full column layout: exactly one initial, final and cancel column,
/// a bounded number of pending ones and no duplicate names.
pub fn column_layout(columns: &[(String, ColumnKind)]) -> Result<(), KanbanError> {
    let count = |kind: ColumnKind| columns.iter().filter(|(_, k)| *k == kind).count();

    for kind in [ColumnKind::Initial, ColumnKind::Final, ColumnKind::Cancel] {
        if count(kind) != 1 {
            return Err(KanbanError::Validation(format!(
                "Board must have exactly one {} column",
                kind
            )));
        }
    }

    if count(ColumnKind::Pending) > MAX_PENDING_COLUMNS {
        return Err(KanbanError::Validation(format!(
            "Board can have at most {} pending columns",
            MAX_PENDING_COLUMNS
        )));
    }

    let mut seen = HashSet::new();
    for (name, _) in columns {
        if !seen.insert(name.to_lowercase()) {
            return Err(KanbanError::Validation(format!(
                "Column name '{}' is used more than once",
                name
            )));
        }
    }

    Ok(())
}
