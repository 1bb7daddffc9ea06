use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::domain::{format_timestamp, search_key, validation, KanbanError};
use crate::dto::CardSummary;

pub const DEFAULT_SEARCH_LIMIT: i64 = 50;

/// Filters for card search. Every filter is optional; set filters are
/// combined with AND. Blank strings are treated as unset. Text filters are
/// case-insensitive substring matches.
#[derive(Debug, Clone, PartialEq)]
pub struct CardSearchCriteria {
    pub title_contains: Option<String>,
    pub description_contains: Option<String>,
    /// Matches title OR description.
    pub text: Option<String>,
    pub board_ids: Vec<i64>,
    pub column_ids: Vec<i64>,
    pub created_after: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the creation time.
    pub created_before: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the creation time.
    pub older_than: Option<DateTime<Utc>>,
    pub is_blocked: Option<bool>,
    pub block_reason_contains: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for CardSearchCriteria {
    fn default() -> Self {
        Self {
            title_contains: None,
            description_contains: None,
            text: None,
            board_ids: vec![],
            column_ids: vec![],
            created_after: None,
            created_before: None,
            older_than: None,
            is_blocked: None,
            block_reason_contains: None,
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl CardSearchCriteria {
    pub fn title_contains(mut self, value: impl Into<String>) -> Self {
        self.title_contains = Some(value.into());
        self
    }

    pub fn description_contains(mut self, value: impl Into<String>) -> Self {
        self.description_contains = Some(value.into());
        self
    }

    pub fn text(mut self, value: impl Into<String>) -> Self {
        self.text = Some(value.into());
        self
    }

    pub fn board(mut self, board_id: i64) -> Self {
        self.board_ids.push(board_id);
        self
    }

    pub fn column(mut self, column_id: i64) -> Self {
        self.column_ids.push(column_id);
        self
    }

    pub fn created_after(mut self, at: DateTime<Utc>) -> Self {
        self.created_after = Some(at);
        self
    }

    pub fn created_before(mut self, at: DateTime<Utc>) -> Self {
        self.created_before = Some(at);
        self
    }

    pub fn older_than(mut self, at: DateTime<Utc>) -> Self {
        self.older_than = Some(at);
        self
    }

    pub fn blocked(mut self, blocked: bool) -> Self {
        self.is_blocked = Some(blocked);
        self
    }

    pub fn block_reason_contains(mut self, value: impl Into<String>) -> Self {
        self.block_reason_contains = Some(value.into());
        self
    }

    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    pub fn has_text_filter(&self) -> bool {
        non_blank(&self.title_contains).is_some()
            || non_blank(&self.description_contains).is_some()
            || non_blank(&self.text).is_some()
    }

    pub fn has_date_filter(&self) -> bool {
        self.created_after.is_some() || self.created_before.is_some() || self.older_than.is_some()
    }

    pub fn has_column_filter(&self) -> bool {
        !self.column_ids.is_empty()
    }

    pub fn has_board_filter(&self) -> bool {
        !self.board_ids.is_empty()
    }

    pub fn has_block_filter(&self) -> bool {
        self.is_blocked.is_some() || non_blank(&self.block_reason_contains).is_some()
    }

    pub fn validate(&self) -> Result<(), KanbanError> {
        validation::require_range(self.limit, validation::SEARCH_LIMIT, "Limit")?;
        if self.offset < 0 {
            return Err(KanbanError::Validation("Offset must not be negative".into()));
        }
        if let (Some(after), Some(before)) = (self.created_after, self.created_before) {
            if after > before {
                return Err(KanbanError::Validation(
                    "created-after must not be later than created-before".into(),
                ));
            }
        }
        Ok(())
    }
}

/// One page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page_size: i64,
    pub current_page: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> SearchResult<T> {
    pub fn new(items: Vec<T>, total_count: i64, limit: i64, offset: i64) -> Self {
        let current_page = if limit > 0 { offset / limit } else { 0 };
        Self {
            items,
            total_count,
            page_size: limit,
            current_page,
            has_next: offset.saturating_add(limit) < total_count,
            has_previous: offset > 0,
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.page_size <= 0 {
            return 0;
        }
        (self.total_count + self.page_size - 1) / self.page_size
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `%value%` with LIKE wildcards in `value` escaped.
fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

const FROM_CLAUSE: &str = r#"
    FROM cards c
    INNER JOIN boards_columns bc ON bc.id = c.board_column_id
    LEFT JOIN blocks b ON b.card_id = c.id AND b.unblocked_at IS NULL
"#;

fn push_condition(builder: &mut QueryBuilder<'_, Sqlite>, has_where: &mut bool) {
    builder.push(if *has_where { " AND " } else { " WHERE " });
    *has_where = true;
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, criteria: &CardSearchCriteria) {
    let mut has_where = false;

    if let Some(title) = non_blank(&criteria.title_contains) {
        push_condition(builder, &mut has_where);
        builder
            .push("c.title_folded LIKE ")
            .push_bind(like_pattern(&search_key(title)))
            .push(" ESCAPE '\\'");
    }

    if let Some(description) = non_blank(&criteria.description_contains) {
        push_condition(builder, &mut has_where);
        builder
            .push("c.description_folded LIKE ")
            .push_bind(like_pattern(&search_key(description)))
            .push(" ESCAPE '\\'");
    }

    if let Some(text) = non_blank(&criteria.text) {
        let pattern = like_pattern(&search_key(text));
        push_condition(builder, &mut has_where);
        builder
            .push("(c.title_folded LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR c.description_folded LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    if criteria.has_board_filter() {
        push_condition(builder, &mut has_where);
        builder.push("bc.board_id IN (");
        let mut separated = builder.separated(", ");
        for id in &criteria.board_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
    }

    if criteria.has_column_filter() {
        push_condition(builder, &mut has_where);
        builder.push("c.board_column_id IN (");
        let mut separated = builder.separated(", ");
        for id in &criteria.column_ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
    }

    match criteria.is_blocked {
        Some(true) => {
            push_condition(builder, &mut has_where);
            builder.push("b.id IS NOT NULL");
        }
        Some(false) => {
            push_condition(builder, &mut has_where);
            builder.push("b.id IS NULL");
        }
        None => {}
    }

    if let Some(reason) = non_blank(&criteria.block_reason_contains) {
        push_condition(builder, &mut has_where);
        builder
            .push("b.block_reason_folded LIKE ")
            .push_bind(like_pattern(&search_key(reason)))
            .push(" ESCAPE '\\'");
    }

    if let Some(after) = criteria.created_after {
        push_condition(builder, &mut has_where);
        builder.push("c.created_at >= ").push_bind(format_timestamp(after));
    }

    if let Some(before) = criteria.created_before {
        push_condition(builder, &mut has_where);
        builder.push("c.created_at <= ").push_bind(format_timestamp(before));
    }

    if let Some(bound) = criteria.older_than {
        push_condition(builder, &mut has_where);
        builder.push("c.created_at < ").push_bind(format_timestamp(bound));
    }
}

pub struct CardSearchService;

impl CardSearchService {
    pub async fn search(
        pool: &SqlitePool,
        criteria: &CardSearchCriteria,
    ) -> Result<SearchResult<CardSummary>, KanbanError> {
        criteria.validate()?;
        tracing::debug!(?criteria, "Searching cards");

        let total_count = Self::count(pool, criteria).await?;
        let items = Self::find(pool, criteria).await?;

        tracing::debug!("Search returned {} of {} cards", items.len(), total_count);

        Ok(SearchResult::new(items, total_count, criteria.limit, criteria.offset))
    }

    /// The page of cards selected by `criteria`, newest first.
    pub async fn find(
        pool: &SqlitePool,
        criteria: &CardSearchCriteria,
    ) -> Result<Vec<CardSummary>, KanbanError> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT
                c.id, c.title, c.description, c.created_at,
                bc.board_id,
                bc.id AS column_id,
                bc.name AS column_name,
                bc.kind AS column_kind,
                (b.id IS NOT NULL) AS blocked,
                b.block_reason
            "#,
        );
        builder.push(FROM_CLAUSE);
        push_filters(&mut builder, criteria);
        builder
            .push(" ORDER BY c.id DESC LIMIT ")
            .push_bind(criteria.limit)
            .push(" OFFSET ")
            .push_bind(criteria.offset);

        let cards = builder
            .build_query_as::<CardSummary>()
            .fetch_all(pool)
            .await?;

        Ok(cards)
    }

    /// Number of cards matching `criteria`, ignoring pagination.
    pub async fn count(pool: &SqlitePool, criteria: &CardSearchCriteria) -> Result<i64, KanbanError> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(DISTINCT c.id)");
        builder.push(FROM_CLAUSE);
        push_filters(&mut builder, criteria);

        let count: i64 = builder.build_query_scalar().fetch_one(pool).await?;
        Ok(count)
    }
}
