pub mod boards;
pub mod cards;

pub use boards::{BoardDetails, BoardSummary, ColumnCard, ColumnDetails, ColumnSummary, NewBoard};
pub use cards::{CardDetails, CardSummary, NewCard};
