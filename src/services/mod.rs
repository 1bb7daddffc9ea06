pub mod board_service;
pub mod card_service;
pub mod export_service;
pub mod metrics;
pub mod report_service;
pub mod search;

pub use board_service::BoardService;
pub use card_service::CardService;
pub use export_service::{BoardExport, ExportService, ExportedCard};
pub use metrics::{MetricsCollector, MetricsReport, OperationStats};
pub use report_service::{ColumnCount, ProductivityReport, ReportService, StaleCardsReport};
pub use search::{CardSearchCriteria, CardSearchService, SearchResult};
