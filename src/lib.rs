// Domain Portfolio - Core Library
// Exposes all modules for use in CLI, TUI, API server, and tests

pub mod error;
pub mod records;        // Domain, Evaluation, Sale
pub mod derivation;     // Expiration + portfolio metrics
pub mod journal;        // Append-only mutation events
pub mod settings;       // Custom lists + import fallbacks
pub mod store;          // Mutation API
pub mod columns;        // Spreadsheet headers
pub mod import;         // Import Normalizer + decoders
pub mod export;         // Workbook / template / sales CSV
pub mod reconciliation; // Domain status vs. sales ledger
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{PortfolioError, PortfolioResult};
pub use records::{
    DomainRecord, DomainStatus, Evaluation, NewDomain, NewEvaluation, NewSale, Sale,
};
pub use derivation::{
    compute_expiration, portfolio_metrics, roi_statistics, sales_summary, status_breakdown,
    MetricsEngine, PortfolioMetrics, RoiStatistics, SalesSummary, StatusBreakdown,
    DEFAULT_VALUE_MULTIPLIER,
};
pub use journal::{EntityKind, Event, Journal};
pub use settings::{
    CustomLists, ImportDefaults, ListKind, DEFAULT_FALLBACK_CATEGORY, DEFAULT_FALLBACK_REGISTRAR,
};
pub use store::{DeletionSummary, IdSequence, PortfolioStore, UNKNOWN_DOMAIN_NAME};
pub use import::{
    decode_csv_rows, decode_sales_csv, decode_workbook, import_bytes, import_file, ImportBatch,
    ImportNormalizer, ImportSource, SpreadsheetRow,
};
pub use export::{
    domains_workbook, export_file_name, sales_csv, template_workbook, SALES_CSV_FILE_NAME,
    TEMPLATE_FILE_NAME,
};
pub use reconciliation::{
    Discrepancy, DiscrepancyCategory, ReconciliationReport, SaleReconciler,
};
pub use config::AppConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
