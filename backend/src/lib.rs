//! # Inventory - read a published inventory spreadsheet
//!
//! Fetches the CSV export of a spreadsheet, turns each row into a typed
//! [`Record`], and answers the questions an inventory screen asks:
//! which categories and suppliers exist, which items match a search.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV export │────▶│   Fetch     │────▶│   Parser    │────▶│   Store +   │
//! │ (HTTP/file) │     │ (decode)    │     │ (RecordSet) │     │   Queries   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use inventory::{Config, HttpSource, InventoryStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().unwrap();
//!     let source = HttpSource::new(&config.csv_url).unwrap();
//!     let mut store = InventoryStore::new(config.parse_options());
//!     store.initialize(&source).await;
//!     println!("Categories: {:?}", store.categories());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Field values, records, inventory items
//! - [`parser`] - CSV line splitting, key normalization, coercion
//! - [`fetch`] - HTTP and file sources
//! - [`store`] - Loading state and current records
//! - [`query`] - Search and filter helpers
//! - [`export`] - CSV output
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server and log streaming

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Retrieval and state
pub mod fetch;
pub mod store;

// Queries and output
pub mod export;
pub mod query;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::Config;

pub use error::{ConfigError, ExportError, FetchError, ServerError};

pub use models::{FieldValue, InventoryItem, Record, RecordSet};

pub use parser::{
    normalize_key, parse, parse_number, parse_with_report, split_fields, ParseOptions,
    ParseResult,
};

pub use fetch::{AnySource, CsvSource, FileSource, HttpSource};

pub use store::{refresh_shared, InventoryStore, SharedStore, StoreState};

pub use query::{
    categories, filter_by_category, filter_by_supplier, search, suppliers, ItemQuery, QueryFields,
};

pub use export::{write_csv, write_csv_file, write_records_file};

pub use api::logs::{log_error, log_info, log_success, log_warning, LOG_BROADCASTER};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server, AppState};
}
