//! Inventory state: current records, a loading flag and the last error.
//!
//! A refresh fetches the CSV text from a [`CsvSource`], parses it, and either
//! replaces the records or stores the error message. Previous records stay in
//! place when a refresh fails.
//!
//! Every load gets a generation number from [`InventoryStore::begin_load`].
//! Only the latest generation may finish a load, so overlapping refreshes
//! cannot land out of order.
//!
//! ```rust,ignore
//! use inventory::{Config, FileSource, InventoryStore};
//!
//! let mut store = InventoryStore::new(Config::default().parse_options());
//! store.initialize(&FileSource::new("inventory.csv")).await;
//! println!("{} items", store.records().len());
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::api::logs::{log_error, log_info_indent, log_success, log_warning};
use crate::error::FetchResult;
use crate::fetch::CsvSource;
use crate::models::{Record, RecordSet};
use crate::parser::{parse_with_report, ParseOptions};
use crate::query::{self, ItemQuery, QueryFields};

/// Store shared between HTTP handlers.
pub type SharedStore = Arc<RwLock<InventoryStore>>;

/// Serializable summary of the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub loading: bool,
    pub error: Option<String>,
    pub item_count: usize,
    pub last_refreshed: Option<DateTime<Utc>>,
    pub snapshot_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct InventoryStore {
    records: RecordSet,
    loading: bool,
    error: Option<String>,
    last_refreshed: Option<DateTime<Utc>>,
    snapshot_id: Option<Uuid>,
    generation: u64,
    options: ParseOptions,
    fields: QueryFields,
}

impl InventoryStore {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn with_fields(mut self, fields: QueryFields) -> Self {
        self.fields = fields;
        self
    }

    /// Wrap into a handle for concurrent use.
    pub fn shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    // -------------------------------------------------------------------------
    // State accessors
    // -------------------------------------------------------------------------

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    pub fn snapshot_id(&self) -> Option<Uuid> {
        self.snapshot_id
    }

    pub fn fields(&self) -> &QueryFields {
        &self.fields
    }

    pub fn state(&self) -> StoreState {
        StoreState {
            loading: self.loading,
            error: self.error.clone(),
            item_count: self.records.len(),
            last_refreshed: self.last_refreshed,
            snapshot_id: self.snapshot_id,
        }
    }

    // -------------------------------------------------------------------------
    // Setters
    // -------------------------------------------------------------------------

    /// Mark a load as started and clear the previous error.
    ///
    /// Returns the generation to hand back to [`Self::finish_load`].
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.error = None;
        self.generation
    }

    /// Replace the records with a fresh set.
    pub fn set_records(&mut self, records: RecordSet) {
        self.records = records;
        self.last_refreshed = Some(Utc::now());
        self.snapshot_id = Some(Uuid::new_v4());
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Complete a load with the fetched text or the fetch failure.
    ///
    /// A result from a superseded generation is discarded and leaves the
    /// state alone. Returns `true` when the fetch succeeded.
    pub fn finish_load(&mut self, generation: u64, fetched: FetchResult<String>) -> bool {
        if generation != self.generation {
            log_info_indent(
                format!(
                    "Load #{} superseded by #{}, result discarded",
                    generation, self.generation
                ),
                1,
            );
            return fetched.is_ok();
        }

        let ok = match fetched {
            Ok(text) => {
                self.apply_text(&text);
                true
            }
            Err(e) => {
                log_error(format!("Error fetching inventory data: {}", e));
                self.set_error(e.to_string());
                false
            }
        };
        self.loading = false;
        ok
    }

    fn apply_text(&mut self, text: &str) {
        let report = parse_with_report(text, &self.options);

        for key in &report.duplicate_keys {
            log_warning(format!("Column '{}' appears more than once, last one wins", key));
        }
        if report.dropped_rows > 0 {
            let key = report.required_key.as_deref().unwrap_or("?");
            log_info_indent(
                format!("{} rows skipped (empty '{}')", report.dropped_rows, key),
                1,
            );
        }
        log_success(format!(
            "Parsed {} items from {} rows",
            report.records.len(),
            report.data_lines
        ));

        self.set_records(report.records);
    }

    // -------------------------------------------------------------------------
    // Fetch-then-parse
    // -------------------------------------------------------------------------

    /// Fetch from `source` and parse. Errors end up in [`Self::error`].
    pub async fn refresh<S: CsvSource>(&mut self, source: &S) -> bool {
        let generation = self.begin_load();
        let fetched = source.fetch_text().await;
        self.finish_load(generation, fetched)
    }

    /// Startup load. Does nothing once a snapshot exists.
    pub async fn initialize<S: CsvSource>(&mut self, source: &S) -> bool {
        if self.snapshot_id.is_some() {
            return true;
        }
        self.refresh(source).await
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn categories(&self) -> Vec<String> {
        query::categories(&self.records.records, &self.fields)
    }

    pub fn suppliers(&self) -> Vec<String> {
        query::suppliers(&self.records.records, &self.fields)
    }

    pub fn search(&self, q: &str) -> Vec<&Record> {
        query::search(&self.records.records, q, &self.fields)
    }

    pub fn filter_by_category(&self, category: &str) -> Vec<&Record> {
        query::filter_by_category(&self.records.records, category, &self.fields)
    }

    pub fn filter_by_supplier(&self, supplier: &str) -> Vec<&Record> {
        query::filter_by_supplier(&self.records.records, supplier, &self.fields)
    }

    pub fn query(&self, q: &ItemQuery) -> Vec<&Record> {
        q.apply(&self.records.records, &self.fields)
    }
}

/// Refresh a shared store without holding the lock during the fetch.
///
/// When refreshes overlap, the one started last decides the final state.
pub async fn refresh_shared<S: CsvSource>(store: &SharedStore, source: &S) -> bool {
    let generation = store.write().await.begin_load();
    let fetched = source.fetch_text().await;
    store.write().await.finish_load(generation, fetched)
}
