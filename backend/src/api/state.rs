//! Shared server state: the currently loaded table.
//!
//! A table is only ever swapped in whole, after its upload parsed
//! successfully. Readers take a cheap `Arc` snapshot so an export never
//! sees half of one table and half of another.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::transform::pipeline::{CsvInfo, PivotOptions, PivotResult};
use crate::transform::projector::ProjectedRow;

/// One successfully parsed upload.
#[derive(Debug, Clone)]
pub struct Table {
    pub id: Uuid,
    pub loaded_at: DateTime<Utc>,
    pub source_name: Option<String>,
    pub rows: Vec<ProjectedRow>,
    pub unplaced_fragments: usize,
    pub csv_info: CsvInfo,
}

impl Table {
    pub fn new(result: PivotResult, source_name: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            source_name,
            rows: result.rows,
            unplaced_fragments: result.unplaced_fragments,
            csv_info: result.csv_info,
        }
    }
}

/// State handed to every handler.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    current: Arc<RwLock<Option<Arc<Table>>>>,
    /// Options used when an upload does not override them
    pub defaults: PivotOptions,
}

impl AppState {
    pub fn new(defaults: PivotOptions) -> Self {
        Self {
            current: Arc::default(),
            defaults,
        }
    }

    /// Snapshot of the current table, if any.
    pub async fn current(&self) -> Option<Arc<Table>> {
        self.current.read().await.clone()
    }

    /// Replace the current table and return the published snapshot.
    pub async fn replace(&self, table: Table) -> Arc<Table> {
        let table = Arc::new(table);
        *self.current.write().await = Some(Arc::clone(&table));
        table
    }
}
