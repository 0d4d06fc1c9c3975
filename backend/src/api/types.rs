//! REST API types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::logs::log_error;
use super::state::Table;
use crate::error::ServerError;
use crate::transform::pipeline::CsvInfo;
use crate::transform::projector::HEADER;

/// Response sent after a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Identifier of the table now loaded
    pub table_id: String,

    /// Always "ready"; failures use [`error_response`]
    pub status: String,

    pub metadata: TableMetadata,
}

/// Facts about a loaded table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableMetadata {
    pub file_name: Option<String>,
    pub loaded_at: DateTime<Utc>,
    pub row_count: usize,
    /// Fragments dropped because their corner tag has no column
    pub unplaced_fragments: usize,
    pub csv_info: CsvInfo,
}

/// Preview of the current table, laid out exactly as the exports are.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResponse {
    pub table_id: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub metadata: TableMetadata,
}

impl From<&Table> for TableMetadata {
    fn from(table: &Table) -> Self {
        TableMetadata {
            file_name: table.source_name.clone(),
            loaded_at: table.loaded_at,
            row_count: table.rows.len(),
            unplaced_fragments: table.unplaced_fragments,
            csv_info: table.csv_info.clone(),
        }
    }
}

impl From<&Table> for UploadResponse {
    fn from(table: &Table) -> Self {
        UploadResponse {
            table_id: table.id.to_string(),
            status: "ready".to_string(),
            metadata: TableMetadata::from(table),
        }
    }
}

impl From<&Table> for TableResponse {
    fn from(table: &Table) -> Self {
        TableResponse {
            table_id: table.id.to_string(),
            columns: HEADER.iter().map(|c| c.to_string()).collect(),
            rows: table.rows.iter().map(|r| r.to_record()).collect(),
            metadata: TableMetadata::from(table),
        }
    }
}

/// Create an error response body
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Pipeline(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Encode(_) | ServerError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NoTable => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        log_error(&message);
        (self.status_code(), Json(error_response(&message))).into_response()
    }
}
