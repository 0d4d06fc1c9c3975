//! HTTP Server for the cornerpivot API.
//!
//! # API Endpoints
//!
//! | Method | Path                  | Description                               |
//! |--------|-----------------------|-------------------------------------------|
//! | GET    | `/health`             | Health check                              |
//! | POST   | `/api/upload`         | Upload a CSV file, replacing the table    |
//! | GET    | `/api/table`          | Current table as JSON                     |
//! | GET    | `/api/export/{format}`| Download `output.csv` or `output.xlsx`    |
//! | GET    | `/api/logs`           | SSE stream for real-time logs             |
//!
//! `/api/upload` accepts `delimiter` and `skipHeader` query parameters that
//! override the server defaults for that upload.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, Method},
    response::{sse::Event, IntoResponse, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{
    convert::Infallible,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, log_success, LOG_BROADCASTER};
use super::state::{AppState, Table};
use super::types::{TableResponse, UploadResponse};
use crate::error::{ServerError, ServerResult};
use crate::export::ExportFormat;
use crate::transform::pipeline::{pivot_bytes, PivotOptions};

/// Default request body cap for uploads (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

/// Where and how the server listens.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub defaults: PivotOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            defaults: PivotOptions::default(),
        }
    }
}

/// Per-upload overrides taken from the query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadParams {
    delimiter: Option<char>,
    skip_header: Option<bool>,
}

/// Build the application router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/upload", post(upload_csv))
        .route("/api/table", get(current_table))
        .route("/api/export/{format}", get(export_table))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState::new(config.defaults.clone());
    let app = router(state, config.max_upload_bytes);

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("cornerpivot server listening on http://{}", listener.local_addr()?);
    tracing::info!("POST /api/upload           - Upload CSV file");
    tracing::info!("GET  /api/table            - Current table");
    tracing::info!("GET  /api/export/{{csv,xlsx}} - Download export");
    tracing::info!("GET  /api/logs             - SSE log stream");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health(State(state): State<AppState>) -> Json<Value> {
    let loaded = state.current().await.map(|t| t.id.to_string());

    Json(json!({
        "status": "ok",
        "service": "cornerpivot",
        "version": env!("CARGO_PKG_VERSION"),
        "tableId": loaded,
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip what they missed.
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload CSV endpoint.
///
/// The current table is only replaced when the whole file parses.
async fn upload_csv(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResponse>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some(FILE_FIELD) {
            file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
            file_data = Some(bytes.to_vec());
        }
    }

    let bytes = file_data.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))?;

    log_info(format!(
        "📄 New upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    let options = PivotOptions {
        delimiter: params.delimiter.or(state.defaults.delimiter),
        skip_header: params.skip_header.unwrap_or(state.defaults.skip_header),
    };

    // chardet and the CSV pass are CPU-bound; keep them off the async workers
    let result = tokio::task::spawn_blocking(move || pivot_bytes(&bytes, &options)).await??;
    let table = state.replace(Table::new(result, file_name)).await;
    log_success(format!("Table {} loaded with {} rows", table.id, table.rows.len()));

    Ok(Json(UploadResponse::from(table.as_ref())))
}

/// Current table as JSON
async fn current_table(State(state): State<AppState>) -> ServerResult<Json<TableResponse>> {
    let table = state.current().await.ok_or(ServerError::NoTable)?;
    Ok(Json(TableResponse::from(table.as_ref())))
}

/// Download the current table.
///
/// Refused while there is nothing to export.
async fn export_table(
    State(state): State<AppState>,
    Path(format): Path<ExportFormat>,
) -> ServerResult<impl IntoResponse> {
    let table = state
        .current()
        .await
        .filter(|t| !t.rows.is_empty())
        .ok_or(ServerError::NoTable)?;

    let bytes = format.encode(&table.rows)?;
    log_success(format!(
        "Exported {} rows as {} ({} bytes)",
        table.rows.len(),
        format,
        bytes.len()
    ));

    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", format.file_name()),
        ),
    ];

    Ok((headers, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const BOUNDARY: &str = "cornerpivot-test-boundary";

    fn app() -> Router {
        router(AppState::default(), DEFAULT_MAX_UPLOAD_BYTES)
    }

    fn upload_request(uri: &str, content: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"points.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        );

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app().oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["tableId"].is_null());
    }

    #[tokio::test]
    async fn test_export_without_table_conflicts() {
        let response = app().oneshot(get_request("/api/export/csv")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app().oneshot(get_request("/api/table")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_upload_then_export_csv() {
        let app = app();
        let input = "1a/10/20/30\n1b/11/21/31\n1c/12/22/32\n1d/13/23/33\n";

        let response = app.clone().oneshot(upload_request("/api/upload", input)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ready");
        assert_eq!(json["metadata"]["rowCount"], 1);
        assert_eq!(json["metadata"]["fileName"], "points.csv");

        let response = app.oneshot(get_request("/api/export/csv")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv;charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"output.csv\""
        );

        let text = body_text(response).await;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("ID,Top Left x"));
        assert_eq!(lines[1], "1,10,20,30,11,21,31,12,22,32,13,23,33");
    }

    #[tokio::test]
    async fn test_export_xlsx() {
        let app = app();
        app.clone()
            .oneshot(upload_request("/api/upload", "5a/1/2/3"))
            .await
            .unwrap();

        let response = app.oneshot(get_request("/api/export/xlsx")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"output.xlsx\""
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_large_upload_alongside_health() {
        let app = app();
        let input: String = (1..=20_000).map(|i| format!("{i}a/{i}/{i}/{i}\n")).collect();

        let (upload, health) = tokio::join!(
            app.clone().oneshot(upload_request("/api/upload", &input)),
            app.clone().oneshot(get_request("/health")),
        );

        assert_eq!(health.unwrap().status(), StatusCode::OK);
        let upload = upload.unwrap();
        assert_eq!(upload.status(), StatusCode::OK);
        let json = body_json(upload).await;
        assert_eq!(json["metadata"]["rowCount"], 20_000);
    }

    #[tokio::test]
    async fn test_unknown_export_format() {
        let response = app().oneshot(get_request("/api/export/pdf")).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_previous_table() {
        let app = app();
        app.clone()
            .oneshot(upload_request("/api/upload", "2a/1/2/3\n"))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(upload_request("/api/upload", "3a/1/2/3\nbad/1/2/3\n"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("Line 2"));

        let json = body_json(app.oneshot(get_request("/api/table")).await.unwrap()).await;
        assert_eq!(json["rows"].as_array().unwrap().len(), 1);
        assert_eq!(json["rows"][0][0], "2");
    }

    #[tokio::test]
    async fn test_upload_replaces_instead_of_merging() {
        let app = app();
        app.clone()
            .oneshot(upload_request("/api/upload", "1a/1/2/3\n"))
            .await
            .unwrap();
        app.clone()
            .oneshot(upload_request("/api/upload", "2b/4/5/6\n"))
            .await
            .unwrap();

        let json = body_json(app.oneshot(get_request("/api/table")).await.unwrap()).await;
        let rows = json["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "2");
        assert_eq!(rows[0][4], "4");
    }

    #[tokio::test]
    async fn test_upload_query_overrides() {
        let app = app();
        let response = app
            .clone()
            .oneshot(upload_request(
                "/api/upload?delimiter=%3B&skipHeader=true",
                "id;x;y;z\n7c;1,5;2;3\n",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(app.oneshot(get_request("/api/table")).await.unwrap()).await;
        assert_eq!(json["rows"][0][0], "7");
        assert_eq!(json["rows"][0][7], "1,5");
    }

    #[tokio::test]
    async fn test_upload_without_file() {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"other\"\r\n\r\n\
             hello\r\n\
             --{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_empty_table_not_exported() {
        let state = AppState::default();
        state
            .replace(Table::new(
                crate::transform::pipeline::PivotResult {
                    rows: Vec::new(),
                    unplaced_fragments: 0,
                    csv_info: crate::transform::pipeline::CsvInfo {
                        encoding: "utf-8".into(),
                        delimiter: ',',
                        record_count: 0,
                    },
                },
                None,
            ))
            .await;

        let response = router(state, DEFAULT_MAX_UPLOAD_BYTES)
            .oneshot(get_request("/api/export/xlsx"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
