//! HTTP routes for the import service
//!
//! - `POST /import-csv` - multipart form with a `file` part and a `tableName` field
//! - `GET /health` - liveness probe

use crate::api::http::{read_request, write_response, HttpRequest, HttpResponse};
use crate::api::multipart::{self, FormPart};
use crate::api::upload::StagedUpload;
use crate::config::ServerConfig;
use crate::error::{ImportError, ValidationError};
use crate::import::ImportOrchestrator;
use crate::ingestion::{read_csv_file, Dataset};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

/// Server state shared by all connections
pub struct AppState {
    pub orchestrator: ImportOrchestrator,
    pub config: ServerConfig,
}

/// Accept connections until the listener fails; one task per connection.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    loop {
        let (stream, addr) = listener.accept().await?;
        debug!(%addr, "New connection");
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, state).await {
                error!(%addr, error = %e, "Error handling connection");
            }
        });
    }
}

pub async fn handle_connection(mut stream: TcpStream, state: Arc<AppState>) -> std::io::Result<()> {
    let response = match read_request(&mut stream, state.config.max_upload_bytes).await {
        Ok(request) => handle_request(&state, request).await,
        Err(e) => {
            warn!(error = %e, "Rejected request");
            HttpResponse::error(e.status_code(), &e.to_string())
        }
    };
    write_response(&mut stream, &response).await
}

pub async fn handle_request(state: &AppState, request: HttpRequest) -> HttpResponse {
    info!(method = %request.method, path = %request.path, "Request");

    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/health") => HttpResponse::json(200, &serde_json::json!({ "status": "ok" })),
        ("POST", "/import-csv") => import_csv(state, request).await,
        (_, "/import-csv") | (_, "/health") => HttpResponse::error(405, "Method not allowed"),
        _ => HttpResponse::error(404, "Not found"),
    }
}

async fn import_csv(state: &AppState, request: HttpRequest) -> HttpResponse {
    let boundary = request.header("content-type").and_then(multipart::boundary);
    let parts = match boundary {
        Some(boundary) => match multipart::parse(request.body, boundary).await {
            Ok(parts) => parts,
            Err(e) => return HttpResponse::error(e.status_code(), &e.to_string()),
        },
        None => Vec::new(),
    };

    let Some(file) = parts.iter().find(|p| p.name == "file" && p.is_file()) else {
        return failure(ValidationError::MissingFile.into());
    };
    let table_name = match table_name_field(&parts) {
        Some(name) => name,
        None => return failure(ValidationError::MissingTableName.into()),
    };

    let (upload, dataset) = match stage_and_parse(state, file).await {
        Ok(staged) => staged,
        Err(e) => return failure(e),
    };
    info!(
        table = %table_name,
        file = upload.original_name().unwrap_or("<unnamed>"),
        bytes = upload.size(),
        rows = dataset.row_count(),
        "Parsed upload"
    );

    let outcome = state.orchestrator.import_dataset(&table_name, &dataset).await;
    drop(upload);

    match outcome {
        Ok(result) => HttpResponse::json(200, &result),
        Err(e) => failure(e),
    }
}

fn table_name_field(parts: &[FormPart]) -> Option<String> {
    parts
        .iter()
        .find(|p| p.name == "tableName" && !p.is_file())
        .map(FormPart::text)
        .filter(|name| !name.trim().is_empty())
}

/// Write the upload to the staging directory and parse it off the async runtime.
async fn stage_and_parse(
    state: &AppState,
    file: &FormPart,
) -> Result<(StagedUpload, Dataset), ImportError> {
    let dir = state.config.upload_dir.clone();
    let data = file.data.clone();
    let original_name = file.filename.clone();

    tokio::task::spawn_blocking(move || {
        let upload = StagedUpload::stage(&dir, &data, original_name)?;
        let dataset = read_csv_file(upload.path())?;
        Ok::<_, ImportError>((upload, dataset))
    })
    .await
    .map_err(|e| ImportError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}

fn failure(e: ImportError) -> HttpResponse {
    HttpResponse::error(e.status_code(), &e.to_string())
}
