//! HTTP Handlers for document screening

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::path::Path;

use super::{Analysis, View, analyze_document};
use crate::api::{AnalysisResponse, FilterParams, KeywordsResponse};
use crate::error::HandlerError;
use crate::export;
use crate::handler::AppState;

const UPLOAD_FIELD: &str = "file";
const CSV_MIME: &str = "text/csv; charset=utf-8";
const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug)]
struct Upload {
    filename: String,
    data: Bytes,
}

impl FilterParams {
    pub fn view(&self) -> Result<View, HandlerError> {
        self.filter
            .as_deref()
            .unwrap_or("all")
            .parse()
            .map_err(HandlerError::Validation)
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, HandlerError> {
    // multipart errors carry their own status, 413 once the body limit is hit
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("document.pdf").to_string();
        let data = field.bytes().await?;

        if data.is_empty() {
            return Err(HandlerError::Validation(format!("{} is empty", filename)));
        }

        tracing::info!(filename = %filename, bytes = data.len(), "received document");
        return Ok(Upload { filename, data });
    }

    Err(HandlerError::Validation(format!(
        "missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}

/// PDF extraction is CPU bound and may take a while on large documents.
async fn run_analysis(state: &AppState, upload: Upload) -> Result<Analysis, HandlerError> {
    let keywords = state.keywords.clone();
    let analysis = tokio::task::spawn_blocking(move || {
        analyze_document(&upload.data, &upload.filename, &keywords)
    })
    .await??;
    Ok(analysis)
}

fn download_name(document: &str, suffix: &str) -> String {
    let stem = Path::new(document)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    format!("{}_{}", stem, suffix)
}

fn attachment(filename: &str, mime: &'static str, body: Vec<u8>) -> Response {
    let ascii: String = filename
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    let disposition = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(filename)
    );

    let mut response = (StatusCode::OK, body).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    response
}

pub async fn list_keywords(State(state): State<AppState>) -> Response {
    let body = KeywordsResponse {
        count: state.keywords.len(),
        keywords: state.keywords.iter().collect(),
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub async fn analyze(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
    multipart: Multipart,
) -> Result<Response, HandlerError> {
    let view = params.view()?;
    let upload = read_upload(multipart).await?;
    let analysis = run_analysis(&state, upload).await?;

    let selected = analysis.select(view);
    let body = AnalysisResponse::new(&analysis.document, view.to_string(), analysis.summary, &selected);
    Ok((StatusCode::OK, Json(body)).into_response())
}

pub async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
    multipart: Multipart,
) -> Result<Response, HandlerError> {
    let view = params.view()?;
    let upload = read_upload(multipart).await?;
    let analysis = run_analysis(&state, upload).await?;

    let body = export::csv_bytes(&analysis.select(view))?;
    let filename = download_name(&analysis.document, "livestock_filtered.csv");
    tracing::info!(filename = %filename, filter = %view, "exporting csv");
    Ok(attachment(&filename, CSV_MIME, body))
}

pub async fn export_xlsx(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
    multipart: Multipart,
) -> Result<Response, HandlerError> {
    let view = params.view()?;
    let upload = read_upload(multipart).await?;
    let analysis = run_analysis(&state, upload).await?;

    let body = export::analysis_workbook(&analysis, view)?;
    let filename = download_name(&analysis.document, "livestock_analysis.xlsx");
    tracing::info!(filename = %filename, filter = %view, "exporting xlsx");
    Ok(attachment(&filename, XLSX_MIME, body))
}
