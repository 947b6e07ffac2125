use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ErrorResponse;

/// A source document could not be turned into rows. Terminal for that document.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("{document} is not a PDF file")]
    NotPdf { document: String },

    #[error("failed to read {document}: {reason}")]
    Unreadable { document: String, reason: String },

    #[error("no text could be extracted from {document}, it may be scanned or encrypted")]
    NoText { document: String },
}

#[derive(Debug, Error)]
pub enum KeywordError {
    #[error("failed to read keyword file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv export failed")]
    Csv(#[from] csv::Error),

    #[error("xlsx export failed")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("io error during export")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("{0}")]
    Validation(String),

    #[error("invalid multipart body")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("background task failed")]
    Task(#[from] tokio::task::JoinError),
}

impl HandlerError {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Input(_) | HandlerError::Validation(_) => StatusCode::BAD_REQUEST,
            HandlerError::Multipart(e) => e.status(),
            HandlerError::Export(_) | HandlerError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = crate::unpack_error(&self);

        if status.is_server_error() {
            tracing::error!(error = %detail, "request failed");
        } else {
            tracing::info!(error = %detail, "rejected request");
        }

        let body = ErrorResponse { error: detail };
        (status, Json(body)).into_response()
    }
}
