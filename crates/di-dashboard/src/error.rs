//! Error types for the dashboard.

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use di_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// A configured column is not in the unified table.
    #[error("column '{column}' not found in the unified table")]
    MissingColumn { column: String },

    /// No metric is configured for the requested modality and kind.
    #[error("no {kind} metric configured for {modality}")]
    MissingMetric { modality: String, kind: String },

    #[error("unknown chart '{name}'")]
    UnknownChart { name: String },

    #[error("unknown metric '{name}'")]
    UnknownMetric { name: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Server(#[source] std::io::Error),

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for DashboardError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match self {
            DashboardError::UnknownChart { .. } => StatusCode::NOT_FOUND,
            DashboardError::MissingMetric { .. } | DashboardError::UnknownMetric { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
