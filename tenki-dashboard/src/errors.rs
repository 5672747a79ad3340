use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tenki_core::GatewayError;
use thiserror::Error;

use crate::render;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("{0}")]
    BadQuery(String),
    #[error("could not load readings: {0}")]
    Load(#[from] GatewayError),
}

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            DashboardError::BadQuery(_) => StatusCode::BAD_REQUEST,
            DashboardError::Load(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Errors still render the page, with the message in place of the table.
pub struct PageError {
    pub title: String,
    pub error: DashboardError,
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self.error, "dashboard view failed");
        let body = render::error_page(&self.title, &self.error.to_string());
        (self.error.status(), Html(body)).into_response()
    }
}
