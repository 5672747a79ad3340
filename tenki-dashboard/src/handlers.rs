use axum::Json;
use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;
use serde_json::{Value, json};
use tenki_core::{Category, SummaryStats, filter_readings};

use crate::AppState;
use crate::errors::{DashboardError, PageError};
use crate::render::{self, PageView};

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// Search term.
    pub q: Option<String>,
    pub category: Option<String>,
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, PageError> {
    let fail = |error| PageError { title: state.title.clone(), error };

    let category = match query.category.as_deref().filter(|c| !c.is_empty()) {
        Some(raw) => raw
            .parse::<Category>()
            .map_err(|e| fail(DashboardError::BadQuery(e.to_string())))?,
        None => Category::All,
    };
    let term = query.q.unwrap_or_default();

    let rows = state
        .gateway
        .select_all()
        .await
        .map_err(|e| fail(DashboardError::Load(e)))?;

    let shown = filter_readings(&rows, &term, category);
    let stats = SummaryStats::from_readings(&shown);
    tracing::debug!(loaded = rows.len(), shown = shown.len(), %category, "dashboard view");

    Ok(Html(render::page(&PageView {
        title: &state.title,
        term: &term,
        category,
        rows: &shown,
        stats: &stats,
        total: rows.len(),
    })))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
