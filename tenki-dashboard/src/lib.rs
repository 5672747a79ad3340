//! Web dashboard over the stored readings.
//!
//! A single server-rendered page: every view loads the rows once through
//! the gateway, then filters and summarises them in memory.

use std::sync::Arc;

use tenki_core::ReadingGateway;

pub mod errors;
pub mod handlers;
pub mod render;
pub mod routes;
pub mod shutdown;

#[derive(Debug, Clone)]
pub struct AppState {
    pub gateway: Arc<dyn ReadingGateway>,
    pub title: String,
}

impl AppState {
    pub fn new(gateway: Arc<dyn ReadingGateway>) -> Self {
        Self { gateway, title: "Saitama weather".to_string() }
    }
}
