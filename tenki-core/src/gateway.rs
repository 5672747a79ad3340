use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;

use crate::{
    config::GatewayConfig,
    error::{ConfigError, GatewayError},
    model::{NewReading, Reading},
};

pub mod memory;
pub mod supabase;

pub use memory::MemoryGateway;
pub use supabase::SupabaseGateway;

/// Row store shared by the extractor (writes) and the dashboard (reads).
#[async_trait]
pub trait ReadingGateway: Send + Sync + Debug {
    /// Validates and writes one row, returning it as stored.
    async fn insert(&self, reading: &NewReading) -> Result<Reading, GatewayError>;

    /// All rows, newest `created_at` first.
    async fn select_all(&self) -> Result<Vec<Reading>, GatewayError>;
}

/// Construct the hosted gateway from config. Built once and shared.
pub fn gateway_from_config(
    config: &GatewayConfig,
) -> Result<Arc<dyn ReadingGateway>, ConfigError> {
    let config = config.require_credentials()?;
    let gateway = SupabaseGateway::new(config)?;
    Ok(Arc::new(gateway))
}
