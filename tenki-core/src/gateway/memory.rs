use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};

use crate::{
    error::GatewayError,
    model::{NewReading, Reading},
};

use super::ReadingGateway;

/// In-process row store with the same contract as the hosted one.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    rows: Arc<RwLock<Vec<Reading>>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing rows, e.g. for dashboard tests.
    pub fn with_rows(rows: Vec<Reading>) -> Self {
        Self { rows: Arc::new(RwLock::new(rows)) }
    }

    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReadingGateway for MemoryGateway {
    async fn insert(&self, reading: &NewReading) -> Result<Reading, GatewayError> {
        reading.validate()?;

        // A poisoned lock only means a panicking writer; the rows are still whole.
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;

        let row = Reading {
            id,
            temperature: reading.temperature.clone(),
            wind: reading.wind.clone(),
            precipitation: reading.precipitation.clone(),
            created_at: reading.created_at.clone().unwrap_or_else(|| Utc::now().to_rfc3339()),
        };
        rows.push(row.clone());

        Ok(row)
    }

    async fn select_all(&self) -> Result<Vec<Reading>, GatewayError> {
        let mut rows = self.rows.read().unwrap_or_else(|e| e.into_inner()).clone();
        rows.sort_by(|a, b| {
            sort_key(&b.created_at)
                .cmp(&sort_key(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(rows)
    }
}

fn sort_key(created_at: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(created_at).ok()
}
