use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::GatewayConfig,
    error::{ConfigError, GatewayError, truncate_body},
    model::{NewReading, Reading},
};

use super::ReadingGateway;

/// PostgREST endpoint of a hosted Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseGateway {
    table_url: String,
    http: Client,
}

impl SupabaseGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let key = HeaderValue::from_str(&config.key).map_err(|_| ConfigError::InvalidKey)?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.key))
            .map_err(|_| ConfigError::InvalidKey)?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ConfigError::HttpClient)?;

        let table_url =
            format!("{}/rest/v1/{}", config.url.trim_end_matches('/'), config.table);

        Ok(Self { table_url, http })
    }

    pub fn table_url(&self) -> &str {
        &self.table_url
    }
}

#[async_trait]
impl ReadingGateway for SupabaseGateway {
    async fn insert(&self, reading: &NewReading) -> Result<Reading, GatewayError> {
        reading.validate()?;
        debug!(url = %self.table_url, ?reading, "inserting reading");

        let res = self
            .http
            .post(&self.table_url)
            .header("Prefer", "return=representation")
            .json(reading)
            .send()
            .await
            .map_err(GatewayError::Request)?;

        let rows: Vec<Reading> = decode(res).await?;
        rows.into_iter().next().ok_or(GatewayError::EmptyInsert)
    }

    async fn select_all(&self) -> Result<Vec<Reading>, GatewayError> {
        debug!(url = %self.table_url, "selecting readings");

        let res = self
            .http
            .get(&self.table_url)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await
            .map_err(GatewayError::Request)?;

        decode(res).await
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, GatewayError> {
    let status = res.status();
    let body = res.text().await.map_err(GatewayError::Request)?;

    if !status.is_success() {
        return Err(GatewayError::Status { status, body: truncate_body(&body) });
    }

    serde_json::from_str(&body).map_err(GatewayError::Decode)
}
