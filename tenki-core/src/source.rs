use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::debug;

use crate::{
    config::SourceConfig,
    error::{FetchError, truncate_body},
};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "ja,en-US;q=0.7,en;q=0.3";

/// Something that can hand back the HTML of the source page.
#[async_trait]
pub trait PageSource: Send + Sync + Debug {
    async fn fetch_page(&self) -> Result<String, FetchError>;
}

/// Fetches the source page over HTTP. One attempt, no retry.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    url: String,
    http: Client,
}

impl HttpPageSource {
    pub fn new(config: &SourceConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(FetchError::Request)?;

        Ok(Self { url: config.url.clone(), http })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch_page(&self) -> Result<String, FetchError> {
        debug!(url = %self.url, "fetching source page");

        let res = self.http.get(&self.url).send().await.map_err(FetchError::Request)?;

        let status = res.status();
        // The page is UTF-8 regardless of what the headers claim.
        let bytes = res.bytes().await.map_err(FetchError::Request)?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        debug!(bytes = body.len(), "source page received");
        Ok(body)
    }
}

/// Serves a fixed page; used for tests and offline runs.
#[derive(Debug, Clone)]
pub struct StaticPageSource {
    html: String,
}

impl StaticPageSource {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

#[async_trait]
impl PageSource for StaticPageSource {
    async fn fetch_page(&self) -> Result<String, FetchError> {
        Ok(self.html.clone())
    }
}
