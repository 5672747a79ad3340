use chrono::{DateTime, Days, FixedOffset, NaiveTime, Utc};
use tracing::{info, warn};

use crate::{
    config::SourceConfig,
    error::{RunError, ScrapeError},
    extract::{Extraction, extract_reading},
    gateway::ReadingGateway,
    model::{NewReading, Reading},
    source::PageSource,
};

/// Fetches the source page and turns it into one reading.
#[derive(Debug, Clone)]
pub struct Extractor<S> {
    source: S,
}

impl<S: PageSource> Extractor<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn scrape(&self) -> Result<Extraction, ScrapeError> {
        let html = self.source.fetch_page().await?;
        Ok(extract_reading(&html)?)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Extract and report, but write nothing.
    pub dry_run: bool,

    /// Offset used to turn the page's observation time into a timestamp.
    /// `None` leaves `created_at` to the gateway.
    pub stamp_offset: Option<FixedOffset>,
}

impl RunOptions {
    pub fn from_config(config: &SourceConfig) -> Self {
        let stamp_offset = if config.stamp_observation_time {
            config.utc_offset().ok()
        } else {
            None
        };

        Self { dry_run: false, stamp_offset }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub extraction: Extraction,
    pub row: NewReading,

    /// `None` on a dry run.
    pub stored: Option<Reading>,
}

/// One scrape-and-store run: fetch, parse, write one row.
pub async fn run_once<S: PageSource>(
    extractor: &Extractor<S>,
    gateway: &dyn ReadingGateway,
    options: RunOptions,
) -> Result<RunOutcome, RunError> {
    let extraction = extractor.scrape().await.inspect_err(|e| match e {
        ScrapeError::Fetch(err) => warn!(error = %err, "source page unavailable"),
        ScrapeError::Parse(err) => warn!(error = %err, "source page changed shape"),
    })?;

    info!(
        temperature = %extraction.temperature,
        wind = %extraction.wind,
        precipitation = %extraction.precipitation,
        observed_at = ?extraction.observed_at,
        "extracted reading"
    );

    let mut row = extraction.to_new_reading();
    if let (Some(offset), Some(time)) = (options.stamp_offset, extraction.observed_at) {
        row.created_at = Some(observation_timestamp(Utc::now(), offset, time).to_rfc3339());
    }

    if options.dry_run {
        info!("dry run, nothing written");
        return Ok(RunOutcome { extraction, row, stored: None });
    }

    let stored = gateway.insert(&row).await.inspect_err(|e| {
        warn!(error = %e, "failed to store reading");
    })?;
    info!(id = stored.id, created_at = %stored.created_at, "reading stored");

    Ok(RunOutcome { extraction, row, stored: Some(stored) })
}

/// The most recent instant at the source showing the time printed on the
/// page: today, or yesterday when that time hasn't come yet today.
pub fn observation_timestamp(
    now: DateTime<Utc>,
    offset: FixedOffset,
    time: NaiveTime,
) -> DateTime<FixedOffset> {
    let local_now = now.with_timezone(&offset);
    let mut naive = local_now.date_naive().and_time(time);
    if naive > local_now.naive_local() {
        naive = naive.checked_sub_days(Days::new(1)).unwrap_or(naive);
    }
    // A fixed offset maps every local time to exactly one instant.
    naive.and_local_timezone(offset).single().unwrap_or(local_now)
}
