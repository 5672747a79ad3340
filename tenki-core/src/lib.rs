//! Core library for `tenki`.
//!
//! This crate defines:
//! - Configuration & gateway credentials handling
//! - Fetching the source page and extracting a reading from it
//! - The persistence gateway abstraction (hosted and in-memory)
//! - Dashboard view logic (date formatting, filtering, summary stats)
//!
//! It is used by `tenki-cli` and `tenki-dashboard`.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod model;
pub mod scrape;
pub mod source;

pub use config::{Config, GatewayConfig, SourceConfig};
pub use dashboard::{Category, SummaryStats, filter_readings, format_date_time};
pub use error::{FetchError, GatewayError, ParseError, RunError, ScrapeError};
pub use extract::Extraction;
pub use gateway::{MemoryGateway, ReadingGateway, SupabaseGateway, gateway_from_config};
pub use model::{Field, NewReading, Reading};
pub use scrape::{Extractor, RunOptions, RunOutcome, run_once};
pub use source::{HttpPageSource, PageSource, StaticPageSource};
