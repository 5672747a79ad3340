//! Extraction of a reading from the source page.
//!
//! The page shows two similar sets of figures: an hourly forecast
//! (integers) and the real-time observation section (decimals, class
//! `observedValue`). Temperature and wind are read only from the
//! observation section. Precipitation is not part of that section and is
//! taken from the hourly data elsewhere on the page.
//!
//! Each step is a separate function so a layout change on the source
//! side breaks one unit, not the pipeline.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::{
    error::ParseError,
    model::{Field, NewReading},
};

static OBSERVED_VALUE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".observedValue").expect("valid selector"));
static OBS_BLOCK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".obs_block").expect("valid selector"));

// Label, then anything that is not a digit or a sign, then the number.
static TEMPERATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"気温[^0-9\-]*(-?[0-9]+(?:\.[0-9]+)?)").expect("valid temperature regex")
});
static WIND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*m/s").expect("valid wind regex"));
static PRECIPITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*ミリ").expect("valid precipitation regex")
});
static OBSERVATION_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{1,2}):([0-9]{2})\s*時点").expect("valid observation time regex")
});

/// Values pulled from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub temperature: String,
    pub wind: String,
    pub precipitation: String,

    /// Local time printed next to the observation ("22:40時点"), if any.
    pub observed_at: Option<NaiveTime>,
}

impl Extraction {
    pub fn to_new_reading(&self) -> NewReading {
        NewReading::new(&self.temperature, &self.wind, &self.precipitation)
    }
}

/// Extracts all fields from a page, failing on the first missing one.
pub fn extract_reading(html: &str) -> Result<Extraction, ParseError> {
    let document = Html::parse_document(html);

    let observation = observation_text(&document)?;
    let temperature =
        extract_temperature(&observation).ok_or(ParseError::FieldMissing(Field::Temperature))?;
    let wind = extract_wind(&observation).ok_or(ParseError::FieldMissing(Field::Wind))?;

    let page_text = element_text(document.root_element());
    let precipitation = extract_precipitation(&page_text)
        .ok_or(ParseError::FieldMissing(Field::Precipitation))?;

    Ok(Extraction {
        temperature: temperature.to_string(),
        wind: wind.to_string(),
        precipitation: precipitation.to_string(),
        observed_at: extract_observation_time(&observation),
    })
}

/// Returns the text of the real-time observation section.
pub fn locate_observation_block(html: &str) -> Result<String, ParseError> {
    observation_text(&Html::parse_document(html))
}

fn observation_text(document: &Html) -> Result<String, ParseError> {
    if let Some(section) = document.select(&OBSERVED_VALUE).next() {
        return Ok(element_text(section));
    }

    // Older layouts only carry the per-measurement tiles.
    let tiles: Vec<String> = document.select(&OBS_BLOCK).map(element_text).collect();
    if tiles.is_empty() {
        return Err(ParseError::ObservationBlockMissing);
    }
    Ok(tiles.join(" "))
}

// Text nodes are joined with a space so figures in adjacent nodes never fuse.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn extract_temperature(text: &str) -> Option<&str> {
    first_capture(&TEMPERATURE, text)
}

pub fn extract_wind(text: &str) -> Option<&str> {
    first_capture(&WIND, text)
}

pub fn extract_precipitation(text: &str) -> Option<&str> {
    first_capture(&PRECIPITATION, text)
}

pub fn extract_observation_time(text: &str) -> Option<NaiveTime> {
    let caps = OBSERVATION_TIME.captures(text)?;
    let hour = caps[1].parse().ok()?;
    let minute = caps[2].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn first_capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}
