//! View logic for the dashboard: date formatting, search filtering and
//! summary figures. Everything here works on rows that are already
//! loaded; nothing re-queries the gateway.

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::model::{Field, Reading};

static DATE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})[T ]([0-9]{2}):([0-9]{2})")
        .expect("valid date regex")
});

/// Renders `YYYY-MM-DD[T ]HH:MM...` as `YYYY/MM/DD HH:MM` from the literal
/// digits, with no timezone conversion. Anything else comes back unchanged.
pub fn format_date_time(value: &str) -> String {
    match DATE_TIME.captures(value) {
        Some(c) => format!("{}/{}/{} {}:{}", &c[1], &c[2], &c[3], &c[4], &c[5]),
        None => value.to_string(),
    }
}

/// Which column a search applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Category {
    #[default]
    All,
    Date,
    Temperature,
    Wind,
    Precipitation,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Date => "date",
            Category::Temperature => "temperature",
            Category::Wind => "wind",
            Category::Precipitation => "precipitation",
        }
    }

    pub const fn all() -> &'static [Category] {
        &[
            Category::All,
            Category::Date,
            Category::Temperature,
            Category::Wind,
            Category::Precipitation,
        ]
    }

    fn matches(&self, reading: &Reading, needle: &str) -> bool {
        let contains = |hay: &str| hay.to_lowercase().contains(needle);
        let date = || contains(&format_date_time(&reading.created_at));

        match self {
            Category::All => date() || Field::ALL.iter().any(|f| contains(reading.field(*f))),
            Category::Date => date(),
            Category::Temperature => contains(&reading.temperature),
            Category::Wind => contains(&reading.wind),
            Category::Precipitation => contains(&reading.precipitation),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lower = value.trim().to_lowercase();

        Category::all().iter().copied().find(|c| c.as_str() == lower).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown category '{value}'. Supported categories: all, date, temperature, wind, precipitation."
            )
        })
    }
}

/// Rows whose selected column contains `term`, ignoring case. An empty
/// term keeps every row. Input order is preserved.
pub fn filter_readings<'a>(
    readings: &'a [Reading],
    term: &str,
    category: Category,
) -> Vec<&'a Reading> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return readings.iter().collect();
    }

    readings.iter().filter(|r| category.matches(r, &needle)).collect()
}

/// Min / max / mean of one measurement over the rows that parse as numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub samples: usize,
}

impl FieldStats {
    fn collect<'a>(values: impl Iterator<Item = &'a str>) -> Option<Self> {
        let nums: Vec<f64> = values.filter_map(|v| v.trim().parse::<f64>().ok()).collect();
        if nums.is_empty() {
            return None;
        }

        let min = nums.iter().copied().fold(f64::INFINITY, f64::min);
        let max = nums.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = nums.iter().sum::<f64>() / nums.len() as f64;

        Some(Self { min, max, mean, samples: nums.len() })
    }
}

/// Figures shown above the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,

    /// Formatted `created_at` of the first (newest) row.
    pub latest: Option<String>,

    pub temperature: Option<FieldStats>,
    pub wind: Option<FieldStats>,
    pub precipitation: Option<FieldStats>,
}

impl SummaryStats {
    pub fn from_readings(readings: &[&Reading]) -> Self {
        let stats = |field: Field| FieldStats::collect(readings.iter().map(|r| r.field(field)));

        Self {
            count: readings.len(),
            latest: readings.first().map(|r| format_date_time(&r.created_at)),
            temperature: stats(Field::Temperature),
            wind: stats(Field::Wind),
            precipitation: stats(Field::Precipitation),
        }
    }

    pub fn field(&self, field: Field) -> Option<&FieldStats> {
        match field {
            Field::Temperature => self.temperature.as_ref(),
            Field::Wind => self.wind.as_ref(),
            Field::Precipitation => self.precipitation.as_ref(),
        }
    }
}
