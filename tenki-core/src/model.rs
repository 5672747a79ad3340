use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").expect("valid decimal regex"));

/// One stored observation, as returned by the persistence gateway.
///
/// Measurements are kept as the literal scraped text so no precision is
/// lost between the page and the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    pub id: i64,
    pub temperature: String,
    pub wind: String,
    pub precipitation: String,
    pub created_at: String,
}

impl Reading {
    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Temperature => &self.temperature,
            Field::Wind => &self.wind,
            Field::Precipitation => &self.precipitation,
        }
    }
}

/// Row shape written to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReading {
    pub temperature: String,
    pub wind: String,
    pub precipitation: String,

    /// Absent means the gateway stamps the insertion time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl NewReading {
    pub fn new(
        temperature: impl Into<String>,
        wind: impl Into<String>,
        precipitation: impl Into<String>,
    ) -> Self {
        Self {
            temperature: temperature.into(),
            wind: wind.into(),
            precipitation: precipitation.into(),
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// Checks that every measurement is a plain decimal number.
    pub fn validate(&self) -> Result<(), GatewayError> {
        for field in Field::ALL {
            let value = match field {
                Field::Temperature => &self.temperature,
                Field::Wind => &self.wind,
                Field::Precipitation => &self.precipitation,
            };
            if !DECIMAL.is_match(value) {
                return Err(GatewayError::InvalidRow { field, value: value.clone() });
            }
        }
        Ok(())
    }
}

/// The three measurements a reading carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Temperature,
    Wind,
    Precipitation,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Temperature, Field::Wind, Field::Precipitation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Temperature => "temperature",
            Field::Wind => "wind",
            Field::Precipitation => "precipitation",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Field::Temperature => "°C",
            Field::Wind => "m/s",
            Field::Precipitation => "mm",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
