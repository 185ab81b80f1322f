use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

pub type Year = i32;

/// Averages are always reported with this many fractional digits.
pub const AVERAGE_DIGITS: u32 = 2;

/// Aggregated output: for every city, one record per year it was measured in.
/// Records are sorted by year.
pub type CityAverages = HashMap<String, Vec<AverageRecord>>;

/// One line of the measurements file. The temperature is kept as an exact decimal
/// so that summing a whole year of values doesn't drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub city: String,
    pub date: NaiveDate,
    pub temperature: Decimal,
}

impl Measurement {
    /// Placeholder substituted for a line whose temperature couldn't be read.
    /// It is aggregated like any other measurement, under the empty city.
    pub fn empty() -> Self {
        Self {
            city: String::new(),
            date: NaiveDate::MIN,
            temperature: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AverageRecord {
    pub year: Year,
    pub average_temperature: Decimal,
}

/// Why a single line couldn't be turned into a `Measurement`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Field #{0} is missing")]
    MissingField(usize),
    #[error("Invalid date {0:?}")]
    InvalidDate(String),
    #[error("Invalid temperature {0:?}")]
    InvalidTemperature(String),
}

/// Failures that abort processing of a whole file.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line_number} ({line:?}): {source}")]
    Parse {
        line_number: usize,
        line: String,
        source: ParseError,
    },
    #[error("Sum of temperatures for {city:?} in {year} overflowed")]
    Overflow { city: String, year: Year },
}
