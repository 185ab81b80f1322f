use crate::data::{Error, Measurement, ParseError};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::{io::BufRead, str::FromStr};
use tracing::warn;

/// Every `;` and every space starts a new field, so a `date time` column
/// takes up two fields and pushes the temperature to index 3.
const DELIMITERS: &[char] = &[';', ' '];
const CITY: usize = 0;
const DATE: usize = 1;
const TEMPERATURE: usize = 3;
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Strict parse of a single line. Fields are looked up by fixed index, in the
/// order city, date, temperature; the first problem found is reported.
pub fn parse_line(line: &str) -> Result<Measurement, ParseError> {
    let fields: Vec<&str> = line.split(DELIMITERS).collect();
    let field = |index: usize| {
        fields
            .get(index)
            .copied()
            .ok_or(ParseError::MissingField(index))
    };
    let city = field(CITY)?;
    let date = parse_date(field(DATE)?)?;
    let temperature = parse_temperature(field(TEMPERATURE)?)?;
    Ok(Measurement {
        city: city.to_owned(),
        date,
        temperature,
    })
}

/// Only `YYYY-MM-DD` is a date; chrono alone would also take `2018-6-1` or `+2018-06-01`.
fn parse_date(field: &str) -> Result<NaiveDate, ParseError> {
    let iso_shaped = field.len() == 10
        && field.bytes().enumerate().all(|(index, byte)| match index {
            4 | 7 => byte == b'-',
            _ => byte.is_ascii_digit(),
        });
    if !iso_shaped {
        return Err(ParseError::InvalidDate(field.to_owned()));
    }
    NaiveDate::parse_from_str(field, DATE_FORMAT)
        .map_err(|_| ParseError::InvalidDate(field.to_owned()))
}

/// Plain or scientific notation, without digit separators. Values outside of
/// `Decimal`'s range don't parse.
fn parse_temperature(field: &str) -> Result<Decimal, ParseError> {
    if field.contains('_') {
        return Err(ParseError::InvalidTemperature(field.to_owned()));
    }
    Decimal::from_str(field)
        .or_else(|_| Decimal::from_scientific(field))
        .map_err(|_| ParseError::InvalidTemperature(field.to_owned()))
}

impl Measurement {
    /// Parses a line the way the aggregation strategies need it: an unreadable
    /// temperature is reported and replaced by `Measurement::empty()`, anything
    /// else wrong with the line is returned as an error.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        match parse_line(line) {
            Err(ParseError::InvalidTemperature(field)) => {
                warn!(%line, %field, "malformed temperature, counting line as empty");
                Ok(Self::empty())
            }
            result => result,
        }
    }
}

/// Lazily parses every line of `reader`. Lines are pulled only as the iterator
/// advances, so whatever has been written to the underlying file by then is seen.
pub fn measurements<R: BufRead>(reader: R) -> impl Iterator<Item = Result<Measurement, Error>> {
    reader.lines().enumerate().map(|(index, line)| {
        let line = line?;
        match Measurement::parse(&line) {
            Ok(measurement) => Ok(measurement),
            Err(source) => Err(Error::Parse {
                line_number: index + 1,
                line,
                source,
            }),
        }
    })
}

/// Something consuming `Measurement`s one at a time, as they are read.
pub trait MeasurementUser {
    fn use_measurement(&mut self, measurement: Measurement) -> Result<(), Error>;
}

/// Feeds every measurement of `reader` to `user`, stopping at the first fatal error,
/// whether it comes from reading or from `user`.
pub fn read_measurements<R: BufRead, U: MeasurementUser>(
    reader: R,
    user: &mut U,
) -> Result<(), Error> {
    for measurement in measurements(reader) {
        user.use_measurement(measurement?)?;
    }
    Ok(())
}
