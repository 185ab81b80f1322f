//! Per city, per year average temperatures out of a delimited measurements file.
//!
//! ```no_run
//! use average_temperature::{Strategy, TemperatureFileProcessor};
//!
//! let processor = TemperatureFileProcessor::new("measurements.txt");
//! let averages = processor.process(Strategy::Grouping)?;
//! # Ok::<(), average_temperature::Error>(())
//! ```

mod compute;
mod data;
mod processor;
mod read;
mod write;

pub use compute::Strategy;
pub use data::{
    AverageRecord, CityAverages, Error, Measurement, ParseError, Year, AVERAGE_DIGITS,
};
pub use processor::TemperatureFileProcessor;
pub use read::{measurements, parse_line, read_measurements, MeasurementUser};
pub use write::write_averages;
