use crate::{
    data::{AverageRecord, CityAverages, Error, Measurement, Year, AVERAGE_DIGITS},
    read::{measurements, read_measurements, MeasurementUser},
};
use chrono::Datelike;
use rust_decimal::{Decimal, RoundingStrategy};
use std::{collections::HashMap, io::BufRead};
use tracing::debug;

/// The two ways of aggregating a measurements file. They read the input the
/// same way and must always agree on the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Strategy {
    /// Group every temperature by city then year, and reduce each group.
    Grouping,
    /// Keep a running sum and count per city and year.
    Accumulator,
}

impl Strategy {
    /// Reads `reader` to its end, once, and averages its temperatures per city and year.
    pub fn process<R: BufRead>(self, reader: R) -> Result<CityAverages, Error> {
        let averages = match self {
            Strategy::Grouping => group_and_average(reader)?,
            Strategy::Accumulator => {
                let mut accumulator = Accumulator::new();
                read_measurements(reader, &mut accumulator)?;
                accumulator.into_averages()
            }
        };
        debug!(strategy = ?self, cities = averages.len(), "aggregated measurements");
        Ok(averages)
    }
}

/// `sum / count` rounded up (away from zero) to `AVERAGE_DIGITS` fractional digits.
pub(crate) fn average(sum: Decimal, count: usize) -> Decimal {
    let mut average = (sum / Decimal::from(count))
        .round_dp_with_strategy(AVERAGE_DIGITS, RoundingStrategy::AwayFromZero);
    average.rescale(AVERAGE_DIGITS);
    average
}

fn year_records(averages: impl Iterator<Item = (Year, Decimal)>) -> Vec<AverageRecord> {
    let mut records: Vec<AverageRecord> = averages
        .map(|(year, average_temperature)| AverageRecord {
            year,
            average_temperature,
        })
        .collect();
    records.sort_unstable_by_key(|record| record.year);
    records
}

fn group_and_average<R: BufRead>(reader: R) -> Result<CityAverages, Error> {
    let grouped = measurements(reader).try_fold(
        HashMap::<String, HashMap<Year, Vec<Decimal>>>::new(),
        |mut cities, measurement| {
            let Measurement {
                city,
                date,
                temperature,
            } = measurement?;
            cities
                .entry(city)
                .or_default()
                .entry(date.year())
                .or_default()
                .push(temperature);
            Ok::<_, Error>(cities)
        },
    )?;
    grouped
        .into_iter()
        .map(|(city, years)| {
            let averages = years
                .into_iter()
                .map(|(year, temperatures)| {
                    let sum = temperatures
                        .iter()
                        .try_fold(Decimal::ZERO, |sum, temperature| sum.checked_add(*temperature))
                        .ok_or_else(|| Error::Overflow {
                            city: city.clone(),
                            year,
                        })?;
                    Ok::<_, Error>((year, average(sum, temperatures.len())))
                })
                .collect::<Result<Vec<_>, Error>>()?;
            Ok::<_, Error>((city, year_records(averages.into_iter())))
        })
        .collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct YearTotal {
    sum: Decimal,
    count: usize,
}

/// Running totals, created afresh for each pass over a file.
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    cities: HashMap<String, HashMap<Year, YearTotal>>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_averages(self) -> CityAverages {
        self.cities
            .into_iter()
            .map(|(city, years)| {
                let records = year_records(
                    years
                        .into_iter()
                        .map(|(year, total)| (year, average(total.sum, total.count))),
                );
                (city, records)
            })
            .collect()
    }
}

impl MeasurementUser for Accumulator {
    fn use_measurement(&mut self, measurement: Measurement) -> Result<(), Error> {
        let Measurement {
            city,
            date,
            temperature,
        } = measurement;
        let year = date.year();
        let total = self
            .cities
            .get(&city)
            .and_then(|years| years.get(&year))
            .copied()
            .unwrap_or_default();
        let sum = total
            .sum
            .checked_add(temperature)
            .ok_or_else(|| Error::Overflow {
                city: city.clone(),
                year,
            })?;
        self.cities.entry(city).or_default().insert(
            year,
            YearTotal {
                sum,
                count: total.count + 1,
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{average, Accumulator, Strategy};
    use crate::{
        data::{AverageRecord, Error, Measurement, ParseError},
        read::MeasurementUser,
    };
    use chrono::{Datelike, NaiveDate};
    use rust_decimal_macros::dec;

    const STRATEGIES: [Strategy; 2] = [Strategy::Grouping, Strategy::Accumulator];

    const MEASUREMENTS: &str = "\
Warszawa;2018-06-01;ignored;10.00
Warszawa;2018-06-02;ignored;17.06
Warszawa;2019-01-15 07:30:00.000;-4.2
Kraków;2018-03-03;x;5
Kraków;2018-03-04;x;5
Kraków;2018-03-05;x;5.01
Wrocław;2020-12-31 23:59:59.999;-0.01
Wrocław;2020-12-30 23:59:59.999;-0.02
Wrocław;2020-12-29 23:59:59.999;-0.02
";

    #[test]
    fn test_average_rounds_up() {
        assert_eq!(average(dec!(30.01), 3), dec!(10.01));
        assert_eq!(average(dec!(27.06), 2), dec!(13.53));
        assert_eq!(average(dec!(1), 3), dec!(0.34));
        assert_eq!(average(dec!(-30.01), 3), dec!(-10.01));
    }

    #[test]
    fn test_average_has_two_digits() {
        assert_eq!(average(dec!(20), 2).to_string(), "10.00");
        assert_eq!(average(dec!(0), 1).to_string(), "0.00");
    }

    #[test]
    fn test_accumulator() {
        let mut accumulator = Accumulator::new();
        for (day, temperature) in [(1, dec!(10.0)), (2, dec!(10.0)), (3, dec!(10.01))] {
            accumulator.use_measurement(Measurement {
                city: "Poznań".to_owned(),
                date: NaiveDate::from_ymd_opt(2021, 7, day).unwrap(),
                temperature,
            })
            .unwrap();
        }
        let averages = accumulator.into_averages();
        assert_eq!(
            averages["Poznań"],
            [AverageRecord {
                year: 2021,
                average_temperature: dec!(10.01),
            }]
        );
    }

    #[test]
    fn test_two_measurements_same_year() {
        let input = "\
Warszawa;2018-06-01;ignored;10.00
Warszawa;2018-06-02;ignored;17.06
";
        for strategy in STRATEGIES {
            let averages = strategy.process(input.as_bytes()).unwrap();
            assert_eq!(averages.len(), 1);
            assert_eq!(
                averages["Warszawa"],
                [AverageRecord {
                    year: 2018,
                    average_temperature: dec!(13.53),
                }]
            );
        }
    }

    #[test]
    fn test_every_city_and_year() {
        for strategy in STRATEGIES {
            let averages = strategy.process(MEASUREMENTS.as_bytes()).unwrap();
            assert_eq!(averages.len(), 3);
            assert_eq!(
                averages["Warszawa"],
                [
                    AverageRecord {
                        year: 2018,
                        average_temperature: dec!(13.53),
                    },
                    AverageRecord {
                        year: 2019,
                        average_temperature: dec!(-4.20),
                    },
                ]
            );
            assert_eq!(
                averages["Kraków"],
                [AverageRecord {
                    year: 2018,
                    average_temperature: dec!(5.01),
                }]
            );
            assert_eq!(
                averages["Wrocław"],
                [AverageRecord {
                    year: 2020,
                    average_temperature: dec!(-0.02),
                }]
            );
        }
    }

    #[test]
    fn test_strategies_agree() {
        let grouping = Strategy::Grouping.process(MEASUREMENTS.as_bytes()).unwrap();
        let accumulator = Strategy::Accumulator
            .process(MEASUREMENTS.as_bytes())
            .unwrap();
        assert_eq!(grouping, accumulator);
    }

    #[test]
    fn test_malformed_temperature_is_kept_as_empty() {
        let input = "\
Gdańsk;2018-06-01;x;12.00
Gdańsk;2018-06-02;x;twelve
Gdańsk;2018-06-03;x;14.00
";
        for strategy in STRATEGIES {
            let averages = strategy.process(input.as_bytes()).unwrap();
            assert_eq!(
                averages["Gdańsk"],
                [AverageRecord {
                    year: 2018,
                    average_temperature: dec!(13.00),
                }]
            );
            assert_eq!(
                averages[""],
                [AverageRecord {
                    year: NaiveDate::MIN.year(),
                    average_temperature: dec!(0),
                }]
            );
        }
    }

    #[test]
    fn test_fatal_lines_abort() {
        let bad_date = "\
Łódź;2018-06-01;x;1.00
Łódź;2018/06/02;x;2.00
";
        let missing_temperature = "\
Łódź;2018-06-01;x;1.00
Łódź;2018-06-02;2.00
";
        for strategy in STRATEGIES {
            assert!(matches!(
                strategy.process(bad_date.as_bytes()),
                Err(Error::Parse {
                    line_number: 2,
                    source: ParseError::InvalidDate(_),
                    ..
                })
            ));
            assert!(matches!(
                strategy.process(missing_temperature.as_bytes()),
                Err(Error::Parse {
                    line_number: 2,
                    source: ParseError::MissingField(3),
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_overflowing_sum_aborts() {
        let input = "\
A;2018-01-01;x;79228162514264337593543950335
A;2018-01-02;x;79228162514264337593543950335
";
        for strategy in STRATEGIES {
            assert!(matches!(
                strategy.process(input.as_bytes()),
                Err(Error::Overflow { city, year: 2018 }) if city == "A"
            ));
        }
    }

    #[test]
    fn test_trailing_blank_line_aborts() {
        let input = "\
Łódź;2018-06-01;x;1.00

";
        for strategy in STRATEGIES {
            assert!(matches!(
                strategy.process(input.as_bytes()),
                Err(Error::Parse {
                    line_number: 2,
                    source: ParseError::MissingField(1),
                    ..
                })
            ));
        }
    }

    #[test]
    fn test_empty_input() {
        for strategy in STRATEGIES {
            assert!(strategy.process(&b""[..]).unwrap().is_empty());
        }
    }
}
