use crate::data::{CityAverages, Year};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Serialize)]
struct AverageRow<'a> {
    city: &'a str,
    year: Year,
    average_temperature: Decimal,
}

/// Basic CSV exporter for `CityAverages`, cities sorted by name.
pub fn write_averages<W: std::io::Write>(
    writer: W,
    averages: &CityAverages,
) -> Result<(), anyhow::Error> {
    let mut cities: Vec<_> = averages.iter().collect();
    cities.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
    let mut wtr = csv::Writer::from_writer(writer);
    for (city, records) in cities {
        for record in records {
            wtr.serialize(AverageRow {
                city,
                year: record.year,
                average_temperature: record.average_temperature,
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}
