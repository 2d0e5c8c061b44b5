use anyhow::Context;
use chrono::NaiveDate;
use core_types::{CoreError, EventTable, PriceTable};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// The on-disk shape of an event table.
///
/// ```json
/// { "instruments": ["AAPL", "MSFT"],
///   "rows": [{ "date": "2024-01-25", "events": ["MSFT"] }] }
/// ```
#[derive(Debug, Deserialize)]
pub struct EventsFile {
    pub instruments: Vec<String>,
    pub rows: Vec<EventRow>,
}

#[derive(Debug, Deserialize)]
pub struct EventRow {
    pub date: NaiveDate,
    #[serde(default)]
    pub events: Vec<String>,
}

impl EventsFile {
    pub fn into_table(self) -> Result<EventTable, CoreError> {
        let mut table = EventTable::new(self.instruments)?;
        for row in self.rows {
            table.insert_row(row.date, &row.events)?;
        }
        Ok(table)
    }
}

/// The on-disk shape of a wide price table: one column per instrument, each
/// aligned with `dates`. `null` marks a missing price.
#[derive(Debug, Deserialize)]
pub struct PricesFile {
    pub dates: Vec<NaiveDate>,
    pub columns: BTreeMap<String, Vec<Option<Decimal>>>,
}

impl PricesFile {
    pub fn into_table(self) -> Result<PriceTable, CoreError> {
        let mut table = PriceTable::new(self.dates)?;
        for (instrument, values) in self.columns {
            table.insert_column(instrument, values)?;
        }
        Ok(table)
    }
}

pub fn load_events(path: &Path) -> anyhow::Result<EventTable> {
    let file: EventsFile = read_json(path)?;
    let table = file
        .into_table()
        .with_context(|| format!("Invalid event table in {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        instruments = table.instruments().len(),
        rows = table.row_count(),
        events = table.event_count(),
        "Loaded event table"
    );
    Ok(table)
}

pub fn load_prices(path: &Path) -> anyhow::Result<PriceTable> {
    let file: PricesFile = read_json(path)?;
    let table = file
        .into_table()
        .with_context(|| format!("Invalid price table in {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        instruments = table.instruments().len(),
        rows = table.len(),
        "Loaded price table"
    );
    Ok(table)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))
}
