use crate::enums::{AdjustType, Frequency, PriceField};
use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Everything a price source needs to answer a history request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRequest {
    pub instruments: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub field: PriceField,
    pub adjust: AdjustType,
    pub frequency: Frequency,
}

/// How price history is requested: the series to read and how far around the
/// events to fetch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceSettings {
    /// The price field to analyse (e.g., "close").
    pub field: PriceField,
    /// The price-adjustment convention (e.g., "post").
    pub adjust: AdjustType,
    /// The bar frequency (e.g., "1d").
    pub frequency: Frequency,
    /// Business days of history fetched before the first and after the last event.
    pub padding_periods: u32,
}

impl Default for PriceSettings {
    fn default() -> Self {
        Self {
            field: PriceField::default(),
            adjust: AdjustType::default(),
            frequency: Frequency::default(),
            padding_periods: 20,
        }
    }
}

impl PriceSettings {
    /// A request for `instruments` over `[start, end]` with these settings.
    pub fn request(&self, instruments: Vec<String>, start: NaiveDate, end: NaiveDate) -> PriceRequest {
        PriceRequest {
            instruments,
            start,
            end,
            field: self.field,
            adjust: self.adjust,
            frequency: self.frequency,
        }
    }
}

/// A dates × instruments table of prices.
///
/// Dates are strictly ascending and unique so that an exact-date lookup yields a
/// row position that can be used to slice windows. Individual cells may be
/// missing (suspended trading, late listing, etc.).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    index: HashMap<NaiveDate, usize>,
    instruments: Vec<String>,
    columns: HashMap<String, usize>,
    values: Vec<Vec<Option<Decimal>>>,
}

impl PriceTable {
    /// Creates a table with the given row dates and no columns.
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self, CoreError> {
        let mut index = HashMap::with_capacity(dates.len());
        for (row, pair) in dates.windows(2).enumerate() {
            if pair[0] == pair[1] {
                return Err(CoreError::DuplicateDate(pair[1]));
            }
            if pair[0] > pair[1] {
                return Err(CoreError::InvalidInput(
                    "price dates".to_string(),
                    format!("{} follows {} at row {}", pair[1], pair[0], row + 1),
                ));
            }
        }
        for (row, date) in dates.iter().enumerate() {
            index.insert(*date, row);
        }

        Ok(Self {
            dates,
            index,
            ..Self::default()
        })
    }

    /// Adds a column. `values` must line up with the table's dates.
    pub fn insert_column(
        &mut self,
        instrument: impl Into<String>,
        values: Vec<Option<Decimal>>,
    ) -> Result<(), CoreError> {
        let instrument = instrument.into();
        if self.columns.contains_key(&instrument) {
            return Err(CoreError::DuplicateColumn(instrument));
        }
        if values.len() != self.dates.len() {
            return Err(CoreError::ColumnLength {
                column: instrument,
                expected: self.dates.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(instrument.clone(), self.instruments.len());
        self.instruments.push(instrument);
        self.values.push(values);
        Ok(())
    }

    /// Builder-style variant of [`PriceTable::insert_column`].
    pub fn with_column(
        mut self,
        instrument: impl Into<String>,
        values: Vec<Option<Decimal>>,
    ) -> Result<Self, CoreError> {
        self.insert_column(instrument, values)?;
        Ok(self)
    }

    /// Assembles a table from long-format `(instrument, date, price)` rows, as a
    /// database returns them. The date index is the union of all dates seen;
    /// a later observation for the same cell replaces an earlier one.
    pub fn from_observations<S: AsRef<str>>(
        observations: impl IntoIterator<Item = (S, NaiveDate, Option<Decimal>)>,
    ) -> Self {
        let observations: Vec<(S, NaiveDate, Option<Decimal>)> = observations.into_iter().collect();
        let dates: Vec<NaiveDate> = observations
            .iter()
            .map(|(_, date, _)| *date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut table = Self {
            index: dates.iter().enumerate().map(|(row, date)| (*date, row)).collect(),
            dates,
            ..Self::default()
        };

        for (instrument, date, price) in observations {
            let instrument = instrument.as_ref();
            let column = match table.columns.get(instrument) {
                Some(&column) => column,
                None => {
                    table.columns.insert(instrument.to_string(), table.instruments.len());
                    table.instruments.push(instrument.to_string());
                    table.values.push(vec![None; table.dates.len()]);
                    table.instruments.len() - 1
                }
            };
            let row = table.index[&date];
            table.values[column][row] = price;
        }

        table
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Exact-date lookup of a row position.
    pub fn locate(&self, date: NaiveDate) -> Option<usize> {
        self.index.get(&date).copied()
    }

    pub fn column(&self, instrument: &str) -> Option<&[Option<Decimal>]> {
        self.columns
            .get(instrument)
            .map(|&column| self.values[column].as_slice())
    }

    pub fn has_instrument(&self, instrument: &str) -> bool {
        self.columns.contains_key(instrument)
    }

    /// A copy restricted to `instruments` and the inclusive date range. Requested
    /// instruments the table does not hold are left out.
    pub fn clip(&self, instruments: &[String], start: NaiveDate, end: NaiveDate) -> PriceTable {
        let rows: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(_, date)| **date >= start && **date <= end)
            .map(|(row, _)| row)
            .collect();

        let dates: Vec<NaiveDate> = rows.iter().map(|&row| self.dates[row]).collect();
        let mut clipped = Self {
            index: dates.iter().enumerate().map(|(row, date)| (*date, row)).collect(),
            dates,
            ..Self::default()
        };

        for instrument in instruments {
            if clipped.columns.contains_key(instrument) {
                continue;
            }
            if let Some(column) = self.column(instrument) {
                clipped.columns.insert(instrument.clone(), clipped.instruments.len());
                clipped.instruments.push(instrument.clone());
                clipped.values.push(rows.iter().map(|&row| column[row]).collect());
            }
        }

        clipped
    }
}
