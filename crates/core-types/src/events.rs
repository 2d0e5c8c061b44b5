use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A single event: something happened to `instrument` on `date`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub instrument: String,
    pub date: NaiveDate,
}

impl Event {
    pub fn new(instrument: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            instrument: instrument.into(),
            date,
        }
    }
}

/// A sparse dates × instruments table of event markers.
///
/// Rows are kept in ascending date order and each row stores only the column
/// positions that carry a marker, so iterating events never touches empty
/// cells. A row may exist with no markers at all; it still counts as a day in
/// the by-day distribution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    instruments: Vec<String>,
    columns: HashMap<String, usize>,
    rows: BTreeMap<NaiveDate, BTreeSet<usize>>,
}

impl EventTable {
    /// Creates an empty table with the given instrument columns, in order.
    pub fn new<S: Into<String>>(instruments: impl IntoIterator<Item = S>) -> Result<Self, CoreError> {
        let mut table = Self::default();
        for instrument in instruments {
            table.add_instrument(instrument.into())?;
        }
        Ok(table)
    }

    fn add_instrument(&mut self, instrument: String) -> Result<usize, CoreError> {
        if self.columns.contains_key(&instrument) {
            return Err(CoreError::DuplicateColumn(instrument));
        }
        let position = self.instruments.len();
        self.columns.insert(instrument.clone(), position);
        self.instruments.push(instrument);
        Ok(position)
    }

    /// Inserts a full row. `instruments` lists the columns marked on `date`;
    /// an empty slice inserts a row with no events.
    pub fn insert_row<S: AsRef<str>>(
        &mut self,
        date: NaiveDate,
        instruments: &[S],
    ) -> Result<(), CoreError> {
        if self.rows.contains_key(&date) {
            return Err(CoreError::DuplicateDate(date));
        }
        let mut marked = BTreeSet::new();
        for instrument in instruments {
            let instrument = instrument.as_ref();
            let column = *self
                .columns
                .get(instrument)
                .ok_or_else(|| CoreError::UnknownInstrument(instrument.to_string()))?;
            marked.insert(column);
        }
        self.rows.insert(date, marked);
        Ok(())
    }

    /// Marks a single event, creating the row if needed.
    pub fn mark(&mut self, date: NaiveDate, instrument: &str) -> Result<(), CoreError> {
        let column = *self
            .columns
            .get(instrument)
            .ok_or_else(|| CoreError::UnknownInstrument(instrument.to_string()))?;
        self.rows.entry(date).or_default().insert(column);
        Ok(())
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next_back().copied()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The number of markers in the table.
    pub fn event_count(&self) -> usize {
        self.rows.values().map(BTreeSet::len).sum()
    }

    pub fn contains(&self, date: NaiveDate, instrument: &str) -> bool {
        match (self.rows.get(&date), self.columns.get(instrument)) {
            (Some(row), Some(column)) => row.contains(column),
            _ => false,
        }
    }

    /// Every marker as an `Event`, in row order then column order.
    pub fn events(&self) -> impl Iterator<Item = Event> + '_ {
        self.rows.iter().flat_map(move |(date, columns)| {
            columns
                .iter()
                .map(move |&column| Event::new(self.instruments[column].clone(), *date))
        })
    }

    /// The number of markers on each row, in row order.
    pub fn row_counts(&self) -> impl Iterator<Item = (NaiveDate, usize)> + '_ {
        self.rows.iter().map(|(date, columns)| (*date, columns.len()))
    }
}
