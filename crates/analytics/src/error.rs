use chrono::NaiveDate;
use core_types::CoreError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("The event table has no rows")]
    EmptyEventTable,

    #[error("The event table has no instrument columns")]
    NoInstruments,

    #[error("Invalid price window: start {start} is after end {end}")]
    InvalidPriceWindow { start: NaiveDate, end: NaiveDate },

    #[error("Price retrieval failed: {0}")]
    PriceSource(String),

    #[error("The price source returned no data between {start} and {end}")]
    NoPriceData { start: NaiveDate, end: NaiveDate },

    #[error("No prices are loaded; fetch prices before analysing")]
    PricesNotLoaded,

    #[error(
        "Window of {lookbackward} periods back and {lookforward} forward exceeds the {rows} price rows loaded"
    )]
    WindowTooWide {
        lookforward: usize,
        lookbackward: usize,
        rows: usize,
    },

    #[error("Benchmark '{0}' has no prices in the analysis window")]
    BenchmarkUnavailable(String),

    #[error("Core data error: {0}")]
    Core(#[from] CoreError),
}

/// Why a single event could not be turned into a return series.
///
/// These never abort an aggregation: the event is skipped and recorded.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SliceError {
    #[error("event date {date} is not in the price index")]
    DateNotFound { date: NaiveDate },

    #[error("instrument '{instrument}' is missing from the price table (event row {event_row})")]
    InstrumentMissing { instrument: String, event_row: usize },

    #[error("no price for '{instrument}' at event row {event_row}")]
    MissingAnchorPrice { instrument: String, event_row: usize },

    #[error("price for '{instrument}' at event row {event_row} is zero")]
    ZeroAnchorPrice { instrument: String, event_row: usize },
}
