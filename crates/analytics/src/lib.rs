//! # Event Study Analytics
//!
//! This crate measures how instruments' prices behave around discrete events,
//! such as earnings dates or index inclusions, and aggregates that behavior
//! across all events.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Pure, synchronous calculation. Where prices come from and
//!   how results are shown are behind the `PriceSource` and `Renderer` traits.
//! - **Per-Event Isolation:** An event whose window cannot be sliced is skipped
//!   and recorded on the resulting table; it never aborts the batch.
//! - **Fixed-Point Returns:** Returns are `Decimal`s, so the event-day return is
//!   exactly zero and hand-computed expectations compare exactly.
//!
//! ## Public API
//!
//! - `EventAnalyzer`: Builds the event list, fetches prices, and computes absolute
//!   and relative performance and the event distribution.
//! - `PerformanceTable` / `PerformanceSummary`: Events × day-offsets returns and
//!   their per-offset mean and win rate.
//! - `PriceSource`, `InMemoryPriceSource`: The price-retrieval seam.
//! - `Renderer`, `LogRenderer`: The presentation seam.
//! - `AnalyticsError`, `SliceError`: Batch-level and per-event failures.

// Declare the modules that constitute this crate.
pub mod analyzer;
pub mod distribution;
pub mod error;
pub mod render;
pub mod source;
pub mod table;
pub mod window;

// Re-export the key components to create a clean, public-facing API.
pub use analyzer::EventAnalyzer;
pub use distribution::{count_events, Grouping};
pub use error::{AnalyticsError, SliceError};
pub use render::{EventCounts, LogRenderer, OffsetSeries, Renderer};
pub use source::{padded_window, InMemoryPriceSource, PriceSource};
pub use table::{PerformanceRow, PerformanceSummary, PerformanceTable, SkippedEvent};
pub use window::{EventReturns, Window, WindowBounds};
