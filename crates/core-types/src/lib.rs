//! # Core Types
//!
//! Layer 0 of the workspace: the plain data structures every other crate speaks
//! in. No I/O, no logging setup, no knowledge of where prices come from.

pub mod calendar;
pub mod enums;
pub mod error;
pub mod events;
pub mod prices;

// Re-export the core types to provide a clean public API.
pub use enums::{AdjustType, Frequency, PriceField};
pub use error::CoreError;
pub use events::{Event, EventTable};
pub use prices::{PriceRequest, PriceSettings, PriceTable};
