use crate::error::AnalyticsError;
use chrono::NaiveDate;
use core_types::calendar::offset_business_days;
use core_types::{EventTable, PriceRequest, PriceTable};

/// The price-retrieval collaborator.
///
/// Implementations must return a table whose dates can be located exactly;
/// instruments or dates they cannot supply are simply absent. Completeness is
/// not checked here: events without usable prices are skipped later.
pub trait PriceSource {
    fn fetch(&self, request: &PriceRequest) -> Result<PriceTable, AnalyticsError>;
}

/// Serves requests from a table that is already in memory.
///
/// The field, adjustment and frequency of a request are not interpreted: the
/// table is assumed to hold the series the caller wants.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPriceSource {
    table: PriceTable,
}

impl InMemoryPriceSource {
    pub fn new(table: PriceTable) -> Self {
        Self { table }
    }
}

impl PriceSource for InMemoryPriceSource {
    fn fetch(&self, request: &PriceRequest) -> Result<PriceTable, AnalyticsError> {
        if request.start > request.end {
            return Err(AnalyticsError::InvalidPriceWindow {
                start: request.start,
                end: request.end,
            });
        }

        let clipped = self.table.clip(&request.instruments, request.start, request.end);
        tracing::debug!(
            requested = request.instruments.len(),
            served = clipped.instruments().len(),
            rows = clipped.len(),
            "Served prices from memory"
        );
        Ok(clipped)
    }
}

/// The `[start, end]` date range of price history needed for `events`:
/// `padding_periods` business days before the first row and after the last.
pub fn padded_window(
    events: &EventTable,
    padding_periods: u32,
) -> Result<(NaiveDate, NaiveDate), AnalyticsError> {
    let (Some(first), Some(last)) = (events.first_date(), events.last_date()) else {
        return Err(AnalyticsError::EmptyEventTable);
    };
    let padding = i64::from(padding_periods);
    Ok((
        offset_business_days(first, -padding)?,
        offset_business_days(last, padding)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{AdjustType, Frequency, PriceField};
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn request(instruments: &[&str], start: NaiveDate, end: NaiveDate) -> PriceRequest {
        PriceRequest {
            instruments: instruments.iter().map(|s| s.to_string()).collect(),
            start,
            end,
            field: PriceField::Close,
            adjust: AdjustType::Post,
            frequency: Frequency::Daily,
        }
    }

    #[test]
    fn padded_window_uses_business_days() {
        let mut events = EventTable::new(["A"]).unwrap();
        events.mark(d(2024, 3, 4), "A").unwrap();
        events.mark(d(2024, 3, 8), "A").unwrap();

        let (start, end) = padded_window(&events, 20).unwrap();
        assert_eq!(start, d(2024, 2, 5));
        assert_eq!(end, d(2024, 4, 5));
    }

    #[test]
    fn padded_window_needs_events() {
        let events = EventTable::new(["A"]).unwrap();
        assert!(matches!(
            padded_window(&events, 20),
            Err(AnalyticsError::EmptyEventTable)
        ));
    }

    #[test]
    fn in_memory_source_clips_to_the_request() {
        let table = PriceTable::new(vec![d(2024, 1, 2), d(2024, 1, 3)])
            .unwrap()
            .with_column("A", vec![Some(dec!(1)), Some(dec!(2))])
            .unwrap();
        let source = InMemoryPriceSource::new(table);

        let served = source
            .fetch(&request(&["A", "B"], d(2024, 1, 3), d(2024, 1, 31)))
            .unwrap();
        assert_eq!(served.dates(), &[d(2024, 1, 3)]);
        assert!(served.has_instrument("A"));
        assert!(!served.has_instrument("B"));
    }

    #[test]
    fn in_memory_source_rejects_inverted_ranges() {
        let source = InMemoryPriceSource::default();
        assert!(matches!(
            source.fetch(&request(&["A"], d(2024, 2, 1), d(2024, 1, 1))),
            Err(AnalyticsError::InvalidPriceWindow { .. })
        ));
    }
}
