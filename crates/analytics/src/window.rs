use crate::error::SliceError;
use chrono::NaiveDate;
use core_types::{Event, PriceTable};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// How many trading periods around each event are analysed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub lookforward: usize,
    pub lookbackward: usize,
}

impl Window {
    pub fn new(lookforward: usize, lookbackward: usize) -> Self {
        Self {
            lookforward,
            lookbackward,
        }
    }

    /// Day offsets covered by the window, `-lookbackward..=lookforward`.
    pub fn offsets(&self) -> RangeInclusive<i64> {
        -(self.lookbackward as i64)..=self.lookforward as i64
    }
}

/// Row positions of one event's window inside a price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowBounds {
    pub event_row: usize,
    /// First row of the backward side, `None` when no lookback was requested.
    pub backward_row: Option<usize>,
    /// Last row of the forward side, inclusive.
    pub forward_row: usize,
}

impl WindowBounds {
    /// Clamps the window to `[0, last_row]`.
    pub fn new(event_row: usize, last_row: usize, window: Window) -> Self {
        Self {
            event_row,
            backward_row: (window.lookbackward > 0)
                .then(|| event_row.saturating_sub(window.lookbackward)),
            forward_row: event_row.saturating_add(window.lookforward).min(last_row),
        }
    }

    /// The bounds for an event on `date`, or `None` if the date is not in `prices`.
    pub fn locate(prices: &PriceTable, date: NaiveDate, window: Window) -> Option<Self> {
        let event_row = prices.locate(date)?;
        // `locate` succeeded, so the table has at least one row.
        Some(Self::new(event_row, prices.len() - 1, window))
    }
}

/// Cumulative returns of one instrument around one event.
///
/// `forward[k]` is the return from the event date to `k` periods later and
/// `backward[j]` the return of the price `j` periods earlier measured against the
/// event-date price. Both start with an exact zero; `backward` is empty when no
/// lookback was requested. Missing prices inside the window stay missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventReturns {
    pub forward: Vec<Option<Decimal>>,
    pub backward: Vec<Option<Decimal>>,
}

impl EventReturns {
    /// The long-target/short-benchmark return at each aligned offset.
    pub fn relative_to(&self, benchmark: &EventReturns) -> EventReturns {
        EventReturns {
            forward: difference(&self.forward, &benchmark.forward),
            backward: difference(&self.backward, &benchmark.backward),
        }
    }
}

fn difference(target: &[Option<Decimal>], benchmark: &[Option<Decimal>]) -> Vec<Option<Decimal>> {
    target
        .iter()
        .enumerate()
        .map(|(i, value)| match (value, benchmark.get(i).copied().flatten()) {
            (Some(target), Some(benchmark)) => Some(*target - benchmark),
            _ => None,
        })
        .collect()
}

/// Normalizes `column[bounds]` to cumulative returns anchored at the event row.
pub fn cumulative_returns(
    column: &[Option<Decimal>],
    bounds: &WindowBounds,
    instrument: &str,
) -> Result<EventReturns, SliceError> {
    let anchor = column
        .get(bounds.event_row)
        .copied()
        .flatten()
        .ok_or_else(|| SliceError::MissingAnchorPrice {
            instrument: instrument.to_string(),
            event_row: bounds.event_row,
        })?;
    if anchor.is_zero() {
        return Err(SliceError::ZeroAnchorPrice {
            instrument: instrument.to_string(),
            event_row: bounds.event_row,
        });
    }

    let normalize = |price: &Option<Decimal>| {
        price.and_then(|price| price.checked_div(anchor)).map(|net_value| net_value - Decimal::ONE)
    };

    let forward = column[bounds.event_row..=bounds.forward_row]
        .iter()
        .map(normalize)
        .collect();

    // Reversed so that index 0 is the event date and index j is j periods earlier.
    let backward = match bounds.backward_row {
        Some(backward_row) => column[backward_row..=bounds.event_row]
            .iter()
            .rev()
            .map(normalize)
            .collect(),
        None => Vec::new(),
    };

    Ok(EventReturns { forward, backward })
}

/// Locates `event` in `prices` and returns its normalized window.
pub fn slice_event(
    prices: &PriceTable,
    event: &Event,
    window: Window,
) -> Result<EventReturns, SliceError> {
    let bounds = WindowBounds::locate(prices, event.date, window)
        .ok_or(SliceError::DateNotFound { date: event.date })?;
    let column = prices
        .column(&event.instrument)
        .ok_or_else(|| SliceError::InstrumentMissing {
            instrument: event.instrument.clone(),
            event_row: bounds.event_row,
        })?;

    tracing::debug!(
        instrument = %event.instrument,
        date = %event.date,
        event_row = bounds.event_row,
        forward_row = bounds.forward_row,
        backward_row = ?bounds.backward_row,
        "Slicing event window"
    );

    cumulative_returns(column, &bounds, &event.instrument)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn prices(values: &[Option<Decimal>]) -> PriceTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates = (0..values.len())
            .map(|i| start + chrono::Days::new(i as u64))
            .collect();
        PriceTable::new(dates)
            .unwrap()
            .with_column("A", values.to_vec())
            .unwrap()
    }

    #[test]
    fn bounds_are_clamped_to_the_table() {
        let bounds = WindowBounds::new(2, 4, Window::new(5, 5));
        assert_eq!(bounds.forward_row, 4);
        assert_eq!(bounds.backward_row, Some(0));

        let bounds = WindowBounds::new(2, 4, Window::new(1, 0));
        assert_eq!(bounds.forward_row, 3);
        assert_eq!(bounds.backward_row, None);
    }

    #[test]
    fn bounds_locate_the_event_date() {
        let table = prices(&[Some(dec!(1)), Some(dec!(2)), Some(dec!(3))]);
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        let bounds = WindowBounds::locate(&table, date, Window::new(4, 2)).unwrap();
        assert_eq!(bounds.event_row, 1);
        assert_eq!(bounds.forward_row, 2);
        assert_eq!(bounds.backward_row, Some(0));

        let absent = NaiveDate::from_ymd_opt(2023, 6, 1).unwrap();
        assert_eq!(WindowBounds::locate(&table, absent, Window::new(1, 0)), None);
    }

    #[test]
    fn window_offsets_span_backward_to_forward() {
        let window = Window::new(5, 3);
        assert_eq!(window.offsets(), -3..=5);
    }

    #[test]
    fn forward_returns_start_at_zero() {
        let column = vec![Some(dec!(10)), Some(dec!(11)), Some(dec!(9)), Some(dec!(12))];
        let bounds = WindowBounds::new(1, 3, Window::new(2, 1));
        let returns = cumulative_returns(&column, &bounds, "A").unwrap();

        assert_eq!(returns.forward, vec![Some(dec!(0)), Some(dec!(9) / dec!(11) - dec!(1)), Some(dec!(12) / dec!(11) - dec!(1))]);
        assert_eq!(returns.backward, vec![Some(dec!(0)), Some(dec!(10) / dec!(11) - dec!(1))]);
    }

    #[test]
    fn missing_prices_inside_the_window_stay_missing() {
        let column = vec![Some(dec!(10)), None, Some(dec!(15))];
        let bounds = WindowBounds::new(0, 2, Window::new(2, 0));
        let returns = cumulative_returns(&column, &bounds, "A").unwrap();
        assert_eq!(returns.forward, vec![Some(dec!(0)), None, Some(dec!(0.5))]);
    }

    #[test]
    fn unusable_anchor_prices_fail_the_event() {
        let bounds = WindowBounds::new(0, 1, Window::new(1, 0));
        assert_eq!(
            cumulative_returns(&[None, Some(dec!(1))], &bounds, "A"),
            Err(SliceError::MissingAnchorPrice { instrument: "A".into(), event_row: 0 })
        );
        assert_eq!(
            cumulative_returns(&[Some(dec!(0)), Some(dec!(1))], &bounds, "A"),
            Err(SliceError::ZeroAnchorPrice { instrument: "A".into(), event_row: 0 })
        );
    }

    #[test]
    fn slice_event_reports_missing_date_and_instrument() {
        let table = prices(&[Some(dec!(1)), Some(dec!(2))]);
        let missing_date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        assert_eq!(
            slice_event(&table, &Event::new("A", missing_date), Window::new(1, 0)),
            Err(SliceError::DateNotFound { date: missing_date })
        );

        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(
            slice_event(&table, &Event::new("B", date), Window::new(1, 0)),
            Err(SliceError::InstrumentMissing { instrument: "B".into(), event_row: 1 })
        );
    }

    #[test]
    fn relative_returns_subtract_aligned_offsets() {
        let target = EventReturns {
            forward: vec![Some(dec!(0)), Some(dec!(0.10)), Some(dec!(0.20))],
            backward: vec![Some(dec!(0)), Some(dec!(-0.05))],
        };
        let benchmark = EventReturns {
            forward: vec![Some(dec!(0)), Some(dec!(0.04))],
            backward: vec![Some(dec!(0)), None],
        };

        let relative = target.relative_to(&benchmark);
        assert_eq!(relative.forward, vec![Some(dec!(0)), Some(dec!(0.06)), None]);
        assert_eq!(relative.backward, vec![Some(dec!(0)), None]);
    }
}
