use crate::error::SliceError;
use crate::render::OffsetSeries;
use crate::window::{EventReturns, Window, WindowBounds};
use core_types::Event;
use rust_decimal::Decimal;
use serde::Serialize;
use std::ops::RangeInclusive;

/// One event's returns, one value per offset of the table's window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceRow {
    pub event: Event,
    pub values: Vec<Option<Decimal>>,
}

/// An event left out of an aggregate, and why.
///
/// `bounds` holds the rows the window would have covered, or `None` when the
/// event date is not in the price index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEvent {
    pub event: Event,
    pub reason: SliceError,
    pub bounds: Option<WindowBounds>,
}

/// The events × day-offsets table behind an absolute or relative analysis.
///
/// Columns always span the full requested window, `-lookbackward..=lookforward`,
/// with offset 0 appearing exactly once. Windows cut short by the edge of the
/// price history leave missing cells rather than shrinking the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PerformanceTable {
    window: Window,
    rows: Vec<PerformanceRow>,
    skipped: Vec<SkippedEvent>,
}

impl PerformanceTable {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            rows: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Appends a row assembled from the backward side (most negative offset
    /// first, event day dropped) followed by the forward side.
    pub fn push(&mut self, event: Event, returns: &EventReturns) {
        let backward = (1..=self.window.lookbackward)
            .rev()
            .map(|periods_before| returns.backward.get(periods_before).copied().flatten());
        let forward = (0..=self.window.lookforward)
            .map(|periods_after| returns.forward.get(periods_after).copied().flatten());

        self.rows.push(PerformanceRow {
            event,
            values: backward.chain(forward).collect(),
        });
    }

    pub fn skip(&mut self, event: Event, reason: SliceError, bounds: Option<WindowBounds>) {
        self.skipped.push(SkippedEvent {
            event,
            reason,
            bounds,
        });
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn offsets(&self) -> RangeInclusive<i64> {
        self.window.offsets()
    }

    pub fn rows(&self) -> &[PerformanceRow] {
        &self.rows
    }

    pub fn skipped(&self) -> &[SkippedEvent] {
        &self.skipped
    }

    /// Number of events that made it into the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn position(&self, offset: i64) -> Option<usize> {
        self.offsets()
            .contains(&offset)
            .then(|| (offset + self.window.lookbackward as i64) as usize)
    }

    pub fn value(&self, row: usize, offset: i64) -> Option<Decimal> {
        let position = self.position(offset)?;
        self.rows.get(row).and_then(|row| row.values[position])
    }

    /// The present values in one offset column.
    pub fn column(&self, offset: i64) -> Vec<Decimal> {
        match self.position(offset) {
            Some(position) => self.rows.iter().filter_map(|row| row.values[position]).collect(),
            None => Vec::new(),
        }
    }

    /// Number of present values per offset.
    pub fn observations(&self) -> Vec<(i64, usize)> {
        self.offsets()
            .map(|offset| (offset, self.column(offset).len()))
            .collect()
    }

    /// Per-offset mean over present values. Offsets with no values have none.
    pub fn mean(&self) -> OffsetSeries {
        self.per_offset(|values| {
            let total: Decimal = values.iter().sum();
            total / Decimal::from(values.len())
        })
    }

    /// Per-offset share of present values that are strictly positive.
    pub fn win_rate(&self) -> OffsetSeries {
        self.per_offset(|values| {
            let wins = values.iter().filter(|value| **value > Decimal::ZERO).count();
            Decimal::from(wins) / Decimal::from(values.len())
        })
    }

    fn per_offset(&self, statistic: impl Fn(&[Decimal]) -> Decimal) -> OffsetSeries {
        let points = self
            .offsets()
            .map(|offset| {
                let values = self.column(offset);
                let value = (!values.is_empty()).then(|| statistic(&values));
                (offset, value)
            })
            .collect();
        OffsetSeries { points }
    }

    pub fn summary(&self) -> PerformanceSummary {
        PerformanceSummary {
            window: self.window,
            mean: self.mean(),
            win_rate: self.win_rate(),
            observations: self.observations(),
            events_used: self.rows.len(),
            events_skipped: self.skipped.len(),
        }
    }
}

/// The aggregate view of a performance table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceSummary {
    pub window: Window,
    pub mean: OffsetSeries,
    pub win_rate: OffsetSeries,
    pub observations: Vec<(i64, usize)>,
    pub events_used: usize,
    pub events_skipped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn event(instrument: &str) -> Event {
        Event::new(instrument, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap())
    }

    fn returns(backward: &[Option<Decimal>], forward: &[Option<Decimal>]) -> EventReturns {
        EventReturns {
            forward: forward.to_vec(),
            backward: backward.to_vec(),
        }
    }

    #[test]
    fn rows_run_from_most_negative_offset_to_lookforward() {
        let mut table = PerformanceTable::new(Window::new(2, 2));
        table.push(
            event("A"),
            &returns(
                &[Some(dec!(0)), Some(dec!(-0.01)), Some(dec!(-0.02))],
                &[Some(dec!(0)), Some(dec!(0.01)), Some(dec!(0.03))],
            ),
        );

        assert_eq!(table.offsets(), -2..=2);
        assert_eq!(
            table.rows()[0].values,
            vec![Some(dec!(-0.02)), Some(dec!(-0.01)), Some(dec!(0)), Some(dec!(0.01)), Some(dec!(0.03))]
        );
        assert_eq!(table.value(0, -2), Some(dec!(-0.02)));
        assert_eq!(table.value(0, 3), None);
    }

    #[test]
    fn truncated_windows_leave_missing_cells() {
        let mut table = PerformanceTable::new(Window::new(3, 2));
        table.push(event("A"), &returns(&[Some(dec!(0))], &[Some(dec!(0)), Some(dec!(0.1))]));

        assert_eq!(table.rows()[0].values.len(), 6);
        assert_eq!(table.value(0, -2), None);
        assert_eq!(table.value(0, -1), None);
        assert_eq!(table.value(0, 1), Some(dec!(0.1)));
        assert_eq!(table.value(0, 2), None);
    }

    #[test]
    fn mean_and_win_rate_ignore_missing_values() {
        let mut table = PerformanceTable::new(Window::new(1, 0));
        table.push(event("A"), &returns(&[], &[Some(dec!(0)), Some(dec!(0.10))]));
        table.push(event("B"), &returns(&[], &[Some(dec!(0)), Some(dec!(-0.04))]));
        table.push(event("C"), &returns(&[], &[Some(dec!(0))]));

        let mean = table.mean();
        assert_eq!(mean.get(0), Some(dec!(0)));
        assert_eq!(mean.get(1), Some(dec!(0.03)));

        let win_rate = table.win_rate();
        assert_eq!(win_rate.get(0), Some(dec!(0)));
        assert_eq!(win_rate.get(1), Some(dec!(0.5)));

        assert_eq!(table.observations(), vec![(0, 3), (1, 2)]);
    }

    #[test]
    fn empty_table_yields_offsets_without_values() {
        let mut table = PerformanceTable::new(Window::new(2, 1));
        table.skip(
            event("A"),
            SliceError::DateNotFound { date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap() },
            None,
        );

        let summary = table.summary();
        assert_eq!(summary.events_used, 0);
        assert_eq!(summary.events_skipped, 1);
        assert_eq!(summary.mean.len(), 4);
        assert!(summary.mean.points.iter().all(|(_, value)| value.is_none()));
        assert!(summary.win_rate.points.iter().all(|(_, value)| value.is_none()));
    }
}
