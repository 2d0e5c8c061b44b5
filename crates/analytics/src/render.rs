use rust_decimal::Decimal;
use serde::Serialize;

/// A value per day offset from the event (negative = before, 0 = event day).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OffsetSeries {
    pub points: Vec<(i64, Option<Decimal>)>,
}

impl OffsetSeries {
    pub fn get(&self, offset: i64) -> Option<Decimal> {
        self.points
            .iter()
            .find(|(point_offset, _)| *point_offset == offset)
            .and_then(|(_, value)| *value)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Event counts per labelled bucket (a year-month or a date).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    pub buckets: Vec<(String, usize)>,
}

impl EventCounts {
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|(_, count)| count).sum()
    }
}

/// The presentation sink for analysis results.
///
/// Implementations draw or print; nothing they do feeds back into the analysis.
pub trait Renderer {
    /// Mean performance curve.
    fn render_band(&mut self, series: &OffsetSeries, title: &str, y_label: &str);

    /// Win-rate curve.
    fn render_area(&mut self, series: &OffsetSeries, title: &str);

    /// Event frequency distribution.
    fn render_bar(&mut self, counts: &EventCounts, title: &str);
}

/// Writes every render call to the `tracing` log at `info` level.
#[derive(Debug, Default)]
pub struct LogRenderer;

impl Renderer for LogRenderer {
    fn render_band(&mut self, series: &OffsetSeries, title: &str, y_label: &str) {
        for (offset, value) in &series.points {
            tracing::info!(title, y_label, offset, value = ?value, "band");
        }
    }

    fn render_area(&mut self, series: &OffsetSeries, title: &str) {
        for (offset, value) in &series.points {
            tracing::info!(title, offset, value = ?value, "area");
        }
    }

    fn render_bar(&mut self, counts: &EventCounts, title: &str) {
        for (label, count) in &counts.buckets {
            tracing::info!(title, label = %label, count, "bar");
        }
    }
}
