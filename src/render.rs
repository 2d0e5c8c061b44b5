use analytics::{EventCounts, OffsetSeries, Renderer, SkippedEvent};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use rust_decimal::Decimal;

const BAR_WIDTH: usize = 40;

/// Prints every render call to stdout as a table.
#[derive(Debug, Default)]
pub struct ConsoleRenderer;

impl Renderer for ConsoleRenderer {
    fn render_band(&mut self, series: &OffsetSeries, title: &str, y_label: &str) {
        println!("\n{title}\n{}", band_table(series, y_label));
    }

    fn render_area(&mut self, series: &OffsetSeries, title: &str) {
        println!("\n{title}\n{}", band_table(series, "Win Rate"));
    }

    fn render_bar(&mut self, counts: &EventCounts, title: &str) {
        println!("\n{title}\n{}", bar_table(counts));
    }
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// One row per day offset, the value shown as a percentage.
pub fn band_table(series: &OffsetSeries, y_label: &str) -> Table {
    let mut table = new_table(vec!["Offset", y_label]);
    for (offset, value) in &series.points {
        table.add_row(vec![
            Cell::new(offset).set_alignment(CellAlignment::Right),
            Cell::new(format_percent(*value)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// One row per bucket with a histogram bar scaled to the largest count.
pub fn bar_table(counts: &EventCounts) -> Table {
    let mut table = new_table(vec!["Period", "Events", ""]);
    let max = counts.buckets.iter().map(|(_, count)| *count).max().unwrap_or(0);
    for (label, count) in &counts.buckets {
        let width = if max == 0 { 0 } else { count * BAR_WIDTH / max };
        table.add_row(vec![
            Cell::new(label),
            Cell::new(count).set_alignment(CellAlignment::Right),
            Cell::new("#".repeat(width)),
        ]);
    }
    table
}

pub fn skipped_table(skipped: &[SkippedEvent]) -> Table {
    let mut table = new_table(vec!["Instrument", "Date", "Reason"]);
    for entry in skipped {
        table.add_row(vec![
            Cell::new(&entry.event.instrument),
            Cell::new(entry.event.date),
            Cell::new(&entry.reason),
        ]);
    }
    table
}

fn format_percent(value: Option<Decimal>) -> String {
    match value {
        Some(value) => format!("{:.2}%", value * Decimal::ONE_HUNDRED),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn percentages_have_two_decimals() {
        assert_eq!(format_percent(Some(dec!(0.01234))), "1.23%");
        assert_eq!(format_percent(Some(Decimal::ZERO)), "0.00%");
        assert_eq!(format_percent(None), "-");
    }

    #[test]
    fn band_table_lists_every_offset() {
        let series = OffsetSeries {
            points: vec![(-1, Some(dec!(-0.02))), (0, Some(Decimal::ZERO)), (1, None)],
        };
        let rendered = band_table(&series, "Rate of Return").to_string();
        assert!(rendered.contains("Rate of Return"));
        assert!(rendered.contains("-2.00%"));
        assert!(rendered.contains("0.00%"));
        assert_eq!(band_table(&series, "x").row_iter().count(), 3);
    }

    #[test]
    fn bar_table_scales_to_the_largest_bucket() {
        let counts = EventCounts {
            buckets: vec![("2024-01".to_string(), 4), ("2024-02".to_string(), 0)],
        };
        let rendered = bar_table(&counts).to_string();
        assert!(rendered.contains(&"#".repeat(BAR_WIDTH)));
        assert!(rendered.contains("2024-02"));
    }
}
