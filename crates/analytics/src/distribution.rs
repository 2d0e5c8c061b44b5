use crate::error::AnalyticsError;
use crate::render::EventCounts;
use chrono::NaiveDate;
use core_types::calendar::{month_end, year_month_label};
use core_types::EventTable;
use std::collections::BTreeMap;

/// How events are bucketed for the frequency distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// One bucket per calendar month from the first to the last event month,
    /// empty months included, labelled "YYYY-MM".
    Month,
    /// One bucket per event-table row, labelled "YYYY-MM-DD".
    Day,
}

impl Grouping {
    pub fn title(&self) -> &'static str {
        match self {
            Grouping::Month => "Event Distribution By Month",
            Grouping::Day => "Event Distribution By Day",
        }
    }
}

/// Counts event markers per bucket.
pub fn count_events(table: &EventTable, grouping: Grouping) -> Result<EventCounts, AnalyticsError> {
    match grouping {
        Grouping::Day => Ok(EventCounts {
            buckets: table
                .row_counts()
                .map(|(date, count)| (date.to_string(), count))
                .collect(),
        }),
        Grouping::Month => count_by_month(table),
    }
}

fn count_by_month(table: &EventTable) -> Result<EventCounts, AnalyticsError> {
    let mut per_month: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for (date, count) in table.row_counts() {
        *per_month.entry(month_end(date)?).or_insert(0) += count;
    }

    let (Some(&first), Some(&last)) = (per_month.keys().next(), per_month.keys().next_back()) else {
        return Ok(EventCounts::default());
    };

    let mut buckets = Vec::new();
    let mut current = first;
    while current <= last {
        buckets.push((
            year_month_label(current),
            per_month.get(&current).copied().unwrap_or(0),
        ));
        let next_month_start = current
            .succ_opt()
            .ok_or(core_types::CoreError::DateOverflow(current))?;
        current = month_end(next_month_start)?;
    }

    Ok(EventCounts { buckets })
}
