use crate::distribution::{count_events, Grouping};
use crate::error::AnalyticsError;
use crate::render::{EventCounts, Renderer};
use crate::source::{padded_window, PriceSource};
use crate::table::{PerformanceSummary, PerformanceTable};
use crate::window::{slice_event, EventReturns, Window, WindowBounds};
use core_types::{
    AdjustType, Event, EventTable, Frequency, PriceField, PriceRequest, PriceSettings, PriceTable,
};
use tracing::{info, warn};

const RATE_OF_RETURN: &str = "Rate of Return";

/// Measures how instruments behave around their events.
///
/// The event table and the fetched prices are fixed once the analyzer is built
/// (short of an explicit `fetch_prices`). The absolute and relative performance
/// tables are recomputed, and overwritten, on every call with whatever window
/// is passed in.
pub struct EventAnalyzer {
    // --- Inputs ---
    event_table: EventTable,
    event_list: Vec<Event>,
    padding_periods: u32,
    // --- Prices ---
    prices: PriceTable,
    price_request: Option<PriceRequest>,
    // --- Derived ---
    absolute_performance: PerformanceTable,
    relative_performance: PerformanceTable,
    // --- Collaborators ---
    source: Box<dyn PriceSource>,
    renderer: Box<dyn Renderer>,
}

impl EventAnalyzer {
    /// Builds an analyzer, fetching prices and the event list immediately.
    ///
    /// Fails if the event table is empty, has no instruments, or the price
    /// source cannot supply any prices for the padded window.
    pub fn new(
        event_table: EventTable,
        settings: &PriceSettings,
        source: Box<dyn PriceSource>,
        renderer: Box<dyn Renderer>,
    ) -> Result<Self, AnalyticsError> {
        info!("Generating event analyzer...");
        let mut analyzer = Self {
            event_table,
            event_list: Vec::new(),
            padding_periods: settings.padding_periods,
            prices: PriceTable::default(),
            price_request: None,
            absolute_performance: PerformanceTable::default(),
            relative_performance: PerformanceTable::default(),
            source,
            renderer,
        };

        analyzer.fetch_prices(settings.field, settings.adjust, settings.frequency)?;
        analyzer.build_event_list();
        Ok(analyzer)
    }

    /// Collects every marked cell of the event table as an `Event`, in row order
    /// then column order.
    pub fn build_event_list(&mut self) -> &[Event] {
        self.event_list = self.event_table.events().collect();
        info!(events = self.event_list.len(), "Built event list");
        &self.event_list
    }

    /// Retrieves prices for every instrument in the event table over the padded
    /// event range and replaces the stored price table.
    pub fn fetch_prices(
        &mut self,
        field: PriceField,
        adjust: AdjustType,
        frequency: Frequency,
    ) -> Result<(), AnalyticsError> {
        if self.event_table.instruments().is_empty() {
            return Err(AnalyticsError::NoInstruments);
        }
        let (start, end) = padded_window(&self.event_table, self.padding_periods)?;

        let request = PriceRequest {
            instruments: self.event_table.instruments().to_vec(),
            start,
            end,
            field,
            adjust,
            frequency,
        };
        info!(
            instruments = request.instruments.len(),
            %start,
            %end,
            %field,
            %adjust,
            %frequency,
            "Collecting price data..."
        );

        let prices = self.source.fetch(&request)?;
        if prices.is_empty() {
            return Err(AnalyticsError::NoPriceData { start, end });
        }
        let missing = request
            .instruments
            .iter()
            .filter(|instrument| !prices.has_instrument(instrument))
            .count();
        if missing > 0 {
            warn!(missing, "Price source returned no column for some instruments");
        }

        self.prices = prices;
        self.price_request = Some(request);
        Ok(())
    }

    /// Mean cumulative return and win rate of the event instruments around
    /// their events.
    ///
    /// Renders "Absolute Performance" and "Win Rate (Absolute)" and keeps the
    /// underlying table until the next call. Fails if either side of the window
    /// is longer than the loaded price history.
    pub fn compute_absolute_performance(
        &mut self,
        lookforward: usize,
        lookbackward: usize,
    ) -> Result<PerformanceSummary, AnalyticsError> {
        let window = self.window(lookforward, lookbackward)?;
        info!(lookforward, lookbackward, "Calculating absolute performance");

        let table = self.aggregate(window, |prices, event| slice_event(prices, event, window));
        let summary = table.summary();

        self.renderer
            .render_band(&summary.mean, "Absolute Performance", RATE_OF_RETURN);
        self.renderer
            .render_area(&summary.win_rate, "Win Rate (Absolute)");
        self.absolute_performance = table;
        Ok(summary)
    }

    /// Like [`EventAnalyzer::compute_absolute_performance`], but each event's
    /// returns are measured net of `benchmark` over the same offsets: a long
    /// target, short benchmark position.
    ///
    /// Both sides use the same inclusive forward window. Benchmark prices are
    /// fetched with the stored request's range and settings; if none come back
    /// the whole call fails.
    pub fn compute_relative_performance(
        &mut self,
        benchmark: &str,
        lookforward: usize,
        lookbackward: usize,
    ) -> Result<PerformanceSummary, AnalyticsError> {
        let window = self.window(lookforward, lookbackward)?;
        info!(benchmark, lookforward, lookbackward, "Calculating relative performance");

        let benchmark_prices = self.fetch_benchmark(benchmark)?;
        let table = self.aggregate(window, |prices, event| {
            let target = slice_event(prices, event, window)?;
            let reference = slice_event(
                &benchmark_prices,
                &Event::new(benchmark, event.date),
                window,
            )?;
            Ok::<EventReturns, _>(target.relative_to(&reference))
        });
        let summary = table.summary();

        self.renderer
            .render_band(&summary.mean, "Relative Performance", RATE_OF_RETURN);
        self.renderer
            .render_area(&summary.win_rate, "Win Rate (Relative)");
        self.relative_performance = table;
        Ok(summary)
    }

    /// Counts events by calendar month or by event-table row and renders them.
    pub fn event_distribution(&mut self, group_by_month: bool) -> Result<EventCounts, AnalyticsError> {
        info!(group_by_month, "Plotting event distribution...");
        let grouping = if group_by_month { Grouping::Month } else { Grouping::Day };
        let counts = count_events(&self.event_table, grouping)?;
        self.renderer.render_bar(&counts, grouping.title());
        Ok(counts)
    }

    /// Offsets past the end of the loaded history can never hold a value, so
    /// windows reaching beyond it are rejected rather than allocated.
    fn window(&self, lookforward: usize, lookbackward: usize) -> Result<Window, AnalyticsError> {
        let longest = self.prices.len().saturating_sub(1);
        if lookforward > longest || lookbackward > longest {
            return Err(AnalyticsError::WindowTooWide {
                lookforward,
                lookbackward,
                rows: self.prices.len(),
            });
        }
        Ok(Window::new(lookforward, lookbackward))
    }

    /// Runs `slice` over every event, keeping successes and recording failures.
    fn aggregate<F>(&self, window: Window, slice: F) -> PerformanceTable
    where
        F: Fn(&PriceTable, &Event) -> Result<EventReturns, crate::error::SliceError>,
    {
        let mut table = PerformanceTable::new(window);
        for event in &self.event_list {
            match slice(&self.prices, event) {
                Ok(returns) => table.push(event.clone(), &returns),
                Err(reason) => {
                    let bounds = WindowBounds::locate(&self.prices, event.date, window);
                    warn!(
                        instrument = %event.instrument,
                        date = %event.date,
                        event_row = ?bounds.map(|b| b.event_row),
                        forward_row = ?bounds.map(|b| b.forward_row),
                        backward_row = ?bounds.and_then(|b| b.backward_row),
                        %reason,
                        "Slice price error; skipping event"
                    );
                    table.skip(event.clone(), reason, bounds);
                }
            }
        }

        info!(
            used = table.len(),
            skipped = table.skipped().len(),
            "Aggregated event windows"
        );
        if table.is_empty() && !self.event_list.is_empty() {
            warn!("Every event failed to slice; the aggregate is empty");
        }
        table
    }

    fn fetch_benchmark(&self, benchmark: &str) -> Result<PriceTable, AnalyticsError> {
        let request = PriceRequest {
            instruments: vec![benchmark.to_string()],
            ..self.price_request.clone().ok_or(AnalyticsError::PricesNotLoaded)?
        };
        let prices = self.source.fetch(&request)?;
        if prices.is_empty() || !prices.has_instrument(benchmark) {
            return Err(AnalyticsError::BenchmarkUnavailable(benchmark.to_string()));
        }
        Ok(prices)
    }

    // --- Accessors ---

    pub fn event_table(&self) -> &EventTable {
        &self.event_table
    }

    pub fn event_list(&self) -> &[Event] {
        &self.event_list
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// The request behind the stored price table.
    pub fn price_request(&self) -> Option<&PriceRequest> {
        self.price_request.as_ref()
    }

    pub fn absolute_performance(&self) -> &PerformanceTable {
        &self.absolute_performance
    }

    pub fn relative_performance(&self) -> &PerformanceTable {
        &self.relative_performance
    }
}
