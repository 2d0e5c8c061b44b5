use analytics::{
    padded_window, EventAnalyzer, InMemoryPriceSource, LogRenderer, PerformanceSummary,
    PerformanceTable, Renderer,
};
use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{init_tracing, load_config, AnalysisSettings, PriceSettings};
use core_types::{AdjustType, EventTable, Frequency, PriceField};
use database::{connect, run_migrations, DbRepository};
use render::ConsoleRenderer;
use std::path::PathBuf;
use tracing::{info, warn};

mod input;
mod render;

/// The main entry point for the event study application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    cli.overrides.apply(&mut config.prices);
    // Hold the guard so buffered file logs are flushed on exit.
    let _log_guard = init_tracing(&config.logging).context("Failed to initialise logging")?;

    let events = input::load_events(&cli.events)?;

    let benchmark = match &cli.command {
        Commands::Relative(args) => Some(
            args.benchmark
                .clone()
                .or_else(|| config.analysis.benchmark.clone())
                .context("A benchmark is required: pass --benchmark or set [analysis] benchmark")?,
        ),
        _ => None,
    };

    let source = match &cli.prices {
        Some(path) => InMemoryPriceSource::new(input::load_prices(path)?),
        None => prefetch_prices(&events, &config.prices, benchmark.as_deref()).await?,
    };

    let renderer: Box<dyn Renderer> = if cli.json {
        Box::new(LogRenderer)
    } else {
        Box::new(ConsoleRenderer)
    };
    let mut analyzer = EventAnalyzer::new(events, &config.prices, Box::new(source), renderer)
        .context("Failed to build the event analyzer")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Absolute(args) => {
            let (lookforward, lookbackward) = args.resolve(&config.analysis);
            let summary = analyzer
                .compute_absolute_performance(lookforward, lookbackward)
                .context("Absolute performance failed")?;
            report(&summary, analyzer.absolute_performance(), cli.json)?;
        }
        Commands::Relative(args) => {
            let (lookforward, lookbackward) = args.window.resolve(&config.analysis);
            let benchmark = benchmark.unwrap_or_default();
            let summary = analyzer
                .compute_relative_performance(&benchmark, lookforward, lookbackward)
                .with_context(|| format!("Relative performance against {benchmark} failed"))?;
            report(&summary, analyzer.relative_performance(), cli.json)?;
        }
        Commands::Distribution(args) => {
            let group_by_month = !args.by_day && config.analysis.group_by_month;
            let counts = analyzer.event_distribution(group_by_month)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&counts)?);
            } else {
                println!("Total events: {}", counts.total());
            }
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Measures how instruments' prices behave around discrete events.
#[derive(Parser)]
#[command(name = "event-study", author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. A missing file means defaults.
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// JSON file holding the event table.
    #[arg(long)]
    events: PathBuf,

    /// JSON file holding prices. When omitted, prices are read from PostgreSQL.
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Print the result as JSON instead of tables.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    overrides: PriceOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mean cumulative return and win rate around each event.
    Absolute(WindowArgs),
    /// Performance net of a benchmark instrument.
    Relative(RelativeArgs),
    /// Number of events per month (or per event date).
    Distribution(DistributionArgs),
}

#[derive(Parser)]
struct WindowArgs {
    /// Trading periods after the event. Defaults to [analysis] lookforward.
    #[arg(long)]
    lookforward: Option<usize>,

    /// Trading periods before the event. Defaults to [analysis] lookbackward.
    #[arg(long)]
    lookbackward: Option<usize>,
}

impl WindowArgs {
    fn resolve(&self, settings: &AnalysisSettings) -> (usize, usize) {
        (
            self.lookforward.unwrap_or(settings.lookforward),
            self.lookbackward.unwrap_or(settings.lookbackward),
        )
    }
}

/// Per-run overrides of the `[prices]` section.
#[derive(Parser)]
struct PriceOverrides {
    /// Price field to analyse: open, high, low or close.
    #[arg(long)]
    field: Option<PriceField>,

    /// Price adjustment: none, pre or post.
    #[arg(long)]
    adjust: Option<AdjustType>,

    /// Bar frequency: 1d or 1w.
    #[arg(long)]
    frequency: Option<Frequency>,
}

impl PriceOverrides {
    fn apply(&self, settings: &mut PriceSettings) {
        if let Some(field) = self.field {
            settings.field = field;
        }
        if let Some(adjust) = self.adjust {
            settings.adjust = adjust;
        }
        if let Some(frequency) = self.frequency {
            settings.frequency = frequency;
        }
    }
}

#[derive(Parser)]
struct RelativeArgs {
    /// Benchmark instrument. Defaults to [analysis] benchmark.
    #[arg(long)]
    benchmark: Option<String>,

    #[command(flatten)]
    window: WindowArgs,
}

#[derive(Parser)]
struct DistributionArgs {
    /// Count per event date instead of per calendar month.
    #[arg(long)]
    by_day: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Loads the padded price window for every event instrument, plus the
/// benchmark, from the database so the analysis itself can run synchronously.
async fn prefetch_prices(
    events: &EventTable,
    settings: &PriceSettings,
    benchmark: Option<&str>,
) -> anyhow::Result<InMemoryPriceSource> {
    let db_pool = connect().await.context("Failed to connect to the database")?;
    run_migrations(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    let db_repo = DbRepository::new(db_pool);

    let (start, end) = padded_window(events, settings.padding_periods)?;
    let mut instruments = events.instruments().to_vec();
    if let Some(benchmark) = benchmark {
        if !instruments.iter().any(|instrument| instrument == benchmark) {
            instruments.push(benchmark.to_string());
        }
    }

    let request = settings.request(instruments, start, end);
    let table = db_repo.get_price_table(&request).await?;

    let missing: Vec<&String> = request
        .instruments
        .iter()
        .filter(|instrument| !table.has_instrument(instrument))
        .collect();
    if !missing.is_empty() {
        let available = db_repo
            .get_available_symbols(settings.frequency.as_str(), settings.adjust.as_str())
            .await?;
        warn!(
            ?missing,
            available = available.len(),
            "Some instruments have no stored prices for this interval and adjustment"
        );
    }

    info!(%start, %end, rows = table.len(), "Prefetched price window");
    Ok(InMemoryPriceSource::new(table))
}

fn report(summary: &PerformanceSummary, table: &PerformanceTable, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!(
        "\nEvents used: {}, skipped: {}",
        summary.events_used, summary.events_skipped
    );
    if !table.skipped().is_empty() {
        println!("{}", render::skipped_table(table.skipped()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_flags_override_the_config() {
        let cli = Cli::try_parse_from([
            "event-study",
            "--events",
            "events.json",
            "--field",
            "Open",
            "--frequency",
            "1w",
            "absolute",
        ])
        .unwrap();

        let mut settings = PriceSettings::default();
        cli.overrides.apply(&mut settings);
        assert_eq!(settings.field, PriceField::Open);
        assert_eq!(settings.adjust, AdjustType::Post);
        assert_eq!(settings.frequency, Frequency::Weekly);
    }

    #[test]
    fn unknown_price_flags_are_rejected() {
        let result = Cli::try_parse_from([
            "event-study",
            "--events",
            "events.json",
            "--adjust",
            "forward",
            "absolute",
        ]);
        assert!(result.is_err());
    }
}
