use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use macrofolio::application::backtest::{BacktestEngine, default_benchmarks};
use macrofolio::application::reporting::{BacktestReport, RegimeReport};
use macrofolio::application::sweep::{SweepCandidate, SweepRunner};
use macrofolio::config::Config;
use macrofolio::domain::allocation::CASH_TICKER;
use macrofolio::domain::classifier::{ClassifierConfig, RegimeClassifier};
use macrofolio::domain::ports::{IndicatorSource, PriceSource};
use macrofolio::infrastructure::csv_source::CsvDataSource;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "macrofolio",
    about = "Macro regime classification and allocation backtests"
)]
struct Cli {
    /// Directory holding indicators.csv and prices.csv
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Emit JSON instead of the text report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify the latest snapshot and print the recommended allocation
    Classify,
    /// Replay the classifier over history and compare against benchmarks
    Backtest {
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Evaluate classifier threshold variants in parallel
    Sweep {
        /// Comma-separated Sahm margins to test
        #[arg(long, default_value = "0.3,0.5,0.8")]
        sahm_margins: String,
        /// Comma-separated elevated-VIX thresholds to test
        #[arg(long, default_value = "20,25,30")]
        vix_elevated: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data_dir.clone());
    let source = CsvDataSource::new(&data_dir, &config.index_ticker, config.snapshot);
    let json = cli.json;

    match cli.command {
        Command::Classify => classify(json, &config, &source).await,
        Command::Backtest { start, end } => backtest(json, &config, &source, start, end).await,
        Command::Sweep {
            sahm_margins,
            vix_elevated,
        } => sweep(&config, &source, &sahm_margins, &vix_elevated).await,
    }
}

async fn classify(json: bool, config: &Config, source: &CsvDataSource) -> Result<()> {
    let series = source.fetch(NaiveDate::MIN, NaiveDate::MAX).await?;
    let snapshot = series
        .last()
        .context("No complete snapshots in the data directory")?;

    let classifier = RegimeClassifier::new(config.classifier)?;
    let table = config.allocations.build_table()?;
    let regime = classifier.classify(snapshot);

    let report = RegimeReport {
        date: snapshot.date,
        regime,
        allocation: table.allocate(regime).clone(),
    };
    if json {
        println!("{}", report.to_json()?);
    } else {
        report.print();
    }
    Ok(())
}

async fn backtest(
    json: bool,
    config: &Config,
    source: &CsvDataSource,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<()> {
    let start = start.unwrap_or(NaiveDate::MIN);
    let end = end.unwrap_or(NaiveDate::MAX);

    let series = source.fetch(start, end).await?;
    let table = config.allocations.build_table()?;
    let benchmarks = default_benchmarks();

    let mut tickers: BTreeSet<String> = table.instruments();
    for spec in &benchmarks {
        tickers.extend(
            spec.allocation
                .tickers()
                .filter(|t| *t != CASH_TICKER)
                .map(str::to_string),
        );
    }
    let tickers: Vec<String> = tickers.into_iter().collect();
    let prices = source.fetch_prices(&tickers, start, end).await?;

    let engine = BacktestEngine::new(
        RegimeClassifier::new(config.classifier)?,
        table.clone(),
        benchmarks,
        config.rebalance,
    );
    let result = engine.run(&series, &prices, config.initial_capital)?;

    let report = BacktestReport::from_result(&result, &table)
        .context("Backtest produced no entries")?;
    if json {
        println!("{}", report.to_json()?);
    } else {
        report.print();
    }
    Ok(())
}

async fn sweep(
    config: &Config,
    source: &CsvDataSource,
    sahm_margins: &str,
    vix_elevated: &str,
) -> Result<()> {
    let margins = parse_list(sahm_margins).context("Invalid --sahm-margins list")?;
    let vix_levels = parse_list(vix_elevated).context("Invalid --vix-elevated list")?;

    let series = source.fetch(NaiveDate::MIN, NaiveDate::MAX).await?;
    let table = config.allocations.build_table()?;
    let tickers: Vec<String> = table.instruments().into_iter().collect();
    let prices = source
        .fetch_prices(&tickers, NaiveDate::MIN, NaiveDate::MAX)
        .await?;

    let mut candidates = Vec::new();
    for &sahm_margin in &margins {
        for &vix in &vix_levels {
            candidates.push(SweepCandidate {
                label: format!("sahm={sahm_margin} vix_elevated={vix}"),
                thresholds: ClassifierConfig {
                    sahm_margin,
                    vix_elevated: vix,
                    vix_extreme: config.classifier.vix_extreme.max(vix),
                    ..config.classifier
                },
            });
        }
    }

    let runner = SweepRunner::new(table, config.rebalance, config.initial_capital);
    let outcomes = runner.run_parallel(candidates, &series, &prices);

    info!("Sweep complete: {} outcome(s)", outcomes.len());
    println!("\n📊 Sweep Results");
    println!(
        "  {:<32} {:>12} {:>12} {:>8}",
        "configuration", "return %", "max dd %", "sharpe"
    );
    for outcome in &outcomes {
        match &outcome.result {
            Ok(summary) => println!(
                "  {:<32} {:>12.2} {:>12.2} {:>8.2}",
                outcome.label,
                summary.total_return_pct,
                summary.max_drawdown_pct,
                summary.sharpe_ratio
            ),
            Err(reason) => println!("  {:<32} failed: {}", outcome.label, reason),
        }
    }
    Ok(())
}

fn parse_list(raw: &str) -> Result<Vec<f64>> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| anyhow::anyhow!("{}: {}", part, e))
        })
        .collect()
}
