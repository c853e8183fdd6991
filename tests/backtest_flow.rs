use chrono::NaiveDate;
use macrofolio::application::backtest::{BacktestEngine, default_benchmarks};
use macrofolio::application::reporting::BacktestReport;
use macrofolio::config::AllocationConfig;
use macrofolio::domain::allocation::RebalancePolicy;
use macrofolio::domain::classifier::{ClassifierConfig, RegimeClassifier};
use macrofolio::domain::errors::BacktestError;
use macrofolio::domain::indicators::{IndicatorSeries, IndicatorSnapshot};
use macrofolio::domain::ports::{IndicatorSource, PriceSource};
use macrofolio::domain::prices::PriceTable;
use macrofolio::domain::regime::Regime;
use macrofolio::infrastructure::mock::{MockIndicatorSource, MockPriceSource};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const TICKERS: &[&str] = &["SPY", "TLT", "GLD", "IWY", "QQQ", "WTMF", "USMV", "XLP"];

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn snapshot(d: u32, vix: f64) -> IndicatorSnapshot {
    IndicatorSnapshot {
        date: day(d),
        unemployment_rate: 4.0,
        unemployment_rolling_min: 3.9,
        yield_spread: 0.5,
        vix,
        sharp_decline: false,
        trend_broken: false,
    }
}

/// Ten calm days, then an elevated-volatility stretch.
fn indicator_fixture() -> IndicatorSeries {
    let mut snapshots = Vec::new();
    for d in 1..=10u32 {
        snapshots.push(snapshot(d, 15.0));
    }
    for d in 11..=15u32 {
        snapshots.push(snapshot(d, 28.0));
    }
    IndicatorSeries::new(snapshots).unwrap()
}

/// Flat prices for everything except a steadily rising SPY.
fn price_fixture() -> PriceTable {
    let mut table = PriceTable::new();
    for d in 1..=15u32 {
        for ticker in TICKERS {
            let close = if *ticker == "SPY" {
                Decimal::from(400 + d)
            } else {
                Decimal::from(100)
            };
            table.insert(ticker, day(d), close);
        }
    }
    table
}

fn all_tickers() -> Vec<String> {
    TICKERS.iter().map(|t| t.to_string()).collect()
}

fn engine() -> BacktestEngine {
    BacktestEngine::new(
        RegimeClassifier::new(ClassifierConfig::default()).unwrap(),
        AllocationConfig::default().build_table().unwrap(),
        default_benchmarks(),
        RebalancePolicy::OnRegimeChange,
    )
}

#[tokio::test]
async fn end_to_end_backtest_over_mock_sources() {
    let indicator_source = MockIndicatorSource::new(indicator_fixture());
    let price_source = MockPriceSource::new(price_fixture());

    let series = indicator_source.fetch(day(1), day(15)).await.unwrap();
    let prices = price_source
        .fetch_prices(&all_tickers(), day(1), day(15))
        .await
        .unwrap();

    let result = engine().run(&series, &prices, dec!(100000)).unwrap();

    assert_eq!(result.entries.len(), 15);
    assert_eq!(result.initial_capital, dec!(100000));

    // Monotonic-time invariant over adjacent entries.
    for pair in result.entries.windows(2) {
        assert!(pair[0].date < pair[1].date);
    }

    // The volatility spike flips the classification mid-run.
    assert_eq!(result.entries[0].regime, Regime::Neutral);
    assert_eq!(result.entries[14].regime, Regime::CautiousVol);

    // Both default benchmarks are tracked on every entry.
    for entry in &result.entries {
        assert!(entry.benchmarks.contains_key("SPY"));
        assert!(entry.benchmarks.contains_key("60/40"));
    }

    // 100% SPY benchmark follows the index exactly: 401 -> 415.
    let spy_series = result.benchmark_series("SPY");
    let expected = dec!(100000) * Decimal::from(415) / Decimal::from(401);
    assert!((spy_series.last().unwrap().1 - expected).abs() < dec!(0.01));
}

#[tokio::test]
async fn report_summarizes_portfolio_and_benchmarks() {
    let indicator_source = MockIndicatorSource::new(indicator_fixture());
    let price_source = MockPriceSource::new(price_fixture());

    let series = indicator_source.fetch(day(1), day(15)).await.unwrap();
    let prices = price_source
        .fetch_prices(&all_tickers(), day(1), day(15))
        .await
        .unwrap();

    let table = AllocationConfig::default().build_table().unwrap();
    let result = engine().run(&series, &prices, dec!(100000)).unwrap();
    let report = BacktestReport::from_result(&result, &table).unwrap();

    assert_eq!(report.current_regime, Regime::CautiousVol);
    assert_eq!(
        report.current_allocation.weight("SPY"),
        table.allocate(Regime::CautiousVol).weight("SPY")
    );
    assert_eq!(report.benchmarks.len(), 2);
    assert_eq!(
        report.regime_days.values().sum::<usize>(),
        result.entries.len()
    );

    // Serializable for the external UI layer.
    let json = report.to_json().unwrap();
    assert!(json.contains("CAUTIOUS_VOL"));
}

#[tokio::test]
async fn empty_fetch_range_yields_insufficient_data() {
    let indicator_source = MockIndicatorSource::new(indicator_fixture());
    let price_source = MockPriceSource::new(price_fixture());

    // A range before any observation produces an empty series.
    let series = indicator_source
        .fetch(day(20), day(25))
        .await
        .unwrap();
    assert!(series.is_empty());

    let prices = price_source
        .fetch_prices(&all_tickers(), day(1), day(15))
        .await
        .unwrap();

    let err = engine().run(&series, &prices, dec!(100000)).unwrap_err();
    assert!(matches!(err, BacktestError::InsufficientData));
}

#[tokio::test]
async fn unknown_instrument_in_overridden_basket_fails_fast() {
    let config = AllocationConfig::from_toml_str(
        "[baskets.neutral]\nVNQ = 1.0\n",
    )
    .unwrap();
    let table = config.build_table().unwrap();

    let indicator_source = MockIndicatorSource::new(indicator_fixture());
    let price_source = MockPriceSource::new(price_fixture());
    let series = indicator_source.fetch(day(1), day(15)).await.unwrap();
    let prices = price_source
        .fetch_prices(&all_tickers(), day(1), day(15))
        .await
        .unwrap();

    let e = BacktestEngine::new(
        RegimeClassifier::new(ClassifierConfig::default()).unwrap(),
        table,
        Vec::new(),
        RebalancePolicy::OnRegimeChange,
    );
    let err = e.run(&series, &prices, dec!(100000)).unwrap_err();
    match err {
        BacktestError::MissingInstrumentData { ticker, required_by } => {
            assert_eq!(ticker, "VNQ");
            assert!(required_by.contains("NEUTRAL"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
