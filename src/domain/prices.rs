use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// Date-indexed close prices per instrument.
///
/// Lookups carry the last observed price forward, so a gap in the data reads
/// as a hold, not a zero return.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    series: HashMap<String, BTreeMap<NaiveDate, Decimal>>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ticker: &str, date: NaiveDate, close: Decimal) {
        self.series
            .entry(ticker.to_string())
            .or_default()
            .insert(date, close);
    }

    /// Whether the instrument has any price history at all.
    pub fn has_history(&self, ticker: &str) -> bool {
        self.series.get(ticker).is_some_and(|s| !s.is_empty())
    }

    /// Last close at or before `date`. None when the instrument has not
    /// printed yet.
    pub fn close_on_or_before(&self, ticker: &str, date: NaiveDate) -> Option<Decimal> {
        self.series
            .get(ticker)?
            .range(..=date)
            .next_back()
            .map(|(_, close)| *close)
    }

    pub fn first_date(&self, ticker: &str) -> Option<NaiveDate> {
        self.series.get(ticker)?.keys().next().copied()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Sub-table restricted to the given instruments and date range, both
    /// bounds inclusive.
    pub fn restricted(&self, tickers: &[String], start: NaiveDate, end: NaiveDate) -> PriceTable {
        let mut out = PriceTable::new();
        for ticker in tickers {
            if let Some(series) = self.series.get(ticker) {
                for (date, close) in series.range(start..=end) {
                    out.insert(ticker, *date, *close);
                }
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}
