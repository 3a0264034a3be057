//! Raw multi-ticker market data and the per-company tables split from it

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

/// A column reported by the market data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    Volume,
    AdjClose,
}

impl PriceField {
    /// Every field, in provider column order
    pub const ALL: [PriceField; 6] = [
        Self::Open,
        Self::High,
        Self::Low,
        Self::Close,
        Self::Volume,
        Self::AdjClose,
    ];

    /// Fields copied verbatim into a company table when present
    pub const STANDARD: [PriceField; 5] = [
        Self::Open,
        Self::High,
        Self::Low,
        Self::Close,
        Self::Volume,
    ];

    /// Provider column label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::High => "High",
            Self::Low => "Low",
            Self::Close => "Close",
            Self::Volume => "Volume",
            Self::AdjClose => "Adj Close",
        }
    }
}

/// One trading day for one ticker, as returned by the provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub adj_close: Option<f64>,
}

impl RawBar {
    /// A bar with no values
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            adj_close: None,
        }
    }

    /// Value of a single field
    pub fn value(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => self.close,
            PriceField::Volume => self.volume,
            PriceField::AdjClose => self.adj_close,
        }
    }
}

/// Wide fetch result: (field, ticker) columns over trading dates
///
/// `fields` records which columns the provider returned at all; a field
/// outside that set is treated as absent for every ticker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMarketTable {
    fields: BTreeSet<PriceField>,
    series: BTreeMap<String, Vec<RawBar>>,
}

impl RawMarketTable {
    /// The result of an unobtainable fetch
    pub fn empty() -> Self {
        Self::default()
    }

    /// A table whose provider reports the given columns
    pub fn with_fields(fields: impl IntoIterator<Item = PriceField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
            series: BTreeMap::new(),
        }
    }

    /// Add (or replace) one ticker's bars; rows are kept in date order
    pub fn insert_series(&mut self, ticker: impl Into<String>, mut bars: Vec<RawBar>) {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        self.series.insert(ticker.into(), bars);
    }

    /// True when no ticker has any rows
    pub fn is_empty(&self) -> bool {
        self.series.values().all(Vec::is_empty)
    }

    /// Whether the provider returned this column
    pub fn has_field(&self, field: PriceField) -> bool {
        self.fields.contains(&field)
    }

    /// Columns the provider returned
    pub fn fields(&self) -> impl Iterator<Item = PriceField> + '_ {
        self.fields.iter().copied()
    }

    /// Tickers with a series
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Rows for one ticker (empty when the ticker is unknown)
    pub fn series(&self, ticker: &str) -> &[RawBar] {
        self.series.get(ticker).map_or(&[], Vec::as_slice)
    }

    /// Total row count across tickers
    pub fn row_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }
}

/// One row of a per-company table
///
/// Every value is optional; `None` means undefined (missing in the source,
/// or a rolling statistic whose window has not filled).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
    pub adj_close: Option<f64>,
    pub ma20: Option<f64>,
    pub ma50: Option<f64>,
    pub volatility: Option<f64>,
}

impl DailyRow {
    /// A row with no values
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            adj_close: None,
            ma20: None,
            ma50: None,
            volatility: None,
        }
    }

    /// A row carrying only a closing price
    pub fn with_close(date: NaiveDate, close: f64) -> Self {
        Self {
            close: Some(close),
            ..Self::new(date)
        }
    }
}

/// Date-indexed table for one company
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyTable {
    columns: BTreeSet<PriceField>,
    close_from_adjusted: bool,
    rows: Vec<DailyRow>,
}

impl CompanyTable {
    /// A table with no rows and no columns
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from rows (sorted by date) and the set of source columns present
    pub fn from_rows(columns: impl IntoIterator<Item = PriceField>, mut rows: Vec<DailyRow>) -> Self {
        rows.sort_by_key(|r| r.date);
        Self {
            columns: columns.into_iter().collect(),
            close_from_adjusted: false,
            rows,
        }
    }

    /// Build a close-only table from (date, close) pairs
    pub fn from_closes(closes: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        let rows = closes
            .into_iter()
            .map(|(date, close)| DailyRow::with_close(date, close))
            .collect();
        Self::from_rows([PriceField::Close], rows)
    }

    /// Extract one ticker's columns from the raw table
    ///
    /// Standard OHLCV fields are copied when the provider returned them,
    /// Adj Close likewise. When Close is absent but Adj Close is present,
    /// Close takes the adjusted values. An empty raw table, or a ticker with
    /// no rows, produces an empty table.
    pub fn from_raw(raw: &RawMarketTable, ticker: &str) -> Self {
        let bars = raw.series(ticker);
        if bars.is_empty() {
            return Self::empty();
        }

        let mut columns: BTreeSet<PriceField> = PriceField::STANDARD
            .into_iter()
            .filter(|f| raw.has_field(*f))
            .collect();
        if raw.has_field(PriceField::AdjClose) {
            columns.insert(PriceField::AdjClose);
        }

        let close_from_adjusted =
            !columns.contains(&PriceField::Close) && columns.contains(&PriceField::AdjClose);
        if close_from_adjusted {
            columns.insert(PriceField::Close);
        }

        let pick = |bar: &RawBar, field: PriceField| {
            if raw.has_field(field) {
                bar.value(field)
            } else {
                None
            }
        };

        let rows = bars
            .iter()
            .map(|bar| {
                let adj_close = pick(bar, PriceField::AdjClose);
                DailyRow {
                    open: pick(bar, PriceField::Open),
                    high: pick(bar, PriceField::High),
                    low: pick(bar, PriceField::Low),
                    close: if close_from_adjusted {
                        adj_close
                    } else {
                        pick(bar, PriceField::Close)
                    },
                    volume: pick(bar, PriceField::Volume),
                    adj_close,
                    ..DailyRow::new(bar.date)
                }
            })
            .collect();

        Self {
            columns,
            close_from_adjusted,
            rows,
        }
    }

    /// True when the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows in date order
    pub fn rows(&self) -> &[DailyRow] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [DailyRow] {
        &mut self.rows
    }

    /// Whether a source column is present
    pub fn has_column(&self, field: PriceField) -> bool {
        self.columns.contains(&field)
    }

    /// Whether Close was derived from Adj Close
    pub fn close_from_adjusted(&self) -> bool {
        self.close_from_adjusted
    }

    /// Close column (undefined entries included)
    pub fn closes(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.close).collect()
    }

    /// Defined closing prices with their dates
    pub fn defined_closes(&self) -> impl DoubleEndedIterator<Item = (NaiveDate, f64)> + '_ {
        self.rows.iter().filter_map(|r| r.close.map(|c| (r.date, c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn bar(d: u32, close: f64) -> RawBar {
        RawBar {
            open: Some(close - 1.0),
            high: Some(close + 1.0),
            low: Some(close - 2.0),
            close: Some(close),
            volume: Some(1_000.0),
            adj_close: Some(close * 0.99),
            ..RawBar::new(day(d))
        }
    }

    #[test]
    fn test_empty_raw_table() {
        let raw = RawMarketTable::empty();
        assert!(raw.is_empty());

        let table = CompanyTable::from_raw(&raw, "AAPL");
        assert!(table.is_empty());
        assert!(!table.has_column(PriceField::Close));
    }

    #[test]
    fn test_split_copies_present_columns() {
        let mut raw = RawMarketTable::with_fields(PriceField::ALL);
        raw.insert_series("AAPL", vec![bar(2, 10.0), bar(1, 9.0)]);
        raw.insert_series("MSFT", vec![bar(1, 400.0)]);

        let table = CompanyTable::from_raw(&raw, "AAPL");
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].date, day(1));
        assert_eq!(table.rows()[0].close, Some(9.0));
        assert_eq!(table.rows()[1].high, Some(11.0));
        assert_eq!(table.rows()[1].adj_close, Some(9.9));
        assert!(table.has_column(PriceField::Volume));
        assert!(!table.close_from_adjusted());
    }

    #[test]
    fn test_missing_close_uses_adjusted() {
        let mut raw = RawMarketTable::with_fields([
            PriceField::Open,
            PriceField::High,
            PriceField::Low,
            PriceField::Volume,
            PriceField::AdjClose,
        ]);
        raw.insert_series("TSLA", vec![bar(1, 200.0)]);

        let table = CompanyTable::from_raw(&raw, "TSLA");
        assert!(table.close_from_adjusted());
        assert!(table.has_column(PriceField::Close));
        assert_eq!(table.rows()[0].close, Some(198.0));
        assert_eq!(table.rows()[0].adj_close, Some(198.0));
    }

    #[test]
    fn test_absent_field_is_not_copied() {
        let mut raw = RawMarketTable::with_fields([PriceField::Close]);
        raw.insert_series("AMZN", vec![bar(1, 150.0)]);

        let table = CompanyTable::from_raw(&raw, "AMZN");
        assert_eq!(table.rows()[0].close, Some(150.0));
        assert_eq!(table.rows()[0].open, None);
        assert_eq!(table.rows()[0].adj_close, None);
        assert!(!table.has_column(PriceField::AdjClose));
    }

    #[test]
    fn test_unknown_ticker_is_empty() {
        let mut raw = RawMarketTable::with_fields(PriceField::ALL);
        raw.insert_series("AAPL", vec![bar(1, 10.0)]);

        assert!(CompanyTable::from_raw(&raw, "GOOGL").is_empty());
        assert_eq!(raw.row_count(), 1);
        assert_eq!(raw.tickers().collect::<Vec<_>>(), ["AAPL"]);
    }

    #[test]
    fn test_duplicate_dates_collapse() {
        let mut raw = RawMarketTable::with_fields(PriceField::ALL);
        raw.insert_series("AAPL", vec![bar(1, 10.0), bar(1, 11.0)]);
        assert_eq!(raw.series("AAPL").len(), 1);
    }
}
