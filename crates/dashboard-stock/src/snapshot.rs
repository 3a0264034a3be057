//! The in-memory dataset the dashboard serves
//!
//! Built once at startup and read-only afterwards; share it behind an `Arc`.

use crate::analysis::add_indicators;
use crate::api::MarketDataSource;
use crate::chart::{ChartFragment, render_chart};
use crate::fetcher::MarketDataFetcher;
use crate::registry::{Company, CompanyRegistry};
use crate::table::{CompanyTable, RawMarketTable};
use std::collections::HashMap;
use tracing::{info, warn};

/// Latest close and day-over-day change, shown in the ticker bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickerSummary {
    pub last_close: f64,
    /// Percent change against the previous defined close, when there is one
    pub change_pct: Option<f64>,
}

impl TickerSummary {
    /// Summarize a company table; `None` when it has no defined close
    pub fn from_table(table: &CompanyTable) -> Option<Self> {
        let mut closes = table.defined_closes().map(|(_, c)| c).rev();
        let last_close = closes.next()?;
        let change_pct = closes
            .next()
            .filter(|prev| *prev != 0.0)
            .map(|prev| (last_close - prev) / prev * 100.0);
        Some(Self {
            last_close,
            change_pct,
        })
    }

    /// Whether the last move was not downward
    pub fn is_up(&self) -> bool {
        self.change_pct.is_none_or(|c| c >= 0.0)
    }
}

/// Everything known about one company
#[derive(Debug, Clone)]
pub struct CompanySnapshot {
    pub company: &'static Company,
    pub table: CompanyTable,
    pub chart: ChartFragment,
    pub summary: Option<TickerSummary>,
}

impl CompanySnapshot {
    fn build(company: &'static Company, table: CompanyTable) -> Self {
        let table = add_indicators(table);
        let chart = render_chart(&table, company.name);
        let summary = TickerSummary::from_table(&table);
        Self {
            company,
            table,
            chart,
            summary,
        }
    }

    /// Whether any rows were loaded
    pub fn has_data(&self) -> bool {
        !self.table.is_empty()
    }
}

/// Per-company tables, charts and summaries in registry order
///
/// Every registry company has an entry; companies whose data could not be
/// loaded carry an empty table and a placeholder fragment.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    registry: CompanyRegistry,
    companies: Vec<CompanySnapshot>,
}

impl MarketSnapshot {
    /// Fetch, split, analyze and render every registry company
    pub async fn load<S: MarketDataSource>(
        fetcher: &MarketDataFetcher<S>,
        registry: CompanyRegistry,
    ) -> Self {
        let raw = fetcher.fetch(&registry.tickers()).await;
        let snapshot = Self::from_raw(registry, &raw);
        info!(
            companies = snapshot.len(),
            with_data = snapshot.companies_with_data(),
            "Market snapshot ready"
        );
        snapshot
    }

    /// Build from an already-fetched raw table
    pub fn from_raw(registry: CompanyRegistry, raw: &RawMarketTable) -> Self {
        let companies = registry
            .iter()
            .map(|company| {
                let table = CompanyTable::from_raw(raw, company.ticker);
                if table.is_empty() && !raw.is_empty() {
                    warn!(company = %company.name, ticker = %company.ticker, "No rows for ticker");
                }
                CompanySnapshot::build(company, table)
            })
            .collect();
        Self {
            registry,
            companies,
        }
    }

    /// Build from per-company tables keyed by company name
    ///
    /// Companies missing from `tables` get an empty table.
    pub fn from_tables(registry: CompanyRegistry, mut tables: HashMap<String, CompanyTable>) -> Self {
        let companies = registry
            .iter()
            .map(|company| {
                let table = tables.remove(company.name).unwrap_or_default();
                CompanySnapshot::build(company, table)
            })
            .collect();
        Self {
            registry,
            companies,
        }
    }

    /// A snapshot where no company has data
    pub fn empty(registry: CompanyRegistry) -> Self {
        Self::from_raw(registry, &RawMarketTable::empty())
    }

    /// The registry this snapshot covers
    pub fn registry(&self) -> CompanyRegistry {
        self.registry
    }

    /// Entries in registry order
    pub fn iter(&self) -> impl Iterator<Item = &CompanySnapshot> {
        self.companies.iter()
    }

    /// Entry for a company name
    pub fn get(&self, name: &str) -> Option<&CompanySnapshot> {
        self.companies.iter().find(|c| c.company.name == name)
    }

    /// Table for a company name
    pub fn table(&self, name: &str) -> Option<&CompanyTable> {
        self.get(name).map(|c| &c.table)
    }

    /// Number of companies
    pub fn len(&self) -> usize {
        self.companies.len()
    }

    /// Whether the registry was empty
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// Number of companies with at least one row
    pub fn companies_with_data(&self) -> usize {
        self.companies.iter().filter(|c| c.has_data()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::FragmentKind;
    use crate::table::{PriceField, RawBar};
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn raw_with(tickers: &[&str], days: u32) -> RawMarketTable {
        let mut raw = RawMarketTable::with_fields(PriceField::ALL);
        for ticker in tickers {
            let bars = (0..days)
                .map(|i| RawBar {
                    close: Some(f64::from(i + 1)),
                    adj_close: Some(f64::from(i + 1)),
                    ..RawBar::new(start() + Duration::days(i64::from(i)))
                })
                .collect();
            raw.insert_series(*ticker, bars);
        }
        raw
    }

    #[test]
    fn test_every_company_has_an_entry() {
        let snapshot = MarketSnapshot::from_raw(CompanyRegistry::default(), &raw_with(&["AAPL"], 60));
        let names: Vec<_> = snapshot.iter().map(|c| c.company.name).collect();
        assert_eq!(names, ["Apple", "Microsoft", "Amazon", "Google", "Tesla"]);
        assert_eq!(snapshot.companies_with_data(), 1);

        let apple = snapshot.get("Apple").unwrap();
        assert!(apple.chart.is_chart());
        assert_eq!(apple.table.len(), 60);
        assert!(apple.table.rows()[49].ma50.is_some());

        let tesla = snapshot.get("Tesla").unwrap();
        assert_eq!(tesla.chart.kind(), FragmentKind::NoData);
        assert!(tesla.summary.is_none());
    }

    #[test]
    fn test_failed_fetch_gives_placeholders() {
        let snapshot = MarketSnapshot::empty(CompanyRegistry::default());
        assert_eq!(snapshot.len(), 5);
        assert!(snapshot.iter().all(|c| !c.has_data()
            && c.chart.kind() == FragmentKind::NoData));
    }

    #[test]
    fn test_from_tables() {
        let mut tables = HashMap::new();
        tables.insert(
            "Google".to_string(),
            CompanyTable::from_closes([(start(), 100.0), (start() + Duration::days(1), 110.0)]),
        );
        let snapshot = MarketSnapshot::from_tables(CompanyRegistry::default(), tables);

        assert_eq!(snapshot.table("Google").map(CompanyTable::len), Some(2));
        assert!(snapshot.table("Apple").is_some_and(CompanyTable::is_empty));
        assert!(snapshot.table("Netflix").is_none());
    }

    #[test]
    fn test_ticker_summary() {
        let table = CompanyTable::from_closes([
            (start(), 100.0),
            (start() + Duration::days(1), 90.0),
        ]);
        let summary = TickerSummary::from_table(&table).unwrap();
        assert!((summary.last_close - 90.0).abs() < f64::EPSILON);
        assert!((summary.change_pct.unwrap() + 10.0).abs() < 1e-9);
        assert!(!summary.is_up());

        let single = CompanyTable::from_closes([(start(), 50.0)]);
        let summary = TickerSummary::from_table(&single).unwrap();
        assert_eq!(summary.change_pct, None);
        assert!(summary.is_up());

        assert!(TickerSummary::from_table(&CompanyTable::empty()).is_none());
    }
}
