//! Dashboard page rendering

use crate::error::Result;
use chrono::{Datelike, Utc};
use dashboard_stock::{CompanySnapshot, MarketSnapshot};
use minijinja::{Environment, context};
use serde::Serialize;

/// Page heading and document title
pub const PAGE_TITLE: &str = "Live Stock Dashboard with AI Agent";

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
const INDEX_NAME: &str = "index.html";

#[derive(Debug, Serialize)]
struct CompanyView<'a> {
    name: &'a str,
    chart: &'a str,
}

#[derive(Debug, Serialize, PartialEq)]
struct TickerView {
    label: String,
    class: &'static str,
}

impl TickerView {
    fn from_company(entry: &CompanySnapshot) -> Self {
        let name = entry.company.name;
        match entry.summary {
            Some(summary) => {
                let change = summary
                    .change_pct
                    .map_or_else(String::new, |c| format!(" ({c:+.2}%)"));
                Self {
                    label: format!("{name}: ${:.2}{change}", summary.last_close),
                    class: if summary.is_up() {
                        "stock-ticker"
                    } else {
                        "stock-ticker down"
                    },
                }
            }
            None => Self {
                label: format!("{name}: n/a"),
                class: "stock-ticker missing",
            },
        }
    }
}

/// Renders the dashboard from the embedded template
///
/// The `.html` template name turns on HTML auto-escaping; chart fragments
/// are marked safe and inserted verbatim.
pub struct PageRenderer {
    env: Environment<'static>,
}

impl PageRenderer {
    /// Load the embedded template
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(INDEX_NAME, INDEX_TEMPLATE)?;
        Ok(Self { env })
    }

    /// Render the full page for a snapshot
    pub fn render(&self, snapshot: &MarketSnapshot) -> Result<String> {
        let companies: Vec<CompanyView<'_>> = snapshot
            .iter()
            .map(|entry| CompanyView {
                name: entry.company.name,
                chart: entry.chart.as_str(),
            })
            .collect();
        let tickers: Vec<TickerView> = snapshot.iter().map(TickerView::from_company).collect();

        let template = self.env.get_template(INDEX_NAME)?;
        Ok(template.render(context! {
            title => PAGE_TITLE,
            companies => companies,
            tickers => tickers,
            year => Utc::now().year(),
        })?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use dashboard_stock::{CompanyRegistry, CompanyTable};
    use std::collections::HashMap;

    fn snapshot() -> MarketSnapshot {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut tables = HashMap::new();
        tables.insert(
            "Amazon".to_string(),
            CompanyTable::from_closes([(start, 100.0), (start + Duration::days(1), 98.0)]),
        );
        MarketSnapshot::from_tables(CompanyRegistry::default(), tables)
    }

    #[test]
    fn test_page_embeds_fragments_in_order() {
        let snapshot = snapshot();
        let html = PageRenderer::new().unwrap().render(&snapshot).unwrap();

        assert!(html.contains("<h1>Live Stock Dashboard with AI Agent</h1>"));
        let positions: Vec<usize> = snapshot
            .iter()
            .map(|entry| html.find(entry.chart.as_str()).expect("fragment embedded"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        // Placeholders are inserted without escaping
        assert!(html.contains("<div style='color:red; text-align:center;'>No data available for Apple.</div>"));
        assert!(html.contains("Plotly.newPlot(\"chart-amazon\""));
    }

    #[test]
    fn test_ticker_labels() {
        let snapshot = snapshot();
        let amazon = TickerView::from_company(snapshot.get("Amazon").unwrap());
        assert_eq!(amazon.label, "Amazon: $98.00 (-2.00%)");
        assert_eq!(amazon.class, "stock-ticker down");

        let apple = TickerView::from_company(snapshot.get("Apple").unwrap());
        assert_eq!(apple.label, "Apple: n/a");
        assert_eq!(apple.class, "stock-ticker missing");
    }
}
