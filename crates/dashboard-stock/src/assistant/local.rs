//! Keyword-driven answers computed from the loaded tables

use crate::registry::Company;
use crate::snapshot::MarketSnapshot;
use crate::table::CompanyTable;
use chrono::NaiveDate;

/// Rows considered for the one-month trend
pub const TREND_WINDOW: usize = 30;

/// Reply when no company name appears in the question
pub const UNKNOWN_COMPANY_REPLY: &str = "Sorry, I didn't understand the question. Ask about trend, average price, highest or lowest price of a company.";

/// Reply when a company is named but no question keyword is
pub const UNKNOWN_QUESTION_REPLY: &str =
    "Ask me about the trend, average price, highest or lowest price of the company.";

/// Keyword groups, matched as lower-case substrings
pub mod keywords {
    pub const TREND: &[&str] = &["trend"];
    pub const AVERAGE: &[&str] = &["average", "mean"];
    pub const HIGHEST: &[&str] = &["highest", "peak"];
    pub const LOWEST: &[&str] = &["lowest", "dip"];
}

/// What a question asks about a company
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question {
    Trend,
    Average,
    Highest,
    Lowest,
    Unknown,
}

impl Question {
    /// Classify lower-cased text; earlier groups take priority
    pub fn classify(text: &str) -> Self {
        if matches_any(text, keywords::TREND) {
            Self::Trend
        } else if matches_any(text, keywords::AVERAGE) {
            Self::Average
        } else if matches_any(text, keywords::HIGHEST) {
            Self::Highest
        } else if matches_any(text, keywords::LOWEST) {
            Self::Lowest
        } else {
            Self::Unknown
        }
    }
}

fn matches_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

/// Answers trend, average, highest and lowest questions locally
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalResponder;

impl LocalResponder {
    /// Create a local responder
    pub fn new() -> Self {
        Self
    }

    /// Answer a free-text question
    pub fn respond(&self, text: &str, snapshot: &MarketSnapshot) -> String {
        let text = text.to_lowercase();

        let Some(entry) = snapshot
            .iter()
            .find(|entry| text.contains(&entry.company.name.to_lowercase()))
        else {
            return UNKNOWN_COMPANY_REPLY.to_string();
        };

        let company = entry.company;
        let table = &entry.table;
        if table.is_empty() {
            return no_data(company);
        }

        match Question::classify(&text) {
            Question::Trend => trend(company, table),
            Question::Average => average_close(table).map_or_else(
                || no_data(company),
                |avg| {
                    format!(
                        "The average closing price of {} over the past year was ${avg:.2}.",
                        company.name
                    )
                },
            ),
            Question::Highest => extreme_close(table, |a, b| a > b).map_or_else(
                || no_data(company),
                |(date, price)| {
                    format!(
                        "The highest closing price of {} in the past year was ${price:.2} on {}.",
                        company.name,
                        date.format("%Y-%m-%d")
                    )
                },
            ),
            Question::Lowest => extreme_close(table, |a, b| a < b).map_or_else(
                || no_data(company),
                |(date, price)| {
                    format!(
                        "The lowest closing price of {} in the past year was ${price:.2} on {}.",
                        company.name,
                        date.format("%Y-%m-%d")
                    )
                },
            ),
            Question::Unknown => UNKNOWN_QUESTION_REPLY.to_string(),
        }
    }
}

fn no_data(company: &Company) -> String {
    format!("No data available for {}.", company.name)
}

fn trend(company: &Company, table: &CompanyTable) -> String {
    let rows = table.rows();
    let recent: Vec<f64> = rows[rows.len().saturating_sub(TREND_WINDOW)..]
        .iter()
        .filter_map(|r| r.close)
        .collect();

    let [first, .., last] = recent.as_slice() else {
        return not_enough(company);
    };

    let change = last - first;
    if change > 0.0 {
        format!(
            "The trend for {} over the last month is upward 📈.",
            company.name
        )
    } else if change < 0.0 {
        format!(
            "The trend for {} over the last month is downward 📉.",
            company.name
        )
    } else {
        format!(
            "The trend for {} over the last month has been flat.",
            company.name
        )
    }
}

fn not_enough(company: &Company) -> String {
    format!("Not enough data to determine trend for {}.", company.name)
}

fn average_close(table: &CompanyTable) -> Option<f64> {
    let (sum, n) = table
        .defined_closes()
        .fold((0.0, 0_usize), |(sum, n), (_, c)| (sum + c, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// First close that beats every other under `better`
fn extreme_close<F>(table: &CompanyTable, better: F) -> Option<(NaiveDate, f64)>
where
    F: Fn(f64, f64) -> bool,
{
    table
        .defined_closes()
        .fold(None, |best: Option<(NaiveDate, f64)>, (date, close)| match best {
            Some((_, b)) if !better(close, b) => best,
            _ => Some((date, close)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CompanyRegistry;
    use crate::table::{DailyRow, PriceField};
    use chrono::Duration;
    use std::collections::HashMap;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn closes(values: &[f64]) -> CompanyTable {
        CompanyTable::from_closes(
            values
                .iter()
                .enumerate()
                .map(|(i, c)| (start() + Duration::days(i as i64), *c)),
        )
    }

    fn sparse(values: &[Option<f64>]) -> CompanyTable {
        let rows = values
            .iter()
            .enumerate()
            .map(|(i, close)| DailyRow {
                close: *close,
                ..DailyRow::new(start() + Duration::days(i as i64))
            })
            .collect();
        CompanyTable::from_rows([PriceField::Close], rows)
    }

    fn snapshot(tables: Vec<(&str, CompanyTable)>) -> MarketSnapshot {
        let tables: HashMap<String, CompanyTable> = tables
            .into_iter()
            .map(|(name, t)| (name.to_string(), t))
            .collect();
        MarketSnapshot::from_tables(CompanyRegistry::default(), tables)
    }

    fn ask(snapshot: &MarketSnapshot, text: &str) -> String {
        LocalResponder::new().respond(text, snapshot)
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(Question::classify("trend and average"), Question::Trend);
        assert_eq!(Question::classify("mean or peak"), Question::Average);
        assert_eq!(Question::classify("peak dip"), Question::Highest);
        assert_eq!(Question::classify("biggest dip"), Question::Lowest);
        assert_eq!(Question::classify("hello"), Question::Unknown);
    }

    #[test]
    fn test_average() {
        let snap = snapshot(vec![("Apple", closes(&[10.0, 20.0, 30.0]))]);
        assert_eq!(
            ask(&snap, "What's the average price of Apple?"),
            "The average closing price of Apple over the past year was $20.00."
        );
    }

    #[test]
    fn test_highest_and_lowest() {
        let snap = snapshot(vec![("Tesla", closes(&[5.0, 9.0, 1.0, 9.0, 1.0]))]);
        assert_eq!(
            ask(&snap, "tesla peak"),
            "The highest closing price of Tesla in the past year was $9.00 on 2024-01-02."
        );
        assert_eq!(
            ask(&snap, "TESLA lowest?"),
            "The lowest closing price of Tesla in the past year was $1.00 on 2024-01-03."
        );
    }

    #[test]
    fn test_trend_directions() {
        let up: Vec<f64> = (1..=40).map(f64::from).collect();
        let snap = snapshot(vec![
            ("Google", closes(&up)),
            ("Amazon", closes(&[3.0, 2.0, 1.0])),
            ("Microsoft", closes(&[4.0, 7.0, 4.0])),
            ("Apple", closes(&[100.0])),
        ]);

        assert_eq!(
            ask(&snap, "Google trend"),
            "The trend for Google over the last month is upward 📈."
        );
        assert_eq!(
            ask(&snap, "amazon trend"),
            "The trend for Amazon over the last month is downward 📉."
        );
        assert_eq!(
            ask(&snap, "microsoft trend"),
            "The trend for Microsoft over the last month has been flat."
        );
        assert_eq!(
            ask(&snap, "apple trend"),
            "Not enough data to determine trend for Apple."
        );
    }

    #[test]
    fn test_trend_uses_last_month_only() {
        // Falls overall, rises across the final 30 rows
        let mut values: Vec<f64> = (0..20).map(|i| 1000.0 - f64::from(i)).collect();
        values.extend((0..30).map(|i| 10.0 + f64::from(i)));
        let snap = snapshot(vec![("Apple", closes(&values))]);
        assert_eq!(
            ask(&snap, "apple trend"),
            "The trend for Apple over the last month is upward 📈."
        );
    }

    #[test]
    fn test_no_data_for_company() {
        let snap = snapshot(vec![]);
        assert_eq!(ask(&snap, "apple trend"), "No data available for Apple.");
    }

    #[test]
    fn test_unknown_inputs() {
        let snap = snapshot(vec![("Apple", closes(&[1.0, 2.0]))]);
        assert_eq!(ask(&snap, "Hello"), UNKNOWN_COMPANY_REPLY);
        assert_eq!(ask(&snap, "Tell me about Apple"), UNKNOWN_QUESTION_REPLY);
    }

    #[test]
    fn test_first_company_in_registry_order_wins() {
        let snap = snapshot(vec![
            ("Apple", closes(&[1.0, 2.0])),
            ("Tesla", closes(&[50.0, 60.0])),
        ]);
        assert_eq!(
            ask(&snap, "average of tesla vs apple"),
            "The average closing price of Apple over the past year was $1.50."
        );
    }

    #[test]
    fn test_trend_skips_undefined_closes() {
        // Window edges are undefined; the defined closes inside it rise
        let mut values: Vec<Option<f64>> = (0..10).map(|i| Some(500.0 - f64::from(i))).collect();
        values.push(None);
        values.extend((1..29).map(|i| Some(f64::from(i))));
        values.push(None);
        assert_eq!(values.len(), 40);

        let snap = snapshot(vec![("Amazon", sparse(&values))]);
        assert_eq!(
            ask(&snap, "amazon trend"),
            "The trend for Amazon over the last month is upward 📈."
        );
    }

    #[test]
    fn test_trend_needs_two_defined_closes() {
        let snap = snapshot(vec![("Google", sparse(&[None, Some(5.0), None]))]);
        assert_eq!(
            ask(&snap, "google trend"),
            "Not enough data to determine trend for Google."
        );
    }

    #[test]
    fn test_undefined_closes_have_no_statistics() {
        let snap = snapshot(vec![("Apple", sparse(&[None, None, None]))]);
        for question in ["apple average", "apple highest", "apple lowest"] {
            assert_eq!(ask(&snap, question), "No data available for Apple.");
        }
        assert_eq!(
            ask(&snap, "apple trend"),
            "Not enough data to determine trend for Apple."
        );
    }

    #[test]
    fn test_statistics_ignore_undefined_closes() {
        let snap = snapshot(vec![(
            "Tesla",
            sparse(&[None, Some(4.0), None, Some(8.0), None]),
        )]);
        assert_eq!(
            ask(&snap, "tesla mean"),
            "The average closing price of Tesla over the past year was $6.00."
        );
        assert_eq!(
            ask(&snap, "tesla lowest"),
            "The lowest closing price of Tesla in the past year was $4.00 on 2024-01-02."
        );
    }
}
