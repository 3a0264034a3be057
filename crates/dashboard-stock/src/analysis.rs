//! Rolling indicators over closing prices
//!
//! A window is defined only once it holds `window` rows, and only when every
//! close inside it is defined. Volatility is the sample (n - 1) standard
//! deviation.

use crate::table::CompanyTable;

/// Short moving-average window
pub const MA_SHORT_WINDOW: usize = 20;

/// Long moving-average window
pub const MA_LONG_WINDOW: usize = 50;

/// Volatility window
pub const VOLATILITY_WINDOW: usize = 20;

/// Trailing mean over each full window
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| w.iter().sum::<f64>() / w.len() as f64)
}

/// Trailing sample standard deviation over each full window
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }

    rolling(values, window, |w| {
        let n = w.len() as f64;
        let mean = w.iter().sum::<f64>() / n;
        let ss: f64 = w.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    })
}

fn rolling<F>(values: &[Option<f64>], window: usize, stat: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut buf = Vec::with_capacity(window);
    (0..values.len())
        .map(|end| {
            if end + 1 < window {
                return None;
            }
            buf.clear();
            for v in &values[end + 1 - window..=end] {
                buf.push((*v)?);
            }
            Some(stat(&buf))
        })
        .collect()
}

/// Add MA20, MA50 and Volatility to a company table
///
/// An empty table is returned unchanged. Derived values are only filled
/// where their window is complete.
pub fn add_indicators(mut table: CompanyTable) -> CompanyTable {
    if table.is_empty() {
        return table;
    }

    let closes = table.closes();
    let ma20 = rolling_mean(&closes, MA_SHORT_WINDOW);
    let ma50 = rolling_mean(&closes, MA_LONG_WINDOW);
    let volatility = rolling_std(&closes, VOLATILITY_WINDOW);

    for (i, row) in table.rows_mut().iter_mut().enumerate() {
        row.ma20 = ma20[i];
        row.ma50 = ma50[i];
        row.volatility = volatility[i];
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn close_table(closes: impl IntoIterator<Item = f64>) -> CompanyTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        CompanyTable::from_closes(
            closes
                .into_iter()
                .enumerate()
                .map(|(i, c)| (start + Duration::days(i as i64), c)),
        )
    }

    fn approx(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value should be defined");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_ramp_indicators() {
        // Close = 1..=60
        let table = add_indicators(close_table((1..=60).map(f64::from)));
        let rows = table.rows();

        approx(rows[49].ma50, 25.5);
        approx(rows[19].ma20, 10.5);
        approx(rows[19].volatility, 5.916_079_783_099_616);

        assert!(rows[48].ma50.is_none());
        assert!(rows[18].ma20.is_none());
        assert!(rows[18].volatility.is_none());
        approx(rows[59].ma20, 50.5);
        approx(rows[59].ma50, 35.5);
    }

    #[test]
    fn test_constant_series_has_zero_volatility() {
        let table = add_indicators(close_table(std::iter::repeat_n(100.0, 25)));
        approx(table.rows()[24].volatility, 0.0);
        approx(table.rows()[24].ma20, 100.0);
    }

    #[test]
    fn test_short_history_has_no_indicators() {
        let table = add_indicators(close_table((1..=10).map(f64::from)));
        assert!(table.rows().iter().all(|r| r.ma20.is_none()
            && r.ma50.is_none()
            && r.volatility.is_none()));
    }

    #[test]
    fn test_undefined_close_poisons_window() {
        let mut closes: Vec<Option<f64>> = (1..=25).map(|v| Some(f64::from(v))).collect();
        closes[10] = None;

        // Every full window ending at 19..=24 still covers index 10
        let mean = rolling_mean(&closes, 20);
        assert_eq!(mean.len(), 25);
        assert!(mean.iter().all(Option::is_none));

        let std = rolling_std(&closes, 5);
        assert!(std[9].is_some());
        assert!(std[10..15].iter().all(Option::is_none));
        assert!(std[15].is_some());
    }

    #[test]
    fn test_degenerate_windows() {
        let values = [Some(1.0), Some(2.0)];
        assert_eq!(rolling_mean(&values, 0), vec![None, None]);
        assert_eq!(rolling_std(&values, 1), vec![None, None]);
        assert_eq!(rolling_mean(&values, 1), vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_empty_table_unchanged() {
        let table = add_indicators(CompanyTable::empty());
        assert!(table.is_empty());
    }
}
