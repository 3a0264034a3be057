//! The fixed set of companies shown on the dashboard

/// A tracked company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Company {
    /// Human-readable name, also the keyword the assistant matches on
    pub name: &'static str,
    /// Exchange ticker symbol
    pub ticker: &'static str,
}

impl Company {
    /// Create a registry entry
    pub const fn new(name: &'static str, ticker: &'static str) -> Self {
        Self { name, ticker }
    }
}

/// Companies in display order
pub const COMPANIES: &[Company] = &[
    Company::new("Apple", "AAPL"),
    Company::new("Microsoft", "MSFT"),
    Company::new("Amazon", "AMZN"),
    Company::new("Google", "GOOGL"),
    Company::new("Tesla", "TSLA"),
];

/// Ordered, immutable company → ticker mapping
///
/// Iteration order is definition order; the dashboard renders charts and the
/// local assistant resolves company names in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanyRegistry {
    companies: &'static [Company],
}

impl Default for CompanyRegistry {
    fn default() -> Self {
        Self::new(COMPANIES)
    }
}

impl CompanyRegistry {
    /// Wrap a static company list
    pub const fn new(companies: &'static [Company]) -> Self {
        Self { companies }
    }

    /// Companies in registry order
    pub fn iter(&self) -> impl Iterator<Item = &'static Company> + '_ {
        self.companies.iter()
    }

    /// Ticker symbols in registry order
    pub fn tickers(&self) -> Vec<String> {
        self.companies.iter().map(|c| c.ticker.to_string()).collect()
    }

    /// Look up a company by exact name
    pub fn by_name(&self, name: &str) -> Option<&'static Company> {
        self.companies.iter().find(|c| c.name == name)
    }

    /// Number of companies
    pub fn len(&self) -> usize {
        self.companies.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }
}
