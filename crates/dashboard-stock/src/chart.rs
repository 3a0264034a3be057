//! Embeddable Plotly chart fragments
//!
//! Fragments assume the page has already loaded plotly.js. Chart data is
//! serialized as JSON from typed structs; undefined values become `null`,
//! which Plotly draws as gaps.

use crate::error::Result;
use crate::table::CompanyTable;
use minijinja::HtmlEscape;
use serde::Serialize;
use tracing::error;

const BACKGROUND: &str = "#1e1e1e";
const FOREGROUND: &str = "#e0e0e0";

/// What a fragment shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// An interactive chart
    Chart,
    /// The company table had no rows
    NoData,
    /// The table had rows but nothing could be plotted
    NoValidData,
}

/// Self-contained HTML for one company's chart, or a placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFragment {
    html: String,
    kind: FragmentKind,
}

impl ChartFragment {
    /// Placeholder shown when a company has no rows
    pub fn no_data(company: &str) -> Self {
        Self::placeholder(
            format!("No data available for {}.", HtmlEscape(company)),
            FragmentKind::NoData,
        )
    }

    /// Placeholder shown when rendering is impossible
    pub fn no_valid_data(company: &str) -> Self {
        Self::placeholder(
            format!("No valid data available for {}.", HtmlEscape(company)),
            FragmentKind::NoValidData,
        )
    }

    fn placeholder(message: String, kind: FragmentKind) -> Self {
        Self {
            html: format!("<div style='color:red; text-align:center;'>{message}</div>"),
            kind,
        }
    }

    /// Fragment markup
    pub fn as_str(&self) -> &str {
        &self.html
    }

    /// What the fragment shows
    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    /// Whether this is an interactive chart
    pub fn is_chart(&self) -> bool {
        self.kind == FragmentKind::Chart
    }

    /// Consume into the markup string
    pub fn into_html(self) -> String {
        self.html
    }
}

/// One plotted line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Series {
    Close,
    Ma20,
    Ma50,
}

impl Series {
    const ALL: [Series; 3] = [Self::Close, Self::Ma20, Self::Ma50];

    fn name(self) -> &'static str {
        match self {
            Self::Close => "Close Price",
            Self::Ma20 => "MA20",
            Self::Ma50 => "MA50",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Close => "cyan",
            Self::Ma20 => "orange",
            Self::Ma50 => "lightgreen",
        }
    }

    fn values(self, table: &CompanyTable) -> Vec<Option<f64>> {
        table
            .rows()
            .iter()
            .map(|r| match self {
                Self::Close => r.close,
                Self::Ma20 => r.ma20,
                Self::Ma50 => r.ma50,
            })
            .collect()
    }
}

#[derive(Serialize)]
struct Trace<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    mode: &'static str,
    name: &'static str,
    x: &'a [String],
    y: Vec<Option<f64>>,
    line: Line,
}

#[derive(Serialize)]
struct Line {
    color: &'static str,
}

#[derive(Serialize)]
struct Title {
    text: String,
}

#[derive(Serialize)]
struct Axis {
    title: Title,
    color: &'static str,
}

#[derive(Serialize)]
struct Font {
    color: &'static str,
}

#[derive(Serialize)]
struct Legend {
    bgcolor: &'static str,
}

#[derive(Serialize)]
struct Layout {
    title: Title,
    xaxis: Axis,
    yaxis: Axis,
    hovermode: &'static str,
    plot_bgcolor: &'static str,
    paper_bgcolor: &'static str,
    font: Font,
    legend: Legend,
}

impl Layout {
    fn for_company(company: &str) -> Self {
        let axis = |text: &str| Axis {
            title: Title {
                text: text.to_string(),
            },
            color: FOREGROUND,
        };
        Self {
            title: Title {
                text: format!("{company} Stock Price and Moving Averages (1 Year)"),
            },
            xaxis: axis("Date"),
            yaxis: axis("Price (USD)"),
            hovermode: "x unified",
            plot_bgcolor: BACKGROUND,
            paper_bgcolor: BACKGROUND,
            font: Font { color: FOREGROUND },
            legend: Legend {
                bgcolor: BACKGROUND,
            },
        }
    }
}

#[derive(Serialize)]
struct PlotConfig {
    responsive: bool,
}

/// Deterministic element id for a company's chart
pub fn chart_id(company: &str) -> String {
    let slug: String = company
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("chart-{slug}")
}

/// Render a company's chart fragment
///
/// Empty tables yield the "No data" placeholder. Only series with at least
/// one defined value are plotted; when none qualify, or the chart fails to
/// serialize, the "No valid data" placeholder is returned. Rendering is pure:
/// the same table and name always produce the same markup.
pub fn render_chart(table: &CompanyTable, company: &str) -> ChartFragment {
    if table.is_empty() {
        return ChartFragment::no_data(company);
    }

    let dates: Vec<String> = table
        .rows()
        .iter()
        .map(|r| r.date.format("%Y-%m-%d").to_string())
        .collect();

    let traces: Vec<Trace<'_>> = Series::ALL
        .into_iter()
        .filter_map(|series| {
            let y = series.values(table);
            y.iter().any(Option::is_some).then(|| Trace {
                kind: "scatter",
                mode: "lines",
                name: series.name(),
                x: &dates,
                y,
                line: Line {
                    color: series.color(),
                },
            })
        })
        .collect();

    if traces.is_empty() {
        error!(company = %company, "No plottable series");
        return ChartFragment::no_valid_data(company);
    }

    match build_chart(&traces, company) {
        Ok(html) => ChartFragment {
            html,
            kind: FragmentKind::Chart,
        },
        Err(e) => {
            error!(company = %company, error = %e, "Error generating chart");
            ChartFragment::no_valid_data(company)
        }
    }
}

fn build_chart(traces: &[Trace<'_>], company: &str) -> Result<String> {
    let data = script_json(&traces)?;
    let layout = script_json(&Layout::for_company(company))?;
    let config = script_json(&PlotConfig { responsive: true })?;
    let id = chart_id(company);

    Ok(format!(
        concat!(
            "<div id=\"{id}\" class=\"plotly-graph-div\" style=\"height:100%; width:100%;\"></div>\n",
            "<script type=\"text/javascript\">\n",
            "    if (document.getElementById(\"{id}\")) {{\n",
            "        Plotly.newPlot(\"{id}\", {data}, {layout}, {config});\n",
            "    }}\n",
            "</script>"
        ),
        id = id,
        data = data,
        layout = layout,
        config = config,
    ))
}

/// JSON safe to inline inside a `<script>` element
fn script_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}
