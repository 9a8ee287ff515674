//! Chart handlers.
//!
//! Every handler is a pure function of the context and the user inputs and
//! returns a Plotly-compatible figure.

use std::fmt;
use std::str::FromStr;

use di_model::{MetricKind, Modality};
use serde::{Deserialize, Serialize};

use crate::context::DashboardContext;
use crate::error::{DashboardError, Result};
use crate::rolling::rolling_mean;

/// Tableau 10 palette, first entries.
const TABLEAU: [&str; 3] = ["#1f77b4", "#ff7f0e", "#2ca02c"];
const BAR_COLOR: &str = TABLEAU[0];
const HIGHLIGHT_COLOR: &str = TABLEAU[2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceType {
    Bar,
    Scatter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub name: String,
    #[serde(rename = "type")]
    pub trace_type: TraceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl Trace {
    fn bar(name: impl Into<String>, x: Vec<String>, y: Vec<f64>) -> Self {
        Self {
            x,
            y,
            name: name.into(),
            trace_type: TraceType::Bar,
            marker: None,
            line: None,
            mode: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub color: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub dash: String,
    pub color: String,
}

/// The four dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Activity and waiting list over time for the selected region.
    Trend(Modality),
    /// Latest rolling value per region, ranked.
    Overall(Modality),
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Trend(Modality::Ct),
        ChartKind::Trend(Modality::Mri),
        ChartKind::Overall(Modality::Ct),
        ChartKind::Overall(Modality::Mri),
    ];
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Trend(modality) => write!(f, "{}-trend", modality.as_str().to_lowercase()),
            ChartKind::Overall(modality) => {
                write!(f, "{}-overall", modality.as_str().to_lowercase())
            }
        }
    }
}

impl FromStr for ChartKind {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || DashboardError::UnknownChart {
            name: s.to_string(),
        };
        let (modality, chart) = s.trim().split_once('-').ok_or_else(unknown)?;
        let modality = modality.parse::<Modality>().map_err(|_| unknown())?;
        match chart.to_ascii_lowercase().as_str() {
            "trend" => Ok(ChartKind::Trend(modality)),
            "overall" => Ok(ChartKind::Overall(modality)),
            _ => Err(unknown()),
        }
    }
}

/// One region's position in the cross-region ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankEntry {
    pub region: String,
    /// Last full-window rolling mean.
    pub value: f64,
}

fn iso_dates(periods: &[chrono::NaiveDate]) -> Vec<String> {
    periods
        .iter()
        .map(|period| period.format("%Y-%m-%d").to_string())
        .collect()
}

/// Activity and waiting-list bars for one region, smoothed over `window` periods.
///
/// Periods without a full window are dropped. An unknown region yields empty
/// traces.
pub fn region_trend(
    ctx: &DashboardContext,
    modality: Modality,
    region: &str,
    window: usize,
) -> Result<Figure> {
    let window = window.max(1);
    let mut data = Vec::with_capacity(MetricKind::ALL.len());
    for kind in MetricKind::ALL {
        let metric = ctx.metric(modality, kind)?;
        let (periods, values) = ctx.series(region, modality, kind)?;
        let means = rolling_mean(&values, window);
        let x = if means.is_empty() {
            Vec::new()
        } else {
            iso_dates(&periods[window - 1..])
        };
        data.push(Trace::bar(metric.label(), x, means));
    }
    Ok(Figure {
        data,
        layout: Layout {
            title: format!("{modality} Activity and Waiting List<br>{region}"),
        },
    })
}

/// Latest full-window rolling mean of one metric per region, highest first.
///
/// Regions with fewer periods than `window` are left out. Ties keep region
/// name order.
pub fn ranking(
    ctx: &DashboardContext,
    modality: Modality,
    kind: MetricKind,
    window: usize,
) -> Result<Vec<RankEntry>> {
    let window = window.max(1);
    let mut entries = Vec::new();
    for region in ctx.regions() {
        let (_, values) = ctx.series(region, modality, kind)?;
        if let Some(value) = rolling_mean(&values, window).last() {
            entries.push(RankEntry {
                region: region.to_string(),
                value: *value,
            });
        }
    }
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    Ok(entries)
}

/// Cross-region ranking bars with the selected region highlighted and a
/// dotted line at the mean.
pub fn overall_ranking(
    ctx: &DashboardContext,
    modality: Modality,
    kind: MetricKind,
    selected: &str,
    window: usize,
) -> Result<Figure> {
    let metric = ctx.metric(modality, kind)?;
    let entries = ranking(ctx, modality, kind, window)?;

    let x: Vec<String> = entries.iter().map(|entry| entry.region.clone()).collect();
    let y: Vec<f64> = entries.iter().map(|entry| entry.value).collect();
    let colors = entries
        .iter()
        .map(|entry| {
            if entry.region == selected {
                HIGHLIGHT_COLOR.to_string()
            } else {
                BAR_COLOR.to_string()
            }
        })
        .collect();
    let mean = if y.is_empty() {
        0.0
    } else {
        y.iter().sum::<f64>() / y.len() as f64
    };

    let bars = Trace {
        marker: Some(Marker { color: colors }),
        ..Trace::bar(kind.as_str(), x.clone(), y)
    };
    let average = Trace {
        y: vec![mean; x.len()],
        x,
        name: format!("Average {kind}"),
        trace_type: TraceType::Scatter,
        marker: None,
        line: Some(Line {
            dash: "dot".to_string(),
            color: "grey".to_string(),
        }),
        mode: Some("lines".to_string()),
    };

    Ok(Figure {
        data: vec![bars, average],
        layout: Layout {
            title: metric.label(),
        },
    })
}

/// User inputs shared by every chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartInputs {
    pub region: String,
    pub window: usize,
    /// Metric ranked by the overall charts.
    pub kind: MetricKind,
}

/// Renders one chart.
pub fn render_chart(ctx: &DashboardContext, chart: ChartKind, inputs: &ChartInputs) -> Result<Figure> {
    match chart {
        ChartKind::Trend(modality) => region_trend(ctx, modality, &inputs.region, inputs.window),
        ChartKind::Overall(modality) => {
            overall_ranking(ctx, modality, inputs.kind, &inputs.region, inputs.window)
        }
    }
}
