//! Region-filtered rolling-average dashboard.
//!
//! The unified table is loaded once into a [`DashboardContext`]. Chart
//! handlers are pure functions of that context and the user inputs, and the
//! axum server in [`server`] exposes them as JSON figures for a small Plotly
//! page.

pub mod charts;
pub mod context;
pub mod error;
pub mod rolling;
pub mod server;

pub use charts::{
    ChartInputs, ChartKind, Figure, Layout, Line, Marker, RankEntry, Trace, TraceType,
    overall_ranking, ranking, region_trend, render_chart,
};
pub use context::{DashboardContext, RegionSeries};
pub use error::{DashboardError, Result};
pub use rolling::{parse_window, rolling_mean};
pub use server::{ChartQuery, RegionsResponse, router, serve};
