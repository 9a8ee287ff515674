//! HTTP surface of the dashboard.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::response::{Html, Json};
use axum::routing::get;
use di_model::MetricKind;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::charts::{ChartInputs, ChartKind, Figure, render_chart};
use crate::context::DashboardContext;
use crate::error::{DashboardError, Result};
use crate::rolling::parse_window;

const INDEX_HTML: &str = include_str!("../assets/index.html");

type SharedContext = Arc<DashboardContext>;

/// Query string accepted by the chart endpoint.
///
/// Everything is optional; missing values fall back to the context defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub region: Option<String>,
    /// Raw window text, parsed with [`parse_window`].
    pub window: Option<String>,
    pub metric: Option<String>,
}

impl ChartQuery {
    fn into_inputs(self, ctx: &DashboardContext) -> Result<ChartInputs> {
        let kind = match self.metric.as_deref() {
            None | Some("") => MetricKind::Activity,
            Some(text) => text
                .parse::<MetricKind>()
                .map_err(|_| DashboardError::UnknownMetric {
                    name: text.to_string(),
                })?,
        };
        Ok(ChartInputs {
            region: self
                .region
                .filter(|region| !region.trim().is_empty())
                .unwrap_or_else(|| ctx.default_region.clone()),
            window: self
                .window
                .as_deref()
                .map_or(ctx.default_window, parse_window),
            kind,
        })
    }
}

/// Selector options for the page.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegionsResponse {
    pub regions: Vec<String>,
    pub default_region: String,
    pub default_window: usize,
    pub charts: Vec<String>,
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn regions(State(ctx): State<SharedContext>) -> Json<RegionsResponse> {
    Json(RegionsResponse {
        regions: ctx.regions().into_iter().map(str::to_string).collect(),
        default_region: ctx.default_region.clone(),
        default_window: ctx.default_window,
        charts: ChartKind::ALL.iter().map(ToString::to_string).collect(),
    })
}

async fn chart(
    State(ctx): State<SharedContext>,
    Path(name): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<Figure>> {
    let chart = name.parse::<ChartKind>()?;
    let inputs = query.into_inputs(&ctx)?;
    tracing::debug!(%chart, region = %inputs.region, window = inputs.window, "render chart");
    render_chart(&ctx, chart, &inputs).map(Json)
}

/// Builds the dashboard router over a shared context.
pub fn router(ctx: SharedContext) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/regions", get(regions))
        .route("/api/charts/{chart}", get(chart))
        .with_state(ctx)
}

/// Serves the dashboard until Ctrl+C (or SIGTERM on Unix).
pub async fn serve(ctx: DashboardContext, addr: SocketAddr) -> Result<()> {
    let app = router(Arc::new(ctx));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| DashboardError::Bind { addr, source })?;
    let local = listener.local_addr().unwrap_or(addr);
    info!(addr = %local, "dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(DashboardError::Server)?;

    info!("dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
