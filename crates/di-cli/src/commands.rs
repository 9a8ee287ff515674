use std::net::SocketAddr;

use anyhow::{Context, Result};
use di_cli::pipeline::{ProcessOptions, ProcessResult, resolve_config, run_process};
use di_dashboard::{DashboardContext, RankEntry, parse_window, ranking, serve};
use di_model::{MetricKind, Modality, OutputFormat, PipelineConfig};
use tracing::info;

use crate::cli::{MetricArg, ModalityArg, OutputFormatArg, ProcessArgs, RankArgs, ServeArgs};
use crate::types::{RankRequest, ServeTarget};

pub fn run_process_command(args: &ProcessArgs) -> Result<ProcessResult> {
    let config = resolve_config(args.config.as_deref())?;
    let options = ProcessOptions {
        workbook: args.workbook.clone(),
        lookup: args.lookup.clone(),
        output: args.output.clone(),
        format: output_format(args.format),
        cleaned_output: args.cleaned_output.clone(),
        dry_run: args.dry_run,
    };
    run_process(&options, &config)
}

pub fn run_serve(args: &ServeArgs) -> Result<()> {
    let config = resolve_config(args.config.as_deref())?;
    let ctx = DashboardContext::load(&args.table, &config.dashboard)
        .with_context(|| format!("load unified table {}", args.table.display()))?;
    let target = ServeTarget {
        host: args.host,
        port: args.port,
    };
    let addr = SocketAddr::new(target.host, target.port);
    info!(table = %args.table.display(), %addr, "starting dashboard");
    println!("Dashboard: http://{addr}  (Ctrl+C to stop)");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    runtime
        .block_on(serve(ctx, addr))
        .context("dashboard server")
}

pub fn run_rank(args: &RankArgs) -> Result<(RankRequest, Vec<RankEntry>)> {
    let config = resolve_config(args.config.as_deref())?;
    let ctx = DashboardContext::load(&args.table, &config.dashboard)
        .with_context(|| format!("load unified table {}", args.table.display()))?;
    let request = RankRequest {
        region: args
            .region
            .clone()
            .unwrap_or_else(|| ctx.default_region.clone()),
        window: args
            .window
            .as_deref()
            .map_or(ctx.default_window, parse_window),
        modality: modality(args.modality),
        kind: metric_kind(args.metric),
    };
    if !ctx.has_region(&request.region) {
        tracing::warn!(region = %request.region, "region not present in the table");
    }
    let entries = ranking(&ctx, request.modality, request.kind, request.window)
        .context("rank regions")?;
    Ok((request, entries))
}

pub fn run_config() -> Result<()> {
    let text = PipelineConfig::default()
        .to_toml()
        .context("render default configuration")?;
    print!("{text}");
    Ok(())
}

fn output_format(arg: OutputFormatArg) -> OutputFormat {
    match arg {
        OutputFormatArg::Xlsx => OutputFormat::Xlsx,
        OutputFormatArg::Csv => OutputFormat::Csv,
    }
}

fn modality(arg: ModalityArg) -> Modality {
    match arg {
        ModalityArg::Ct => Modality::Ct,
        ModalityArg::Mri => Modality::Mri,
    }
}

fn metric_kind(arg: MetricArg) -> MetricKind {
    match arg {
        MetricArg::Activity => MetricKind::Activity,
        MetricArg::WaitingList => MetricKind::WaitingList,
    }
}
