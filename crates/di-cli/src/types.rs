use std::net::IpAddr;

use di_model::{MetricKind, Modality};

/// Resolved inputs of the `rank` command.
#[derive(Debug)]
pub struct RankRequest {
    pub region: String,
    pub window: usize,
    pub modality: Modality,
    pub kind: MetricKind,
}

/// Resolved bind address of the `serve` command.
#[derive(Debug, Clone, Copy)]
pub struct ServeTarget {
    pub host: IpAddr,
    pub port: u16,
}
