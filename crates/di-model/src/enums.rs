//! Enumerations for dashboard metrics and output formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Imaging modality charted by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Computed tomography.
    Ct,
    /// Magnetic resonance imaging.
    Mri,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Ct => "CT",
            Modality::Mri => "MRI",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Modality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CT" => Ok(Modality::Ct),
            "MRI" | "MR" => Ok(Modality::Mri),
            _ => Err(format!("Unknown modality: {s}")),
        }
    }
}

/// Metric family: activity counts or waiting-list sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    Activity,
    WaitingList,
}

impl MetricKind {
    pub const ALL: [MetricKind; 2] = [MetricKind::Activity, MetricKind::WaitingList];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Activity => "Activity",
            MetricKind::WaitingList => "Waiting List",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    /// Accepts `activity`, `waiting-list`, `waiting list`, `wl` (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "activity" => Ok(MetricKind::Activity),
            "waitinglist" | "wl" => Ok(MetricKind::WaitingList),
            _ => Err(format!("Unknown metric kind: {s}")),
        }
    }
}

/// File format of the persisted unified table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}
