use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MAX_BOTTLENECKS: usize = 3;
pub const MAX_REWORK_LOOPS: usize = 2;
pub const MAX_INEFFICIENCIES: usize = 3;
pub const MAX_ANOMALIES: usize = 2;

pub const UNAVAILABLE_SUMMARY: &str = "LLM analysis unavailable at this time.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Bottleneck {
    pub activity: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ReworkLoop {
    #[serde(rename = "loop")]
    pub sequence: Vec<String>,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Inefficiency {
    pub observation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Anomaly {
    pub item: String,
    pub description: String,
}

/// Qualitative review of a process graph. All five fields are required when
/// parsing a model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InsightReport {
    pub summary: String,
    pub bottlenecks: Vec<Bottleneck>,
    pub rework_loops: Vec<ReworkLoop>,
    pub inefficiencies: Vec<Inefficiency>,
    pub anomalies: Vec<Anomaly>,
}

impl InsightReport {
    /// Report with only a summary; used when no real review is available.
    pub fn degraded(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            bottlenecks: Vec::new(),
            rework_loops: Vec::new(),
            inefficiencies: Vec::new(),
            anomalies: Vec::new(),
        }
    }

    pub fn unavailable() -> Self {
        Self::degraded(UNAVAILABLE_SUMMARY)
    }

    pub fn has_findings(&self) -> bool {
        !(self.bottlenecks.is_empty()
            && self.rework_loops.is_empty()
            && self.inefficiencies.is_empty()
            && self.anomalies.is_empty())
    }

    pub fn truncate_to_limits(&mut self) {
        self.bottlenecks.truncate(MAX_BOTTLENECKS);
        self.rework_loops.truncate(MAX_REWORK_LOOPS);
        self.inefficiencies.truncate(MAX_INEFFICIENCIES);
        self.anomalies.truncate(MAX_ANOMALIES);
    }
}
